//! Finds resume/job-posting pairs: explicit arguments first, otherwise the
//! input directory.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::SystemTime;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::AppError;
use crate::models::document::DocumentFormat;

static RE_RESUME_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(resume|cv)").unwrap());
static RE_JOB_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(job|jd|posting|description)").unwrap());

/// Where one side of a pair comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InputRef {
    Path(PathBuf),
    Url(String),
}

impl InputRef {
    pub fn display(&self) -> String {
        match self {
            InputRef::Path(p) => p.display().to_string(),
            InputRef::Url(u) => u.clone(),
        }
    }
}

/// One unit of work. Either side may be missing; a pair with neither is
/// never produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputPair {
    pub label: String,
    pub resume: Option<InputRef>,
    pub job: Option<InputRef>,
}

/// Pairs from `--resume`/`--job` (matched by position) and `--job-url`.
/// Returns an empty list when nothing explicit was given.
pub fn explicit_pairs(
    resumes: &[PathBuf],
    jobs: &[PathBuf],
    job_url: Option<&str>,
) -> Vec<InputPair> {
    let count = resumes.len().max(jobs.len());
    if count == 0 {
        return match job_url {
            Some(url) => vec![InputPair {
                label: "pair-1".to_string(),
                resume: None,
                job: Some(InputRef::Url(url.to_string())),
            }],
            None => Vec::new(),
        };
    }

    (0..count)
        .map(|i| {
            let job = jobs
                .get(i)
                .map(|p| InputRef::Path(p.clone()))
                .or_else(|| job_url.map(|u| InputRef::Url(u.to_string())));
            InputPair {
                label: format!("pair-{}", i + 1),
                resume: resumes.get(i).map(|p| InputRef::Path(p.clone())),
                job,
            }
        })
        .collect()
}

/// Auto-detection: each subdirectory is one pair; otherwise the newest
/// resume-like and job-like files in the directory itself.
pub async fn discover_pairs(input_dir: &Path) -> Result<Vec<InputPair>, AppError> {
    if !tokio::fs::try_exists(input_dir).await? {
        warn!("Input directory {} does not exist", input_dir.display());
        return Ok(Vec::new());
    }

    let (files, mut subdirs) = list_dir(input_dir).await?;
    subdirs.sort();

    let mut pairs = Vec::new();
    for dir in &subdirs {
        let (sub_files, _) = list_dir(dir).await?;
        let label = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("pair-{}", pairs.len() + 1));
        match pick_pair(label, &sub_files) {
            Some(pair) => pairs.push(pair),
            None => debug!("No resume or posting found in {}", dir.display()),
        }
    }

    if pairs.is_empty() {
        if let Some(pair) = pick_pair("pair-1".to_string(), &files) {
            pairs.push(pair);
        }
    }

    info!(
        "Discovered {} pair(s) in {}",
        pairs.len(),
        input_dir.display()
    );
    Ok(pairs)
}

async fn list_dir(dir: &Path) -> Result<(Vec<(PathBuf, SystemTime)>, Vec<PathBuf>), AppError> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();
    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let meta = entry.metadata().await?;
        let path = entry.path();
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if hidden {
            continue;
        }
        if meta.is_dir() {
            dirs.push(path);
        } else if meta.is_file() && DocumentFormat::from_extension(&path).is_some() {
            let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            files.push((path, modified));
        }
    }
    Ok((files, dirs))
}

/// Newest file per role. A name matching both patterns counts as a resume.
fn pick_pair(label: String, files: &[(PathBuf, SystemTime)]) -> Option<InputPair> {
    let stem = |p: &Path| {
        p.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let newest = |want_resume: bool| {
        files
            .iter()
            .filter(|(p, _)| {
                let s = stem(p);
                let resume_like = RE_RESUME_NAME.is_match(&s);
                if want_resume {
                    resume_like
                } else {
                    !resume_like && RE_JOB_NAME.is_match(&s)
                }
            })
            // ties on mtime resolve by name so discovery is deterministic
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(&a.0)))
            .map(|(p, _)| InputRef::Path(p.clone()))
    };

    let resume = newest(true);
    let job = newest(false);
    if resume.is_none() && job.is_none() {
        return None;
    }
    Some(InputPair { label, resume, job })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_pairs_match_by_position() {
        let pairs = explicit_pairs(
            &[PathBuf::from("a_resume.txt"), PathBuf::from("b_resume.txt")],
            &[PathBuf::from("a_job.txt")],
            None,
        );
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].job, Some(InputRef::Path("a_job.txt".into())));
        assert_eq!(pairs[1].job, None);
    }

    #[test]
    fn test_job_url_fills_missing_job() {
        let pairs = explicit_pairs(
            &[PathBuf::from("resume.pdf")],
            &[],
            Some("https://example.com/jobs/1"),
        );
        assert_eq!(
            pairs[0].job,
            Some(InputRef::Url("https://example.com/jobs/1".into()))
        );
        assert!(explicit_pairs(&[], &[], None).is_empty());
    }

    #[tokio::test]
    async fn test_discovers_flat_directory() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("Jane_Resume.pdf"), b"%PDF").await.unwrap();
        tokio::fs::write(dir.path().join("job_description.txt"), "Title: X").await.unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), "ignore me").await.unwrap();
        tokio::fs::write(dir.path().join("run.py"), "print()").await.unwrap();

        let pairs = discover_pairs(dir.path()).await.unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(
            pairs[0].resume,
            Some(InputRef::Path(dir.path().join("Jane_Resume.pdf")))
        );
        assert_eq!(
            pairs[0].job,
            Some(InputRef::Path(dir.path().join("job_description.txt")))
        );
    }

    #[tokio::test]
    async fn test_each_subdirectory_is_a_pair() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["acme", "beta"] {
            let sub = dir.path().join(name);
            tokio::fs::create_dir(&sub).await.unwrap();
            tokio::fs::write(sub.join("resume.txt"), "Jane").await.unwrap();
            tokio::fs::write(sub.join("posting.txt"), "Job").await.unwrap();
        }
        let pairs = discover_pairs(dir.path()).await.unwrap();
        let labels: Vec<&str> = pairs.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(labels, vec!["acme", "beta"]);
    }

    #[tokio::test]
    async fn test_missing_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let pairs = discover_pairs(&dir.path().join("absent")).await.unwrap();
        assert!(pairs.is_empty());
    }
}
