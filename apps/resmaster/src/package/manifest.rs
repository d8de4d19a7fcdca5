//! Run manifest (`RUN_MANIFEST_<date>.json`) and the append-only run log
//! (`RUN_LOG.ndjson`). The manifest is written last, after every pair.

use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AppError, Warning};
use crate::generation::enrich::HealthcareReport;
use crate::generation::fit_scoring::ScoreReport;
use crate::generation::risk::RiskReport;
use crate::generation::style::{StylePack, StyleSuggestion};
use crate::models::resume::OutputFile;
use crate::package::naming::manifest_name;

pub const RUN_LOG_NAME: &str = "RUN_LOG.ndjson";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairStatus {
    Completed,
    /// Identical inputs already built; the recorded entry was reused.
    Cached,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairError {
    pub code: String,
    pub message: String,
}

impl From<&AppError> for PairError {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Everything recorded about one resume/job pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairEntry {
    pub label: String,
    pub resume: Option<String>,
    pub job: Option<String>,
    pub status: PairStatus,
    #[serde(default)]
    pub candidate: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub styles: Vec<StylePack>,
    /// Present when no style was requested and one was auto-suggested.
    pub style_suggestion: Option<StyleSuggestion>,
    pub score: Option<ScoreReport>,
    pub risk: Option<RiskReport>,
    /// Credentials found for healthcare targets, with what only the posting names.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthcare: Option<HealthcareReport>,
    #[serde(default)]
    pub files: Vec<OutputFile>,
    pub archive: Option<PathBuf>,
    #[serde(default)]
    pub warnings: Vec<Warning>,
    pub error: Option<PairError>,
    pub signature: Option<String>,
}

impl PairEntry {
    pub fn failed(label: &str, resume: Option<String>, job: Option<String>, err: &AppError) -> Self {
        Self {
            label: label.to_string(),
            resume,
            job,
            status: PairStatus::Failed,
            candidate: String::new(),
            company: String::new(),
            title: String::new(),
            styles: Vec::new(),
            style_suggestion: None,
            score: None,
            risk: None,
            healthcare: None,
            files: Vec::new(),
            archive: None,
            warnings: Vec::new(),
            error: Some(PairError::from(err)),
            signature: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub run_id: Uuid,
    pub version: String,
    pub generated_at: DateTime<Utc>,
    pub run_date: NaiveDate,
    pub pairs: Vec<PairEntry>,
}

impl Manifest {
    pub fn new(run_date: NaiveDate) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            generated_at: Utc::now(),
            run_date,
            pairs: Vec::new(),
        }
    }

    pub fn failed_count(&self) -> usize {
        self.pairs.iter().filter(|p| p.status == PairStatus::Failed).count()
    }

    pub fn file_count(&self) -> usize {
        self.pairs.iter().map(|p| p.files.len()).sum()
    }

    /// Writes the manifest into `dir` and returns its path.
    pub async fn write(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let path = dir.join(manifest_name(self.run_date));
        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(&path, json).await?;
        info!("Manifest written to {}", path.display());
        Ok(path)
    }
}

/// One line of `RUN_LOG.ndjson`.
#[derive(Debug, Serialize, Deserialize)]
pub struct RunLogLine {
    pub ts: DateTime<Utc>,
    pub run_id: Uuid,
    pub version: String,
    pub label: String,
    pub status: PairStatus,
    pub candidate: String,
    pub company: String,
    pub title: String,
    pub coverage: Option<u32>,
    pub grade: Option<String>,
    pub error_code: Option<String>,
}

/// Appends one line per pair to `RUN_LOG.ndjson` in `dir`.
pub async fn append_run_log(dir: &Path, manifest: &Manifest) -> Result<PathBuf, AppError> {
    let path = dir.join(RUN_LOG_NAME);
    let mut lines = String::new();
    for pair in &manifest.pairs {
        let line = RunLogLine {
            ts: manifest.generated_at,
            run_id: manifest.run_id,
            version: manifest.version.clone(),
            label: pair.label.clone(),
            status: pair.status,
            candidate: pair.candidate.clone(),
            company: pair.company.clone(),
            title: pair.title.clone(),
            coverage: pair.score.as_ref().map(|s| s.coverage),
            grade: pair.score.as_ref().map(|s| s.grade.clone()),
            error_code: pair.error.as_ref().map(|e| e.code.clone()),
        };
        lines.push_str(&serde_json::to_string(&line)?);
        lines.push('\n');
    }

    let mut file = tokio::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .await?;
    file.write_all(lines.as_bytes()).await?;
    file.flush().await?;
    Ok(path)
}
