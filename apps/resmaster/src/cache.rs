//! Idempotent-run cache.
//!
//! A pair's signature is the SHA-256 of its normalized inputs and every option
//! that shapes the output. A completed build leaves `<sig>.done` holding the
//! pair's manifest entry; a later run with the same signature reuses it as long
//! as the recorded files still exist.

use std::path::PathBuf;

use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::package::manifest::{PairEntry, PairStatus};

/// Identity of the person and target role.
#[derive(Debug, Serialize)]
pub struct SignaturePerson<'a> {
    pub name: &'a str,
    pub company: &'a str,
    pub title: &'a str,
}

/// Inputs hashed into the signature. Serialized through `serde_json::Value`,
/// whose maps keep keys sorted, so field order never changes the hash.
#[derive(Debug, Serialize)]
pub struct SignatureInputs<'a, S: Serialize> {
    pub resume: &'a str,
    pub jd: &'a str,
    pub person: SignaturePerson<'a>,
    pub selection: S,
}

pub fn signature<S: Serialize>(inputs: &SignatureInputs<'_, S>) -> Result<String, AppError> {
    let canonical = serde_json::to_value(inputs)?;
    let bytes = serde_json::to_vec(&canonical)?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

pub struct BuildCache {
    dir: PathBuf,
}

impl BuildCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn marker(&self, sig: &str) -> PathBuf {
        self.dir.join(format!("{sig}.done"))
    }

    /// The recorded entry for `sig`, marked `Cached`. `None` when there is no
    /// marker, it is unreadable, or any recorded file has since disappeared.
    pub async fn lookup(&self, sig: &str) -> Option<PairEntry> {
        let raw = tokio::fs::read_to_string(self.marker(sig)).await.ok()?;
        let mut entry: PairEntry = match serde_json::from_str(&raw) {
            Ok(e) => e,
            Err(e) => {
                warn!("Ignoring unreadable cache marker {sig}: {e}");
                return None;
            }
        };

        let all_present = entry.files.iter().all(|f| f.path.exists())
            && entry.archive.as_ref().map_or(true, |a| a.exists());
        if !all_present {
            debug!("Cache marker {sig} is stale; outputs were removed");
            return None;
        }

        entry.status = PairStatus::Cached;
        Some(entry)
    }

    pub async fn record(&self, sig: &str, entry: &PairEntry) -> Result<(), AppError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_string_pretty(entry)?;
        tokio::fs::write(self.marker(sig), json).await?;
        debug!("Recorded build {sig}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::style::StylePack;
    use crate::models::resume::{DocumentKind, OutputFile, OutputFormat};

    #[derive(Serialize)]
    struct Selection {
        styles: Vec<StylePack>,
        max_bullets: usize,
    }

    fn inputs(resume: &str, styles: Vec<StylePack>) -> SignatureInputs<'_, Selection> {
        SignatureInputs {
            resume,
            jd: "Requirements: sales",
            person: SignaturePerson {
                name: "Jane Doe",
                company: "Northwind",
                title: "Manager",
            },
            selection: Selection {
                styles,
                max_bullets: 6,
            },
        }
    }

    fn entry(path: PathBuf) -> PairEntry {
        let mut entry = PairEntry::failed(
            "pair-1",
            None,
            None,
            &AppError::EmptyInput("placeholder".into()),
        );
        entry.status = PairStatus::Completed;
        entry.error = None;
        entry.files.push(OutputFile {
            kind: DocumentKind::AtsText,
            style: StylePack::Classic,
            format: OutputFormat::Txt,
            requested: OutputFormat::Txt,
            path,
        });
        entry
    }

    #[test]
    fn test_signature_is_stable_and_sensitive() {
        let a = signature(&inputs("resume", vec![StylePack::Classic])).unwrap();
        let b = signature(&inputs("resume", vec![StylePack::Classic])).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, signature(&inputs("resume!", vec![StylePack::Classic])).unwrap());
        assert_ne!(a, signature(&inputs("resume", vec![StylePack::Federal])).unwrap());
    }

    #[tokio::test]
    async fn test_record_then_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("ats.txt");
        std::fs::write(&out, "x").unwrap();
        let cache = BuildCache::new(dir.path().join("cache"));

        assert!(cache.lookup("abc").await.is_none());
        cache.record("abc", &entry(out.clone())).await.unwrap();
        let hit = cache.lookup("abc").await.unwrap();
        assert_eq!(hit.status, PairStatus::Cached);
        assert_eq!(hit.files[0].path, out);
    }

    #[tokio::test]
    async fn test_missing_outputs_invalidate_marker() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("ats.txt");
        std::fs::write(&out, "x").unwrap();
        let cache = BuildCache::new(dir.path());
        cache.record("abc", &entry(out.clone())).await.unwrap();

        std::fs::remove_file(&out).unwrap();
        assert!(cache.lookup("abc").await.is_none());
    }
}
