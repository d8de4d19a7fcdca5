//! Style memory: the last explicit style and tone choice, recalled when a
//! later run names neither.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::errors::AppError;
use crate::generation::style::StylePack;
use crate::generation::tone::CoverTone;

pub const MEMORY_FILE: &str = "memory.json";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LastSelection {
    #[serde(default)]
    pub styles: Vec<StylePack>,
    #[serde(default)]
    pub tone: Option<CoverTone>,
}

impl LastSelection {
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.tone.is_none()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct MemoryFile {
    #[serde(default)]
    last_selection: Option<LastSelection>,
}

pub struct StyleMemory {
    path: PathBuf,
}

impl StyleMemory {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            path: dir.join(MEMORY_FILE),
        }
    }

    /// The remembered selection; `None` when absent or unreadable.
    pub async fn recall(&self) -> Option<LastSelection> {
        let raw = tokio::fs::read(&self.path).await.ok()?;
        match serde_json::from_slice::<MemoryFile>(&raw) {
            Ok(memory) => memory.last_selection.filter(|s| !s.is_empty()),
            Err(e) => {
                warn!("Ignoring unreadable style memory {}: {e}", self.path.display());
                None
            }
        }
    }

    pub async fn remember(&self, selection: &LastSelection) -> Result<(), AppError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let memory = MemoryFile {
            last_selection: Some(selection.clone()),
        };
        tokio::fs::write(&self.path, serde_json::to_vec_pretty(&memory)?).await?;
        debug!("Remembered style selection in {}", self.path.display());
        Ok(())
    }

    /// Fills styles and tone the caller left unset from the remembered
    /// selection, then stores whatever the caller did set explicitly.
    pub async fn apply(&self, config: &mut Config) -> Result<(), AppError> {
        let explicit = LastSelection {
            styles: config.styles.clone(),
            tone: config.tone,
        };
        if let Some(last) = self.recall().await {
            if config.styles.is_empty() && !last.styles.is_empty() {
                debug!("Recalled styles {:?}", last.styles);
                config.styles = last.styles;
            }
            if config.tone.is_none() {
                config.tone = last.tone;
            }
        }
        if explicit.is_empty() {
            return Ok(());
        }
        // Keep the half the caller did not override.
        let stored = match self.recall().await {
            Some(prev) => LastSelection {
                styles: if explicit.styles.is_empty() { prev.styles } else { explicit.styles },
                tone: explicit.tone.or(prev.tone),
            },
            None => explicit,
        };
        self.remember(&stored).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recall_without_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(StyleMemory::new(dir.path().into()).recall().await.is_none());
    }

    #[tokio::test]
    async fn test_explicit_choice_is_recalled_next_run() {
        let dir = tempfile::tempdir().unwrap();
        let memory = StyleMemory::new(dir.path().join("session"));

        let mut first = Config::for_tests(dir.path());
        first.styles = vec![StylePack::Healthcare, StylePack::Classic];
        first.tone = Some(CoverTone::Warm);
        memory.apply(&mut first).await.unwrap();

        let mut second = Config::for_tests(dir.path());
        memory.apply(&mut second).await.unwrap();
        assert_eq!(second.styles, vec![StylePack::Healthcare, StylePack::Classic]);
        assert_eq!(second.tone, Some(CoverTone::Warm));
    }

    #[tokio::test]
    async fn test_partial_override_keeps_other_half() {
        let dir = tempfile::tempdir().unwrap();
        let memory = StyleMemory::new(dir.path().into());
        memory
            .remember(&LastSelection {
                styles: vec![StylePack::Federal],
                tone: Some(CoverTone::Direct),
            })
            .await
            .unwrap();

        let mut cfg = Config::for_tests(dir.path());
        cfg.styles = vec![StylePack::Technical];
        memory.apply(&mut cfg).await.unwrap();
        assert_eq!(cfg.styles, vec![StylePack::Technical]);
        assert_eq!(cfg.tone, Some(CoverTone::Direct));

        assert_eq!(
            memory.recall().await.unwrap(),
            LastSelection {
                styles: vec![StylePack::Technical],
                tone: Some(CoverTone::Direct),
            }
        );
    }

    #[tokio::test]
    async fn test_corrupt_memory_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(MEMORY_FILE), b"{not json").unwrap();
        let memory = StyleMemory::new(dir.path().into());
        let mut cfg = Config::for_tests(dir.path());
        memory.apply(&mut cfg).await.unwrap();
        assert!(cfg.styles.is_empty());
    }
}
