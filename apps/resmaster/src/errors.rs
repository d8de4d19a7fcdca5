use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::http_client::FetchError;

/// Application-level error type.
/// Every variant maps to a stable code that is recorded in the run manifest
/// when a resume/job pair fails.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Packaging error: {0}")]
    Packaging(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] FetchError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("External tool error: {0}")]
    Tool(String),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Machine-readable code used in the manifest and in log lines.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            AppError::EmptyInput(_) => "EMPTY_INPUT",
            AppError::Packaging(_) => "PACKAGING_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Http(_) => "HTTP_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Tool(_) => "TOOL_ERROR",
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "INTERNAL_ERROR"
            }
        }
    }

    /// True for errors that abort a single pair but never the whole batch.
    pub fn is_pair_local(&self) -> bool {
        !matches!(self, AppError::Internal(_))
    }
}

/// Non-fatal conditions surfaced alongside results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// Text could not be reliably extracted (image-only content, OCR missing or empty).
    LowConfidenceExtraction { document: String, reason: String },
    /// A preferred output format was skipped in favor of the next one in the chain.
    WriterFallback {
        document: String,
        skipped: String,
        reason: String,
    },
    /// A field extractor received no text and produced an empty record.
    EmptyExtraction { document: String },
    /// A URL in the inputs did not resolve.
    BrokenLink { url: String },
}

impl Warning {
    pub fn low_confidence(document: &str, reason: impl Into<String>) -> Self {
        Warning::LowConfidenceExtraction {
            document: document.to_string(),
            reason: reason.into(),
        }
    }
}
