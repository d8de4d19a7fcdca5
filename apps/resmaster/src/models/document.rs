use std::path::{Path, PathBuf};

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Input formats the normalizer knows how to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    PlainText,
    Pdf,
    Image,
    WordProcessor,
    RichText,
    Html,
}

impl DocumentFormat {
    /// Format declared by a file extension.
    pub fn from_extension(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "txt" | "md" | "text" => Some(Self::PlainText),
            "pdf" => Some(Self::Pdf),
            "png" | "jpg" | "jpeg" | "tif" | "tiff" | "bmp" | "webp" => Some(Self::Image),
            "docx" | "odt" => Some(Self::WordProcessor),
            "rtf" => Some(Self::RichText),
            "html" | "htm" => Some(Self::Html),
            _ => None,
        }
    }

    /// Format detected from leading magic bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"%PDF") {
            return Some(Self::Pdf);
        }
        if bytes.starts_with(&[0x89, b'P', b'N', b'G'])
            || bytes.starts_with(&[0xFF, 0xD8, 0xFF])
            || bytes.starts_with(b"II*\0")
            || bytes.starts_with(b"MM\0*")
        {
            return Some(Self::Image);
        }
        if bytes.starts_with(b"PK\x03\x04") {
            return Some(Self::WordProcessor);
        }
        if bytes.starts_with(b"{\\rtf") {
            return Some(Self::RichText);
        }
        let head = String::from_utf8_lossy(&bytes[..bytes.len().min(512)]).to_ascii_lowercase();
        let trimmed = head.trim_start();
        if trimmed.starts_with("<!doctype html") || trimmed.starts_with("<html") {
            return Some(Self::Html);
        }
        // A multi-byte character cut at the window edge still counts as text.
        match std::str::from_utf8(&bytes[..bytes.len().min(4096)]) {
            Ok(_) => Some(Self::PlainText),
            Err(e) if e.error_len().is_none() => Some(Self::PlainText),
            Err(_) => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PlainText => "text",
            Self::Pdf => "pdf",
            Self::Image => "image",
            Self::WordProcessor => "word",
            Self::RichText => "rtf",
            Self::Html => "html",
        }
    }
}

/// Where a document came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSource {
    File(PathBuf),
    Url(String),
    Inline,
}

/// An ingested upload. Immutable once constructed.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub format: DocumentFormat,
    pub source: DocumentSource,
    pub bytes: Bytes,
}

impl Document {
    pub fn new(
        name: impl Into<String>,
        format: DocumentFormat,
        source: DocumentSource,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            source,
            bytes: bytes.into(),
        }
    }

    /// Convenience for in-memory plain text.
    #[cfg(test)]
    pub fn from_text(name: &str, text: &str) -> Self {
        Self::new(
            name,
            DocumentFormat::PlainText,
            DocumentSource::Inline,
            Bytes::copy_from_slice(text.as_bytes()),
        )
    }

    pub fn source_url(&self) -> Option<&str> {
        match &self.source {
            DocumentSource::Url(url) => Some(url),
            _ => None,
        }
    }
}
