//! Input normalizer: heterogeneous uploads → plain text plus a confidence flag.

use std::path::Path;

use serde::Serialize;
use tracing::{debug, info};

use crate::context::readers::{
    HtmlReader, ImageReader, PdfReader, PlainTextReader, ReadOutcome, RtfReader, TextReader,
    WordReader,
};
use crate::errors::{AppError, Warning};
use crate::http_client::HttpClient;
use crate::models::document::{Document, DocumentFormat, DocumentSource};
use crate::tools::ExternalTool;

/// Normalized text for one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedText {
    pub text: String,
    /// False when the text may be incomplete (image-only input, OCR missing).
    pub confident: bool,
    pub warnings: Vec<Warning>,
    /// Set when the document was fetched from a URL.
    pub source_url: Option<String>,
}

impl NormalizedText {
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Dispatches each document to the first reader that supports its format.
pub struct Normalizer {
    readers: Vec<Box<dyn TextReader>>,
}

impl Normalizer {
    pub fn new(pandoc: ExternalTool, tesseract: ExternalTool) -> Self {
        Self {
            readers: vec![
                Box::new(PlainTextReader),
                Box::new(PdfReader),
                Box::new(HtmlReader),
                Box::new(RtfReader),
                Box::new(WordReader::new(pandoc)),
                Box::new(ImageReader::new(tesseract)),
            ],
        }
    }

    pub async fn normalize(&self, doc: &Document) -> Result<NormalizedText, AppError> {
        let reader = self
            .readers
            .iter()
            .find(|r| r.supports(doc.format))
            .ok_or_else(|| {
                AppError::UnsupportedFormat(format!(
                    "{}: no reader for {} input",
                    doc.name,
                    doc.format.label()
                ))
            })?;

        debug!("Reading {} with the {} reader", doc.name, reader.name());
        let ReadOutcome { text, warnings } = reader.read(doc).await?;
        let text = normalize_text(&text);
        let confident = !warnings
            .iter()
            .any(|w| matches!(w, Warning::LowConfidenceExtraction { .. }));

        info!(
            "Normalized {} ({}): {} chars{}",
            doc.name,
            doc.format.label(),
            text.len(),
            if confident { "" } else { ", low confidence" }
        );
        Ok(NormalizedText {
            text,
            confident,
            warnings,
            source_url: doc.source_url().map(str::to_string),
        })
    }
}

/// Canonical whitespace: LF line endings, no control or zero-width
/// characters, single spaces within lines, at most one blank line in a row.
pub fn normalize_text(raw: &str) -> String {
    let cleaned: String = raw
        .replace("\r\n", "\n")
        .replace('\r', "\n")
        .chars()
        .filter_map(|c| match c {
            '\u{00A0}' | '\t' => Some(' '),
            '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' => None,
            '\n' => Some('\n'),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect();

    let mut out = String::with_capacity(cleaned.len());
    let mut blank_run = 0;
    for line in cleaned.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 || out.is_empty() {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(&line);
        out.push('\n');
    }
    out.trim_end().to_string()
}

/// Reads a file. The extension declares the format; magic bytes decide when
/// the extension is missing or unknown.
pub async fn load_document(path: &Path) -> Result<Document, AppError> {
    let bytes = tokio::fs::read(path).await?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let format = DocumentFormat::from_extension(path)
        .or_else(|| DocumentFormat::sniff(&bytes))
        .ok_or_else(|| {
            AppError::UnsupportedFormat(format!("{name}: format not recognized"))
        })?;

    Ok(Document::new(
        name,
        format,
        DocumentSource::File(path.to_path_buf()),
        bytes,
    ))
}

/// Fetches a job posting page. HTML unless the server says otherwise.
pub async fn fetch_document(http: &HttpClient, url: &str) -> Result<Document, AppError> {
    let fetched = http.get(url).await?;
    let declared = fetched.content_type.as_deref().unwrap_or_default();
    let format = if declared.starts_with("application/pdf") {
        DocumentFormat::Pdf
    } else if declared.starts_with("text/plain") {
        DocumentFormat::PlainText
    } else if declared.contains("html") {
        DocumentFormat::Html
    } else {
        DocumentFormat::sniff(&fetched.body).unwrap_or(DocumentFormat::Html)
    };

    Ok(Document::new(
        url,
        format,
        DocumentSource::Url(url.to_string()),
        fetched.body,
    ))
}
