//! Format readers behind the input normalizer.
//!
//! One reader per input format. Readers never fail on merely poor content:
//! image-only input yields empty text plus a `LowConfidenceExtraction`
//! warning so the pair can still produce best-effort output.

use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

use crate::errors::{AppError, Warning};
use crate::models::document::{Document, DocumentFormat};
use crate::tools::ExternalTool;

/// Below this many non-whitespace characters a PDF is treated as image-only.
pub const MIN_PDF_TEXT_CHARS: usize = 40;

const SKIPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "svg", "head"];
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "section",
    "article", "header", "footer", "table", "dt", "dd", "blockquote", "pre",
];
const RTF_DESTINATIONS: &[&str] = &[
    "fonttbl", "colortbl", "stylesheet", "info", "pict", "header", "footer", "headerl",
    "headerr", "footerl", "footerr", "object", "generator", "listtable", "listoverridetable",
    "rsidtbl", "themedata", "datastore", "latentstyles", "xmlnstbl", "fldinst",
];

/// Text pulled out of one document, before normalization.
#[derive(Debug, Clone, Default)]
pub struct ReadOutcome {
    pub text: String,
    pub warnings: Vec<Warning>,
}

impl ReadOutcome {
    fn text(text: String) -> Self {
        Self {
            text,
            warnings: Vec::new(),
        }
    }

    fn low_confidence(document: &str, text: String, reason: impl Into<String>) -> Self {
        Self {
            text,
            warnings: vec![Warning::low_confidence(document, reason)],
        }
    }
}

#[async_trait]
pub trait TextReader: Send + Sync {
    fn name(&self) -> &'static str;

    fn supports(&self, format: DocumentFormat) -> bool;

    async fn read(&self, doc: &Document) -> Result<ReadOutcome, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Plain text
// ────────────────────────────────────────────────────────────────────────────

pub struct PlainTextReader;

#[async_trait]
impl TextReader for PlainTextReader {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        format == DocumentFormat::PlainText
    }

    async fn read(&self, doc: &Document) -> Result<ReadOutcome, AppError> {
        let bytes = doc.bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(&doc.bytes);
        Ok(ReadOutcome::text(String::from_utf8_lossy(bytes).into_owned()))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// PDF
// ────────────────────────────────────────────────────────────────────────────

pub struct PdfReader;

#[async_trait]
impl TextReader for PdfReader {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        format == DocumentFormat::Pdf
    }

    async fn read(&self, doc: &Document) -> Result<ReadOutcome, AppError> {
        let bytes = doc.bytes.clone();
        // pdf-extract is CPU-bound and panics on some malformed files; the
        // blocking task turns a panic into a JoinError.
        let extracted = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&bytes).map_err(|e| e.to_string())
        })
        .await;

        let text = match extracted {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                warn!("PDF text extraction failed for {}: {e}", doc.name);
                return Ok(ReadOutcome::low_confidence(
                    &doc.name,
                    String::new(),
                    format!("PDF could not be parsed: {e}"),
                ));
            }
            Err(e) => {
                warn!("PDF extraction task aborted for {}: {e}", doc.name);
                return Ok(ReadOutcome::low_confidence(
                    &doc.name,
                    String::new(),
                    "PDF could not be parsed",
                ));
            }
        };

        let visible = text.chars().filter(|c| !c.is_whitespace()).count();
        if visible < MIN_PDF_TEXT_CHARS {
            debug!("{} has {visible} text characters; treating as image-only", doc.name);
            return Ok(ReadOutcome::low_confidence(
                &doc.name,
                text,
                format!("PDF has only {visible} characters of text and looks image-only"),
            ));
        }
        Ok(ReadOutcome::text(text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HTML
// ────────────────────────────────────────────────────────────────────────────

pub struct HtmlReader;

#[async_trait]
impl TextReader for HtmlReader {
    fn name(&self) -> &'static str {
        "html"
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        format == DocumentFormat::Html
    }

    async fn read(&self, doc: &Document) -> Result<ReadOutcome, AppError> {
        let raw = String::from_utf8_lossy(&doc.bytes);
        Ok(ReadOutcome::text(html_to_text(&raw)))
    }
}

/// Visible text of an HTML page with block elements on their own lines.
pub fn html_to_text(raw: &str) -> String {
    let document = Html::parse_document(raw);
    let root = Selector::parse("body")
        .ok()
        .and_then(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element());

    let mut out = String::new();
    walk_html(root, &mut out);
    out
}

fn walk_html(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            let t = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !t.is_empty() {
                if !out.is_empty() && !out.ends_with(['\n', ' ']) {
                    out.push(' ');
                }
                out.push_str(&t);
            }
            continue;
        }
        let Some(child_el) = ElementRef::wrap(child) else {
            continue;
        };
        let tag = child_el.value().name();
        if SKIPPED_TAGS.contains(&tag) {
            continue;
        }
        let block = BLOCK_TAGS.contains(&tag);
        if block && !out.is_empty() && !out.ends_with('\n') {
            out.push('\n');
        }
        if tag == "li" {
            out.push_str("• ");
        }
        walk_html(child_el, out);
        if block && !out.ends_with('\n') {
            out.push('\n');
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RTF
// ────────────────────────────────────────────────────────────────────────────

pub struct RtfReader;

#[async_trait]
impl TextReader for RtfReader {
    fn name(&self) -> &'static str {
        "rtf"
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        format == DocumentFormat::RichText
    }

    async fn read(&self, doc: &Document) -> Result<ReadOutcome, AppError> {
        let raw = String::from_utf8_lossy(&doc.bytes);
        Ok(ReadOutcome::text(rtf_to_text(&raw)))
    }
}

/// Strips RTF control words and groups, keeping the document text.
///
/// Handles `\par`/`\line`/`\tab`, `\'hh` escapes, `\uN` with its fallback
/// character, and skips non-text destinations (font tables, pictures, `\*`).
pub fn rtf_to_text(raw: &str) -> String {
    let chars: Vec<char> = raw.chars().collect();
    let mut out = String::new();
    let mut skip_stack: Vec<bool> = vec![false];
    let mut fallback_pending = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let skipping = skip_stack.last().copied().unwrap_or(false);
        let c = chars[i];
        i += 1;
        match c {
            '{' => skip_stack.push(skipping),
            '}' => {
                if skip_stack.len() > 1 {
                    skip_stack.pop();
                }
            }
            '\r' | '\n' => {}
            '\\' => {
                let Some(&next) = chars.get(i) else { break };
                match next {
                    '\\' | '{' | '}' => {
                        i += 1;
                        emit(&mut out, next, skipping, &mut fallback_pending);
                    }
                    '\'' => {
                        let hex: String = chars.iter().skip(i + 1).take(2).collect();
                        i += 1 + hex.len();
                        if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                            emit(&mut out, char::from(byte), skipping, &mut fallback_pending);
                        }
                    }
                    '*' => {
                        i += 1;
                        if let Some(top) = skip_stack.last_mut() {
                            *top = true;
                        }
                    }
                    '~' => {
                        i += 1;
                        emit(&mut out, ' ', skipping, &mut fallback_pending);
                    }
                    '\r' | '\n' => {
                        i += 1;
                        emit(&mut out, '\n', skipping, &mut fallback_pending);
                    }
                    n if n.is_ascii_alphabetic() => {
                        let start = i;
                        while i < chars.len() && chars[i].is_ascii_alphabetic() {
                            i += 1;
                        }
                        let word: String = chars[start..i].iter().collect();
                        let param_start = i;
                        if i < chars.len() && chars[i] == '-' {
                            i += 1;
                        }
                        while i < chars.len() && chars[i].is_ascii_digit() {
                            i += 1;
                        }
                        let param: Option<i32> = chars[param_start..i]
                            .iter()
                            .collect::<String>()
                            .parse()
                            .ok();
                        if i < chars.len() && chars[i] == ' ' {
                            i += 1;
                        }

                        if RTF_DESTINATIONS.contains(&word.as_str()) {
                            if let Some(top) = skip_stack.last_mut() {
                                *top = true;
                            }
                            continue;
                        }
                        if skipping {
                            continue;
                        }
                        match word.as_str() {
                            "par" | "line" | "sect" | "page" => out.push('\n'),
                            "tab" => out.push('\t'),
                            "bullet" => out.push('•'),
                            "emdash" => out.push('—'),
                            "endash" => out.push('–'),
                            "lquote" | "rquote" => out.push('\''),
                            "ldblquote" | "rdblquote" => out.push('"'),
                            "u" => {
                                if let Some(code) = param {
                                    let code = if code < 0 { code + 65536 } else { code };
                                    if let Some(ch) = u32::try_from(code).ok().and_then(char::from_u32) {
                                        out.push(ch);
                                    }
                                    fallback_pending = 1;
                                }
                            }
                            _ => {}
                        }
                    }
                    _ => {
                        i += 1;
                    }
                }
            }
            other => emit(&mut out, other, skipping, &mut fallback_pending),
        }
    }
    out
}

fn emit(out: &mut String, c: char, skipping: bool, fallback_pending: &mut usize) {
    if skipping {
        return;
    }
    if *fallback_pending > 0 {
        *fallback_pending -= 1;
        return;
    }
    out.push(c);
}

// ────────────────────────────────────────────────────────────────────────────
// Word processor files (pandoc)
// ────────────────────────────────────────────────────────────────────────────

pub struct WordReader {
    pandoc: ExternalTool,
}

impl WordReader {
    pub fn new(pandoc: ExternalTool) -> Self {
        Self { pandoc }
    }
}

#[async_trait]
impl TextReader for WordReader {
    fn name(&self) -> &'static str {
        "word"
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        format == DocumentFormat::WordProcessor
    }

    async fn read(&self, doc: &Document) -> Result<ReadOutcome, AppError> {
        if !self.pandoc.is_available() {
            return Ok(ReadOutcome::low_confidence(
                &doc.name,
                String::new(),
                "word-processor file and pandoc is not available; save it as PDF, RTF or TXT for full extraction",
            ));
        }
        let input_format = if doc.name.to_ascii_lowercase().ends_with(".odt") {
            "odt"
        } else {
            "docx"
        };
        let staged = stage_bytes(doc, input_format).await?;
        let text = match self
            .pandoc
            .run([
                OsStr::new("-f"),
                OsStr::new(input_format),
                OsStr::new("-t"),
                OsStr::new("plain"),
                OsStr::new("--wrap=none"),
                staged.path().as_os_str(),
            ])
            .await
        {
            Ok(stdout) => String::from_utf8_lossy(&stdout).into_owned(),
            Err(e) => {
                warn!("pandoc could not read {}: {e}", doc.name);
                return Ok(ReadOutcome::low_confidence(
                    &doc.name,
                    String::new(),
                    format!("word-processor conversion failed: {e}"),
                ));
            }
        };
        Ok(ReadOutcome::text(text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Images (OCR)
// ────────────────────────────────────────────────────────────────────────────

pub struct ImageReader {
    tesseract: ExternalTool,
}

impl ImageReader {
    pub fn new(tesseract: ExternalTool) -> Self {
        Self { tesseract }
    }
}

#[async_trait]
impl TextReader for ImageReader {
    fn name(&self) -> &'static str {
        "ocr"
    }

    fn supports(&self, format: DocumentFormat) -> bool {
        format == DocumentFormat::Image
    }

    async fn read(&self, doc: &Document) -> Result<ReadOutcome, AppError> {
        if !self.tesseract.is_available() {
            return Ok(ReadOutcome::low_confidence(
                &doc.name,
                String::new(),
                "image input and no OCR engine is available",
            ));
        }

        let ext = Path::new(&doc.name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("png")
            .to_ascii_lowercase();
        let staged = stage_bytes(doc, &ext).await?;

        let text = match self
            .tesseract
            .run([staged.path().as_os_str(), OsStr::new("stdout")])
            .await
        {
            Ok(stdout) => String::from_utf8_lossy(&stdout).into_owned(),
            Err(e) => {
                warn!("OCR failed for {}: {e}", doc.name);
                return Ok(ReadOutcome::low_confidence(
                    &doc.name,
                    String::new(),
                    format!("OCR failed: {e}"),
                ));
            }
        };

        if text.trim().is_empty() {
            return Ok(ReadOutcome::low_confidence(
                &doc.name,
                text,
                "OCR produced no text",
            ));
        }
        Ok(ReadOutcome::text(text))
    }
}

/// Copies document bytes to a temp file so an external tool can read them.
async fn stage_bytes(doc: &Document, ext: &str) -> Result<tempfile::NamedTempFile, AppError> {
    let staged = tempfile::Builder::new()
        .prefix("resmaster-")
        .suffix(&format!(".{ext}"))
        .tempfile()?;
    tokio::fs::write(staged.path(), &doc.bytes).await?;
    Ok(staged)
}
