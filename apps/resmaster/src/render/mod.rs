// Output writers: one per format, tried in the order each document kind prefers.
pub mod docx;
pub mod html;
pub mod pdf;
pub mod rtf;
pub mod txt;

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::errors::{AppError, Warning};
use crate::models::resume::{AssembledDocument, OutputFile, OutputFormat};
use crate::tools::ExternalTool;

pub use docx::DocxWriter;
pub use html::HtmlWriter;
pub use pdf::PdfWriter;
pub use rtf::RtfWriter;
pub use txt::TxtWriter;

/// Serializes an assembled document into one concrete format.
#[async_trait]
pub trait FormatWriter: Send + Sync {
    fn format(&self) -> OutputFormat;

    /// False when the external converter this writer needs is missing.
    fn is_available(&self) -> bool {
        true
    }

    /// Why the writer is unavailable, for the fallback warning.
    fn unavailable_reason(&self) -> String {
        format!("{} writer unavailable", self.format().extension())
    }

    async fn write(&self, doc: &AssembledDocument, path: &Path) -> Result<(), AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Fallback chain
// ────────────────────────────────────────────────────────────────────────────

/// All writers known to the run, looked up by format.
pub struct WriterChain {
    writers: Vec<Box<dyn FormatWriter>>,
}

impl WriterChain {
    pub fn new(pandoc: ExternalTool, typst: ExternalTool) -> Self {
        Self::from_writers(vec![
            Box::new(DocxWriter::new(pandoc)),
            Box::new(PdfWriter::new(typst)),
            Box::new(RtfWriter),
            Box::new(HtmlWriter),
            Box::new(TxtWriter),
        ])
    }

    pub fn from_writers(writers: Vec<Box<dyn FormatWriter>>) -> Self {
        Self { writers }
    }

    fn writer(&self, format: OutputFormat) -> Option<&dyn FormatWriter> {
        self.writers
            .iter()
            .find(|w| w.format() == format)
            .map(|w| w.as_ref())
    }

    /// Writes `doc` as `<dir>/<stem>.<ext>` in the first format of the kind's
    /// chain that succeeds. Every skipped format yields a `WriterFallback`
    /// warning. Plain text ends every chain, so an error here means the output
    /// directory itself is unwritable.
    pub async fn write_with_fallback(
        &self,
        doc: &AssembledDocument,
        dir: &Path,
        stem: &str,
    ) -> Result<(OutputFile, Vec<Warning>), AppError> {
        let chain = doc.kind.format_chain();
        let requested = chain[0];
        let mut warnings = Vec::new();
        let mut last_error = None;

        for &format in chain {
            let path = dir.join(format!("{stem}.{}", format.extension()));
            let Some(writer) = self.writer(format) else {
                warnings.push(fallback(doc, format, "no writer registered".into()));
                continue;
            };
            if !writer.is_available() {
                debug!("Skipping {} for {}: unavailable", format.extension(), doc.title);
                warnings.push(fallback(doc, format, writer.unavailable_reason()));
                continue;
            }

            match writer.write(doc, &path).await {
                Ok(()) => {
                    debug!("Wrote {}", path.display());
                    let file = OutputFile {
                        kind: doc.kind,
                        style: doc.style,
                        format,
                        requested,
                        path,
                    };
                    return Ok((file, warnings));
                }
                Err(e) => {
                    warn!("{} writer failed for {}: {e}", format.extension(), doc.title);
                    // Never leave a half-written file behind.
                    let _ = tokio::fs::remove_file(&path).await;
                    warnings.push(fallback(doc, format, e.to_string()));
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            AppError::Tool(format!("no writer succeeded for {}", doc.title))
        }))
    }
}

fn fallback(doc: &AssembledDocument, skipped: OutputFormat, reason: String) -> Warning {
    Warning::WriterFallback {
        document: doc.title.clone(),
        skipped: skipped.extension().to_string(),
        reason,
    }
}

/// Stages generated markup in a temporary file for an external converter.
pub(crate) async fn stage_markup(
    suffix: &str,
    markup: &str,
) -> Result<tempfile::NamedTempFile, AppError> {
    let staged = tempfile::Builder::new()
        .prefix("resmaster-")
        .suffix(suffix)
        .tempfile()?;
    tokio::fs::write(staged.path(), markup).await?;
    Ok(staged)
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::generation::style::StylePack;
    use crate::models::resume::{AssembledDocument, Block, DocumentKind};

    pub fn sample(kind: DocumentKind) -> AssembledDocument {
        let mut doc = AssembledDocument::new(kind, StylePack::Classic, "Sample");
        doc.push(Block::Title("Jane Doe".into()));
        doc.push(Block::Subtitle("Operations Manager".into()));
        doc.push(Block::Heading("Experience".into()));
        doc.push(Block::Subheading("Shift Supervisor — Acme & Sons".into()));
        doc.push(Block::Bullet("Cut shrink 12% <fast>".into()));
        doc.push(Block::Bullet("Led a team of 5".into()));
        doc.push(Block::Paragraph("Plain {braces} and \\ slash".into()));
        doc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::DocumentKind;

    struct FailingWriter(OutputFormat);

    #[async_trait]
    impl FormatWriter for FailingWriter {
        fn format(&self) -> OutputFormat {
            self.0
        }

        async fn write(&self, _doc: &AssembledDocument, path: &Path) -> Result<(), AppError> {
            tokio::fs::write(path, b"partial").await?;
            Err(AppError::Tool("converter crashed".into()))
        }
    }

    fn offline_chain() -> WriterChain {
        WriterChain::new(ExternalTool::disabled("pandoc"), ExternalTool::disabled("typst"))
    }

    #[tokio::test]
    async fn test_resume_falls_back_to_rtf_without_pandoc() {
        let dir = tempfile::tempdir().unwrap();
        let doc = test_support::sample(DocumentKind::Resume);
        let (file, warnings) = offline_chain()
            .write_with_fallback(&doc, dir.path(), "Jane_Doe_RESUME")
            .await
            .unwrap();

        assert_eq!(file.format, OutputFormat::Rtf);
        assert_eq!(file.requested, OutputFormat::Docx);
        assert!(file.used_fallback());
        assert_eq!(file.file_name(), "Jane_Doe_RESUME.rtf");
        assert!(file.path.exists());
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            Warning::WriterFallback { skipped, .. } if skipped == "docx"
        ));
    }

    #[tokio::test]
    async fn test_guide_falls_back_to_html_without_typst() {
        let dir = tempfile::tempdir().unwrap();
        let doc = test_support::sample(DocumentKind::InterviewGuide);
        let (file, warnings) = offline_chain()
            .write_with_fallback(&doc, dir.path(), "guide")
            .await
            .unwrap();
        assert_eq!(file.format, OutputFormat::Html);
        assert_eq!(warnings.len(), 1);
    }

    #[tokio::test]
    async fn test_ats_goes_straight_to_text() {
        let dir = tempfile::tempdir().unwrap();
        let doc = test_support::sample(DocumentKind::AtsText);
        let (file, warnings) = offline_chain()
            .write_with_fallback(&doc, dir.path(), "ats")
            .await
            .unwrap();
        assert_eq!(file.format, OutputFormat::Txt);
        assert!(!file.used_fallback());
        assert!(warnings.is_empty());
    }

    #[tokio::test]
    async fn test_failed_writer_is_cleaned_up_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let chain = WriterChain::from_writers(vec![
            Box::new(FailingWriter(OutputFormat::Docx)),
            Box::new(FailingWriter(OutputFormat::Rtf)),
            Box::new(TxtWriter),
        ]);
        let doc = test_support::sample(DocumentKind::CoverLetter);
        let (file, warnings) = chain
            .write_with_fallback(&doc, dir.path(), "cover")
            .await
            .unwrap();

        assert_eq!(file.format, OutputFormat::Txt);
        assert_eq!(warnings.len(), 2);
        assert!(!dir.path().join("cover.docx").exists());
        assert!(!dir.path().join("cover.rtf").exists());
    }

    #[tokio::test]
    async fn test_every_kind_yields_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let chain = offline_chain();
        for kind in [
            DocumentKind::Resume,
            DocumentKind::ResumeVariantB,
            DocumentKind::CoverLetter,
            DocumentKind::InterviewGuide,
            DocumentKind::AtsText,
            DocumentKind::Redline,
            DocumentKind::UsajobsChecklist,
        ] {
            let doc = test_support::sample(kind);
            let (file, _) = chain
                .write_with_fallback(&doc, dir.path(), kind.suffix())
                .await
                .unwrap();
            assert!(file.path.exists(), "{kind:?}");
        }
    }
}
