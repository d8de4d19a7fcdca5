use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;

use super::{stage_markup, FormatWriter};
use crate::errors::AppError;
use crate::models::resume::{AssembledDocument, Block, OutputFormat};
use crate::tools::ExternalTool;

/// Word document via pandoc: the document is rendered as Markdown, staged in a
/// temporary file, and converted.
pub struct DocxWriter {
    pandoc: ExternalTool,
}

impl DocxWriter {
    pub fn new(pandoc: ExternalTool) -> Self {
        Self { pandoc }
    }
}

/// Backslash-escapes characters Markdown would treat as syntax.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '`' | '*' | '_' | '{' | '}' | '[' | ']' | '<' | '>' | '#' | '|' | '$' | '~' | '^'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    // A leading digit run plus '.' would start an ordered list.
    if let Some(dot) = out.find('.') {
        if dot > 0 && out[..dot].chars().all(|c| c.is_ascii_digit()) {
            out.insert(dot, '\\');
        }
    }
    out
}

pub fn to_markdown(doc: &AssembledDocument) -> String {
    let mut out = String::new();
    let mut prev_bullet = false;
    for block in &doc.blocks {
        let is_bullet = matches!(block, Block::Bullet(_));
        if prev_bullet && !is_bullet {
            out.push('\n');
        }
        match block {
            Block::Title(t) => out.push_str(&format!("# {}\n\n", escape_markdown(t))),
            Block::Subtitle(t) => out.push_str(&format!("*{}*\n\n", escape_markdown(t))),
            Block::Heading(t) => out.push_str(&format!("## {}\n\n", escape_markdown(t))),
            Block::Subheading(t) => out.push_str(&format!("### {}\n\n", escape_markdown(t))),
            Block::Paragraph(t) => out.push_str(&format!("{}\n\n", escape_markdown(t))),
            Block::Bullet(t) => out.push_str(&format!("- {}\n", escape_markdown(t))),
            Block::Blank => out.push_str("\\\n\n"),
        }
        prev_bullet = is_bullet;
    }
    out
}

#[async_trait]
impl FormatWriter for DocxWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn is_available(&self) -> bool {
        self.pandoc.is_available()
    }

    fn unavailable_reason(&self) -> String {
        "pandoc not available".to_string()
    }

    async fn write(&self, doc: &AssembledDocument, path: &Path) -> Result<(), AppError> {
        let staged = stage_markup(".md", &to_markdown(doc)).await?;
        self.pandoc
            .run([
                OsStr::new("-f"),
                OsStr::new("markdown"),
                OsStr::new("-t"),
                OsStr::new("docx"),
                OsStr::new("-o"),
                path.as_os_str(),
                staged.path().as_os_str(),
            ])
            .await?;
        Ok(())
    }
}
