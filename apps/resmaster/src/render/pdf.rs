use std::ffi::OsStr;
use std::path::Path;

use async_trait::async_trait;

use super::{stage_markup, FormatWriter};
use crate::errors::AppError;
use crate::models::resume::{AssembledDocument, Block, OutputFormat};
use crate::tools::ExternalTool;

const PREAMBLE: &str = r#"#set page(paper: "us-letter", margin: 0.75in)
#set text(size: 10.5pt)
#set par(justify: false)
#show heading.where(level: 1): set text(size: 18pt)
#show heading.where(level: 2): it => block(above: 12pt, below: 6pt, upper(it.body))
#show heading.where(level: 3): set text(size: 11pt)

"#;

/// PDF via `typst compile`.
pub struct PdfWriter {
    typst: ExternalTool,
}

impl PdfWriter {
    pub fn new(typst: ExternalTool) -> Self {
        Self { typst }
    }
}

/// Escapes every character with meaning in Typst markup.
pub fn escape_typst(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '\\' | '#' | '*' | '_' | '`' | '$' | '<' | '>' | '@' | '[' | ']' | '~' | '/' | '='
                | '-' | '+' | '"'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub fn to_typst(doc: &AssembledDocument) -> String {
    let mut out = String::from(PREAMBLE);
    let mut prev_bullet = false;
    for block in &doc.blocks {
        let is_bullet = matches!(block, Block::Bullet(_));
        if prev_bullet && !is_bullet {
            out.push('\n');
        }
        match block {
            Block::Title(t) => out.push_str(&format!("= {}\n\n", escape_typst(t))),
            Block::Subtitle(t) => out.push_str(&format!("#emph[{}]\n\n", escape_typst(t))),
            Block::Heading(t) => out.push_str(&format!("== {}\n\n", escape_typst(t))),
            Block::Subheading(t) => out.push_str(&format!("=== {}\n\n", escape_typst(t))),
            Block::Paragraph(t) => out.push_str(&format!("{}\n\n", escape_typst(t))),
            Block::Bullet(t) => out.push_str(&format!("- {}\n", escape_typst(t))),
            Block::Blank => out.push_str("#v(8pt)\n\n"),
        }
        prev_bullet = is_bullet;
    }
    out
}

#[async_trait]
impl FormatWriter for PdfWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn is_available(&self) -> bool {
        self.typst.is_available()
    }

    fn unavailable_reason(&self) -> String {
        "typst not available".to_string()
    }

    async fn write(&self, doc: &AssembledDocument, path: &Path) -> Result<(), AppError> {
        let staged = stage_markup(".typ", &to_typst(doc)).await?;
        self.typst
            .run([
                OsStr::new("compile"),
                staged.path().as_os_str(),
                path.as_os_str(),
            ])
            .await?;
        Ok(())
    }
}
