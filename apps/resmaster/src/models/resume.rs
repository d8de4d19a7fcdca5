use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::generation::style::StylePack;

/// The artifacts a run can assemble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Resume,
    ResumeVariantB,
    CoverLetter,
    InterviewGuide,
    AtsText,
    Redline,
    UsajobsChecklist,
}

impl DocumentKind {
    /// Suffix appended to the deterministic base name.
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Resume => "RESUME",
            Self::ResumeVariantB => "RESUME_VARIANT_B",
            Self::CoverLetter => "COVER",
            Self::InterviewGuide => "INTERVIEW_GUIDE",
            Self::AtsText => "ATS",
            Self::Redline => "REDLINE",
            Self::UsajobsChecklist => "USAJOBS_CHECKLIST",
        }
    }

    /// Folder inside the delivery archive.
    pub fn bucket(&self) -> &'static str {
        match self {
            Self::Resume | Self::ResumeVariantB | Self::AtsText => "Resume",
            Self::CoverLetter => "Cover",
            Self::InterviewGuide => "Guides",
            Self::Redline => "Reports",
            Self::UsajobsChecklist => "Federal",
        }
    }

    /// Formats tried in order; the last entry is always plain text.
    pub fn format_chain(&self) -> &'static [OutputFormat] {
        match self {
            Self::Resume | Self::ResumeVariantB | Self::CoverLetter => {
                &[OutputFormat::Docx, OutputFormat::Rtf, OutputFormat::Txt]
            }
            Self::InterviewGuide | Self::UsajobsChecklist => {
                &[OutputFormat::Pdf, OutputFormat::Html, OutputFormat::Txt]
            }
            Self::AtsText | Self::Redline => &[OutputFormat::Txt],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Docx,
    Rtf,
    Pdf,
    Html,
    Txt,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Docx => "docx",
            Self::Rtf => "rtf",
            Self::Pdf => "pdf",
            Self::Html => "html",
            Self::Txt => "txt",
        }
    }
}

/// Structural content block, independent of output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "text", rename_all = "snake_case")]
pub enum Block {
    Title(String),
    Subtitle(String),
    Heading(String),
    Subheading(String),
    Paragraph(String),
    Bullet(String),
    Blank,
}

impl Block {
    pub fn text(&self) -> &str {
        match self {
            Block::Title(t)
            | Block::Subtitle(t)
            | Block::Heading(t)
            | Block::Subheading(t)
            | Block::Paragraph(t)
            | Block::Bullet(t) => t,
            Block::Blank => "",
        }
    }

    pub fn text_mut(&mut self) -> Option<&mut String> {
        match self {
            Block::Title(t)
            | Block::Subtitle(t)
            | Block::Heading(t)
            | Block::Subheading(t)
            | Block::Paragraph(t)
            | Block::Bullet(t) => Some(t),
            Block::Blank => None,
        }
    }
}

/// A named artifact built from the profile, the posting and a style pack.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssembledDocument {
    pub kind: DocumentKind,
    pub style: StylePack,
    pub title: String,
    pub blocks: Vec<Block>,
}

impl AssembledDocument {
    pub fn new(kind: DocumentKind, style: StylePack, title: impl Into<String>) -> Self {
        Self {
            kind,
            style,
            title: title.into(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Single-column plain text. Headings are upper-cased and preceded by a
    /// blank line; bullets use `• `.
    pub fn to_plain_text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Heading(h) => {
                    if !out.is_empty() {
                        out.push('\n');
                    }
                    out.push_str(&h.to_uppercase());
                }
                Block::Bullet(b) => {
                    out.push_str("• ");
                    out.push_str(b);
                }
                Block::Blank => {}
                other => out.push_str(other.text()),
            }
            out.push('\n');
        }
        out
    }

    /// Bullets grouped under each subheading, in order.
    #[cfg(test)]
    pub fn bullets_by_section(&self) -> Vec<(String, Vec<String>)> {
        let mut sections: Vec<(String, Vec<String>)> = Vec::new();
        for block in &self.blocks {
            match block {
                Block::Heading(h) | Block::Subheading(h) => sections.push((h.clone(), Vec::new())),
                Block::Bullet(b) => match sections.last_mut() {
                    Some((_, bullets)) => bullets.push(b.clone()),
                    None => sections.push((String::new(), vec![b.clone()])),
                },
                _ => {}
            }
        }
        sections
    }
}

/// A concrete serialized rendering of one assembled document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputFile {
    pub kind: DocumentKind,
    pub style: StylePack,
    pub format: OutputFormat,
    /// Preferred format when a fallback was used.
    pub requested: OutputFormat,
    pub path: PathBuf,
}

impl OutputFile {
    pub fn used_fallback(&self) -> bool {
        self.format != self.requested
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_chain_ends_in_plain_text() {
        for kind in [
            DocumentKind::Resume,
            DocumentKind::ResumeVariantB,
            DocumentKind::CoverLetter,
            DocumentKind::InterviewGuide,
            DocumentKind::AtsText,
            DocumentKind::Redline,
            DocumentKind::UsajobsChecklist,
        ] {
            assert_eq!(kind.format_chain().last(), Some(&OutputFormat::Txt), "{kind:?}");
        }
    }

    #[test]
    fn test_bullets_by_section_groups_under_subheadings() {
        let mut doc = AssembledDocument::new(DocumentKind::Resume, StylePack::Classic, "r");
        doc.push(Block::Heading("Experience".into()));
        doc.push(Block::Subheading("Engineer — Acme".into()));
        doc.push(Block::Bullet("a".into()));
        doc.push(Block::Bullet("b".into()));
        doc.push(Block::Subheading("Intern — Beta".into()));
        doc.push(Block::Bullet("c".into()));

        let sections = doc.bullets_by_section();
        assert_eq!(sections.len(), 3);
        assert!(sections[0].1.is_empty());
        assert_eq!(sections[1].1, vec!["a", "b"]);
        assert_eq!(sections[2].1, vec!["c"]);
    }

    #[test]
    fn test_plain_text_rendering() {
        let mut doc = AssembledDocument::new(DocumentKind::Resume, StylePack::Classic, "r");
        doc.push(Block::Title("Jane Doe".into()));
        doc.push(Block::Heading("Skills".into()));
        doc.push(Block::Paragraph("SQL | Excel".into()));
        doc.push(Block::Bullet("Cut costs 10%".into()));
        assert_eq!(
            doc.to_plain_text(),
            "Jane Doe\n\nSKILLS\nSQL | Excel\n• Cut costs 10%\n"
        );
    }
}
