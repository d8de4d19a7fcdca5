use std::path::Path;

use async_trait::async_trait;

use super::FormatWriter;
use crate::errors::AppError;
use crate::models::resume::{AssembledDocument, Block, OutputFormat};

const HEADER: &str = "{\\rtf1\\ansi\\ansicpg1252\\deff0\\uc1\n{\\fonttbl{\\f0\\fswiss Arial;}}\n\\paperw12240\\paperh15840\\margl1152\\margr1152\\margt1152\\margb1152\n\\f0\\fs21\n";

/// Rich Text Format, written directly. Opens in any word processor.
pub struct RtfWriter;

/// Escapes RTF control characters; non-ASCII becomes `\uN?` per UTF-16 unit.
pub fn escape_rtf(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '{' => out.push_str("\\{"),
            '}' => out.push_str("\\}"),
            '\t' => out.push_str("\\tab "),
            '\n' => out.push_str("\\line "),
            c if c.is_ascii() => out.push(c),
            c => {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    // RTF takes signed 16-bit code units.
                    out.push_str(&format!("\\u{}?", *unit as i16));
                }
            }
        }
    }
    out
}

pub fn to_rtf(doc: &AssembledDocument) -> String {
    let mut out = String::from(HEADER);
    for block in &doc.blocks {
        let line = match block {
            Block::Title(t) => format!("\\pard\\sa60\\b\\fs36 {}\\b0\\fs21\\par\n", escape_rtf(t)),
            Block::Subtitle(t) => format!("\\pard\\sa120\\fs24 {}\\fs21\\par\n", escape_rtf(t)),
            Block::Heading(t) => format!(
                "\\pard\\sb200\\sa60\\b\\fs24 {}\\b0\\fs21\\par\n",
                escape_rtf(&t.to_uppercase())
            ),
            Block::Subheading(t) => format!("\\pard\\sb120\\b {}\\b0\\par\n", escape_rtf(t)),
            Block::Paragraph(t) => format!("\\pard\\sa60 {}\\par\n", escape_rtf(t)),
            Block::Bullet(t) => format!(
                "\\pard\\fi-240\\li480\\sa40 \\bullet\\tab {}\\par\n",
                escape_rtf(t)
            ),
            Block::Blank => "\\pard\\par\n".to_string(),
        };
        out.push_str(&line);
    }
    out.push('}');
    out
}

#[async_trait]
impl FormatWriter for RtfWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Rtf
    }

    async fn write(&self, doc: &AssembledDocument, path: &Path) -> Result<(), AppError> {
        tokio::fs::write(path, to_rtf(doc)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::readers::rtf_to_text;
    use crate::models::resume::DocumentKind;
    use crate::render::test_support::sample;

    #[test]
    fn test_escapes_control_characters_and_unicode() {
        assert_eq!(escape_rtf("a{b}\\c"), "a\\{b\\}\\\\c");
        assert_eq!(escape_rtf("—"), "\\u8212?");
        assert_eq!(escape_rtf("é"), "\\u233?");
    }

    #[test]
    fn test_document_is_balanced() {
        let rtf = to_rtf(&sample(DocumentKind::Resume));
        assert!(rtf.starts_with("{\\rtf1"));
        let unescaped = rtf.replace("\\{", "").replace("\\}", "");
        assert_eq!(unescaped.matches('{').count(), unescaped.matches('}').count());
        assert!(rtf.contains("\\bullet\\tab Led a team of 5\\par"));
    }

    #[test]
    fn test_reader_recovers_the_text() {
        let text = rtf_to_text(&to_rtf(&sample(DocumentKind::Resume)));
        assert!(text.contains("Jane Doe"));
        assert!(text.contains("Led a team of 5"));
        assert!(text.contains("EXPERIENCE"));
    }
}
