use std::path::Path;

use async_trait::async_trait;

use super::FormatWriter;
use crate::errors::AppError;
use crate::models::resume::{AssembledDocument, Block, OutputFormat};

const STYLE: &str = "body{font-family:Arial,Helvetica,sans-serif;max-width:8in;margin:0.6in auto;line-height:1.35;color:#111}\
h1{font-size:20pt;margin:0}h2{font-size:12pt;text-transform:uppercase;border-bottom:1px solid #999;margin-top:14pt}\
h3{font-size:11pt;margin:8pt 0 2pt}.subtitle{font-size:12pt;margin:2pt 0 8pt}ul{margin:2pt 0 6pt 18pt;padding:0}";

/// Single-column HTML with inline styles; no scripts or external assets.
pub struct HtmlWriter;

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

pub fn to_html(doc: &AssembledDocument) -> String {
    let mut body = String::new();
    let mut in_list = false;

    for block in &doc.blocks {
        let is_bullet = matches!(block, Block::Bullet(_));
        if in_list && !is_bullet {
            body.push_str("</ul>\n");
            in_list = false;
        }
        match block {
            Block::Title(t) => body.push_str(&format!("<h1>{}</h1>\n", escape_html(t))),
            Block::Subtitle(t) => {
                body.push_str(&format!("<p class=\"subtitle\">{}</p>\n", escape_html(t)))
            }
            Block::Heading(t) => body.push_str(&format!("<h2>{}</h2>\n", escape_html(t))),
            Block::Subheading(t) => body.push_str(&format!("<h3>{}</h3>\n", escape_html(t))),
            Block::Paragraph(t) => body.push_str(&format!("<p>{}</p>\n", escape_html(t))),
            Block::Bullet(t) => {
                if !in_list {
                    body.push_str("<ul>\n");
                    in_list = true;
                }
                body.push_str(&format!("<li>{}</li>\n", escape_html(t)));
            }
            Block::Blank => body.push_str("<br>\n"),
        }
    }
    if in_list {
        body.push_str("</ul>\n");
    }

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n",
        escape_html(&doc.title)
    )
}

#[async_trait]
impl FormatWriter for HtmlWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Html
    }

    async fn write(&self, doc: &AssembledDocument, path: &Path) -> Result<(), AppError> {
        tokio::fs::write(path, to_html(doc)).await?;
        Ok(())
    }
}
