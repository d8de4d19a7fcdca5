use std::path::Path;

use async_trait::async_trait;

use super::FormatWriter;
use crate::errors::AppError;
use crate::models::resume::{AssembledDocument, OutputFormat};

/// UTF-8 plain text. Needs no external tools, so it closes every chain.
pub struct TxtWriter;

#[async_trait]
impl FormatWriter for TxtWriter {
    fn format(&self) -> OutputFormat {
        OutputFormat::Txt
    }

    async fn write(&self, doc: &AssembledDocument, path: &Path) -> Result<(), AppError> {
        tokio::fs::write(path, doc.to_plain_text()).await?;
        Ok(())
    }
}
