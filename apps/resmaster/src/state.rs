use std::sync::Arc;

use crate::cache::BuildCache;
use crate::config::Config;
use crate::context::ingest::Normalizer;
use crate::errors::AppError;
use crate::generation::fit_scoring::{FitScorer, KeywordFitScorer};
use crate::http_client::HttpClient;
use crate::render::WriterChain;
use crate::tools::ExternalTool;

/// Shared run state handed to every stage of the pipeline.
pub struct RunContext {
    pub config: Config,
    /// Pluggable fit scorer. Default: KeywordFitScorer.
    pub fit_scorer: Arc<dyn FitScorer>,
    pub normalizer: Normalizer,
    pub writers: WriterChain,
    pub http: HttpClient,
    pub cache: BuildCache,
}

impl RunContext {
    /// Detects the external converters once and wires the pipeline.
    pub async fn initialize(config: Config) -> Result<Self, AppError> {
        let pandoc = ExternalTool::detect("pandoc", &config.pandoc_path).await;
        let typst = ExternalTool::detect("typst", &config.typst_path).await;
        let tesseract = if config.toggles.ocr {
            ExternalTool::detect("tesseract", &config.tesseract_path).await
        } else {
            ExternalTool::disabled("tesseract")
        };
        Self::with_tools(config, pandoc, typst, tesseract)
    }

    pub fn with_tools(
        config: Config,
        pandoc: ExternalTool,
        typst: ExternalTool,
        tesseract: ExternalTool,
    ) -> Result<Self, AppError> {
        let cache = BuildCache::new(config.cache_dir.clone());
        Ok(Self {
            fit_scorer: Arc::new(KeywordFitScorer),
            normalizer: Normalizer::new(pandoc.clone(), tesseract),
            writers: WriterChain::new(pandoc, typst),
            http: HttpClient::new()?,
            cache,
            config,
        })
    }
}
