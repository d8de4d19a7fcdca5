mod cache;
mod cli;
mod config;
mod context;
mod errors;
mod generation;
mod http_client;
mod layout;
mod models;
mod package;
mod render;
mod session;
mod state;
mod tools;
mod update;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::Cli;
use crate::config::Config;
use crate::context::discovery::{discover_pairs, explicit_pairs};
use crate::generation::generator::{run_batch, summary};
use crate::package::manifest::append_run_log;
use crate::session::StyleMemory;
use crate::state::RunContext;
use crate::update::{check_for_update, UpdateStatus, CURRENT_VERSION};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Environment first, then command-line overrides
    let mut config = Config::from_env()?.apply_cli(&cli)?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resmaster v{CURRENT_VERSION}");

    if config.toggles.style_memory {
        let memory = StyleMemory::new(config.cache_dir.clone());
        if let Err(e) = memory.apply(&mut config).await {
            warn!("Style memory unavailable: {e}");
        }
    }

    let ctx = RunContext::initialize(config.clone()).await?;
    info!("Fit scorer: {}", ctx.fit_scorer.backend());

    let mut pairs = explicit_pairs(&cli.resume, &cli.job, cli.job_url.as_deref());
    if pairs.is_empty() {
        pairs = discover_pairs(&config.input_dir).await?;
    }
    if pairs.is_empty() {
        println!(
            "No resume or job posting found. Pass --resume/--job or place files in {}.",
            config.input_dir.display()
        );
        return Ok(());
    }

    let manifest = run_batch(&ctx, &pairs).await;

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("cannot create {}", config.output_dir.display()))?;
    let manifest_path = manifest.write(&config.output_dir).await?;
    if let Err(e) = append_run_log(&config.output_dir, &manifest).await {
        warn!("Could not append to the run log: {e}");
    }

    println!("\n===== resmaster v{CURRENT_VERSION} =====");
    print!("{}", summary(&manifest, &config.output_dir));
    println!(
        "{} file(s) for {} pair(s). Manifest: {}",
        manifest.file_count(),
        manifest.pairs.len(),
        manifest_path.display()
    );

    if config.check_updates {
        match check_for_update(&ctx.http, &config.update_feed_url).await {
            Ok(UpdateStatus::UpToDate) => println!("You are on the latest version."),
            Ok(UpdateStatus::Available {
                latest,
                tag,
                download_url,
            }) => {
                println!("Update available: {CURRENT_VERSION} → {latest} (tag {tag})");
                if let Some(url) = download_url {
                    println!("Download: {url}");
                }
            }
            Err(e) => warn!("Could not check for updates: {e}"),
        }
    }

    if manifest.failed_count() == manifest.pairs.len() {
        anyhow::bail!("every pair failed; see {}", manifest_path.display());
    }
    Ok(())
}
