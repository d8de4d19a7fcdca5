//! Opt-in release check against a GitHub-releases-shaped JSON feed.

use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::http_client::HttpClient;

pub const CURRENT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub tag_name: String,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub assets: Vec<ReleaseAsset>,
}

#[derive(Debug, Deserialize)]
pub struct ReleaseAsset {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub browser_download_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateStatus {
    UpToDate,
    Available {
        latest: String,
        tag: String,
        download_url: Option<String>,
    },
}

/// Numeric dotted components; a leading `v` is ignored and non-numeric parts
/// are dropped, so `v1.10.0-rc` reads as `[1, 10]`.
pub fn parse_version(raw: &str) -> Vec<u64> {
    raw.trim()
        .trim_start_matches(['v', 'V'])
        .split('.')
        .filter_map(|part| part.parse().ok())
        .collect()
}

/// Compares component-wise with missing trailing components read as zero,
/// so `0.1.0.0` equals `0.1.0`.
pub fn is_newer(candidate: &[u64], current: &[u64]) -> bool {
    let len = candidate.len().max(current.len());
    let at = |v: &[u64], i: usize| v.get(i).copied().unwrap_or(0);
    (0..len)
        .map(|i| at(candidate, i).cmp(&at(current, i)))
        .find(|o| o.is_ne())
        .is_some_and(|o| o.is_gt())
}

pub fn evaluate(release: &Release, current: &str) -> UpdateStatus {
    let latest = release.tag_name.trim().trim_start_matches(['v', 'V']).to_string();
    let newer = parse_version(&latest);
    if newer.is_empty() || !is_newer(&newer, &parse_version(current)) {
        return UpdateStatus::UpToDate;
    }

    // Prefer a build for this platform, then any asset, then the release page.
    let os = std::env::consts::OS;
    let download_url = release
        .assets
        .iter()
        .find(|a| a.name.to_ascii_lowercase().contains(os))
        .or_else(|| release.assets.first())
        .map(|a| a.browser_download_url.clone())
        .filter(|u| !u.is_empty())
        .or_else(|| release.html_url.clone());

    UpdateStatus::Available {
        latest,
        tag: release.tag_name.trim().to_string(),
        download_url,
    }
}

pub async fn check_for_update(http: &HttpClient, feed_url: &str) -> Result<UpdateStatus, AppError> {
    let release: Release = http.get_json(feed_url).await?;
    let status = evaluate(&release, CURRENT_VERSION);
    info!("Update check: current {CURRENT_VERSION}, feed tag '{}'", release.tag_name);
    Ok(status)
}
