//! Best-effort link health for the URLs a pair's documents carry forward.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::http_client::HttpClient;

/// URLs checked per pair, at most.
pub const MAX_LINKS: usize = 40;

static RE_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://[^\s<>()\[\]]+").unwrap());

/// URLs in reading order, de-duplicated, trailing punctuation trimmed.
pub fn find_urls(text: &str, max: usize) -> Vec<String> {
    let mut seen = HashSet::new();
    RE_URL
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(['.', ',', ';', ':', '!', '?', '\'', '"']))
        .filter(|u| seen.insert(u.to_string()))
        .take(max)
        .map(str::to_string)
        .collect()
}

/// URLs that failed a HEAD check, in the order they appear.
pub async fn broken_links(http: &HttpClient, texts: &[&str]) -> Vec<String> {
    let urls = find_urls(&texts.join("\n"), MAX_LINKS);
    debug!("Checking {} link(s)", urls.len());
    let mut bad = Vec::new();
    for url in urls {
        if !http.link_resolves(&url).await {
            warn!("Link did not resolve: {url}");
            bad.push(url);
        }
    }
    bad
}
