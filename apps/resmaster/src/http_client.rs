//! HTTP client used for job-posting URLs and the release feed.
//!
//! Retries on 429 and 5xx responses and on transport errors with exponential
//! backoff. Nothing else in the crate talks to the network directly.

use std::time::Duration;

use bytes::Bytes;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, warn};

const MAX_RETRIES: u32 = 3;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const LINK_TIMEOUT: Duration = Duration::from_secs(3);
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON from {url}: {source}")]
    Parse {
        url: String,
        source: serde_json::Error,
    },

    #[error("gave up on {url} after {retries} attempts")]
    RetriesExhausted { url: String, retries: u32 },
}

/// A fetched body with its declared content type.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub body: Bytes,
    pub content_type: Option<String>,
}

#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// GET with retry on rate limiting, server errors and transport failures.
    pub async fn get(&self, url: &str) -> Result<Fetched, FetchError> {
        let mut last_error: Option<FetchError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                // Exponential backoff: 500ms, 1s
                let delay = Duration::from_millis(500 * (1 << (attempt - 1)));
                warn!(
                    "GET {url} attempt {attempt} failed, retrying after {}ms...",
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = match self.client.get(url).send().await {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(FetchError::Transport(e));
                    continue;
                }
            };

            let status = response.status();
            if status.as_u16() == 429 || status.is_server_error() {
                last_error = Some(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
                continue;
            }
            if !status.is_success() {
                return Err(FetchError::Status {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }

            let content_type = response
                .headers()
                .get(reqwest::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_ascii_lowercase);
            let body = response.bytes().await?;
            debug!("GET {url}: {} bytes", body.len());
            return Ok(Fetched { body, content_type });
        }

        Err(last_error.unwrap_or(FetchError::RetriesExhausted {
            url: url.to_string(),
            retries: MAX_RETRIES,
        }))
    }

    /// One HEAD request, redirects followed. False on any status >= 400 or
    /// transport failure; no retries.
    pub async fn link_resolves(&self, url: &str) -> bool {
        match self.client.head(url).timeout(LINK_TIMEOUT).send().await {
            Ok(response) => {
                let status = response.status();
                debug!("HEAD {url}: {status}");
                !(status.is_client_error() || status.is_server_error())
            }
            Err(e) => {
                debug!("HEAD {url} failed: {e}");
                false
            }
        }
    }

    /// GET and deserialize the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        let fetched = self.get(url).await?;
        serde_json::from_slice(&fetched.body).map_err(|source| FetchError::Parse {
            url: url.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builds() {
        assert!(HttpClient::new().is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_fails_after_retries() {
        tokio::time::pause();
        let client = HttpClient::new().unwrap();
        let err = client.get("http://127.0.0.1:1/posting").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
