//! HTTP fetcher for downloading remote lists.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::AutoblockError;

const TIMEOUT_SECS: u64 = 30;
const MAX_RETRIES: u32 = 3;
const RETRY_DELAY_MS: u64 = 2000;

/// Maximum size per list (10 MB)
const MAX_LIST_SIZE: usize = 10 * 1024 * 1024;

/// Maximum total size for all downloads combined (50 MB)
const MAX_TOTAL_SIZE: usize = 50 * 1024 * 1024;

/// Maximum concurrent HTTP requests
const MAX_CONCURRENT_REQUESTS: usize = 6;

/// Source of remote list bodies
#[async_trait]
pub trait ListFetcher: Send + Sync {
    /// Fetch the body of one list.
    ///
    /// Any failure comes back as [`AutoblockError::Network`].
    async fn fetch(&self, url: &str) -> crate::error::Result<String>;
}

/// HTTP client for fetching lists
pub struct Fetcher {
    client: Client,
    /// Cumulative download size tracker (shared by concurrent fetches)
    total_downloaded: AtomicUsize,
}

impl Fetcher {
    /// Create a new fetcher with default settings
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .user_agent(format!("autoblock/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            total_downloaded: AtomicUsize::new(0),
        })
    }

    /// Get the total bytes downloaded so far
    pub fn total_downloaded(&self) -> usize {
        self.total_downloaded.load(Ordering::Relaxed)
    }

    /// Fetch content with retry logic and size validation
    async fn fetch_with_retry(&self, url: &str, max_size: usize) -> Result<String> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = RETRY_DELAY_MS * (1 << (attempt - 1));
                debug!("Retry {} after {}ms for {}", attempt, delay, url);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }

            match self.client.get(url).send().await {
                Ok(response) => {
                    if response.status().is_success() {
                        if let Some(content_length) = response.content_length() {
                            if content_length as usize > max_size {
                                return Err(anyhow::anyhow!(
                                    "Response too large: {} bytes (max: {} bytes)",
                                    content_length,
                                    max_size
                                ));
                            }
                            let current_total = self.total_downloaded.load(Ordering::Relaxed);
                            if current_total + content_length as usize > MAX_TOTAL_SIZE {
                                return Err(anyhow::anyhow!(
                                    "Cumulative download limit exceeded: {} + {} > {} bytes",
                                    current_total,
                                    content_length,
                                    MAX_TOTAL_SIZE
                                ));
                            }
                        }

                        let body = response
                            .text()
                            .await
                            .context("Failed to read response body")?;

                        // Content-Length may be absent or wrong
                        if body.len() > max_size {
                            return Err(anyhow::anyhow!(
                                "Downloaded content too large: {} bytes (max: {} bytes)",
                                body.len(),
                                max_size
                            ));
                        }

                        let new_total = self
                            .total_downloaded
                            .fetch_add(body.len(), Ordering::Relaxed)
                            + body.len();
                        if new_total > MAX_TOTAL_SIZE {
                            return Err(anyhow::anyhow!(
                                "Cumulative download limit exceeded: {} bytes (max: {} bytes)",
                                new_total,
                                MAX_TOTAL_SIZE
                            ));
                        }

                        return Ok(body);
                    }
                    last_error = Some(anyhow::anyhow!("HTTP {}", response.status()));
                }
                // A malformed request fails the same way every time
                Err(e) if e.is_builder() => return Err(e.into()),
                Err(e) => {
                    last_error = Some(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| anyhow::anyhow!("Unknown error")))
    }
}


#[async_trait]
impl ListFetcher for Fetcher {
    async fn fetch(&self, url: &str) -> crate::error::Result<String> {
        info!("Fetching {}...", url);
        self.fetch_with_retry(url, MAX_LIST_SIZE)
            .await
            .map_err(|e| AutoblockError::Network(format!("{}: {:#}", url, e)))
    }
}

/// Fetch several lists with bounded parallelism.
///
/// Results come back in the order of `urls`, so later deduplication
/// stays deterministic.
pub async fn fetch_all<F: ListFetcher + ?Sized>(
    fetcher: &F,
    urls: &[String],
) -> Vec<(String, crate::error::Result<String>)> {
    use futures::stream::{self, StreamExt};

    stream::iter(urls.iter().map(|url| async move {
        let body = fetcher.fetch(url).await;
        (url.clone(), body)
    }))
    .buffered(MAX_CONCURRENT_REQUESTS)
    .collect()
    .await
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Fetcher serving canned bodies; unknown URLs fail
    #[derive(Default)]
    pub struct MockFetcher {
        pub bodies: HashMap<String, String>,
        pub requested: Mutex<Vec<String>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_body(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), body.to_string());
            self
        }
    }

    #[async_trait]
    impl ListFetcher for MockFetcher {
        async fn fetch(&self, url: &str) -> crate::error::Result<String> {
            self.requested.lock().unwrap().push(url.to_string());
            self.bodies
                .get(url)
                .cloned()
                .ok_or_else(|| AutoblockError::Network(format!("{}: HTTP 404 Not Found", url)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockFetcher;
    use super::*;

    #[test]
    fn test_fetcher_new() {
        let fetcher = Fetcher::new().unwrap();
        assert_eq!(fetcher.total_downloaded(), 0);
    }

    #[tokio::test]
    async fn test_fetch_invalid_url_is_network_error() {
        let fetcher = Fetcher::new().unwrap();

        let err = fetcher.fetch("not a url").await.unwrap_err();

        assert!(matches!(err, AutoblockError::Network(_)));
        assert_eq!(fetcher.total_downloaded(), 0);
    }

    #[tokio::test]
    async fn test_fetch_all_keeps_order() {
        let fetcher = MockFetcher::new()
            .with_body("https://a.example/list", "10.0.0.1\n")
            .with_body("https://b.example/list", "10.0.0.2\n");
        let urls = vec![
            "https://b.example/list".to_string(),
            "https://a.example/list".to_string(),
        ];

        let results = fetch_all(&fetcher, &urls).await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0, "https://b.example/list");
        assert_eq!(results[0].1.as_ref().unwrap(), "10.0.0.2\n");
        assert_eq!(results[1].0, "https://a.example/list");
    }

    #[tokio::test]
    async fn test_fetch_all_reports_failures_per_url() {
        let fetcher = MockFetcher::new().with_body("https://a.example/list", "10.0.0.1\n");
        let urls = vec![
            "https://a.example/list".to_string(),
            "https://missing.example/list".to_string(),
        ];

        let results = fetch_all(&fetcher, &urls).await;

        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(AutoblockError::Network(_))));
    }

    #[tokio::test]
    async fn test_fetch_failure_is_network_error() {
        let fetcher = MockFetcher::new();

        let err = fetcher.fetch("https://down.example/list").await.unwrap_err();

        assert!(matches!(err, AutoblockError::Network(_)));
        assert!(err.to_string().starts_with("Network error: https://down.example/list"));
        let boxed: anyhow::Error = err.into();
        assert!(matches!(
            boxed.downcast_ref::<AutoblockError>(),
            Some(AutoblockError::Network(_))
        ));
    }
}
