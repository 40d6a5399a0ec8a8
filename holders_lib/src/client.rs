//! Caching and retrying wrapper around the page client.

use std::time::Duration;

use holders_api::Client;
use rand::Rng;

use crate::cache::MemoryCache;
use crate::error::HoldersError;
use crate::fetch::PageFetcher;

/// Page client wrapper that adds in-memory response caching and retries.
///
/// Cache hits bypass the network entirely. On cache misses, transient
/// failures (transport errors, HTTP 429 and 5xx) are retried with
/// exponential backoff and jitter. Only successful bodies are cached.
pub struct CachedClient {
    inner: Client,
    cache: MemoryCache,
    retry: RetryConfig,
}

/// Retry policy for [`CachedClient`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 2000,
            max_delay_ms: 30000,
        }
    }
}

impl RetryConfig {
    /// Reads `HOLDERS_RETRY_MAX`, `HOLDERS_RETRY_BASE_MS` and
    /// `HOLDERS_RETRY_MAX_MS`, falling back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: env_usize("HOLDERS_RETRY_MAX", defaults.max_retries),
            base_delay_ms: env_u64("HOLDERS_RETRY_BASE_MS", defaults.base_delay_ms),
            max_delay_ms: env_u64("HOLDERS_RETRY_MAX_MS", defaults.max_delay_ms),
        }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    fn delay_for_attempt(&self, attempt: usize) -> Duration {
        let shift = (attempt.saturating_sub(1)).min(30) as u32;
        let exp = 1u64 << shift;
        let base = self
            .base_delay_ms
            .saturating_mul(exp)
            .min(self.max_delay_ms);
        let jitter = rand::thread_rng().gen_range(0.8..1.2);
        Duration::from_millis((base as f64 * jitter) as u64)
    }
}

impl CachedClient {
    /// Creates a cached client over a direct connection, retry policy from env.
    pub fn new(cache: MemoryCache) -> Self {
        Self::with_client(Client::new(), cache)
    }

    /// Creates a cached client over an existing page client, retry policy from env.
    pub fn with_client(inner: Client, cache: MemoryCache) -> Self {
        Self {
            inner,
            cache,
            retry: RetryConfig::from_env(),
        }
    }

    /// Replaces the retry policy.
    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    async fn with_retry<T, F, Fut>(&self, label: &str, mut f: F) -> Result<T, HoldersError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, HoldersError>>,
    {
        let mut attempt = 0usize;
        loop {
            match f().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    attempt += 1;
                    if attempt > self.retry.max_retries || !is_retryable(&err) {
                        return Err(err);
                    }
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        "{} request failed (attempt {}/{}), retrying in {:.1}s",
                        label,
                        attempt,
                        self.retry.max_retries,
                        delay.as_secs_f64()
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    /// Fetches a page body, returning the cached body when available.
    pub async fn get_page(&self, url: &str, proxy: Option<&str>) -> Result<String, HoldersError> {
        let proxy = proxy.or(self.inner.proxy());
        let cache_key = cache_key(url, proxy);

        if let Some(cached) = self.cache.get(&cache_key) {
            tracing::debug!("cache hit for {}", url);
            return Ok(cached);
        }

        let body = self
            .with_retry(url, || async {
                Ok(self.inner.fetch_html_via(url, proxy).await?)
            })
            .await?;
        self.cache.set(cache_key, body.clone());
        Ok(body)
    }

    /// Removes all entries from the cache.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }
}

impl PageFetcher for CachedClient {
    async fn fetch(&self, url: &str, proxy: Option<&str>) -> Result<String, HoldersError> {
        self.get_page(url, proxy).await
    }
}

fn is_retryable(err: &HoldersError) -> bool {
    match err {
        HoldersError::Api(api_err) => match api_err {
            holders_api::Error::RequestFailed => true,
            holders_api::Error::HttpStatus { status, .. } => *status == 429 || *status >= 500,
            holders_api::Error::InvalidProxy(_) => false,
        },
        _ => false,
    }
}

fn cache_key(url: &str, proxy: Option<&str>) -> String {
    match proxy {
        Some(proxy) => format!("{}|via:{}", url, proxy),
        None => url.to_string(),
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|val| val.parse::<usize>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_errors() {
        assert!(is_retryable(&HoldersError::Api(
            holders_api::Error::RequestFailed
        )));
        assert!(is_retryable(&HoldersError::Api(
            holders_api::Error::HttpStatus {
                status: 429,
                body: String::new()
            }
        )));
        assert!(is_retryable(&HoldersError::Api(
            holders_api::Error::HttpStatus {
                status: 502,
                body: String::new()
            }
        )));
        assert!(!is_retryable(&HoldersError::Api(
            holders_api::Error::HttpStatus {
                status: 404,
                body: String::new()
            }
        )));
        assert!(!is_retryable(&HoldersError::Parse("bad".into())));
    }

    #[test]
    fn delay_grows_and_caps() {
        let cfg = RetryConfig {
            max_retries: 5,
            base_delay_ms: 100,
            max_delay_ms: 300,
        };
        let first = cfg.delay_for_attempt(1).as_millis();
        assert!((80..=120).contains(&first));
        let second = cfg.delay_for_attempt(2).as_millis();
        assert!((160..=240).contains(&second));
        let capped = cfg.delay_for_attempt(10).as_millis();
        assert!(capped <= 360);
    }

    #[test]
    fn cache_key_includes_proxy() {
        assert_eq!(cache_key("https://x/A/holders", None), "https://x/A/holders");
        assert_ne!(
            cache_key("https://x/A/holders", Some("http://p:8080")),
            cache_key("https://x/A/holders", None)
        );
    }

    #[test]
    fn retry_none_disables_retries() {
        assert_eq!(RetryConfig::none().max_retries, 0);
    }
}
