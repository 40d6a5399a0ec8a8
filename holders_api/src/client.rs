//! HTTP client for quote pages.

use std::time::Duration;

use url::Url;

use crate::{user_agent::get_user_agent, Error};

/// HTTP client for HTML quote pages.
///
/// Sends requests with browser-like headers and a randomized user agent to
/// avoid being blocked. Each request builds a fresh `reqwest::Client` with
/// a 30-second timeout, routed through the configured proxy if any and
/// connecting directly otherwise.
#[derive(Debug, Clone, Default)]
pub struct Client {
    /// Proxy URL applied to every request unless overridden per call.
    proxy: Option<String>,
}

impl Client {
    /// Creates a client that connects directly.
    pub fn new() -> Self {
        Self { proxy: None }
    }

    /// Creates a client that routes every request through `proxy`.
    pub fn with_proxy(proxy: &str) -> Self {
        Self {
            proxy: Some(proxy.to_string()),
        }
    }

    /// The proxy used when a call does not name its own.
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    fn build_http(&self, proxy: Option<&str>) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(Duration::from_secs(30));
        if let Some(proxy) = proxy.or(self.proxy.as_deref()) {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| {
                tracing::error!("Invalid proxy {}: {}", proxy, e);
                Error::InvalidProxy(proxy.to_string())
            })?;
            builder = builder.proxy(proxy);
        } else {
            // System proxy variables are ignored; only an explicit proxy is used.
            builder = builder.no_proxy();
        }
        builder.build().map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Error::RequestFailed
        })
    }

    /// Fetches `url` and returns the response body as text.
    pub async fn fetch_html(&self, url: &str) -> Result<String, Error> {
        self.fetch_html_via(url, None).await
    }

    /// Fetches `url`, using `proxy` in place of the client's own proxy when given.
    pub async fn fetch_html_via(&self, url: &str, proxy: Option<&str>) -> Result<String, Error> {
        let url = Url::parse(url).map_err(|e| {
            tracing::error!("Invalid URL {}: {}", url, e);
            Error::RequestFailed
        })?;
        let client = self.build_http(proxy)?;
        let resp = client
            .get(url)
            .header("accept", "text/html,application/xhtml+xml")
            .header("accept-language", "en-US,en;q=0.9")
            .header("upgrade-insecure-requests", "1")
            .header("cache-control", "no-cache")
            .header("pragma", "no-cache")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get page: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        Ok(body)
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        return body.to_string();
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...[truncated]", &body[..end])
}
