//! The page-fetching seam used by [`Holders`](crate::Holders).

use std::future::Future;

use crate::error::HoldersError;

/// Fetches the body of a page, optionally through a proxy.
///
/// Implemented by the plain [`holders_api::Client`] and by
/// [`CachedClient`](crate::CachedClient); tests can supply their own.
pub trait PageFetcher {
    fn fetch(
        &self,
        url: &str,
        proxy: Option<&str>,
    ) -> impl Future<Output = Result<String, HoldersError>> + Send;
}

impl PageFetcher for holders_api::Client {
    async fn fetch(&self, url: &str, proxy: Option<&str>) -> Result<String, HoldersError> {
        Ok(self.fetch_html_via(url, proxy).await?)
    }
}

impl<T: PageFetcher + Sync> PageFetcher for &T {
    fn fetch(
        &self,
        url: &str,
        proxy: Option<&str>,
    ) -> impl Future<Output = Result<String, HoldersError>> + Send {
        (**self).fetch(url, proxy)
    }
}
