//! Library layer for holders: page scraping, table typing, and caching.
//!
//! Wraps the `holders_api` page client with an in-memory TTL cache and
//! retries, tokenizes HTML tables, and normalizes the holder and insider
//! tables of a quote page into typed [`Table`]s.

pub mod cache;
pub mod client;
pub mod error;
pub mod fetch;
pub mod holders;
pub mod html;
pub mod normalize;
pub mod table;
pub mod validation;

pub use holders_api;

pub use client::{CachedClient, RetryConfig};
pub use error::HoldersError;
pub use fetch::PageFetcher;
pub use holders::{Holders, SCRAPE_URL};
pub use table::{Table, Value};
