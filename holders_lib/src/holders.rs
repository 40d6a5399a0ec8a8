//! Lazily scraped holder and insider tables for one symbol.

use tokio::sync::OnceCell;

use crate::error::HoldersError;
use crate::fetch::PageFetcher;
use crate::html::parse_tables;
use crate::normalize;
use crate::table::Table;

/// Quote page root; pages live at `{base}/{symbol}/{page}`.
pub const SCRAPE_URL: &str = "https://finance.yahoo.com/quote";

const HOLDERS_PAGE: &str = "holders";
const INSIDER_TRANSACTIONS_PAGE: &str = "insider-transactions";
const INSIDER_ROSTER_PAGE: &str = "insider-roster";

/// Tables from the holders page.
#[derive(Debug, Default)]
struct HolderTables {
    major: Option<Table>,
    institutional: Option<Table>,
    mutualfund: Option<Table>,
}

/// Tables from the insider transactions page.
#[derive(Debug, Default)]
struct InsiderTables {
    transactions: Option<Table>,
    purchases: Option<Table>,
}

/// Holder and insider tables for one symbol, scraped on first access.
///
/// Each page is fetched at most once per instance: the first accessor for a
/// page scrapes it and fills every dataset that page carries, and concurrent
/// first accesses wait on that single fetch. Results are never refreshed.
/// Nothing here returns an error; a failed fetch or a page missing tables
/// leaves the affected datasets absent.
pub struct Holders<F> {
    fetcher: F,
    symbol: String,
    proxy: Option<String>,
    base_url: String,
    holders: OnceCell<HolderTables>,
    insiders: OnceCell<InsiderTables>,
    roster: OnceCell<Option<Table>>,
}

impl<F: PageFetcher> Holders<F> {
    pub fn new(fetcher: F, symbol: &str) -> Self {
        Self {
            fetcher,
            symbol: symbol.to_string(),
            proxy: None,
            base_url: SCRAPE_URL.to_string(),
            holders: OnceCell::new(),
            insiders: OnceCell::new(),
            roster: OnceCell::new(),
        }
    }

    /// Routes this instrument's page fetches through `proxy`.
    pub fn with_proxy(mut self, proxy: &str) -> Self {
        self.proxy = Some(proxy.to_string());
        self
    }

    /// Points page fetches somewhere other than [`SCRAPE_URL`]. Used for testing.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub async fn major(&self) -> Option<&Table> {
        self.holder_tables().await.major.as_ref()
    }

    pub async fn institutional(&self) -> Option<&Table> {
        self.holder_tables().await.institutional.as_ref()
    }

    pub async fn mutualfund(&self) -> Option<&Table> {
        self.holder_tables().await.mutualfund.as_ref()
    }

    pub async fn insider_transactions(&self) -> Option<&Table> {
        self.insider_tables().await.transactions.as_ref()
    }

    pub async fn insider_purchases(&self) -> Option<&Table> {
        self.insider_tables().await.purchases.as_ref()
    }

    pub async fn insider_roster(&self) -> Option<&Table> {
        self.roster
            .get_or_init(|| self.scrape_insider_roster())
            .await
            .as_ref()
    }

    async fn holder_tables(&self) -> &HolderTables {
        self.holders.get_or_init(|| self.scrape_holders()).await
    }

    async fn insider_tables(&self) -> &InsiderTables {
        self.insiders
            .get_or_init(|| self.scrape_insider_transactions())
            .await
    }

    fn page_url(&self, page: &str) -> String {
        format!("{}/{}/{}", self.base_url, self.symbol, page)
    }

    async fn try_fetch_tables(&self, page: &str) -> Result<Vec<Table>, HoldersError> {
        let url = self.page_url(page);
        let body = self.fetcher.fetch(&url, self.proxy.as_deref()).await?;
        parse_tables(&body)
    }

    /// Every table on `page`, or none if the fetch or parse fails.
    async fn fetch_tables(&self, page: &str) -> Vec<Table> {
        match self.try_fetch_tables(page).await {
            Ok(tables) => {
                tracing::debug!("{} {}: {} tables", self.symbol, page, tables.len());
                tables
            }
            Err(e) => {
                tracing::warn!("{} {} unavailable: {}", self.symbol, page, e);
                Vec::new()
            }
        }
    }

    async fn scrape_holders(&self) -> HolderTables {
        let mut tables = self.fetch_tables(HOLDERS_PAGE).await.into_iter();
        let mut out = HolderTables {
            major: tables.next(),
            institutional: tables.next(),
            mutualfund: tables.next(),
        };

        for table in [&mut out.institutional, &mut out.mutualfund]
            .into_iter()
            .flatten()
        {
            normalize::normalize_holder_table(table);
        }
        out
    }

    async fn scrape_insider_transactions(&self) -> InsiderTables {
        let tables = self.fetch_tables(INSIDER_TRANSACTIONS_PAGE).await;
        let mut out = assign_insider_tables(tables);

        if let Some(table) = out.transactions.as_mut() {
            normalize::normalize_insider_transactions(table);
        }
        if let Some(table) = out.purchases.as_mut() {
            normalize::normalize_insider_purchases(table);
        }
        out
    }

    async fn scrape_insider_roster(&self) -> Option<Table> {
        let mut roster = self
            .fetch_tables(INSIDER_ROSTER_PAGE)
            .await
            .into_iter()
            .next()?;
        normalize::normalize_insider_roster(&mut roster);
        Some(roster)
    }
}

/// Three or more tables: purchases first, transactions third, the summary
/// in between dropped. Two: purchases only. One: transactions only.
fn assign_insider_tables(tables: Vec<Table>) -> InsiderTables {
    let count = tables.len();
    let mut tables = tables.into_iter();
    match count {
        0 => InsiderTables::default(),
        1 => InsiderTables {
            transactions: tables.next(),
            purchases: None,
        },
        2 => InsiderTables {
            transactions: None,
            purchases: tables.next(),
        },
        _ => InsiderTables {
            purchases: tables.next(),
            transactions: tables.nth(1),
        },
    }
}
