use anyhow::Result;
use clap::Args;
use holders_lib::{validation, CachedClient, Holders};

use crate::output::{print_datasets, OutputFormat};

#[derive(Args)]
pub struct RosterArgs {
    /// Ticker symbol (e.g. AAPL, BRK-B)
    pub symbol: String,
}

pub async fn run(args: &RosterArgs, client: &CachedClient, format: &OutputFormat) -> Result<()> {
    let symbol = validation::validate_symbol(&args.symbol)?;
    let holders = Holders::new(client, &symbol);
    print_datasets(&[("insider_roster", holders.insider_roster().await)], format)
}
