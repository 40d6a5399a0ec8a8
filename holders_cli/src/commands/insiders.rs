use anyhow::{bail, Result};
use clap::Args;
use holders_lib::{validation, CachedClient, Holders};

use crate::output::{print_datasets, OutputFormat};

#[derive(Args)]
pub struct InsidersArgs {
    /// Ticker symbol (e.g. AAPL, BRK-B)
    pub symbol: String,

    /// Which table: transactions, purchases, all
    #[arg(long, default_value = "transactions")]
    pub kind: String,
}

pub async fn run(args: &InsidersArgs, client: &CachedClient, format: &OutputFormat) -> Result<()> {
    let symbol = validation::validate_symbol(&args.symbol)?;
    let holders = Holders::new(client, &symbol);

    match args.kind.as_str() {
        "transactions" => print_datasets(
            &[("insider_transactions", holders.insider_transactions().await)],
            format,
        ),
        "purchases" => print_datasets(
            &[("insider_purchases", holders.insider_purchases().await)],
            format,
        ),
        "all" => print_datasets(
            &[
                ("insider_transactions", holders.insider_transactions().await),
                ("insider_purchases", holders.insider_purchases().await),
            ],
            format,
        ),
        other => bail!(
            "unknown insiders kind '{}': expected transactions, purchases or all",
            other
        ),
    }
}
