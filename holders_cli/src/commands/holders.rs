use anyhow::{bail, Result};
use clap::Args;
use holders_lib::{validation, CachedClient, Holders};

use crate::output::{print_datasets, OutputFormat};

#[derive(Args)]
pub struct HoldersArgs {
    /// Ticker symbol (e.g. AAPL, BRK-B)
    pub symbol: String,

    /// Which table: major, institutional, mutualfund, all
    #[arg(long, default_value = "all")]
    pub kind: String,
}

pub async fn run(args: &HoldersArgs, client: &CachedClient, format: &OutputFormat) -> Result<()> {
    let symbol = validation::validate_symbol(&args.symbol)?;
    let holders = Holders::new(client, &symbol);

    match args.kind.as_str() {
        "major" => print_datasets(&[("major", holders.major().await)], format),
        "institutional" => {
            print_datasets(&[("institutional", holders.institutional().await)], format)
        }
        "mutualfund" => print_datasets(&[("mutualfund", holders.mutualfund().await)], format),
        "all" => print_datasets(
            &[
                ("major", holders.major().await),
                ("institutional", holders.institutional().await),
                ("mutualfund", holders.mutualfund().await),
            ],
            format,
        ),
        other => bail!(
            "unknown holders kind '{}': expected major, institutional, mutualfund or all",
            other
        ),
    }
}
