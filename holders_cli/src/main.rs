mod commands;
mod output;

use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand};
use holders_lib::cache::MemoryCache;
use holders_lib::holders_api::Client;
use holders_lib::CachedClient;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "holders")]
#[command(about = "Show holder and insider ownership tables for a ticker")]
struct Cli {
    /// Output format: table, json, csv or md
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Proxy URL for page requests (falls back to HOLDERS_PROXY)
    #[arg(long, global = true)]
    proxy: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Major, institutional and mutual fund holders
    Holders(commands::holders::HoldersArgs),
    /// Insider transactions and purchases
    Insiders(commands::insiders::InsidersArgs),
    /// Insider roster
    Roster(commands::roster::RosterArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("holders=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::parse(&cli.output);

    let proxy = cli
        .proxy
        .clone()
        .or_else(|| std::env::var("HOLDERS_PROXY").ok())
        .filter(|p| !p.trim().is_empty());
    let inner = match proxy.as_deref() {
        Some(proxy) => Client::with_proxy(proxy),
        None => Client::new(),
    };

    let ttl = std::env::var("HOLDERS_CACHE_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(300);
    let client = CachedClient::with_client(inner, MemoryCache::new(Duration::from_secs(ttl)));

    match &cli.command {
        Commands::Holders(args) => commands::holders::run(args, &client, &format).await?,
        Commands::Insiders(args) => commands::insiders::run(args, &client, &format).await?,
        Commands::Roster(args) => commands::roster::run(args, &client, &format).await?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_holders_with_kind_and_globals() {
        let cli = Cli::try_parse_from([
            "holders",
            "holders",
            "aapl",
            "--kind",
            "institutional",
            "--output",
            "json",
            "--proxy",
            "http://127.0.0.1:3128",
        ])
        .unwrap();
        assert_eq!(cli.output, "json");
        assert_eq!(cli.proxy.as_deref(), Some("http://127.0.0.1:3128"));
        match cli.command {
            Commands::Holders(args) => {
                assert_eq!(args.symbol, "aapl");
                assert_eq!(args.kind, "institutional");
            }
            _ => panic!("expected holders subcommand"),
        }
    }

    #[test]
    fn insiders_kind_defaults_to_transactions() {
        let cli = Cli::try_parse_from(["holders", "insiders", "MSFT"]).unwrap();
        match cli.command {
            Commands::Insiders(args) => assert_eq!(args.kind, "transactions"),
            _ => panic!("expected insiders subcommand"),
        }
    }

    #[test]
    fn roster_requires_symbol() {
        assert!(Cli::try_parse_from(["holders", "roster"]).is_err());
    }
}
