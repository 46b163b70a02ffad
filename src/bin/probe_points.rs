//! Probe: node points endpoint
//!
//! Hits GET {base}/node-points?wallet=<addr> for each wallet and prints the
//! raw response, to check what the dashboard API currently reports without
//! sending a heartbeat or claim.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Result, bail};
use clap::Parser;

use layeredge_heartbeat::api::RewardClient;
use layeredge_heartbeat::config::{AppConfig, CONFIG_PATH};
use layeredge_heartbeat::wallets::load_wallets;

#[derive(Parser)]
#[command(name = "probe_points", about = "Print current node points for wallets")]
struct Cli {
    /// Wallet address to query (repeatable)
    #[arg(long)]
    wallet: Vec<String>,

    /// Read wallets from a file instead, one per line
    #[arg(long, conflicts_with = "wallet")]
    wallets: Option<PathBuf>,

    /// Path to config.toml (defaults are used if it does not exist)
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = AppConfig::load_or_default(&cli.config)?;

    let wallets = match &cli.wallets {
        Some(path) => load_wallets(path)?,
        None => cli.wallet.clone(),
    };
    if wallets.is_empty() {
        bail!("no wallets given; use --wallet <addr> or --wallets <path>");
    }

    let client = RewardClient::new(&config.api)?;

    println!("=== Probe: node points ===");
    println!("API: {}", config.api.base_url);
    println!();

    for wallet in &wallets {
        println!("--- {wallet} ---");
        let start = Instant::now();
        match client.check_points(wallet).await {
            Ok(body) => {
                println!("Latency: {:?}", start.elapsed());
                println!("{}", serde_json::to_string_pretty(&body)?);
            }
            Err(e) => {
                println!("Error after {:?}: {e:#}", start.elapsed());
            }
        }
        println!();
    }

    Ok(())
}
