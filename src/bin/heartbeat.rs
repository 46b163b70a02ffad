use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{info, warn};

use layeredge_heartbeat::api::RewardClient;
use layeredge_heartbeat::config::{AppConfig, CONFIG_PATH};
use layeredge_heartbeat::dashboard::{KeyAction, View, handle_key};
use layeredge_heartbeat::scheduler::Scheduler;
use layeredge_heartbeat::state::StatusTable;
use layeredge_heartbeat::terminal::Screen;
use layeredge_heartbeat::wallets::load_wallets;

#[derive(Parser)]
#[command(name = "heartbeat", about = "LayerEdge node heartbeat bot with a live wallet dashboard")]
struct Args {
    /// Path to config.toml (defaults are used if it does not exist)
    #[arg(long, default_value = CONFIG_PATH)]
    config: PathBuf,

    /// Wallet list, one address per line (overrides `wallets_path`)
    #[arg(long)]
    wallets: Option<PathBuf>,

    /// Log file; the dashboard owns stdout
    #[arg(long, default_value = "heartbeat.log")]
    log_file: PathBuf,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let mut config = AppConfig::load_or_default(&args.config)?;
    if let Some(path) = args.wallets {
        config.wallets_path = path;
    }
    init_logging(&args.log_file)?;
    info!("Loaded config from {}", args.config.display());

    let wallets = load_wallets(&config.wallets_path)?;
    if wallets.is_empty() {
        warn!("No wallets in {}", config.wallets_path.display());
    }

    let api = Arc::new(RewardClient::new(&config.api)?);
    info!(
        "Starting heartbeats for {} wallet(s), api={} interval={}s",
        wallets.len(),
        config.api.base_url,
        config.settings.heartbeat_interval_secs,
    );

    run(&config, wallets, api).await?;

    println!("Shutting down...");
    Ok(())
}

fn init_logging(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Run the dashboard until the user quits.
///
/// Heartbeat tasks report over a channel and only this loop mutates the
/// status table, so every update lands in one step between awaits.
async fn run(config: &AppConfig, wallets: Vec<String>, api: Arc<RewardClient>) -> Result<()> {
    let settings = &config.settings;
    let (tx, mut events) = mpsc::unbounded_channel();
    let mut scheduler = Scheduler::new(api, settings.heartbeat_interval(), tx);

    let mut view = View::new(StatusTable::new(wallets), Screen::enter()?, settings);

    for wallet in view.table.wallets() {
        scheduler.start(wallet);
    }
    view.request_draw()?;

    let mut keys = EventStream::new();

    loop {
        let deadline = view.deadline();
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
            Some(event) = events.recv() => {
                if view.table.apply(&event) {
                    view.request_draw()?;
                }
            }
            key = keys.next() => match key {
                Some(Ok(Event::Key(key))) => match handle_key(&mut view.pager, key) {
                    KeyAction::Quit => {
                        info!("Quit requested");
                        break;
                    }
                    KeyAction::Redraw => view.request_draw()?,
                    KeyAction::Ignore => {}
                },
                Some(Ok(Event::Resize(_, _))) => view.request_draw()?,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e).context("failed to read terminal input"),
                None => {
                    warn!("Terminal input closed");
                    break;
                }
            },
            _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                view.draw()?;
            }
        }
    }

    let active = scheduler.active();
    scheduler.shutdown();
    view.screen.restore();
    info!("Stopped {active} heartbeat task(s)");
    Ok(())
}
