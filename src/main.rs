use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use coinwatch::app::{self, AppCfg};
use coinwatch::config::Config;

#[derive(Parser, Debug)]
#[command(version, about = "Crypto price watcher with significant-move notifications")]
struct Args {
    /// Path to config file (optional)
    #[arg(long)]
    config: Option<String>,

    /// Market-data API base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Data directory for settings and cached snapshots
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Refresh interval in minutes
    #[arg(long)]
    interval_minutes: Option<u64>,

    /// Relative change threshold, e.g. 0.05 for 5%
    #[arg(long)]
    threshold: Option<f64>,

    /// Maximum number of tracked assets
    #[arg(long)]
    max_tracked: Option<usize>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the background poller: refresh, notify, persist
    Watch,
    /// Interactive dashboard with live prices and charts
    Dashboard,
    /// Print current prices for the tracked assets once
    Quotes,
    /// Fetch and print a historical price series
    History {
        symbol: String,
        /// Trailing window in days
        #[arg(long, default_value_t = app::DEFAULT_HISTORY_DAYS)]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();

    let base_config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // CLI args override the config file
    let mut cfg = AppCfg::from_config(base_config);
    if let Some(base_url) = args.base_url {
        cfg.base_url = base_url;
    }
    if let Some(data_dir) = args.data_dir {
        cfg.data_dir = data_dir;
    }
    if let Some(interval_minutes) = args.interval_minutes {
        cfg.update_interval_minutes = interval_minutes;
    }
    if let Some(threshold) = args.threshold {
        cfg.change_threshold = threshold;
    }
    if let Some(max_tracked) = args.max_tracked {
        cfg.max_tracked = max_tracked;
    }

    match args.command.unwrap_or(Command::Watch) {
        Command::Watch => app::run_watch(cfg).await,
        Command::Dashboard => app::run_dashboard(cfg).await,
        Command::Quotes => app::run_quotes(cfg).await,
        Command::History { symbol, days } => app::run_history(cfg, symbol, days).await,
    }
}
