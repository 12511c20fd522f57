use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::info;

use crate::application::dashboard::{Dashboard, DashboardConfig, format_usd};
use crate::application::poller::{Poller, PollerConfig, PollerHandle};
use crate::config::Config;
use crate::domain::change::DEFAULT_CHANGE_THRESHOLD;
use crate::domain::watchlist::{Watchlist, DEFAULT_ASSETS, DEFAULT_MAX_TRACKED};
use crate::infrastructure::feed::{MessariClient, DEFAULT_BASE_URL};
use crate::infrastructure::notify;
use crate::infrastructure::store::DocumentStore;

pub use crate::application::poller::DEFAULT_HISTORY_DAYS;

pub const DEFAULT_UPDATE_INTERVAL_MINUTES: u64 = 5;
pub const DEFAULT_REFRESH_SECS: u64 = 30;
const DEFAULT_CHART_WIDTH: u32 = 120;
const DEFAULT_CHART_HEIGHT: u32 = 40;

/// Flat, fully-resolved application configuration.
/// Priority: CLI args > config file > defaults.
#[derive(Debug, Clone)]
pub struct AppCfg {
    pub base_url: String,
    pub data_dir: PathBuf,
    pub update_interval_minutes: u64,
    pub change_threshold: f64,
    pub max_tracked: usize,
    pub default_assets: Vec<String>,
    pub refresh_secs: u64,
    pub history_days: u32,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl AppCfg {
    pub fn from_config(cfg: Config) -> Self {
        Self {
            base_url: cfg.api.base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            data_dir: cfg
                .storage
                .data_dir
                .map(PathBuf::from)
                .unwrap_or_else(default_data_dir),
            update_interval_minutes: cfg
                .poll
                .interval_minutes
                .unwrap_or(DEFAULT_UPDATE_INTERVAL_MINUTES),
            change_threshold: cfg
                .poll
                .change_threshold
                .unwrap_or(DEFAULT_CHANGE_THRESHOLD),
            max_tracked: cfg.watchlist.max_tracked.unwrap_or(DEFAULT_MAX_TRACKED),
            default_assets: cfg
                .watchlist
                .defaults
                .unwrap_or_else(|| DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect()),
            refresh_secs: cfg.display.refresh_secs.unwrap_or(DEFAULT_REFRESH_SECS),
            history_days: cfg.display.history_days.unwrap_or(DEFAULT_HISTORY_DAYS),
            chart_width: cfg.display.chart_width.unwrap_or(DEFAULT_CHART_WIDTH),
            chart_height: cfg.display.chart_height.unwrap_or(DEFAULT_CHART_HEIGHT),
        }
    }

    fn poller_config(&self) -> PollerConfig {
        PollerConfig {
            update_interval: Duration::from_secs(self.update_interval_minutes * 60),
            change_threshold: self.change_threshold,
            max_tracked: self.max_tracked,
            default_assets: self.default_assets.clone(),
        }
    }

    fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            refresh_secs: self.refresh_secs,
            history_days: self.history_days,
            chart_width: self.chart_width,
            chart_height: self.chart_height,
            max_tracked: self.max_tracked,
            default_assets: self.default_assets.clone(),
        }
    }
}

impl Default for AppCfg {
    fn default() -> Self {
        Self::from_config(Config::default())
    }
}

fn default_data_dir() -> PathBuf {
    match std::env::var_os("HOME") {
        Some(home) => PathBuf::from(home).join(".coinwatch"),
        None => PathBuf::from(".coinwatch"),
    }
}

fn build_poller(cfg: &AppCfg) -> (Poller, PollerHandle) {
    let feed = Arc::new(MessariClient::new(cfg.base_url.clone()));
    let store = DocumentStore::new(&cfg.data_dir);
    let notifier = Arc::new(notify::from_env());
    Poller::new(feed, store, notifier, cfg.poller_config())
}

/// Background poller only: refresh on start, then on every interval
pub async fn run_watch(cfg: AppCfg) -> Result<()> {
    info!(
        "Watching up to {} asset(s) every {} minute(s), threshold {:.1}%",
        cfg.max_tracked,
        cfg.update_interval_minutes,
        cfg.change_threshold * 100.0
    );
    let (poller, handle) = build_poller(&cfg);
    // hold a handle so the request channel stays open for the lifetime of the run
    let _handle = handle;
    poller.run().await;
    Ok(())
}

/// Poller plus the interactive terminal dashboard
pub async fn run_dashboard(cfg: AppCfg) -> Result<()> {
    let (poller, handle) = build_poller(&cfg);
    let poller_task = tokio::spawn(poller.run());

    let store = DocumentStore::new(&cfg.data_dir);
    let dashboard = Dashboard::new(handle, store, cfg.dashboard_config());
    let result = dashboard.run().await;

    poller_task.abort();
    result
}

/// Print current prices for the tracked assets once
pub async fn run_quotes(cfg: AppCfg) -> Result<()> {
    let store = DocumentStore::new(&cfg.data_dir);
    let stored = store.load_user_assets()?.unwrap_or_default();
    let watchlist = Watchlist::new(stored, cfg.max_tracked, cfg.default_assets.clone());

    // requests only: printing prices must not notify or touch the snapshot
    let (poller, handle) = build_poller(&cfg);
    let poller_task = tokio::spawn(poller.serve());

    let quotes = handle.fetch_assets(watchlist.symbols().to_vec()).await?;
    poller_task.abort();

    if quotes.is_empty() {
        println!("No price data available");
        return Ok(());
    }
    for quote in &quotes {
        println!(
            "{:<24} {:>6}  {:>14}",
            quote.name,
            quote.symbol,
            format_usd(quote.price)
        );
    }
    Ok(())
}

/// Fetch and print a historical series for one symbol
pub async fn run_history(cfg: AppCfg, symbol: String, days: u32) -> Result<()> {
    let symbol = symbol.trim().to_uppercase();
    let (poller, handle) = build_poller(&cfg);
    let poller_task = tokio::spawn(poller.serve());

    let points = handle.fetch_historical_data(symbol.clone(), days).await?;
    poller_task.abort();

    if points.is_empty() {
        println!("No historical data available for {}", symbol);
        return Ok(());
    }
    println!("{} daily close (USD)", symbol);
    for point in &points {
        println!("{}  {:>14}", point.date, format_usd(point.price));
    }
    Ok(())
}
