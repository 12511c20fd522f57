//! Interactive terminal dashboard
//!
//! Renders the tracked assets with live prices, refreshing every 30 seconds
//! while open, and plots a daily price history for one selected asset at a
//! time. All market data flows through the poller's request channel; the
//! dashboard only touches the settings document to manage the watchlist.

use std::time::Duration;

use chrono::Local;
use textplots::{Chart, Plot, Shape};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::interval;
use tracing::warn;

use crate::application::poller::PollerHandle;
use crate::domain::watchlist::Watchlist;
use crate::infrastructure::store::DocumentStore;
use crate::shared::types::{AssetQuote, PricePoint};

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub refresh_secs: u64,
    pub history_days: u32,
    pub chart_width: u32,
    pub chart_height: u32,
    pub max_tracked: usize,
    pub default_assets: Vec<String>,
}

/// One rendered chart; at most one is live at a time
struct ChartView {
    symbol: String,
    points: Vec<PricePoint>,
}

/// Command vocabulary accepted at the dashboard prompt
#[derive(Debug, Clone, PartialEq)]
enum Command {
    Refresh,
    Chart { symbol: String, days: Option<u32> },
    Add(String),
    Remove(String),
    Help,
    Quit,
    Unknown(String),
}

fn parse_command(input: &str) -> Command {
    let mut parts = input.split_whitespace();
    let Some(verb) = parts.next() else {
        return Command::Refresh;
    };
    match verb.to_lowercase().as_str() {
        "list" | "refresh" => Command::Refresh,
        "chart" => match parts.next() {
            Some(symbol) => Command::Chart {
                symbol: symbol.to_uppercase(),
                days: parts.next().and_then(|d| d.parse().ok()),
            },
            None => Command::Unknown(input.to_string()),
        },
        "add" => match parts.next() {
            Some(symbol) => Command::Add(symbol.to_string()),
            None => Command::Unknown(input.to_string()),
        },
        "rm" | "remove" => match parts.next() {
            Some(symbol) => Command::Remove(symbol.to_uppercase()),
            None => Command::Unknown(input.to_string()),
        },
        "help" | "?" => Command::Help,
        "quit" | "q" | "exit" => Command::Quit,
        _ => Command::Unknown(input.to_string()),
    }
}

pub struct Dashboard {
    poller: PollerHandle,
    store: DocumentStore,
    config: DashboardConfig,
    quotes: Vec<AssetQuote>,
    chart: Option<ChartView>,
    pending_removal: Option<String>,
}

impl Dashboard {
    pub fn new(poller: PollerHandle, store: DocumentStore, config: DashboardConfig) -> Self {
        Self {
            poller,
            store,
            config,
            quotes: Vec::new(),
            chart: None,
            pending_removal: None,
        }
    }

    /// Run until the user quits or stdin closes. The refresh timer and the
    /// input stream are raced; the first tick renders the initial view.
    pub async fn run(mut self) -> anyhow::Result<()> {
        print_help();
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut ticker = interval(Duration::from_secs(self.config.refresh_secs));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.refresh().await;
                    self.render();
                }
                line = lines.next_line() => {
                    match line? {
                        Some(input) => {
                            if !self.handle_input(input.trim()).await {
                                break;
                            }
                        }
                        None => break,
                    }
                }
            }
        }
        Ok(())
    }

    /// Returns false when the user asked to quit
    async fn handle_input(&mut self, input: &str) -> bool {
        if let Some(symbol) = self.pending_removal.take() {
            if matches!(input.to_lowercase().as_str(), "y" | "yes") {
                self.remove_asset(&symbol).await;
            } else {
                println!("Kept {} in the tracking list", symbol);
            }
            return true;
        }

        match parse_command(input) {
            Command::Refresh => {
                self.refresh().await;
                self.render();
            }
            Command::Chart { symbol, days } => {
                self.show_chart(symbol, days.unwrap_or(self.config.history_days))
                    .await;
            }
            Command::Add(symbol) => self.add_asset(&symbol).await,
            Command::Remove(symbol) => {
                if self.watchlist().contains(&symbol) {
                    println!(
                        "Are you sure you want to remove {} from your tracking list? (y/n)",
                        symbol
                    );
                    self.pending_removal = Some(symbol);
                } else {
                    println!("{} is not in the tracking list", symbol);
                }
            }
            Command::Help => print_help(),
            Command::Quit => return false,
            Command::Unknown(raw) => {
                println!("Unrecognized command: {raw:?} (type 'help' for commands)");
            }
        }
        true
    }

    async fn refresh(&mut self) {
        let symbols = self.watchlist().symbols().to_vec();
        match self.poller.fetch_assets(symbols).await {
            Ok(quotes) => self.quotes = quotes,
            Err(e) => warn!("Price refresh failed: {}", e),
        }
    }

    async fn show_chart(&mut self, symbol: String, days: u32) {
        match self.poller.fetch_historical_data(symbol.clone(), days).await {
            Ok(points) if !points.is_empty() => {
                // replaces any prior chart; only one is ever live
                self.chart = Some(ChartView { symbol, points });
                self.render();
            }
            Ok(_) => println!("No historical data available for {}", symbol),
            Err(e) => warn!("History fetch failed: {}", e),
        }
    }

    async fn add_asset(&mut self, symbol: &str) {
        let mut watchlist = self.watchlist();
        match watchlist.add(symbol) {
            Ok(()) => {
                self.persist(&watchlist);
                println!("Now tracking: {}", watchlist.symbols().join(", "));
                self.refresh().await;
                self.render();
            }
            // user-visible duplicate warning, the list stays unchanged
            Err(e) => println!("⚠️  {}", e),
        }
    }

    async fn remove_asset(&mut self, symbol: &str) {
        let mut watchlist = self.watchlist();
        match watchlist.remove(symbol) {
            Ok(()) => {
                self.persist(&watchlist);
                if self
                    .chart
                    .as_ref()
                    .is_some_and(|c| c.symbol.eq_ignore_ascii_case(symbol))
                {
                    self.chart = None;
                }
                println!("Now tracking: {}", watchlist.symbols().join(", "));
                self.refresh().await;
                self.render();
            }
            Err(e) => println!("⚠️  {}", e),
        }
    }

    /// Current watchlist from the settings document, defaults on absence.
    /// Store failures fall back to the defaults; tracking must stay usable.
    fn watchlist(&self) -> Watchlist {
        let stored = match self.store.load_user_assets() {
            Ok(stored) => stored.unwrap_or_default(),
            Err(e) => {
                warn!("Could not read settings: {}", e);
                Vec::new()
            }
        };
        Watchlist::new(
            stored,
            self.config.max_tracked,
            self.config.default_assets.clone(),
        )
    }

    fn persist(&self, watchlist: &Watchlist) {
        if let Err(e) = self.store.save_user_assets(watchlist.symbols()) {
            warn!("Could not persist watchlist: {}", e);
        }
    }

    fn render(&self) {
        println!();
        println!("── Tracked assets ──────────────────────────");
        if self.quotes.is_empty() {
            println!("(no price data — feed unavailable?)");
        }
        for quote in &self.quotes {
            println!(
                "{:<24} {:>6}  {:>14}",
                quote.name,
                quote.symbol,
                format_usd(quote.price)
            );
        }
        println!("Last updated: {}", Local::now().format("%H:%M:%S"));

        if let Some(chart) = &self.chart {
            println!();
            println!(
                "{} price (USD), {} — {}",
                chart.symbol,
                chart.points.first().map(|p| p.date.to_string()).unwrap_or_default(),
                chart.points.last().map(|p| p.date.to_string()).unwrap_or_default(),
            );
            let series: Vec<(f32, f32)> = chart
                .points
                .iter()
                .enumerate()
                .map(|(i, p)| (i as f32, p.price as f32))
                .collect();
            Chart::new(
                self.config.chart_width,
                self.config.chart_height,
                0.0,
                series.len().saturating_sub(1).max(1) as f32,
            )
            .lineplot(&Shape::Lines(&series))
            .display();
        }
        println!();
    }
}

fn print_help() {
    println!("Commands:");
    println!("  list                refresh and show tracked prices");
    println!("  chart SYM [days]    plot a price history (default 7 days)");
    println!("  add SYM             track a new asset");
    println!("  rm SYM              stop tracking an asset (asks to confirm)");
    println!("  quit                exit the dashboard");
}

/// Format a USD price with thousands separators, e.g. "$64,123.55"
pub fn format_usd(price: f64) -> String {
    let negative = price < 0.0;
    let formatted = format!("{:.2}", price.abs());
    let (int_part, frac_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if negative { "-" } else { "" };
    format!("{}${}.{}", sign, grouped, frac_part)
}
