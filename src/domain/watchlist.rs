//! Tracked-asset list rules: ordered, size-capped, never empty

use crate::shared::errors::WatchlistError;

/// Fallback pair used whenever the stored list is absent or runs short
pub const DEFAULT_ASSETS: [&str; 2] = ["BTC", "ETH"];

/// Default cap on tracked assets. Kept configurable to limit API usage.
pub const DEFAULT_MAX_TRACKED: usize = 2;

/// Ordered, size-capped list of tracked ticker symbols.
///
/// The list is never empty: whenever it would shrink below the cap it is
/// backfilled from the defaults, and a missing stored list resolves to the
/// defaults outright.
#[derive(Debug, Clone, PartialEq)]
pub struct Watchlist {
    symbols: Vec<String>,
    capacity: usize,
    defaults: Vec<String>,
}

impl Watchlist {
    /// Build from a stored symbol list. An empty list falls back to the
    /// defaults; an over-long list is truncated to the cap.
    pub fn new(stored: Vec<String>, capacity: usize, defaults: Vec<String>) -> Self {
        let mut list = Self {
            symbols: stored,
            capacity: capacity.max(1),
            defaults,
        };
        if list.symbols.is_empty() {
            list.backfill();
        }
        list.symbols.truncate(list.capacity);
        list
    }

    pub fn with_defaults(capacity: usize, defaults: Vec<String>) -> Self {
        Self::new(Vec::new(), capacity, defaults)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn contains(&self, symbol: &str) -> bool {
        let symbol = normalize(symbol);
        self.symbols.iter().any(|s| *s == symbol)
    }

    /// Prepend a new symbol, truncating the list back to the cap.
    /// Duplicates are rejected so the caller can warn the user.
    pub fn add(&mut self, symbol: &str) -> Result<(), WatchlistError> {
        let symbol = normalize(symbol);
        if self.symbols.contains(&symbol) {
            return Err(WatchlistError::Duplicate(symbol));
        }
        self.symbols.insert(0, symbol);
        self.symbols.truncate(self.capacity);
        Ok(())
    }

    /// Remove a symbol, then backfill from the defaults (skipping symbols
    /// already present) until the list is back at the cap.
    pub fn remove(&mut self, symbol: &str) -> Result<(), WatchlistError> {
        let symbol = normalize(symbol);
        let before = self.symbols.len();
        self.symbols.retain(|s| *s != symbol);
        if self.symbols.len() == before {
            return Err(WatchlistError::NotTracked(symbol));
        }
        if self.symbols.len() < self.capacity {
            self.backfill();
        }
        Ok(())
    }

    fn backfill(&mut self) {
        let defaults: Vec<String> = if self.defaults.is_empty() {
            DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect()
        } else {
            self.defaults.clone()
        };
        for default in defaults {
            if self.symbols.len() >= self.capacity {
                break;
            }
            if !self.symbols.contains(&default) {
                self.symbols.push(default);
            }
        }
    }
}

fn normalize(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
