//! Common types used across the application

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A single asset quote as returned by the market-data feed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetQuote {
    pub name: String,
    pub symbol: String,
    pub price: f64,
}

/// Last-fetched quotes for the tracked assets, persisted between refreshes.
/// Fully replaced on every refresh, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub assets: Vec<AssetQuote>,
    pub last_updated: Option<DateTime<Utc>>,
}

/// One point of a historical daily price series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// A price move that crossed the significance threshold
#[derive(Debug, Clone, PartialEq)]
pub struct PriceChange {
    pub symbol: String,
    pub name: String,
    /// Relative change since the previous snapshot, e.g. 0.06 for +6%
    pub relative_change: f64,
}

impl PriceChange {
    pub fn direction(&self) -> &'static str {
        if self.relative_change > 0.0 {
            "increased"
        } else {
            "decreased"
        }
    }
}
