//! Market-data feed abstraction

use async_trait::async_trait;

use crate::shared::types::{AssetQuote, PricePoint};

mod messari;

pub use messari::{MessariClient, DEFAULT_BASE_URL};

/// Read-only price source.
///
/// Both methods are best-effort: any network or parse failure is logged at
/// the implementation boundary and downgraded to an empty result, so callers
/// cannot distinguish "no data" from "error". No retries, no partial results.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Current name/symbol/USD-price quotes for the given symbols
    async fn fetch_assets(&self, symbols: &[String]) -> Vec<AssetQuote>;

    /// Daily close prices for one symbol over the trailing `days` days
    async fn fetch_historical_data(&self, symbol: &str, days: u32) -> Vec<PricePoint>;
}
