//! Messari market-data API client

use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use super::PriceFeed;
use crate::shared::errors::FeedError;
use crate::shared::types::{AssetQuote, PricePoint};

pub const DEFAULT_BASE_URL: &str = "https://data.messari.io/api/v1/assets";

/// Response for the multi-asset quote endpoint
#[derive(Debug, Deserialize)]
struct AssetsResponse {
    data: Vec<AssetEntry>,
}

#[derive(Debug, Deserialize)]
struct AssetEntry {
    name: String,
    symbol: String,
    metrics: AssetMetrics,
}

#[derive(Debug, Deserialize)]
struct AssetMetrics {
    market_data: MarketData,
}

#[derive(Debug, Deserialize)]
struct MarketData {
    price_usd: f64,
}

/// Response for the time-series endpoint. Each row is
/// [timestamp_ms, open, high, low, close, ...]; close lives at index 4.
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    data: TimeSeriesData,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesData {
    values: Vec<Vec<f64>>,
}

const CLOSE_INDEX: usize = 4;

/// HTTP client for the Messari assets API
pub struct MessariClient {
    http_client: Client,
    base_url: String,
}

impl MessariClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn try_fetch_assets(&self, symbols: &[String]) -> Result<Vec<AssetQuote>, FeedError> {
        let url = format!(
            "{}?fields=id,name,symbol,metrics/market_data/price_usd&assets={}",
            self.base_url,
            symbols.join(",")
        );
        debug!("Fetching quotes from {}", url);

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }

        let body: AssetsResponse = response.json().await?;
        Ok(body
            .data
            .into_iter()
            .map(|entry| AssetQuote {
                name: entry.name,
                symbol: entry.symbol,
                price: entry.metrics.market_data.price_usd,
            })
            .collect())
    }

    async fn try_fetch_historical(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, FeedError> {
        let end = Utc::now().date_naive();
        let start = end - Duration::days(i64::from(days));
        let url = format!(
            "{}/{}/metrics/price/time-series?start={}&end={}&interval=1d",
            self.base_url, symbol, start, end
        );
        debug!("Fetching {}-day history from {}", days, url);

        let response = self.http_client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(FeedError::Status(response.status()));
        }

        let body: TimeSeriesResponse = response.json().await?;
        body.data
            .values
            .iter()
            .map(|row| row_to_point(row))
            .collect()
    }
}

fn row_to_point(row: &[f64]) -> Result<PricePoint, FeedError> {
    if row.len() <= CLOSE_INDEX {
        return Err(FeedError::MalformedSeries(format!(
            "expected at least {} columns, got {}",
            CLOSE_INDEX + 1,
            row.len()
        )));
    }
    let date = Utc
        .timestamp_millis_opt(row[0] as i64)
        .single()
        .ok_or_else(|| FeedError::MalformedSeries(format!("bad timestamp {}", row[0])))?
        .date_naive();
    Ok(PricePoint {
        date,
        price: row[CLOSE_INDEX],
    })
}

#[async_trait]
impl PriceFeed for MessariClient {
    async fn fetch_assets(&self, symbols: &[String]) -> Vec<AssetQuote> {
        match self.try_fetch_assets(symbols).await {
            Ok(quotes) => quotes,
            Err(e) => {
                warn!("Error fetching quotes for {:?}: {}", symbols, e);
                Vec::new()
            }
        }
    }

    async fn fetch_historical_data(&self, symbol: &str, days: u32) -> Vec<PricePoint> {
        match self.try_fetch_historical(symbol, days).await {
            Ok(points) => points,
            Err(e) => {
                warn!("Error fetching historical data for {}: {}", symbol, e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_parse_assets_response() {
        let payload = r#"{
            "status": {"elapsed": 1},
            "data": [
                {
                    "id": "1e31218a-e44e-4285-820c-8282ee222035",
                    "name": "Bitcoin",
                    "symbol": "BTC",
                    "metrics": {"market_data": {"price_usd": 64123.55}}
                },
                {
                    "id": "21c795f5-1bfd-40c3-858e-e9d7e820c6d0",
                    "name": "Ethereum",
                    "symbol": "ETH",
                    "metrics": {"market_data": {"price_usd": 3120.01}}
                }
            ]
        }"#;

        let parsed: AssetsResponse = serde_json::from_str(payload).unwrap();
        assert_eq!(parsed.data.len(), 2);
        assert_eq!(parsed.data[0].symbol, "BTC");
        assert_eq!(parsed.data[0].metrics.market_data.price_usd, 64123.55);
        assert_eq!(parsed.data[1].name, "Ethereum");
    }

    #[test]
    fn test_parse_time_series_response() {
        let payload = r#"{
            "data": {
                "values": [
                    [1714521600000, 60000.0, 61000.0, 59000.0, 60500.5, 12345.0],
                    [1714608000000, 60500.5, 62000.0, 60000.0, 61800.25, 9876.0]
                ]
            }
        }"#;

        let parsed: TimeSeriesResponse = serde_json::from_str(payload).unwrap();
        let points: Vec<PricePoint> = parsed
            .data
            .values
            .iter()
            .map(|row| row_to_point(row).unwrap())
            .collect();

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        assert_eq!(points[0].price, 60500.5);
        assert_eq!(points[1].price, 61800.25);
    }

    #[test]
    fn test_short_time_series_row_is_rejected() {
        let row = vec![1714521600000.0, 60000.0];
        assert!(row_to_point(&row).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_feed_yields_empty_results() {
        // nothing listens on the discard port; the request fails fast and
        // the failure must be downgraded to an empty result, not an error
        let client = MessariClient::new("http://127.0.0.1:9/api/v1/assets");

        let quotes = client.fetch_assets(&["BTC".to_string()]).await;
        assert!(quotes.is_empty());

        let points = client.fetch_historical_data("BTC", 7).await;
        assert!(points.is_empty());
    }
}
