//! Periodic refresh pipeline and request handling
//!
//! One task owns the poller. It races a refresh timer against an inbound
//! request channel, so a run is either a scheduled `update_assets` pass or
//! an ad-hoc fetch on behalf of a display; the two never interleave. The
//! first timer tick fires immediately, which covers the refresh-on-startup
//! requirement.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use crate::domain::change::{detect_significant_changes, format_change_message, NOTIFICATION_TITLE};
use crate::domain::watchlist::Watchlist;
use crate::infrastructure::feed::PriceFeed;
use crate::infrastructure::notify::Notifier;
use crate::infrastructure::store::DocumentStore;
use crate::shared::errors::{AppError, StoreError};
use crate::shared::types::{AssetQuote, PricePoint};

pub const DEFAULT_HISTORY_DAYS: u32 = 7;

fn default_history_days() -> u32 {
    DEFAULT_HISTORY_DAYS
}

/// Request vocabulary understood by the poller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum PollerRequest {
    FetchAssets {
        assets: Vec<String>,
    },
    FetchHistoricalData {
        asset: String,
        #[serde(default = "default_history_days")]
        days: u32,
    },
}

/// Response envelope, always `{"data": [...]}` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PollerResponse {
    Assets { data: Vec<AssetQuote> },
    History { data: Vec<PricePoint> },
}

type Envelope = (PollerRequest, oneshot::Sender<PollerResponse>);

/// Client side of the poller's request channel. Each request gets exactly
/// one response over its own oneshot.
#[derive(Clone)]
pub struct PollerHandle {
    tx: mpsc::Sender<Envelope>,
}

impl PollerHandle {
    pub async fn fetch_assets(&self, assets: Vec<String>) -> Result<Vec<AssetQuote>, AppError> {
        match self.request(PollerRequest::FetchAssets { assets }).await? {
            PollerResponse::Assets { data } => Ok(data),
            PollerResponse::History { .. } => Err(AppError::Protocol(
                "unexpected response type for fetchAssets".to_string(),
            )),
        }
    }

    pub async fn fetch_historical_data(
        &self,
        asset: String,
        days: u32,
    ) -> Result<Vec<PricePoint>, AppError> {
        match self
            .request(PollerRequest::FetchHistoricalData { asset, days })
            .await?
        {
            PollerResponse::History { data } => Ok(data),
            PollerResponse::Assets { .. } => Err(AppError::Protocol(
                "unexpected response type for fetchHistoricalData".to_string(),
            )),
        }
    }

    async fn request(&self, request: PollerRequest) -> Result<PollerResponse, AppError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send((request, reply_tx))
            .await
            .map_err(|_| AppError::PollerGone)?;
        reply_rx.await.map_err(|_| AppError::PollerGone)
    }
}

/// Poller configuration, resolved from AppCfg
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub update_interval: Duration,
    pub change_threshold: f64,
    pub max_tracked: usize,
    pub default_assets: Vec<String>,
}

/// Owns the feed, the store and the notifier; runs the refresh pipeline
pub struct Poller {
    feed: Arc<dyn PriceFeed>,
    store: DocumentStore,
    notifier: Arc<dyn Notifier>,
    config: PollerConfig,
    rx: mpsc::Receiver<Envelope>,
}

impl Poller {
    pub fn new(
        feed: Arc<dyn PriceFeed>,
        store: DocumentStore,
        notifier: Arc<dyn Notifier>,
        config: PollerConfig,
    ) -> (Self, PollerHandle) {
        let (tx, rx) = mpsc::channel(16);
        let poller = Self {
            feed,
            store,
            notifier,
            config,
            rx,
        };
        (poller, PollerHandle { tx })
    }

    /// One full refresh pass: read the tracked list (defaults when absent),
    /// fetch fresh quotes, diff against the prior snapshot, notify on
    /// significant moves, then overwrite the snapshot and timestamp.
    pub async fn update_assets(&self) -> Result<(), StoreError> {
        let stored = self.store.load_user_assets()?.unwrap_or_default();
        let watchlist = Watchlist::new(
            stored,
            self.config.max_tracked,
            self.config.default_assets.clone(),
        );
        let symbols = watchlist.symbols().to_vec();

        let new_assets = self.feed.fetch_assets(&symbols).await;
        let old_snapshot = self.store.load_snapshot()?;

        let changes = detect_significant_changes(
            &new_assets,
            &old_snapshot.assets,
            self.config.change_threshold,
        );
        if !changes.is_empty() {
            info!("{} significant price change(s) detected", changes.len());
            for change in &changes {
                self.notifier
                    .notify(NOTIFICATION_TITLE, &format_change_message(change))
                    .await;
            }
        }

        self.store.save_snapshot(&new_assets, Utc::now())?;
        debug!("Refreshed snapshot for {:?}", symbols);
        Ok(())
    }

    async fn handle_request(&self, request: PollerRequest) -> PollerResponse {
        match request {
            PollerRequest::FetchAssets { assets } => {
                let symbols: Vec<String> = assets
                    .into_iter()
                    .take(self.config.max_tracked)
                    .collect();
                PollerResponse::Assets {
                    data: self.feed.fetch_assets(&symbols).await,
                }
            }
            PollerRequest::FetchHistoricalData { asset, days } => PollerResponse::History {
                data: self.feed.fetch_historical_data(&asset, days).await,
            },
        }
    }

    /// Run until every handle is dropped. Refreshes immediately, then on
    /// every interval tick; ad-hoc requests are served in between and are
    /// not gated by the timer.
    pub async fn run(mut self) {
        let mut ticker = interval(self.config.update_interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.update_assets().await {
                        error!("Refresh failed: {}", e);
                    }
                }
                envelope = self.rx.recv() => {
                    match envelope {
                        Some((request, reply)) => {
                            let response = self.handle_request(request).await;
                            if reply.send(response).is_err() {
                                warn!("Requester went away before the response was sent");
                            }
                        }
                        None => break,
                    }
                }
            }
        }
        debug!("Poller shutting down");
    }

    /// Serve ad-hoc requests only, without the refresh timer. One-shot
    /// commands use this so a read-only fetch never notifies or moves the
    /// persisted snapshot.
    pub async fn serve(mut self) {
        while let Some((request, reply)) = self.rx.recv().await {
            let response = self.handle_request(request).await;
            if reply.send(response).is_err() {
                warn!("Requester went away before the response was sent");
            }
        }
        debug!("Poller shutting down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::watchlist::{DEFAULT_ASSETS, DEFAULT_MAX_TRACKED};
    use async_trait::async_trait;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::Mutex;

    struct StubFeed {
        quotes: Vec<AssetQuote>,
    }

    #[async_trait]
    impl PriceFeed for StubFeed {
        async fn fetch_assets(&self, symbols: &[String]) -> Vec<AssetQuote> {
            self.quotes
                .iter()
                .filter(|q| symbols.contains(&q.symbol))
                .cloned()
                .collect()
        }

        async fn fetch_historical_data(&self, _symbol: &str, days: u32) -> Vec<PricePoint> {
            (0..days)
                .map(|i| PricePoint {
                    date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1 + i).unwrap(),
                    price: 100.0 + f64::from(i),
                })
                .collect()
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        messages: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, title: &str, message: &str) {
            self.messages
                .lock()
                .unwrap()
                .push((title.to_string(), message.to_string()));
        }
    }

    fn quote(name: &str, symbol: &str, price: f64) -> AssetQuote {
        AssetQuote {
            name: name.to_string(),
            symbol: symbol.to_string(),
            price,
        }
    }

    fn test_config() -> PollerConfig {
        PollerConfig {
            update_interval: Duration::from_secs(300),
            change_threshold: 0.05,
            max_tracked: DEFAULT_MAX_TRACKED,
            default_assets: DEFAULT_ASSETS.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "coinwatch-poller-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[tokio::test]
    async fn test_update_assets_notifies_and_replaces_snapshot() {
        let dir = temp_dir("update");
        let store = DocumentStore::new(&dir);
        store
            .save_snapshot(&[quote("Bitcoin", "BTC", 100.0)], Utc::now())
            .unwrap();

        let feed = Arc::new(StubFeed {
            quotes: vec![
                quote("Bitcoin", "BTC", 106.0),
                quote("Ethereum", "ETH", 3000.0),
            ],
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let (poller, _handle) = Poller::new(
            feed,
            DocumentStore::new(&dir),
            notifier.clone(),
            test_config(),
        );

        poller.update_assets().await.unwrap();

        let messages = notifier.messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, NOTIFICATION_TITLE);
        assert_eq!(messages[0].1, "Bitcoin (BTC) has increased by 6.00%");
        drop(messages);

        let snapshot = DocumentStore::new(&dir).load_snapshot().unwrap();
        assert_eq!(snapshot.assets.len(), 2);
        assert_eq!(snapshot.assets[0].price, 106.0);
        assert!(snapshot.last_updated.is_some());
        let _ = fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_small_move_produces_no_notification() {
        let dir = temp_dir("quiet");
        let store = DocumentStore::new(&dir);
        store
            .save_snapshot(&[quote("Ethereum", "ETH", 100.0)], Utc::now())
            .unwrap();
        store.save_user_assets(&["ETH".to_string()]).unwrap();

        let feed = Arc::new(StubFeed {
            quotes: vec![quote("Ethereum", "ETH", 103.0), quote("Bitcoin", "BTC", 1.0)],
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let (poller, _handle) = Poller::new(
            feed,
            DocumentStore::new(&dir),
            notifier.clone(),
            test_config(),
        );

        poller.update_assets().await.unwrap();
        assert!(notifier.messages.lock().unwrap().is_empty());
        let _ = fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_handle_round_trip_caps_requested_assets() {
        let dir = temp_dir("handle");
        let feed = Arc::new(StubFeed {
            quotes: vec![
                quote("Bitcoin", "BTC", 100.0),
                quote("Ethereum", "ETH", 50.0),
                quote("Dogecoin", "DOGE", 0.5),
            ],
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let (poller, handle) = Poller::new(
            feed,
            DocumentStore::new(&dir),
            notifier,
            test_config(),
        );
        let task = tokio::spawn(poller.run());

        let quotes = handle
            .fetch_assets(vec![
                "BTC".to_string(),
                "ETH".to_string(),
                "DOGE".to_string(),
            ])
            .await
            .unwrap();
        // only the first two symbols are fetched
        assert_eq!(quotes.len(), 2);

        let points = handle
            .fetch_historical_data("BTC".to_string(), 7)
            .await
            .unwrap();
        assert_eq!(points.len(), 7);

        task.abort();
        let _ = fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_serve_mode_has_no_refresh_side_effects() {
        let dir = temp_dir("serve");
        let store = DocumentStore::new(&dir);
        store
            .save_snapshot(&[quote("Bitcoin", "BTC", 100.0)], Utc::now())
            .unwrap();
        let baseline = store.load_snapshot().unwrap();

        let feed = Arc::new(StubFeed {
            quotes: vec![quote("Bitcoin", "BTC", 106.0)],
        });
        let notifier = Arc::new(RecordingNotifier::default());
        let (poller, handle) = Poller::new(
            feed,
            DocumentStore::new(&dir),
            notifier.clone(),
            test_config(),
        );
        let task = tokio::spawn(poller.serve());

        let quotes = handle.fetch_assets(vec!["BTC".to_string()]).await.unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].price, 106.0);

        // an ad-hoc fetch must not notify or move the persisted snapshot
        assert!(notifier.messages.lock().unwrap().is_empty());
        let snapshot = DocumentStore::new(&dir).load_snapshot().unwrap();
        assert_eq!(snapshot, baseline);

        task.abort();
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn test_request_vocabulary_serialization() {
        let request = PollerRequest::FetchAssets {
            assets: vec!["BTC".to_string(), "ETH".to_string()],
        };
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"action":"fetchAssets","assets":["BTC","ETH"]}"#
        );

        let parsed: PollerRequest =
            serde_json::from_str(r#"{"action":"fetchHistoricalData","asset":"BTC"}"#).unwrap();
        assert_eq!(
            parsed,
            PollerRequest::FetchHistoricalData {
                asset: "BTC".to_string(),
                days: DEFAULT_HISTORY_DAYS,
            }
        );
    }

    #[test]
    fn test_response_envelope_shape() {
        let response = PollerResponse::Assets {
            data: vec![quote("Bitcoin", "BTC", 1.5)],
        };
        assert_eq!(
            serde_json::to_string(&response).unwrap(),
            r#"{"data":[{"name":"Bitcoin","symbol":"BTC","price":1.5}]}"#
        );
    }
}
