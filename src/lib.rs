//! Coinwatch - crypto price watcher
//! Polls the Messari API, persists snapshots, notifies on significant moves

pub mod app;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;

// Re-export main types for convenience
pub use application::poller::{Poller, PollerHandle};
pub use domain::change::detect_significant_changes;
pub use domain::watchlist::Watchlist;
pub use infrastructure::feed::{MessariClient, PriceFeed};
pub use infrastructure::store::DocumentStore;
