//! Error handling for the application

use thiserror::Error;

/// Market-data feed errors
#[derive(Error, Debug)]
pub enum FeedError {
    #[error("API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API returned status {0}")]
    Status(reqwest::StatusCode),

    #[error("Malformed time-series row: {0}")]
    MalformedSeries(String),
}

/// Persistent store errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed store document {path}: {source}")]
    Malformed {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Watchlist errors surfaced to the user
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WatchlistError {
    #[error("{0} is already in the tracking list")]
    Duplicate(String),

    #[error("{0} is not in the tracking list")]
    NotTracked(String),
}

/// General application error
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Poller is no longer running")]
    PollerGone,
}
