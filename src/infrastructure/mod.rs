//! Infrastructure - market-data feed, persistent store, notifications

pub mod feed;
pub mod notify;
pub mod store;
