//! Domain logic - change detection and watchlist rules

pub mod change;
pub mod watchlist;

pub use change::detect_significant_changes;
pub use watchlist::Watchlist;
