//! Significant price change detection and notification formatting

use crate::shared::types::{AssetQuote, PriceChange};

/// Default relative-change threshold (5%)
pub const DEFAULT_CHANGE_THRESHOLD: f64 = 0.05;

/// Title used for every price-change notification
pub const NOTIFICATION_TITLE: &str = "Significant Price Change";

/// Compare the freshly fetched quotes against the previous snapshot and
/// collect every asset whose absolute relative change meets the threshold.
///
/// Assets absent from the old snapshot are silently skipped, so a newly
/// tracked asset never triggers a notification on its first refresh.
/// Assets with a non-positive old price are skipped as well since no
/// relative change is defined for them.
pub fn detect_significant_changes(
    new_assets: &[AssetQuote],
    old_assets: &[AssetQuote],
    threshold: f64,
) -> Vec<PriceChange> {
    let mut changes = Vec::new();

    for new_asset in new_assets {
        let Some(old_asset) = old_assets.iter().find(|a| a.symbol == new_asset.symbol) else {
            continue;
        };
        if old_asset.price <= 0.0 {
            continue;
        }

        let relative_change = (new_asset.price - old_asset.price) / old_asset.price;
        if relative_change.abs() >= threshold {
            changes.push(PriceChange {
                symbol: new_asset.symbol.clone(),
                name: new_asset.name.clone(),
                relative_change,
            });
        }
    }

    changes
}

/// Notification body, e.g. "Bitcoin (BTC) has increased by 6.00%"
pub fn format_change_message(change: &PriceChange) -> String {
    format!(
        "{} ({}) has {} by {:.2}%",
        change.name,
        change.symbol,
        change.direction(),
        change.relative_change.abs() * 100.0
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(name: &str, symbol: &str, price: f64) -> AssetQuote {
        AssetQuote {
            name: name.to_string(),
            symbol: symbol.to_string(),
            price,
        }
    }

    #[test]
    fn test_change_above_threshold_is_reported() {
        let old = vec![quote("Bitcoin", "BTC", 100.0)];
        let new = vec![quote("Bitcoin", "BTC", 106.0)];

        let changes = detect_significant_changes(&new, &old, DEFAULT_CHANGE_THRESHOLD);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].symbol, "BTC");
        assert!((changes[0].relative_change - 0.06).abs() < 1e-12);
        assert_eq!(changes[0].direction(), "increased");
    }

    #[test]
    fn test_change_below_threshold_is_not_reported() {
        let old = vec![quote("Ethereum", "ETH", 100.0)];
        let new = vec![quote("Ethereum", "ETH", 103.0)];

        let changes = detect_significant_changes(&new, &old, DEFAULT_CHANGE_THRESHOLD);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_change_exactly_at_threshold_is_reported() {
        let old = vec![quote("Bitcoin", "BTC", 100.0)];
        let new = vec![quote("Bitcoin", "BTC", 95.0)];

        let changes = detect_significant_changes(&new, &old, DEFAULT_CHANGE_THRESHOLD);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].direction(), "decreased");
    }

    #[test]
    fn test_newly_tracked_asset_is_skipped() {
        let old = vec![quote("Bitcoin", "BTC", 100.0)];
        let new = vec![
            quote("Bitcoin", "BTC", 100.0),
            quote("Dogecoin", "DOGE", 0.5),
        ];

        let changes = detect_significant_changes(&new, &old, DEFAULT_CHANGE_THRESHOLD);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_zero_old_price_is_skipped() {
        let old = vec![quote("Bitcoin", "BTC", 0.0)];
        let new = vec![quote("Bitcoin", "BTC", 100.0)];

        let changes = detect_significant_changes(&new, &old, DEFAULT_CHANGE_THRESHOLD);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_empty_old_snapshot_reports_nothing() {
        let new = vec![quote("Bitcoin", "BTC", 100.0)];
        let changes = detect_significant_changes(&new, &[], DEFAULT_CHANGE_THRESHOLD);
        assert!(changes.is_empty());
    }

    #[test]
    fn test_message_formatting() {
        let increase = PriceChange {
            symbol: "BTC".to_string(),
            name: "Bitcoin".to_string(),
            relative_change: 0.06,
        };
        assert_eq!(
            format_change_message(&increase),
            "Bitcoin (BTC) has increased by 6.00%"
        );

        let decrease = PriceChange {
            symbol: "ETH".to_string(),
            name: "Ethereum".to_string(),
            relative_change: -0.125,
        };
        assert_eq!(
            format_change_message(&decrease),
            "Ethereum (ETH) has decreased by 12.50%"
        );
    }
}
