use anyhow::{Context, Result};
use serde::Deserialize;
use std::{fs, path::Path};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiCfg {
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PollCfg {
    pub interval_minutes: Option<u64>,
    pub change_threshold: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WatchlistCfg {
    pub max_tracked: Option<usize>,
    pub defaults: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayCfg {
    pub refresh_secs: Option<u64>,
    pub history_days: Option<u32>,
    pub chart_width: Option<u32>,
    pub chart_height: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageCfg {
    pub data_dir: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiCfg,
    #[serde(default)]
    pub poll: PollCfg,
    #[serde(default)]
    pub watchlist: WatchlistCfg,
    #[serde(default)]
    pub display: DisplayCfg,
    #[serde(default)]
    pub storage: StorageCfg,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let s = fs::read_to_string(path.as_ref())
            .with_context(|| format!("read config {}", path.as_ref().display()))?;
        let cfg: Self = toml::from_str(&s).context("parse config file")?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_config() {
        let cfg: Config = toml::from_str(
            r#"
            [poll]
            interval_minutes = 10

            [watchlist]
            max_tracked = 3
            defaults = ["BTC", "ETH", "SOL"]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.poll.interval_minutes, Some(10));
        assert_eq!(cfg.poll.change_threshold, None);
        assert_eq!(cfg.watchlist.max_tracked, Some(3));
        assert_eq!(cfg.api.base_url, None);
    }

    #[test]
    fn test_empty_config_parses() {
        let cfg: Config = toml::from_str("").unwrap();
        assert!(cfg.storage.data_dir.is_none());
    }
}
