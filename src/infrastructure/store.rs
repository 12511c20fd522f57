//! JSON document store
//!
//! Two flat key-value documents under the data directory: `settings.json`
//! holds user preferences (the tracked-asset list under `userAssets`) and
//! `cache.json` holds refresh output (`topAssets` plus `lastUpdated`).
//! Writes update single keys and preserve whatever else is in the document.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::debug;

use crate::shared::errors::StoreError;
use crate::shared::types::{AssetQuote, Snapshot};

pub const SETTINGS_FILE: &str = "settings.json";
pub const CACHE_FILE: &str = "cache.json";

const USER_ASSETS_KEY: &str = "userAssets";
const TOP_ASSETS_KEY: &str = "topAssets";
const LAST_UPDATED_KEY: &str = "lastUpdated";

pub struct DocumentStore {
    settings_path: PathBuf,
    cache_path: PathBuf,
}

impl DocumentStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            settings_path: data_dir.join(SETTINGS_FILE),
            cache_path: data_dir.join(CACHE_FILE),
        }
    }

    /// Stored tracked-asset list, `None` when never saved
    pub fn load_user_assets(&self) -> Result<Option<Vec<String>>, StoreError> {
        let doc = read_document(&self.settings_path)?;
        match doc.get(USER_ASSETS_KEY) {
            Some(value) => {
                let symbols = serde_json::from_value(value.clone())
                    .map_err(|e| malformed(&self.settings_path, e))?;
                Ok(Some(symbols))
            }
            None => Ok(None),
        }
    }

    pub fn save_user_assets(&self, symbols: &[String]) -> Result<(), StoreError> {
        let mut doc = read_document(&self.settings_path)?;
        doc.insert(
            USER_ASSETS_KEY.to_string(),
            serde_json::to_value(symbols).map_err(|e| malformed(&self.settings_path, e))?,
        );
        write_document(&self.settings_path, &doc)
    }

    /// Last persisted snapshot; a missing cache document yields an empty one
    pub fn load_snapshot(&self) -> Result<Snapshot, StoreError> {
        let doc = read_document(&self.cache_path)?;

        let assets = match doc.get(TOP_ASSETS_KEY) {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| malformed(&self.cache_path, e))?,
            None => Vec::new(),
        };
        let last_updated = match doc.get(LAST_UPDATED_KEY) {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| malformed(&self.cache_path, e))?,
            None => None,
        };

        Ok(Snapshot {
            assets,
            last_updated,
        })
    }

    /// Overwrite the snapshot wholesale and refresh the timestamp
    pub fn save_snapshot(
        &self,
        assets: &[AssetQuote],
        updated: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut doc = read_document(&self.cache_path)?;
        doc.insert(
            TOP_ASSETS_KEY.to_string(),
            serde_json::to_value(assets).map_err(|e| malformed(&self.cache_path, e))?,
        );
        doc.insert(
            LAST_UPDATED_KEY.to_string(),
            Value::String(updated.to_rfc3339()),
        );
        write_document(&self.cache_path, &doc)?;
        debug!("Persisted snapshot of {} asset(s)", assets.len());
        Ok(())
    }
}

fn read_document(path: &Path) -> Result<Map<String, Value>, StoreError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(io_error(path, e)),
    };
    serde_json::from_str(&contents).map_err(|e| malformed(path, e))
}

fn write_document(path: &Path, doc: &Map<String, Value>) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error(path, e))?;
    }
    let contents =
        serde_json::to_string_pretty(&Value::Object(doc.clone())).map_err(|e| malformed(path, e))?;
    fs::write(path, contents).map_err(|e| io_error(path, e))
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn malformed(path: &Path, source: serde_json::Error) -> StoreError {
    StoreError::Malformed {
        path: path.display().to_string(),
        source,
    }
}
