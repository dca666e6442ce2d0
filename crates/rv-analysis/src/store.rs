//! Key-value persistence for analysis bundles.
//!
//! The store holds the serialized bundle verbatim so a fresh cache hit
//! returns exactly the bytes that were written, including field order.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use rv_core::PlaceBundle;
use thiserror::Error;

/// Errors from bundle persistence.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("bundle store I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored bundle is not valid JSON: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Persistence seam for analysis bundles, keyed by place key.
///
/// Implementations are synchronous; callers on async paths should keep
/// bundles small (they are: one profile, a review sample, one stats block).
pub trait BundleStore: Send + Sync {
    /// Returns the bundle stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<PlaceBundle>, StoreError>;

    /// Stores `bundle` under `key`, replacing any previous value.
    fn put(&self, key: &str, bundle: &PlaceBundle) -> Result<(), StoreError>;

    /// Returns every key currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// In-memory store, used by tests and the CLI's dry-run paths.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BundleStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<PlaceBundle>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries
            .get(key)
            .map(|raw| serde_json::from_str(raw).map_err(StoreError::Corrupt))
            .transpose()
    }

    fn put(&self, key: &str, bundle: &PlaceBundle) -> Result<(), StoreError> {
        let raw = serde_json::to_string(bundle)?;
        let mut entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        entries.insert(key.to_owned(), raw);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(entries.keys().cloned().collect())
    }
}

/// File-backed store: one pretty-printed JSON file per key under a cache
/// directory. Writes go through a temp file then rename, so a crashed write
/// never leaves a half-written bundle behind.
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Opens (creating if needed) the cache directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

/// Maps an arbitrary place key to a safe file stem. Place IDs are already
/// URL-safe; anything else gets its odd characters replaced.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl BundleStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<PlaceBundle>, StoreError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, bundle: &PlaceBundle) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(bundle)?)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    keys.push(stem.to_owned());
                }
            }
        }
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rv_core::{BusinessProfile, StatsBundle, VelocityTrend};

    fn bundle() -> PlaceBundle {
        PlaceBundle {
            profile: BusinessProfile {
                name: "Harbor Dental".into(),
                url: "https://harbordental.example".into(),
                logo_url: "https://ui-avatars.com/api/?name=Harbor%20Dental".into(),
                description: "Harbor Dental is a local business.".into(),
                address: Some("1 Pier Rd".into()),
                phone: None,
                price_range: None,
                place_id: Some("ChIJabc123".into()),
                categories: vec!["dentist".into()],
            },
            reviews: Vec::new(),
            stats: StatsBundle {
                total_review_count: 88,
                average_score: 4.6,
                reviews_last_30_days: 2,
                velocity_trend: VelocityTrend::Up,
                identified_services: vec!["cleaning".into()],
                positive_attributes: vec!["gentle".into()],
                narrative_overview: "Recent customer feedback highlights gentle care.".into(),
                numeric_refreshed_at: Utc.with_ymd_and_hms(2026, 8, 20, 8, 0, 0).single().unwrap(),
                text_refreshed_at: Utc.with_ymd_and_hms(2026, 8, 17, 8, 0, 0).single().unwrap(),
            },
        }
    }

    #[test]
    fn memory_store_round_trips() {
        let store = MemoryStore::new();
        assert!(store.get("ChIJabc123").unwrap().is_none());
        store.put("ChIJabc123", &bundle()).unwrap();
        assert_eq!(store.get("ChIJabc123").unwrap().unwrap(), bundle());
        assert_eq!(store.keys().unwrap(), vec!["ChIJabc123".to_string()]);
    }

    #[test]
    fn file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        store.put("ChIJabc123", &bundle()).unwrap();
        assert_eq!(store.get("ChIJabc123").unwrap().unwrap(), bundle());
        assert_eq!(store.keys().unwrap(), vec!["ChIJabc123".to_string()]);
    }

    #[test]
    fn file_store_sanitizes_hostile_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        store.put("../escape/attempt", &bundle()).unwrap();
        // The write stayed inside the cache directory.
        assert_eq!(store.keys().unwrap().len(), 1);
        assert!(store.get("../escape/attempt").unwrap().is_some());
    }

    #[test]
    fn file_store_overwrite_replaces_previous_value() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path()).unwrap();
        let mut b = bundle();
        store.put("k", &b).unwrap();
        b.stats.total_review_count = 99;
        store.put("k", &b).unwrap();
        assert_eq!(store.get("k").unwrap().unwrap().stats.total_review_count, 99);
        assert_eq!(store.keys().unwrap().len(), 1);
    }
}
