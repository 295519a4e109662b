//! Time-to-live cache for chain and quote snapshots.
//!
//! Entries are valid while `now - stored_at < ttl`. Writes are
//! last-write-wins per key. When backed by a file, the whole map is
//! rewritten on every `put` while the write lock is held, so writers to the
//! backing store are serialized within the process. A `put` whose file write
//! fails leaves the in-memory map as it was.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::ContractId;
use crate::error::Result;

/// Key for an underlying's option chain at one expiry.
#[must_use]
pub fn chain_key(underlying: ContractId, expiry: &str) -> String {
    format!("{underlying},{expiry}")
}

/// Key for the quotes of a whole chain.
#[must_use]
pub fn snapshot_key(symbol: &str, expiry: &str) -> String {
    format!("{symbol},{expiry},smile")
}

/// Key for a single contract's quote.
#[must_use]
pub fn ticker_key(contract: ContractId) -> String {
    format!("{contract},ticker")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry<V> {
    stored_at: DateTime<Utc>,
    value: V,
}

/// Key-value store whose entries expire after a fixed duration.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, Entry<V>>>,
    ttl: Duration,
    path: Option<PathBuf>,
}

impl<V> TtlCache<V>
where
    V: Clone + Serialize + DeserializeOwned,
{
    /// In-memory cache.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            path: None,
        }
    }

    /// File-backed cache, loading existing entries from `path` if present.
    pub fn open(path: impl AsRef<Path>, ttl: Duration) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = if path.is_file() {
            let content = fs::read_to_string(&path)?;
            serde_json::from_str(&content)?
        } else {
            HashMap::new()
        };
        debug!(path = %path.display(), entries = entries.len(), "Opened cache");

        Ok(Self {
            entries: RwLock::new(entries),
            ttl,
            path: Some(path),
        })
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Value for `key` if stored less than `ttl` ago.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if Utc::now() - entry.stored_at >= self.ttl {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Store `value`, stamped now, replacing any previous entry.
    pub fn put(&self, key: impl Into<String>, value: V) -> Result<()> {
        let key = key.into();
        let mut entries = self.entries.write();
        let previous = entries.insert(
            key.clone(),
            Entry {
                stored_at: Utc::now(),
                value,
            },
        );

        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Err(err) = persist(path, &entries) {
            match previous {
                Some(entry) => entries.insert(key, entry),
                None => entries.remove(&key),
            };
            return Err(err);
        }
        Ok(())
    }

    /// Drop expired entries. Returns count removed.
    pub fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, e| now - e.stored_at < self.ttl);
        before - entries.len()
    }

    /// Number of stored entries, expired or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

fn persist<V: Serialize>(path: &Path, entries: &HashMap<String, Entry<V>>) -> Result<()> {
    fs::write(path, serde_json::to_string(entries)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_deterministic() {
        assert_eq!(chain_key(ContractId(42), "20191025"), "42,20191025");
        assert_eq!(snapshot_key("GDX", "20191025"), "GDX,20191025,smile");
        assert_eq!(ticker_key(ContractId(42)), "42,ticker");
    }

    #[test]
    fn cache_roundtrip() {
        let cache = TtlCache::new(Duration::hours(1));
        cache.put("a", 1.5_f64).unwrap();
        assert_eq!(cache.get("a"), Some(1.5));
        assert_eq!(cache.get("b"), None);
    }

    #[test]
    fn last_write_wins() {
        let cache = TtlCache::new(Duration::hours(1));
        cache.put("a", vec![1]).unwrap();
        cache.put("a", vec![2, 3]).unwrap();
        assert_eq!(cache.get("a"), Some(vec![2, 3]));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entries_not_returned() {
        let cache = TtlCache::new(Duration::seconds(-1)); // Already expired
        cache.put("a", 1).unwrap();
        assert_eq!(cache.get("a"), None);
        assert_eq!(cache.prune_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn file_backed_cache_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chains.json");

        let cache = TtlCache::open(&path, Duration::hours(1)).unwrap();
        cache.put(chain_key(ContractId(1), "20191025"), vec!["x".to_string()]).unwrap();
        drop(cache);

        let reopened: TtlCache<Vec<String>> = TtlCache::open(&path, Duration::hours(1)).unwrap();
        assert_eq!(
            reopened.get("1,20191025"),
            Some(vec!["x".to_string()])
        );

        let stale: TtlCache<Vec<String>> = TtlCache::open(&path, Duration::zero()).unwrap();
        assert_eq!(stale.get("1,20191025"), None);
    }

    #[test]
    fn failed_write_leaves_memory_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TtlCache::open(dir.path().join("quotes.json"), Duration::hours(1)).unwrap();
        cache.put("kept", 1).unwrap();

        // Backing directory gone: every later write fails.
        fs::remove_dir_all(dir.path()).unwrap();

        assert!(cache.put("fresh", 2).is_err());
        assert_eq!(cache.get("fresh"), None);

        assert!(cache.put("kept", 3).is_err());
        assert_eq!(cache.get("kept"), Some(1));
        assert_eq!(cache.len(), 1);
    }
}
