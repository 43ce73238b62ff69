//! Two-tier TTL cache for metadata API responses.
//!
//! The in-memory map is the source of truth during a session; a versioned
//! JSON snapshot on disk mirrors it across restarts and pre-warms the map
//! at startup. Staleness is checked on every read, so correctness never
//! depends on the background sweeper.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// One cached payload with its storage time.
///
/// A read hit does not refresh `stored_at`; expiry is pure TTL.
struct CacheEntry {
    value: serde_json::Value,
    stored_at: Instant,
}

/// Durable snapshot format: the whole map plus a schema version tag.
#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    timestamp: DateTime<Utc>,
    data: HashMap<String, serde_json::Value>,
}

/// Two-tier key/value cache with TTL expiry
pub struct CacheStore {
    entries: Mutex<HashMap<String, CacheEntry>>,
    ttl: Duration,
    schema_version: u32,
    snapshot_path: PathBuf,
}

impl CacheStore {
    /// Create an empty cache store
    pub fn new(ttl: Duration, schema_version: u32, snapshot_path: impl AsRef<Path>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            schema_version,
            snapshot_path: snapshot_path.as_ref().to_path_buf(),
        }
    }

    /// Look up a key, returning the payload only while it is fresh.
    ///
    /// An expired entry is removed on the spot and reported as a miss.
    pub fn get(&self, key: &str) -> Option<serde_json::Value> {
        let mut entries = self.entries.lock().expect("cache lock poisoned");

        match entries.get(key) {
            Some(entry) if entry.stored_at.elapsed() <= self.ttl => {
                debug!(key = key, "Cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!(key = key, "Cache entry expired");
                entries.remove(key);
                None
            }
            None => {
                debug!(key = key, "Cache miss");
                None
            }
        }
    }

    /// Store a payload, overwriting any previous entry for the key
    pub fn set(&self, key: &str, value: serde_json::Value) {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
        debug!(key = key, "Cache stored");
    }

    /// Remove all expired entries, returning how many were dropped.
    ///
    /// Purely a memory-reclamation pass; `get` re-checks freshness anyway.
    pub fn sweep(&self) -> usize {
        let mut entries = self.entries.lock().expect("cache lock poisoned");
        let before = entries.len();
        entries.retain(|_, entry| entry.stored_at.elapsed() <= self.ttl);
        let dropped = before - entries.len();

        if dropped > 0 {
            debug!(dropped = dropped, remaining = entries.len(), "Cache sweep");
        }

        dropped
    }

    /// Number of entries currently held (stale ones included until swept)
    pub fn len(&self) -> usize {
        self.entries.lock().expect("cache lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Serialize the entire in-memory map to the snapshot file
    pub fn persist(&self) -> Result<()> {
        let snapshot = {
            let entries = self.entries.lock().expect("cache lock poisoned");
            Snapshot {
                version: self.schema_version,
                timestamp: Utc::now(),
                data: entries
                    .iter()
                    .map(|(k, e)| (k.clone(), e.value.clone()))
                    .collect(),
            }
        };

        if let Some(parent) = self.snapshot_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create snapshot directory: {}", parent.display())
            })?;
        }

        let content =
            serde_json::to_string(&snapshot).context("Failed to serialize cache snapshot")?;

        std::fs::write(&self.snapshot_path, content).with_context(|| {
            format!(
                "Failed to write cache snapshot: {}",
                self.snapshot_path.display()
            )
        })?;

        info!(
            path = %self.snapshot_path.display(),
            entries = snapshot.data.len(),
            "Cache snapshot persisted"
        );

        Ok(())
    }

    /// Pre-warm the in-memory tier from the snapshot file.
    ///
    /// A missing file, a version mismatch or a snapshot already older than
    /// the TTL all result in an empty cache, not an error. Loaded entries
    /// keep the snapshot's remaining freshness rather than starting a new
    /// TTL window.
    pub fn load_from_durable(&self) -> Result<usize> {
        if !self.snapshot_path.exists() {
            debug!(path = %self.snapshot_path.display(), "No cache snapshot found");
            return Ok(0);
        }

        let content = std::fs::read_to_string(&self.snapshot_path).with_context(|| {
            format!(
                "Failed to read cache snapshot: {}",
                self.snapshot_path.display()
            )
        })?;

        let snapshot: Snapshot = match serde_json::from_str(&content) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Discarding unreadable cache snapshot");
                return Ok(0);
            }
        };

        if snapshot.version != self.schema_version {
            info!(
                snapshot_version = snapshot.version,
                expected = self.schema_version,
                "Discarding cache snapshot from incompatible schema version"
            );
            return Ok(0);
        }

        let age = (Utc::now() - snapshot.timestamp)
            .to_std()
            .unwrap_or(Duration::ZERO);
        if age > self.ttl {
            info!(age_secs = age.as_secs(), "Discarding expired cache snapshot");
            return Ok(0);
        }

        // Loaded entries keep the snapshot's remaining freshness; fall back
        // to a fresh window when the platform clock can't go back that far.
        let stored_at = Instant::now()
            .checked_sub(age)
            .unwrap_or_else(Instant::now);
        let count = snapshot.data.len();

        let mut entries = self.entries.lock().expect("cache lock poisoned");
        for (key, value) in snapshot.data {
            entries.insert(key, CacheEntry { value, stored_at });
        }

        info!(entries = count, "Cache pre-warmed from snapshot");
        Ok(count)
    }

    /// Spawn a background sweep task firing once per TTL period.
    ///
    /// The task is aborted when the returned handle is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> SweeperHandle {
        let store = Arc::clone(self);
        let period = self.ttl;

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await; // first tick is immediate
            loop {
                interval.tick().await;
                store.sweep();
            }
        });

        SweeperHandle { handle }
    }
}

/// Abort-on-drop guard for the background sweep task
pub struct SweeperHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl Drop for SweeperHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(ttl: Duration, dir: &TempDir) -> CacheStore {
        CacheStore::new(ttl, 1, dir.path().join("snapshot.json"))
    }

    #[test]
    fn test_get_and_set() {
        let temp_dir = TempDir::new().unwrap();
        let cache = store(Duration::from_secs(60), &temp_dir);

        assert_eq!(cache.get("top"), None);
        cache.set("top", json!({"data": [1, 2, 3]}));
        assert_eq!(cache.get("top"), Some(json!({"data": [1, 2, 3]})));
    }

    #[test]
    fn test_expired_entry_is_absent() {
        let temp_dir = TempDir::new().unwrap();
        let cache = store(Duration::from_millis(30), &temp_dir);

        cache.set("top", json!(1));
        std::thread::sleep(Duration::from_millis(60));

        // Read-time check, independent of any sweep
        assert_eq!(cache.get("top"), None);
        assert_eq!(cache.len(), 0); // stale entry dropped by the read
    }

    #[test]
    fn test_hit_does_not_refresh_ttl() {
        let temp_dir = TempDir::new().unwrap();
        let cache = store(Duration::from_millis(80), &temp_dir);

        cache.set("top", json!(1));
        std::thread::sleep(Duration::from_millis(50));
        assert!(cache.get("top").is_some());
        std::thread::sleep(Duration::from_millis(50));

        // The earlier hit must not have extended the entry's life
        assert_eq!(cache.get("top"), None);
    }

    #[test]
    fn test_sweep_drops_only_expired() {
        let temp_dir = TempDir::new().unwrap();
        let cache = store(Duration::from_millis(40), &temp_dir);

        cache.set("old", json!(1));
        std::thread::sleep(Duration::from_millis(60));
        cache.set("new", json!(2));

        assert_eq!(cache.sweep(), 1);
        assert_eq!(cache.get("new"), Some(json!(2)));
    }

    #[test]
    fn test_snapshot_round_trip() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let cache = store(Duration::from_secs(60), &temp_dir);

        cache.set("top", json!({"title": "Cowboy Bebop"}));
        cache.persist()?;

        let reloaded = store(Duration::from_secs(60), &temp_dir);
        assert_eq!(reloaded.load_from_durable()?, 1);
        assert_eq!(
            reloaded.get("top"),
            Some(json!({"title": "Cowboy Bebop"}))
        );

        Ok(())
    }

    #[test]
    fn test_snapshot_version_mismatch_discarded() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let cache = store(Duration::from_secs(60), &temp_dir);
        cache.set("top", json!(1));
        cache.persist()?;

        let incompatible =
            CacheStore::new(Duration::from_secs(60), 2, temp_dir.path().join("snapshot.json"));
        assert_eq!(incompatible.load_from_durable()?, 0);
        assert!(incompatible.is_empty());

        Ok(())
    }

    #[test]
    fn test_expired_snapshot_discarded() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let cache = store(Duration::from_millis(30), &temp_dir);
        cache.set("top", json!(1));
        cache.persist()?;

        std::thread::sleep(Duration::from_millis(60));

        let reloaded = store(Duration::from_millis(30), &temp_dir);
        assert_eq!(reloaded.load_from_durable()?, 0);

        Ok(())
    }

    #[test]
    fn test_corrupt_snapshot_discarded() -> Result<()> {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("snapshot.json");
        std::fs::write(&path, "not json at all")?;

        let cache = CacheStore::new(Duration::from_secs(60), 1, &path);
        assert_eq!(cache.load_from_durable()?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_sweeper_reclaims_in_background() {
        let temp_dir = TempDir::new().unwrap();
        let cache = Arc::new(store(Duration::from_millis(40), &temp_dir));

        cache.set("top", json!(1));
        let _sweeper = cache.spawn_sweeper();

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(cache.len(), 0);
    }
}
