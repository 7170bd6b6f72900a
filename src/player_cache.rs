use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::player::StatsSnapshot;

const CACHE_VERSION: u32 = 1;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Keyed store of player snapshots. Stale entries read as absent.
pub trait PlayerCache: Send + Sync {
    fn get(&self, key: &str) -> Option<StatsSnapshot>;

    /// Overwrites any previous entry for `key`. Callers may ignore the error;
    /// a failed write only costs a future cache miss.
    fn put(&self, key: &str, snapshot: &StatsSnapshot) -> Result<()>;
}

impl<T: PlayerCache + ?Sized> PlayerCache for Box<T> {
    fn get(&self, key: &str) -> Option<StatsSnapshot> {
        (**self).get(key)
    }

    fn put(&self, key: &str, snapshot: &StatsSnapshot) -> Result<()> {
        (**self).put(key, snapshot)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheEntry {
    version: u32,
    key: String,
    fetched_at: DateTime<Utc>,
    payload: StatsSnapshot,
}

fn is_fresh(fetched_at: DateTime<Utc>, now: DateTime<Utc>, ttl: Duration) -> bool {
    let ttl = TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX);
    now.signed_duration_since(fetched_at) < ttl
}

pub struct MemoryCache {
    ttl: Duration,
    clock: Arc<dyn Clock>,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_clock(ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            ttl,
            clock,
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl PlayerCache for MemoryCache {
    fn get(&self, key: &str) -> Option<StatsSnapshot> {
        let guard = self.entries.lock().ok()?;
        let entry = guard.get(key)?;
        if !is_fresh(entry.fetched_at, self.clock.now(), self.ttl) {
            return None;
        }
        Some(entry.payload.clone())
    }

    fn put(&self, key: &str, snapshot: &StatsSnapshot) -> Result<()> {
        let mut guard = self
            .entries
            .lock()
            .map_err(|_| anyhow!("player cache lock poisoned"))?;
        guard.insert(
            key.to_string(),
            CacheEntry {
                version: CACHE_VERSION,
                key: key.to_string(),
                fetched_at: self.clock.now(),
                payload: snapshot.clone(),
            },
        );
        Ok(())
    }
}

/// One JSON file per player under `dir`.
pub struct FileCache {
    dir: PathBuf,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl FileCache {
    pub fn new(dir: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self::with_clock(dir, ttl, Arc::new(SystemClock))
    }

    pub fn with_clock(dir: impl Into<PathBuf>, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            dir: dir.into(),
            ttl,
            clock,
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        let stem: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{stem}.json"))
    }

    fn load_entry(&self, key: &str) -> Option<CacheEntry> {
        let raw = fs::read_to_string(self.entry_path(key)).ok()?;
        let entry = serde_json::from_str::<CacheEntry>(&raw).ok()?;
        // Different keys can share a sanitized file name.
        if entry.version != CACHE_VERSION || entry.key != key {
            return None;
        }
        Some(entry)
    }
}

impl PlayerCache for FileCache {
    fn get(&self, key: &str) -> Option<StatsSnapshot> {
        let entry = self.load_entry(key)?;
        if !is_fresh(entry.fetched_at, self.clock.now(), self.ttl) {
            return None;
        }
        Some(entry.payload)
    }

    fn put(&self, key: &str, snapshot: &StatsSnapshot) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("create cache dir {}", self.dir.display()))?;
        let entry = CacheEntry {
            version: CACHE_VERSION,
            key: key.to_string(),
            fetched_at: self.clock.now(),
            payload: snapshot.clone(),
        };
        let path = self.entry_path(key);
        // Writers never share a temp file; the last rename wins.
        let tmp = path.with_extension(format!(
            "json.{}.{}.tmp",
            std::process::id(),
            TMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        let json = serde_json::to_string(&entry).context("serialize player cache entry")?;
        let written = fs::write(&tmp, json)
            .context("write player cache entry")
            .and_then(|()| fs::rename(&tmp, &path).context("swap player cache entry"));
        if written.is_err() {
            let _ = fs::remove_file(&tmp);
        }
        written
    }
}
