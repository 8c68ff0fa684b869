//! Read-through page cache over the record backend.
//!
//! Pages are keyed by `(owner, offset, length)`. A lookup either returns a
//! live cached page or fetches from the backend and caches the result;
//! a successful record submission invalidates every cached page of that
//! owner. Entries idle-expire after a configured duration (checked lazily
//! on lookup) and are evicted least-recently-read first when the cache is
//! at capacity.

use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use dashmap::DashMap;
use tracing::debug;

use crate::backend::RecordBackend;
use crate::config::CacheConfig;
use crate::error::Result;
use crate::record::TimeRecord;

/// Identifies one cached page: whose records, from which offset, how many.
///
/// Invalidation matches on the `owner` field exactly: an owner whose
/// identifier happens to be a prefix of another's never touches the
/// other's pages.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey {
    pub owner: String,
    pub offset: u32,
    pub length: u32,
}

/// One cached page with access bookkeeping (unix seconds).
#[derive(Debug, Clone)]
struct CacheEntry {
    records: Vec<TimeRecord>,
    inserted_at: u64,
    accessed_at: u64,
}

/// The only stateful component: owns the page cache and all invalidation
/// policy. Construct one instance with its configuration and share it by
/// reference; there is no ambient singleton.
pub struct RecordCache {
    backend: Arc<dyn RecordBackend>,
    entries: DashMap<PageKey, CacheEntry>,
    idle_secs: u64,
    max_entries: usize,
    /// Serializes evict-then-insert so the capacity bound holds under
    /// racing inserts. Lookups and invalidation never take it, and no I/O
    /// happens while it is held.
    insert_lock: Mutex<()>,
}

impl RecordCache {
    /// Create a cache service in front of `backend`.
    ///
    /// `max_entries` is clamped to a minimum of 1 to prevent infinite
    /// eviction loops.
    pub fn new(backend: Arc<dyn RecordBackend>, config: &CacheConfig) -> Self {
        Self {
            backend,
            entries: DashMap::new(),
            idle_secs: config.idle_secs,
            max_entries: config.max_entries.max(1),
            insert_lock: Mutex::new(()),
        }
    }

    /// Read-through page lookup.
    ///
    /// A live cached page is returned without a backend call. On a miss the
    /// backend is fetched and a non-empty result is cached; an empty result
    /// is returned but never cached, so a later write shows up without
    /// waiting out an expiry. A failed fetch propagates and writes nothing.
    ///
    /// A full page (`len == length`) tells the caller more pages may exist;
    /// a short page signals end-of-data.
    pub async fn get_records(&self, owner: &str, offset: u32, length: u32) -> Result<Vec<TimeRecord>> {
        let key = PageKey {
            owner: owner.to_string(),
            offset,
            length,
        };

        if let Some(records) = self.lookup(&key) {
            debug!(owner, offset, length, "Page cache hit");
            return Ok(records);
        }

        // The fetch happens with no map guard held. Two misses racing on
        // the same key may both fetch; the last insert wins.
        let records = self.backend.fetch_page(owner, offset, length).await?;
        if !records.is_empty() {
            self.insert(key, records.clone());
        }
        Ok(records)
    }

    /// Submit a record and, on success, drop every cached page of that
    /// owner; a new record can shift which records fall on which page.
    /// On failure nothing is invalidated and the error propagates; whether
    /// to retry is the caller's call.
    pub async fn create_record(&self, record: &TimeRecord) -> Result<()> {
        self.backend.submit_record(record).await?;
        self.invalidate_owner(&record.email);
        Ok(())
    }

    /// Number of cached pages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Aggregate statistics about the cache.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            oldest_inserted_at: self.entries.iter().map(|e| e.value().inserted_at).min(),
        }
    }

    // -- private helpers ---------------------------------------------------

    /// Return a live entry's records, touching its access time. An entry
    /// idle longer than `idle_secs` is removed and reported as a miss.
    fn lookup(&self, key: &PageKey) -> Option<Vec<TimeRecord>> {
        let now = now_secs();

        let mut entry = self.entries.get_mut(key)?;
        if now.saturating_sub(entry.accessed_at) > self.idle_secs {
            drop(entry);
            debug!(owner = %key.owner, offset = key.offset, "Cache entry idle-expired, removing");
            self.entries.remove(key);
            return None;
        }
        entry.accessed_at = now;
        Some(entry.records.clone())
    }

    /// Insert or overwrite a page, evicting the least-recently-read entries
    /// first when a new key would exceed capacity.
    fn insert(&self, key: PageKey, records: Vec<TimeRecord>) {
        let now = now_secs();
        let _guard = self.insert_lock.lock().expect("cache insert lock poisoned");

        while !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_lru();
        }
        self.entries.insert(
            key,
            CacheEntry {
                records,
                inserted_at: now,
                accessed_at: now,
            },
        );
    }

    /// Drop all pages whose key owner equals `owner`, regardless of offset
    /// and length.
    fn invalidate_owner(&self, owner: &str) {
        let before = self.entries.len();
        self.entries.retain(|key, _| key.owner != owner);
        let dropped = before - self.entries.len();
        if dropped > 0 {
            debug!(owner, dropped, "Invalidated cached pages after write");
        }
    }

    fn evict_lru(&self) {
        if let Some(lru_key) = self
            .entries
            .iter()
            .min_by_key(|entry| entry.value().accessed_at)
            .map(|entry| entry.key().clone())
        {
            debug!(owner = %lru_key.owner, offset = lru_key.offset, "Evicting LRU cache entry");
            self.entries.remove(&lru_key);
        }
    }

    #[cfg(test)]
    fn backdate(&self, key: &PageKey, accessed_at: u64) {
        let mut entry = self.entries.get_mut(key).unwrap();
        entry.accessed_at = accessed_at;
    }
}

/// Aggregate cache statistics.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of pages currently cached.
    pub entries: usize,
    /// Unix time of the oldest insertion still cached, if any.
    pub oldest_inserted_at: Option<u64>,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
