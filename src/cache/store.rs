//! Memory Store Module
//!
//! Single-table cache engine: two ordered key indices (plain and reversed
//! keys) over one recency list, with LRU eviction and lazy TTL expiration.
//!
//! Two locks guard each store. The structural lock covers both indices and
//! list membership; inserts, deletes, evictions and sweeps take it
//! exclusively, lookups and walks take it shared. The recency lock, nested
//! inside, covers list order so that exact reads can bump an entry to the
//! tail while other readers keep the structural lock shared. Expired entries
//! found under the shared lock are removed afterwards in a separate
//! exclusive section.

use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{debug, info, trace};

use crate::backend::Store;
use crate::cache::index::{reverse_key, KeyIndex};
use crate::cache::lru::{Handle, RecencyList};
use crate::cache::record::{resolve_expiry, Record, StoredRecord};
use crate::cache::stats::{CacheStats, StatsCounters};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{DeleteOptions, KeyMatch, ListOptions, Page, ReadOptions, WriteOptions};

/// Data behind the structural lock.
#[derive(Debug)]
struct Tables {
    prefix: KeyIndex,
    suffix: KeyIndex,
    recency: RwLock<RecencyList>,
    config: Config,
}

impl Tables {
    fn new(config: Config) -> Self {
        Self {
            prefix: KeyIndex::new(),
            suffix: KeyIndex::new(),
            recency: RwLock::new(RecencyList::new()),
            config,
        }
    }

    /// Drops a key from both indices and the recency list.
    fn remove_entry(&mut self, key: &str, handle: Handle) -> Option<StoredRecord> {
        self.prefix.remove(key);
        self.suffix.remove(&reverse_key(key));
        self.recency.get_mut().remove(handle)
    }
}

// == Memory Store ==
/// Concurrency-safe key-value cache with exact, prefix and suffix lookups.
///
/// Prefix walks return keys in ascending order. Suffix walks return keys in
/// ascending order of their reversed spelling, so `["aboz", "caaz", "ziuz"]`
/// comes back as `["caaz", "aboz", "ziuz"]` for the suffix `"z"`.
#[derive(Debug)]
pub struct MemStore {
    tables: RwLock<Tables>,
    counters: StatsCounters,
}

impl MemStore {
    // == Constructor ==
    /// Creates a store from a validated configuration.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    /// Creates a store with the given capacity and otherwise default settings.
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::new(Config::default().with_capacity(capacity))
    }

    /// Callers must have validated `config`.
    pub(crate) fn from_valid(config: Config) -> Self {
        info!(
            capacity = config.capacity,
            ttl = ?config.ttl,
            "memory store initialised"
        );
        Self {
            tables: RwLock::new(Tables::new(config)),
            counters: StatsCounters::default(),
        }
    }

    // == Init ==
    /// Clears every entry and switches to a new configuration.
    pub fn init(&self, config: Config) -> Result<()> {
        config.validate()?;
        info!(
            capacity = config.capacity,
            ttl = ?config.ttl,
            "memory store reinitialised"
        );
        *self.tables.write() = Tables::new(config);
        self.counters.reset();
        Ok(())
    }

    // == Reinit ==
    /// Clears every entry and resets the capacity, keeping the other settings.
    pub fn reinit(&self, capacity: usize) -> Result<()> {
        let config = self.config().with_capacity(capacity);
        self.init(config)
    }

    /// Current configuration.
    pub fn config(&self) -> Config {
        self.tables.read().config.clone()
    }

    /// Maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.tables.read().config.capacity
    }

    // == Write ==
    /// Stores a record.
    ///
    /// Expiration precedence: write TTL > write expiry > record TTL > the
    /// configured default TTL. Updating an existing key never evicts; a new
    /// key evicts the least recently used entry when the store is full. An
    /// already-expired expiry is accepted and swept on the next access.
    pub fn write(&self, record: Record, opts: &WriteOptions) -> Result<()> {
        if record.key.is_empty() {
            return Err(CacheError::InvalidRequest(
                "Key cannot be empty".to_string(),
            ));
        }

        let now = Utc::now();
        let mut guard = self.tables.write();
        let Tables {
            prefix,
            suffix,
            recency,
            config,
        } = &mut *guard;
        let recency = recency.get_mut();
        let expires_at = resolve_expiry(record.expiry, opts, config.default_ttl(), now);

        if let Some(handle) = prefix.get(&record.key) {
            if let Some(stored) = recency.get_mut(handle) {
                *stored = StoredRecord::new(record, expires_at);
            }
            recency.move_to_back(handle);
            return Ok(());
        }

        if recency.len() >= config.capacity {
            if let Some(evicted) = recency.pop_front() {
                prefix.remove(&evicted.key);
                suffix.remove(&reverse_key(&evicted.key));
                self.counters.record_eviction();
                debug!(key = %evicted.key, "evicted least recently used entry");
            }
        }

        let key = record.key.clone();
        let reversed = reverse_key(&key);
        let handle = recency.push_back(StoredRecord::new(record, expires_at));
        prefix.insert(key, handle);
        suffix.insert(reversed, handle);
        Ok(())
    }

    // == Read ==
    /// Reads a single key.
    ///
    /// A hit moves the entry to the most recently used position. An expired
    /// entry is removed and reported as not found. The returned expiry is the
    /// time left before the entry expires.
    pub fn read(&self, key: &str) -> Result<Record> {
        let now = Utc::now();
        {
            let tables = self.tables.read();
            let Some(handle) = tables.prefix.get(key) else {
                return Err(self.miss(key));
            };

            let mut recency = tables.recency.write();
            let live = recency
                .get(handle)
                .filter(|stored| !stored.is_expired(now))
                .map(|stored| stored.to_record(now));
            if let Some(record) = live {
                recency.move_to_back(handle);
                self.counters.record_hit();
                return Ok(record);
            }
        }

        self.sweep(&[key.to_string()], now);
        Err(self.miss(key))
    }

    /// Records whose key starts with `prefix`, in ascending key order.
    pub fn read_prefix(&self, prefix: &str, page: Page) -> Vec<Record> {
        self.walk(Some(prefix), None, page, StoredRecord::to_record)
    }

    /// Records whose key ends with `suffix`, in ascending reversed-key order.
    pub fn read_suffix(&self, suffix: &str, page: Page) -> Vec<Record> {
        self.walk(None, Some(suffix), page, StoredRecord::to_record)
    }

    /// Records whose key starts with `prefix` and ends with `suffix`, in
    /// ascending key order.
    pub fn read_prefix_suffix(&self, prefix: &str, suffix: &str, page: Page) -> Vec<Record> {
        self.walk(Some(prefix), Some(suffix), page, StoredRecord::to_record)
    }

    // == Delete ==
    /// Removes a key. Missing keys are not an error.
    pub fn delete(&self, key: &str) -> Result<()> {
        let mut tables = self.tables.write();
        if let Some(handle) = tables.prefix.get(key) {
            tables.remove_entry(key, handle);
        }
        Ok(())
    }

    // == List ==
    /// Lists live keys.
    ///
    /// With a prefix (with or without suffix) or no filter at all, keys come
    /// in ascending order; with only a suffix, in ascending reversed-key order.
    pub fn list(&self, opts: &ListOptions) -> Vec<String> {
        self.walk(
            opts.prefix_filter(),
            opts.suffix_filter(),
            opts.page,
            |stored, _| stored.key.clone(),
        )
    }

    // == Length ==
    /// Number of entries, and whether both indices and the recency list agree
    /// on it. On disagreement the count is 0.
    pub fn len(&self) -> (usize, bool) {
        let tables = self.tables.read();
        let entries = tables.recency.read().len();
        if entries == tables.prefix.len() && entries == tables.suffix.len() {
            (entries, true)
        } else {
            (0, false)
        }
    }

    /// Returns true if the store holds no entries, expired ones included.
    pub fn is_empty(&self) -> bool {
        self.tables.read().recency.read().is_empty()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total_entries = self.tables.read().recency.read().len();
        self.counters.snapshot(total_entries)
    }

    // == Purge Expired ==
    /// Removes every expired entry right away.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut tables = self.tables.write();
        let expired: Vec<String> = tables
            .recency
            .get_mut()
            .iter()
            .filter(|stored| stored.is_expired(now))
            .map(|stored| stored.key.clone())
            .collect();

        let mut removed = 0;
        for key in &expired {
            if let Some(handle) = tables.prefix.get(key) {
                tables.remove_entry(key, handle);
                removed += 1;
            }
        }
        drop(tables);

        self.record_sweep(removed);
        removed
    }

    /// Walks one index under the shared lock, collecting up to `page` live
    /// matches, then sweeps the expired entries it stepped over.
    fn walk<T>(
        &self,
        prefix: Option<&str>,
        suffix: Option<&str>,
        page: Page,
        project: impl Fn(&StoredRecord, DateTime<Utc>) -> T,
    ) -> Vec<T> {
        let now = Utc::now();
        let mut results = Vec::new();
        let mut expired = Vec::new();
        {
            let tables = self.tables.read();
            let recency = tables.recency.read();
            let reversed;
            let candidates: Box<dyn Iterator<Item = (&str, Handle)> + '_> = match (prefix, suffix)
            {
                (Some(prefix), Some(suffix)) => Box::new(
                    tables
                        .prefix
                        .walk_prefix(prefix)
                        .filter(move |(key, _)| key.ends_with(suffix)),
                ),
                (Some(prefix), None) => Box::new(tables.prefix.walk_prefix(prefix)),
                (None, Some(suffix)) => {
                    reversed = reverse_key(suffix);
                    Box::new(tables.suffix.walk_prefix(&reversed))
                }
                (None, None) => Box::new(tables.prefix.walk_prefix("")),
            };

            let mut cursor = page.cursor();
            for (_, handle) in candidates {
                let Some(stored) = recency.get(handle) else {
                    continue;
                };
                if stored.is_expired(now) {
                    expired.push(stored.key.clone());
                    continue;
                }
                if cursor.admit() {
                    results.push(project(stored, now));
                }
                if cursor.is_done() {
                    break;
                }
            }
        }

        self.sweep(&expired, now);
        results
    }

    /// Removes keys that were seen expired at `now`, skipping any that were
    /// deleted or rewritten with a later expiry in the meantime.
    fn sweep(&self, keys: &[String], now: DateTime<Utc>) -> usize {
        if keys.is_empty() {
            return 0;
        }

        let mut tables = self.tables.write();
        let mut removed = 0;
        for key in keys {
            let Some(handle) = tables.prefix.get(key) else {
                continue;
            };
            let still_expired = tables
                .recency
                .get_mut()
                .get(handle)
                .map_or(true, |stored| stored.is_expired(now));
            if still_expired {
                tables.remove_entry(key, handle);
                removed += 1;
            }
        }
        drop(tables);

        self.record_sweep(removed);
        removed
    }

    fn record_sweep(&self, removed: usize) {
        if removed > 0 {
            self.counters.record_expirations(removed);
            debug!(removed, "swept expired entries");
        }
    }

    fn miss(&self, key: &str) -> CacheError {
        self.counters.record_miss();
        trace!(key, "exact read missed");
        CacheError::NotFound(key.to_string())
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::from_valid(Config::default())
    }
}

impl fmt::Display for MemStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RadixMemStore")
    }
}

// == Store Implementation ==
/// Routing fields in the options are ignored.
impl Store for MemStore {
    fn init(&self, config: Config) -> Result<()> {
        MemStore::init(self, config)
    }

    fn config(&self) -> Config {
        MemStore::config(self)
    }

    fn write(&self, record: Record, opts: &WriteOptions) -> Result<()> {
        MemStore::write(self, record, opts)
    }

    fn read(&self, key: &str, opts: &ReadOptions) -> Result<Vec<Record>> {
        let records = match &opts.matching {
            KeyMatch::Exact => vec![MemStore::read(self, key)?],
            KeyMatch::Prefix => self.read_prefix(key, opts.page),
            KeyMatch::Suffix => self.read_suffix(key, opts.page),
            KeyMatch::PrefixSuffix(suffix) => self.read_prefix_suffix(key, suffix, opts.page),
        };
        Ok(records)
    }

    fn delete(&self, key: &str, _opts: &DeleteOptions) -> Result<()> {
        MemStore::delete(self, key)
    }

    fn list(&self, opts: &ListOptions) -> Result<Vec<String>> {
        Ok(MemStore::list(self, opts))
    }
}
