//! Multi-Table Registry Module
//!
//! Routes operations to independent memory stores keyed by
//! `database/table`. Stores are created on first use and kept for the
//! lifetime of the registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::backend::Store;
use crate::cache::record::Record;
use crate::cache::store::MemStore;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{DeleteOptions, ListOptions, ReadOptions, WriteOptions};

#[derive(Debug)]
struct Registry {
    /// Shared settings for every table created from now on
    config: Config,
    stores: HashMap<String, Arc<MemStore>>,
}

// == Multi Memory Store ==
/// A registry of memory stores, one per `(database, table)` pair.
///
/// Capacity, eviction and expiration are per table. Empty database or table
/// names fall back to the defaults from the configuration.
#[derive(Debug)]
pub struct MultiMemStore {
    registry: RwLock<Registry>,
}

impl MultiMemStore {
    // == Constructor ==
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        info!(
            capacity = config.capacity,
            database = %config.database,
            table = %config.table,
            "table registry initialised"
        );
        Ok(Self {
            registry: RwLock::new(Registry {
                config,
                stores: HashMap::new(),
            }),
        })
    }

    // == Init ==
    /// Drops every table and switches to a new configuration.
    pub fn init(&self, config: Config) -> Result<()> {
        config.validate()?;
        info!(capacity = config.capacity, "table registry reinitialised");
        *self.registry.write() = Registry {
            config,
            stores: HashMap::new(),
        };
        Ok(())
    }

    pub fn config(&self) -> Config {
        self.registry.read().config.clone()
    }

    /// Number of tables created so far.
    pub fn table_count(&self) -> usize {
        self.registry.read().stores.len()
    }

    // == Resolve ==
    /// Returns the store for `(database, table)`, creating it if needed.
    ///
    /// The registry lock is released before the handle is returned, so
    /// calls into the store never run under it.
    pub fn resolve(&self, database: &str, table: &str) -> Result<Arc<MemStore>> {
        if database.contains('/') {
            return Err(CacheError::InvalidRequest(format!(
                "database '{}' must not contain '/'",
                database
            )));
        }

        {
            let registry = self.registry.read();
            let key = registry.table_key(database, table);
            if let Some(store) = registry.stores.get(&key) {
                return Ok(Arc::clone(store));
            }
        }

        // the defaults may have changed through `init` since the read above
        let mut registry = self.registry.write();
        let key = registry.table_key(database, table);
        let config = registry.config.clone();
        let store = registry.stores.entry(key).or_insert_with_key(|key| {
            debug!(table = %key, "creating table");
            Arc::new(MemStore::from_valid(config))
        });
        Ok(Arc::clone(store))
    }

    // == Reinit ==
    /// Clears one table and resets its capacity. Other tables are untouched.
    pub fn reinit(&self, database: &str, table: &str, capacity: usize) -> Result<()> {
        self.resolve(database, table)?.reinit(capacity)
    }

    pub fn write(&self, record: Record, opts: &WriteOptions) -> Result<()> {
        self.resolve(&opts.database, &opts.table)?
            .write(record, opts)
    }

    pub fn read(&self, key: &str, opts: &ReadOptions) -> Result<Vec<Record>> {
        let store = self.resolve(&opts.database, &opts.table)?;
        Store::read(&*store, key, opts)
    }

    pub fn delete(&self, key: &str, opts: &DeleteOptions) -> Result<()> {
        self.resolve(&opts.database, &opts.table)?.delete(key)
    }

    pub fn list(&self, opts: &ListOptions) -> Result<Vec<String>> {
        Ok(self.resolve(&opts.database, &opts.table)?.list(opts))
    }
}

impl Registry {
    /// Compound `database/table` key, with empty parts taken from the config.
    fn table_key(&self, database: &str, table: &str) -> String {
        let database = if database.is_empty() {
            self.config.database.as_str()
        } else {
            database
        };
        let table = if table.is_empty() {
            self.config.table.as_str()
        } else {
            table
        };
        format!("{}/{}", database, table)
    }
}

impl Default for MultiMemStore {
    fn default() -> Self {
        Self {
            registry: RwLock::new(Registry {
                config: Config::default(),
                stores: HashMap::new(),
            }),
        }
    }
}

impl fmt::Display for MultiMemStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MultiRadixMemStore")
    }
}

// == Store Implementation ==
impl Store for MultiMemStore {
    fn init(&self, config: Config) -> Result<()> {
        MultiMemStore::init(self, config)
    }

    fn config(&self) -> Config {
        MultiMemStore::config(self)
    }

    fn write(&self, record: Record, opts: &WriteOptions) -> Result<()> {
        MultiMemStore::write(self, record, opts)
    }

    fn read(&self, key: &str, opts: &ReadOptions) -> Result<Vec<Record>> {
        MultiMemStore::read(self, key, opts)
    }

    fn delete(&self, key: &str, opts: &DeleteOptions) -> Result<()> {
        MultiMemStore::delete(self, key, opts)
    }

    fn list(&self, opts: &ListOptions) -> Result<Vec<String>> {
        MultiMemStore::list(self, opts)
    }
}
