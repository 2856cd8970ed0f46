//! Store Interface
//!
//! Generic key-value store interface shared by cache backends. Code written
//! against `dyn Store` can swap a single memory store for the table registry
//! (or any other backend) without changes.

use std::fmt;

use crate::cache::Record;
use crate::config::Config;
use crate::error::Result;
use crate::models::{DeleteOptions, ListOptions, ReadOptions, WriteOptions};

// == Store Trait ==
pub trait Store: Send + Sync + fmt::Display {
    /// Resets the backend with a new configuration.
    fn init(&self, config: Config) -> Result<()>;

    /// Configuration in use.
    fn config(&self) -> Config;

    /// Stores a record.
    fn write(&self, record: Record, opts: &WriteOptions) -> Result<()>;

    /// Reads records. Exact reads return exactly one record or
    /// `CacheError::NotFound`; prefix and suffix reads never fail and may
    /// return nothing.
    fn read(&self, key: &str, opts: &ReadOptions) -> Result<Vec<Record>>;

    /// Removes a key. Removing a missing key succeeds.
    fn delete(&self, key: &str, opts: &DeleteOptions) -> Result<()>;

    /// Lists keys.
    fn list(&self, opts: &ListOptions) -> Result<Vec<String>>;

    /// Releases backend resources. Nothing to release for in-memory stores.
    fn close(&self) -> Result<()> {
        Ok(())
    }
}
