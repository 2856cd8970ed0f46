//! Radix MemStore - an in-process key-value cache
//!
//! Exact, prefix and suffix key lookups over ordered indices, with
//! capacity-bounded LRU eviction and lazy TTL expiration. A registry
//! partitions independent stores by `database/table`.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use backend::Store;
pub use cache::{CacheStats, MemStore, Metadata, MultiMemStore, Record};
pub use config::Config;
pub use error::{CacheError, Result};
pub use models::{DeleteOptions, KeyMatch, ListOptions, Page, ReadOptions, WriteOptions};
