//! Cache Module
//!
//! In-memory key-value stores with prefix/suffix lookups, LRU eviction and
//! lazy TTL expiration, plus a registry of per-table stores.

mod index;
mod lru;
mod multi;
mod record;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use multi::MultiMemStore;
pub use record::{Metadata, Record};
pub use stats::CacheStats;
pub use store::MemStore;
