//! Option models for store operations
//!
//! This module defines the option objects that callers pass to write,
//! read, delete and list operations, including table routing and paging.

pub mod options;

// Re-export commonly used types
pub use options::{DeleteOptions, KeyMatch, ListOptions, Page, ReadOptions, WriteOptions};
