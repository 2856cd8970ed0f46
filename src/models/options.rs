//! Option objects for store operations
//!
//! Every option type carries the `database`/`table` routing pair. A plain
//! `MemStore` ignores it; `MultiMemStore` uses it to pick the target table.

use std::time::Duration;

use chrono::{DateTime, Utc};

// == Page ==
/// Offset/limit window applied to prefix, suffix and list walks.
///
/// A `limit` of zero means unbounded, whatever the offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Number of live matches to skip
    pub offset: usize,
    /// Maximum number of matches to return, 0 = no limit
    pub limit: usize,
}

impl Page {
    /// Creates a new page window.
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Window covering every match.
    pub fn all() -> Self {
        Self::default()
    }

    /// Starts a cursor over this window.
    pub(crate) fn cursor(self) -> PageCursor {
        PageCursor {
            page: self,
            seen: 0,
        }
    }
}

/// Tracks how many live matches a walk has produced so far.
#[derive(Debug)]
pub(crate) struct PageCursor {
    page: Page,
    seen: usize,
}

impl PageCursor {
    /// Counts one live match and reports whether it falls inside the window.
    pub(crate) fn admit(&mut self) -> bool {
        let index = self.seen;
        self.seen += 1;
        index >= self.page.offset
    }

    /// True once `limit` matches have been produced.
    pub(crate) fn is_done(&self) -> bool {
        self.page.limit != 0 && self.seen >= self.page.offset + self.page.limit
    }
}

// == Key Match ==
/// How the key passed to a read is matched against stored keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyMatch {
    /// The key must match exactly
    #[default]
    Exact,
    /// The key is a prefix, results in ascending key order
    Prefix,
    /// The key is a suffix, results in ascending reversed-key order
    Suffix,
    /// The key is a prefix and the stored keys must also end with the given suffix
    PrefixSuffix(String),
}

// == Write Options ==
/// Options for a write.
///
/// Expiration precedence: `ttl` > `expiry` > the record's own expiry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub database: String,
    pub table: String,
    /// Time to live, overrides everything else when non-zero
    pub ttl: Option<Duration>,
    /// Absolute expiration instant
    pub expiry: Option<DateTime<Utc>>,
}

impl WriteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, database: impl Into<String>, table: impl Into<String>) -> Self {
        self.database = database.into();
        self.table = table.into();
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn expiry(mut self, expiry: DateTime<Utc>) -> Self {
        self.expiry = Some(expiry);
        self
    }
}

// == Read Options ==
/// Options for a read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadOptions {
    pub database: String,
    pub table: String,
    pub matching: KeyMatch,
    /// Ignored for exact reads
    pub page: Page,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, database: impl Into<String>, table: impl Into<String>) -> Self {
        self.database = database.into();
        self.table = table.into();
        self
    }

    /// Treat the key as a prefix.
    pub fn prefix(mut self) -> Self {
        self.matching = KeyMatch::Prefix;
        self
    }

    /// Treat the key as a suffix.
    pub fn suffix(mut self) -> Self {
        self.matching = KeyMatch::Suffix;
        self
    }

    /// Treat the key as a prefix and also require `suffix`.
    pub fn prefix_and_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.matching = KeyMatch::PrefixSuffix(suffix.into());
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.page.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.page.limit = limit;
        self
    }
}

// == Delete Options ==
/// Options for a delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub database: String,
    pub table: String,
}

impl DeleteOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, database: impl Into<String>, table: impl Into<String>) -> Self {
        self.database = database.into();
        self.table = table.into();
        self
    }
}

// == List Options ==
/// Options for a key listing. Empty prefix/suffix strings count as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub database: String,
    pub table: String,
    pub prefix: Option<String>,
    pub suffix: Option<String>,
    pub page: Page,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(mut self, database: impl Into<String>, table: impl Into<String>) -> Self {
        self.database = database.into();
        self.table = table.into();
        self
    }

    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.page.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.page.limit = limit;
        self
    }

    /// Prefix filter, if any non-empty one was given.
    pub(crate) fn prefix_filter(&self) -> Option<&str> {
        self.prefix.as_deref().filter(|p| !p.is_empty())
    }

    /// Suffix filter, if any non-empty one was given.
    pub(crate) fn suffix_filter(&self) -> Option<&str> {
        self.suffix.as_deref().filter(|s| !s.is_empty())
    }
}
