//! Record Module
//!
//! Defines the public record handed to and returned by the store, and the
//! stored form that keeps an absolute expiration instant.

use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::models::WriteOptions;

/// Caller metadata attached to a record. The store never interprets it.
pub type Metadata = HashMap<String, serde_json::Value>;

// == Record ==
/// A key with its value, metadata and time to live.
///
/// On write, `expiry` is the TTL embedded in the record (lowest precedence
/// after the write options). On read, it holds the time left before the
/// record expires, or `None` if it never does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub key: String,
    pub value: Bytes,
    pub metadata: Metadata,
    pub expiry: Option<Duration>,
}

impl Record {
    /// Creates a record without metadata or expiry.
    pub fn new(key: impl Into<String>, value: impl Into<Bytes>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            metadata: Metadata::new(),
            expiry: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.expiry = Some(expiry);
        self
    }
}

// == Stored Record ==
/// Record as kept by the recency list.
#[derive(Debug, Clone)]
pub(crate) struct StoredRecord {
    pub key: String,
    pub value: Bytes,
    pub metadata: Metadata,
    /// Absolute expiration instant, None = never expires
    pub expires_at: Option<DateTime<Utc>>,
}

impl StoredRecord {
    pub fn new(record: Record, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            key: record.key,
            value: record.value,
            metadata: record.metadata,
            expires_at,
        }
    }

    // == Is Expired ==
    /// An entry is expired once `now` reaches its expiration instant.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Remaining time before expiration, saturating at zero.
    pub fn ttl_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.expires_at
            .map(|expires| (expires - now).to_std().unwrap_or_default())
    }

    /// Copy handed out to readers, with the expiry relative to `now`.
    pub fn to_record(&self, now: DateTime<Utc>) -> Record {
        Record {
            key: self.key.clone(),
            value: self.value.clone(),
            metadata: self.metadata.clone(),
            expiry: self.ttl_remaining(now),
        }
    }
}

// == Expiry Resolution ==
/// Resolves the absolute expiration of a write.
///
/// Precedence: write TTL > write expiry > record TTL > default TTL. Zero
/// durations count as unset.
pub(crate) fn resolve_expiry(
    record_ttl: Option<Duration>,
    opts: &WriteOptions,
    default_ttl: Option<Duration>,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    let positive = |ttl: Option<Duration>| ttl.filter(|d| !d.is_zero());

    if let Some(ttl) = positive(opts.ttl) {
        return after(now, ttl);
    }
    if let Some(expiry) = opts.expiry {
        return Some(expiry);
    }
    positive(record_ttl)
        .or(positive(default_ttl))
        .and_then(|ttl| after(now, ttl))
}

/// `now + ttl`, or None when the sum doesn't fit (far enough to never expire).
fn after(now: DateTime<Utc>, ttl: Duration) -> Option<DateTime<Utc>> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|delta| now.checked_add_signed(delta))
}
