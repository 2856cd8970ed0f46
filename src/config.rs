//! Configuration Module
//!
//! Handles store configuration from environment variables or decoded option maps.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Deserializer};

use crate::error::{CacheError, Result};

/// Capacity used when none is configured.
pub const DEFAULT_CAPACITY: usize = 512;

/// Store configuration parameters.
///
/// All values can be configured via environment variables or an option map,
/// with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Maximum number of entries a single table can hold
    #[serde(alias = "maxCap")]
    pub capacity: usize,
    /// Default TTL for writes without any expiration, None = never.
    /// Decoded from seconds, fractions allowed.
    #[serde(deserialize_with = "deserialize_ttl_secs")]
    pub ttl: Option<Duration>,
    /// Default database used by the registry for empty routing
    pub database: String,
    /// Default table used by the registry for empty routing
    pub table: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMSTORE_CAPACITY` - Maximum entries per table (default: 512)
    /// - `MEMSTORE_TTL` - Default TTL in seconds, fractions allowed (default: none)
    /// - `MEMSTORE_DATABASE` - Default database (default: empty)
    /// - `MEMSTORE_TABLE` - Default table (default: empty)
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("MEMSTORE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
            ttl: env::var("MEMSTORE_TTL")
                .ok()
                .and_then(|v| v.parse::<f64>().ok())
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
            database: env::var("MEMSTORE_DATABASE").unwrap_or_default(),
            table: env::var("MEMSTORE_TABLE").unwrap_or_default(),
        }
    }

    /// Decodes an option map such as `{"capacity": 50, "ttl": 30}`, with `ttl`
    /// in seconds.
    ///
    /// Unknown keys are ignored. The result is validated.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let config: Config = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Sets the per-table capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the default TTL applied to writes without an expiration.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets the default routing used by the registry.
    pub fn with_table(mut self, database: impl Into<String>, table: impl Into<String>) -> Self {
        self.database = database.into();
        self.table = table.into();
        self
    }

    /// Default TTL as a duration. A zero TTL means entries never expire.
    pub fn default_ttl(&self) -> Option<Duration> {
        self.ttl.filter(|ttl| !ttl.is_zero())
    }

    /// Checks the configuration for values that can't be used.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::Config(
                "capacity must be greater than zero".to_string(),
            ));
        }
        if self.database.contains('/') {
            return Err(CacheError::Config(format!(
                "database '{}' must not contain '/'",
                self.database
            )));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: None,
            database: String::new(),
            table: String::new(),
        }
    }
}

/// Reads an optional, possibly fractional, number of seconds.
fn deserialize_ttl_secs<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(deserializer)?
        .map(|secs| Duration::try_from_secs_f64(secs).map_err(serde::de::Error::custom))
        .transpose()
}
