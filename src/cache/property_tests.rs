//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check round trips, capacity bounds, LRU order, walk
//! ordering and index consistency over random operation sequences.

use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

use chrono::{Duration as ChronoDuration, Utc};

use crate::cache::index::reverse_key;
use crate::cache::{MemStore, Record};
use crate::error::CacheError;
use crate::models::{ListOptions, Page, WriteOptions};

// == Test Configuration ==
const TEST_MAX_ENTRIES: usize = 100;

// == Strategies ==
/// Generates valid cache keys
fn valid_key_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9_]{1,64}".prop_map(|s| s)
}

/// Generates keys from a tiny alphabet so prefixes and suffixes overlap often
fn dense_key_strategy() -> impl Strategy<Value = String> {
    "[a-c]{1,6}".prop_map(|s| s)
}

/// Generates cache values
fn valid_value_strategy() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{1,256}".prop_map(|s| s)
}

/// Generates a sequence of cache operations for testing
#[derive(Debug, Clone)]
enum CacheOp {
    Write { key: String, value: String },
    WriteExpired { key: String },
    Read { key: String },
    Delete { key: String },
    ListPrefix { prefix: String },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        (dense_key_strategy(), valid_value_strategy())
            .prop_map(|(key, value)| CacheOp::Write { key, value }),
        dense_key_strategy().prop_map(|key| CacheOp::WriteExpired { key }),
        dense_key_strategy().prop_map(|key| CacheOp::Read { key }),
        dense_key_strategy().prop_map(|key| CacheOp::Delete { key }),
        "[a-c]{0,2}".prop_map(|prefix| CacheOp::ListPrefix { prefix }),
    ]
}

fn store(capacity: usize) -> MemStore {
    MemStore::with_capacity(capacity).unwrap()
}

fn put(store: &MemStore, key: &str, value: &str) {
    store
        .write(Record::new(key, value.to_string()), &WriteOptions::new())
        .unwrap();
}

fn unique(keys: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    keys.into_iter().filter(|k| seen.insert(k.clone())).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Storing a pair and reading it back returns the exact value.
    #[test]
    fn prop_roundtrip_storage(key in valid_key_strategy(), value in valid_value_strategy()) {
        let store = store(TEST_MAX_ENTRIES);

        put(&store, &key, &value);

        let record = store.read(&key).unwrap();
        prop_assert_eq!(record.key, key);
        prop_assert_eq!(record.value, value.as_bytes());
    }

    // After a delete, an exact read reports not found.
    #[test]
    fn prop_delete_removes_entry(key in valid_key_strategy(), value in valid_value_strategy()) {
        let store = store(TEST_MAX_ENTRIES);

        put(&store, &key, &value);
        prop_assert!(store.read(&key).is_ok(), "Key should exist before delete");

        store.delete(&key).unwrap();
        prop_assert!(
            matches!(store.read(&key), Err(CacheError::NotFound(_))),
            "Key should not exist after delete"
        );
        prop_assert!(store.delete(&key).is_ok(), "Deleting twice should succeed");
    }

    // The store never holds more than its capacity.
    #[test]
    fn prop_capacity_enforcement(
        entries in prop::collection::vec(
            (valid_key_strategy(), valid_value_strategy()),
            1..200
        )
    ) {
        let max_entries = 50;
        let store = store(max_entries);

        for (key, value) in entries {
            put(&store, &key, &value);
            let (len, consistent) = store.len();
            prop_assert!(consistent, "Indices disagree");
            prop_assert!(len <= max_entries, "Cache size {} exceeds max {}", len, max_entries);
        }
    }

    // Rewriting an existing key in a full store removes nothing.
    #[test]
    fn prop_update_does_not_evict(
        keys in prop::collection::vec(valid_key_strategy(), 2..20),
        pick in 0usize..100,
        value in valid_value_strategy()
    ) {
        let keys = unique(keys);
        let store = store(keys.len());
        for key in &keys {
            put(&store, key, "initial");
        }

        let updated = &keys[pick % keys.len()];
        put(&store, updated, &value);

        prop_assert_eq!(store.len(), (keys.len(), true));
        for key in &keys {
            prop_assert!(store.read(key).is_ok(), "Key '{}' should survive an update", key);
        }
    }

    // Prefix walks return exactly the matching keys in ascending order.
    #[test]
    fn prop_prefix_walk_is_sorted_filter(
        keys in prop::collection::vec(dense_key_strategy(), 1..40),
        prefix in "[a-c]{0,3}"
    ) {
        let store = store(TEST_MAX_ENTRIES);
        for key in &keys {
            put(&store, key, key);
        }

        let expected: Vec<String> = keys
            .iter()
            .filter(|k| k.starts_with(&prefix))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let found: Vec<String> = store
            .read_prefix(&prefix, Page::all())
            .into_iter()
            .map(|r| r.key)
            .collect();
        prop_assert_eq!(found, expected);
    }

    // Suffix walks return exactly the matching keys ordered by reversed spelling.
    #[test]
    fn prop_suffix_walk_is_reversed_sorted_filter(
        keys in prop::collection::vec(dense_key_strategy(), 1..40),
        suffix in "[a-c]{0,3}"
    ) {
        let store = store(TEST_MAX_ENTRIES);
        for key in &keys {
            put(&store, key, key);
        }

        let expected: Vec<String> = keys
            .iter()
            .filter(|k| k.ends_with(&suffix))
            .map(|k| reverse_key(k))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|k| reverse_key(&k))
            .collect();
        let found: Vec<String> = store
            .read_suffix(&suffix, Page::all())
            .into_iter()
            .map(|r| r.key)
            .collect();
        prop_assert_eq!(found, expected);
    }

    // A window over a walk is the matching slice of the unbounded walk.
    #[test]
    fn prop_window_is_slice_of_full_walk(
        keys in prop::collection::vec(dense_key_strategy(), 1..40),
        offset in 0usize..20,
        limit in 1usize..20
    ) {
        let store = store(TEST_MAX_ENTRIES);
        for key in &keys {
            put(&store, key, key);
        }

        let all = store.list(&ListOptions::new());
        let window = store.list(&ListOptions::new().offset(offset).limit(limit));
        let expected: Vec<String> = all.into_iter().skip(offset).take(limit).collect();
        prop_assert_eq!(window, expected);
    }

    // Indices and recency list agree after any sequence of operations.
    #[test]
    fn prop_indices_stay_consistent(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let store = store(16);
        let past = Utc::now() - ChronoDuration::seconds(1);

        for op in ops {
            match op {
                CacheOp::Write { key, value } => put(&store, &key, &value),
                CacheOp::WriteExpired { key } => {
                    store
                        .write(Record::new(key, "expired"), &WriteOptions::new().expiry(past))
                        .unwrap();
                }
                CacheOp::Read { key } => {
                    let _ = store.read(&key);
                }
                CacheOp::Delete { key } => store.delete(&key).unwrap(),
                CacheOp::ListPrefix { prefix } => {
                    let listed = store.list(&ListOptions::new().prefix(prefix));
                    prop_assert!(listed.windows(2).all(|w| w[0] < w[1]), "List not sorted");
                }
            }
            let (len, consistent) = store.len();
            prop_assert!(consistent, "Indices disagree after an operation");
            prop_assert!(len <= 16);
        }

        store.purge_expired();
        let listed = store.list(&ListOptions::new());
        prop_assert_eq!(store.len(), (listed.len(), true));
    }

    // Hits and misses reflect the outcome of every exact read.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..50)) {
        let store = store(TEST_MAX_ENTRIES);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Write { key, value } => put(&store, &key, &value),
                CacheOp::Read { key } => match store.read(&key) {
                    Ok(_) => expected_hits += 1,
                    Err(_) => expected_misses += 1,
                },
                CacheOp::Delete { key } => store.delete(&key).unwrap(),
                CacheOp::WriteExpired { .. } | CacheOp::ListPrefix { .. } => {}
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len().0, "Total entries mismatch");
    }
}

// Property tests for LRU eviction behavior
proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // Filling a full store evicts the least recently written key.
    #[test]
    fn prop_lru_eviction_order(
        initial_keys in prop::collection::vec(valid_key_strategy(), 3..10),
        new_key in valid_key_strategy(),
        new_value in valid_value_strategy()
    ) {
        let unique_keys = unique(initial_keys);
        prop_assume!(unique_keys.len() >= 2);
        prop_assume!(!unique_keys.contains(&new_key));

        let capacity = unique_keys.len();
        let store = store(capacity);

        let oldest_key = unique_keys[0].clone();
        for key in &unique_keys {
            put(&store, key, &format!("value_{}", key));
        }
        prop_assert_eq!(store.len(), (capacity, true), "Cache should be at capacity");

        put(&store, &new_key, &new_value);

        prop_assert_eq!(store.len(), (capacity, true), "Cache should remain at capacity");
        prop_assert!(
            store.read(&oldest_key).is_err(),
            "Oldest key '{}' should have been evicted",
            oldest_key
        );
        prop_assert!(store.read(&new_key).is_ok(), "New key '{}' should exist", new_key);
        for key in unique_keys.iter().skip(1) {
            prop_assert!(store.read(key).is_ok(), "Key '{}' should still exist", key);
        }
    }

    // An exact read makes a key the most recently used one.
    #[test]
    fn prop_lru_access_tracking(
        keys in prop::collection::vec(valid_key_strategy(), 3..8),
        new_key in valid_key_strategy(),
        new_value in valid_value_strategy()
    ) {
        let unique_keys = unique(keys);
        prop_assume!(unique_keys.len() >= 3);
        prop_assume!(!unique_keys.contains(&new_key));

        let store = store(unique_keys.len());
        for key in &unique_keys {
            put(&store, key, &format!("value_{}", key));
        }

        // Touch the eviction candidate, the second key becomes the oldest
        let accessed_key = unique_keys[0].clone();
        store.read(&accessed_key).unwrap();
        let expected_evicted = unique_keys[1].clone();

        put(&store, &new_key, &new_value);

        prop_assert!(
            store.read(&accessed_key).is_ok(),
            "Accessed key '{}' should not be evicted after being touched",
            accessed_key
        );
        prop_assert!(
            store.read(&expected_evicted).is_err(),
            "Key '{}' should have been evicted as it was oldest after access",
            expected_evicted
        );
        prop_assert!(store.read(&new_key).is_ok(), "New key should exist");
    }
}
