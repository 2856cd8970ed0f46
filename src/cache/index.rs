//! Key Index Module
//!
//! Ordered key -> handle maps used for exact and prefix lookups. The suffix
//! index is the same structure keyed by reversed keys, so a suffix search is
//! a prefix walk over reversed spellings.

use std::collections::BTreeMap;
use std::ops::Bound;

use crate::cache::lru::Handle;

// == Key Index ==
/// Lexicographically ordered index from key to recency list handle.
#[derive(Debug, Default)]
pub(crate) struct KeyIndex {
    tree: BTreeMap<String, Handle>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<Handle> {
        self.tree.get(key).copied()
    }

    pub fn insert(&mut self, key: String, handle: Handle) -> Option<Handle> {
        self.tree.insert(key, handle)
    }

    pub fn remove(&mut self, key: &str) -> Option<Handle> {
        self.tree.remove(key)
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    // == Walk Prefix ==
    /// Entries whose key starts with `prefix`, in ascending key order.
    /// An empty prefix walks the whole index.
    pub fn walk_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = (&'a str, Handle)> + 'a {
        self.tree
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(key, _)| key.starts_with(prefix))
            .map(|(key, handle)| (key.as_str(), *handle))
    }
}

/// Reverses a key character by character.
pub(crate) fn reverse_key(key: &str) -> String {
    key.chars().rev().collect()
}
