//! Concurrent Keyed Store Module
//!
//! Generic thread-safe key/value storage that every specialised cache builds on.

use std::hash::Hash;

use dashmap::DashMap;

// == Concurrent Keyed Store ==
/// Thread-safe associative store supporting load, store and delete.
///
/// # Contract
/// - Every operation may be called concurrently from any number of tasks.
/// - Operations on the same key are linearizable: a `load` that starts after a
///   `store` has returned observes that value or a later one.
/// - No ordering is promised across different keys, and an operation on one key
///   never waits for an operation on another shard's key to finish.
/// - No capacity limit and no automatic eviction.
///
/// Values are cloned out on `load`, so no lock is held once the call returns.
/// Wrap large values in `Arc` to keep that clone cheap.
#[derive(Debug)]
pub struct ConcurrentKeyedStore<K, V>
where
    K: Eq + Hash,
{
    entries: DashMap<K, V>,
}

impl<K, V> ConcurrentKeyedStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    // == Load ==
    /// Returns a copy of the value stored under `key`, or `None` on a miss.
    pub fn load(&self, key: &K) -> Option<V> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    // == Store ==
    /// Stores `value` under `key`, replacing any previous value.
    pub fn store(&self, key: K, value: V) {
        self.entries.insert(key, value);
    }

    // == Delete ==
    /// Removes `key`. Deleting an absent key is a no-op.
    pub fn delete(&self, key: &K) {
        self.entries.remove(key);
    }

    // == Length ==
    /// Returns the current number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for ConcurrentKeyedStore<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
