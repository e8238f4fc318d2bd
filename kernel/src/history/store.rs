// Versioned Store
//
// Key -> bounded history map. Owns all mutation and lookup logic but
// performs no locking: callers hold the owning server lock.

use std::collections::HashMap;
use std::hash::Hash;

use super::{History, Record};

/// Per-key bounded histories.
///
/// Each history keeps at most `depth + 1` records once pruned.
/// Histories are never removed.
#[derive(Debug)]
pub struct VersionedStore<K, V, T> {
    histories: HashMap<K, History<V, T>>,
    depth: usize,
}

impl<K, V, T> VersionedStore<K, V, T>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    pub fn new(depth: usize) -> Self {
        Self {
            histories: HashMap::new(),
            depth,
        }
    }

    /// Number of old versions kept beyond the newest.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn has(&self, key: &K) -> bool {
        self.histories.contains_key(key)
    }

    pub fn latest(&self, key: &K) -> Option<&Record<V, T>> {
        self.histories.get(key)?.latest()
    }

    pub fn get(&self, key: &K, version: &V) -> Option<&Record<V, T>> {
        self.histories.get(key)?.get(version)
    }

    /// Record `value` under `version`, creating the history if needed.
    ///
    /// An existing version is overwritten in place.
    /// Returns `true` when an existing record was overwritten.
    pub fn append(&mut self, key: K, version: V, value: T) -> bool {
        self.histories
            .entry(key)
            .or_default()
            .upsert(version, value)
    }

    /// Trim the key's history to `depth + 1` records, oldest first.
    ///
    /// Returns the evicted records.
    pub fn prune(&mut self, key: &K) -> Vec<Record<V, T>> {
        let capacity = self.depth.saturating_add(1);
        match self.histories.get_mut(key) {
            Some(history) => history.truncate_front(capacity),
            None => Vec::new(),
        }
    }

    /// Number of keys with a history.
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }

    pub fn history_len(&self, key: &K) -> usize {
        self.histories.get(key).map(History::len).unwrap_or(0)
    }

    /// Versions of `key` in append order, oldest first.
    pub fn versions(&self, key: &K) -> Vec<V> {
        self.histories
            .get(key)
            .map(|h| h.versions().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_key_has_nothing() {
        let store: VersionedStore<String, u32, String> = VersionedStore::new(1);

        assert!(!store.has(&"k".to_string()));
        assert!(store.latest(&"k".to_string()).is_none());
        assert!(store.get(&"k".to_string(), &1).is_none());
        assert_eq!(store.history_len(&"k".to_string()), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn append_creates_history() {
        let mut store = VersionedStore::new(1);
        store.append("k", 7u32, "x");

        assert!(store.has(&"k"));
        assert_eq!(store.latest(&"k").unwrap().value, "x");
        assert_eq!(store.get(&"k", &7).unwrap().version, 7);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn prune_keeps_depth_plus_one() {
        let mut store = VersionedStore::new(2);
        for v in 0u32..5 {
            store.append("k", v, v * 10);
        }

        let evicted = store.prune(&"k");

        assert_eq!(evicted.len(), 2);
        assert_eq!(store.versions(&"k"), vec![2, 3, 4]);
        assert!(store.get(&"k", &1).is_none());
        assert_eq!(store.latest(&"k").unwrap().value, 40);
    }

    #[test]
    fn prune_of_absent_key_is_a_no_op() {
        let mut store: VersionedStore<&str, u32, u32> = VersionedStore::new(1);
        assert!(store.prune(&"missing").is_empty());
        assert!(!store.has(&"missing"));
    }

    #[test]
    fn unbounded_depth_keeps_every_record() {
        let mut store = VersionedStore::new(usize::MAX);
        store.append("k", 1u32, "a");
        store.append("k", 2u32, "b");

        assert!(store.prune(&"k").is_empty());
        assert_eq!(store.versions(&"k"), vec![1, 2]);
        assert_eq!(store.latest(&"k").unwrap().value, "b");
    }

    #[test]
    fn pruning_never_removes_the_history() {
        let mut store = VersionedStore::new(1);
        store.append("k", 1u32, ());
        store.prune(&"k");

        assert!(store.has(&"k"));
        assert_eq!(store.history_len(&"k"), 1);
    }
}
