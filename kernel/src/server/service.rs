// Store Service
//
// The remote-callable side of an ordered server. One lock guards every
// key, so pushes and pulls on an instance are fully serialized.

use parking_lot::Mutex;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

use super::OrderedService;
use crate::gate::{self, Admission};
use crate::history::{Record, VersionedStore};

/// Versioned store behind a single process-wide lock.
#[derive(Debug)]
pub struct StoreService<K, V, T> {
    store: Mutex<VersionedStore<K, V, T>>,
}

impl<K, V, T> StoreService<K, V, T>
where
    K: Eq + Hash + Clone,
    V: Eq + Hash + Clone,
{
    pub fn new(depth: usize) -> Self {
        Self {
            store: Mutex::new(VersionedStore::new(depth)),
        }
    }

    /// Run `f` against the store while holding the lock.
    pub fn inspect<R>(&self, f: impl FnOnce(&VersionedStore<K, V, T>) -> R) -> R {
        let store = self.store.lock();
        f(&*store)
    }
}

impl<K, V, T> OrderedService<K, V, T> for StoreService<K, V, T>
where
    K: Eq + Hash + Clone + Debug + Send,
    V: Eq + Hash + Clone + Debug + Send,
    T: Clone + Send,
{
    fn push_service(&self, key: K, value: T, version: V, prev_version: Option<V>) -> bool {
        let mut store = self.store.lock();

        let latest = store.latest(&key).map(|record| &record.version);
        let admission = gate::admit(latest, &version, prev_version.as_ref());

        match admission {
            Admission::Conflict => {
                debug!(?key, ?version, ?prev_version, "push rejected: version conflict");
            }
            _ => {
                debug!(?key, ?version, ?admission, "push accepted");
                store.append(key.clone(), version, value);
            }
        }

        // Pruning runs whether or not the push was admitted.
        let evicted = store.prune(&key);
        if !evicted.is_empty() {
            trace!(?key, evicted = evicted.len(), "pruned history");
        }

        admission.is_accepted()
    }

    fn pull_service(&self, key: &K, version: Option<&V>) -> Option<(T, V)> {
        let store = self.store.lock();

        let record = match version {
            Some(version) => store.get(key, version),
            None => store.latest(key),
        };
        debug!(?key, ?version, found = record.is_some(), "pull");

        record.cloned().map(Record::into_pair)
    }
}
