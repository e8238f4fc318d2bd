// Bounded Version History
//
// Per-key, append-ordered history of (version, value) records.
// "Latest" always means most recently appended, never the largest version.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::hash::Hash;
use uuid::Uuid;

mod store;

pub use store::VersionedStore;

/// Opaque version token.
///
/// Only equality is meaningful; tags carry no ordering.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionTag(pub String);

impl VersionTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Fresh random tag, for writers that have no natural version.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for VersionTag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

/// A single revision of a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record<V, T> {
    pub version: V,
    pub value: T,
}

impl<V, T> Record<V, T> {
    /// Split into the `(value, version)` pair handed back by pulls.
    pub fn into_pair(self) -> (T, V) {
        (self.value, self.version)
    }
}

/// Append-ordered records of one key.
///
/// Every record gets a sequence number when first appended. `base` is the
/// sequence number of the front record, so a record lives at slot
/// `seq - base`. Overwriting an existing version keeps its sequence number.
#[derive(Debug, Clone)]
pub struct History<V, T> {
    records: VecDeque<Record<V, T>>,
    index: HashMap<V, u64>,
    base: u64,
}

impl<V, T> History<V, T>
where
    V: Eq + Hash + Clone,
{
    pub fn new() -> Self {
        Self {
            records: VecDeque::new(),
            index: HashMap::new(),
            base: 0,
        }
    }

    /// Append `version`, or overwrite its value in place if already present.
    ///
    /// Returns `true` when an existing record was overwritten.
    pub fn upsert(&mut self, version: V, value: T) -> bool {
        if let Some(&seq) = self.index.get(&version) {
            let slot = (seq - self.base) as usize;
            self.records[slot].value = value;
            return true;
        }

        let seq = self.base + self.records.len() as u64;
        self.index.insert(version.clone(), seq);
        self.records.push_back(Record { version, value });
        false
    }

    pub fn latest(&self) -> Option<&Record<V, T>> {
        self.records.back()
    }

    pub fn get(&self, version: &V) -> Option<&Record<V, T>> {
        let seq = *self.index.get(version)?;
        self.records.get((seq - self.base) as usize)
    }

    pub fn contains(&self, version: &V) -> bool {
        self.index.contains_key(version)
    }

    /// Drop oldest records until at most `capacity` remain.
    ///
    /// Returns the evicted records, oldest first.
    pub fn truncate_front(&mut self, capacity: usize) -> Vec<Record<V, T>> {
        let mut evicted = Vec::new();
        while self.records.len() > capacity {
            let Some(record) = self.records.pop_front() else {
                break;
            };
            self.index.remove(&record.version);
            self.base += 1;
            evicted.push(record);
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Versions in append order, oldest first.
    pub fn versions(&self) -> impl Iterator<Item = &V> {
        self.records.iter().map(|r| &r.version)
    }
}

impl<V, T> Default for History<V, T>
where
    V: Eq + Hash + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
