//! Per-call metadata bag
//!
//! An ordered mapping from lowercase header keys to ordered value sequences.
//! A bag is immutable once built: every operation that changes it returns a
//! new bag and leaves the receiver untouched, so a bag can be handed to any
//! number of concurrent readers without locking.

use std::collections::BTreeMap;
use std::sync::Arc;

type Entries = BTreeMap<String, Vec<String>>;

/// Immutable key → values mapping carried by a single call
///
/// Cloning a bag is cheap (the entries are shared behind an `Arc`). Changes
/// go through [`MetadataBag::set_single`] or [`MetadataBag::merge`], both of
/// which build fresh storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataBag {
    entries: Arc<Entries>,
}

/// Lowercase a header key so lookups are case-insensitive
pub fn normalize_key(key: &str) -> String {
    key.trim().to_ascii_lowercase()
}

impl MetadataBag {
    /// Create an empty bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a bag from `(key, value)` pairs
    ///
    /// Repeated keys append to the same sequence, preserving arrival order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut entries = Entries::new();
        for (key, value) in pairs {
            entries
                .entry(normalize_key(key.as_ref()))
                .or_default()
                .push(value.into());
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    /// All values stored under `key`, or `None` if the key is absent
    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.entries
            .get(&normalize_key(key))
            .map(|values| values.as_slice())
    }

    /// First value stored under `key`
    pub fn first(&self, key: &str) -> Option<&str> {
        self.get(key)
            .and_then(|values| values.first())
            .map(|value| value.as_str())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(&normalize_key(key))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Return a new bag where `key` holds exactly `value`
    ///
    /// If the key already exists its sequence is replaced on a copy of the
    /// entries. If it does not, the key is merged in. Either way `self` is
    /// left as it was.
    pub fn set_single(&self, key: &str, value: impl Into<String>) -> Self {
        let key = normalize_key(key);
        let value = value.into();

        if self.entries.contains_key(&key) {
            let mut copy = self.snapshot();
            Arc::make_mut(&mut copy.entries).insert(key, vec![value]);
            copy
        } else {
            self.merge(&Self::from_pairs([(key, value)]))
        }
    }

    /// Return a new bag where `key` is present with no values
    pub fn with_empty(&self, key: &str) -> Self {
        let mut copy = self.snapshot();
        Arc::make_mut(&mut copy.entries).insert(normalize_key(key), Vec::new());
        copy
    }

    /// Combine two bags into a new one; `other` wins on key conflicts
    pub fn merge(&self, other: &MetadataBag) -> Self {
        if other.is_empty() {
            return self.snapshot();
        }

        let mut entries = (*self.entries).clone();
        for (key, values) in other.entries.iter() {
            entries.insert(key.clone(), values.clone());
        }
        Self {
            entries: Arc::new(entries),
        }
    }

    /// Independent deep copy sharing no storage with `self`
    pub fn snapshot(&self) -> Self {
        Self {
            entries: Arc::new((*self.entries).clone()),
        }
    }

    /// Whether two bags share the same underlying storage
    pub fn shares_storage(&self, other: &MetadataBag) -> bool {
        Arc::ptr_eq(&self.entries, &other.entries)
    }
}

impl<K, V> FromIterator<(K, V)> for MetadataBag
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_pairs(iter)
    }
}
