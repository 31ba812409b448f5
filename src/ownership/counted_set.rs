//! Multiset with per-member occurrence counts.

use std::collections::HashMap;
use std::hash::Hash;

/// A set that remembers how many times each member was inserted.
///
/// Members with a count of zero are never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountedSet<T: Eq + Hash> {
    store: HashMap<T, usize>,
}

impl<T: Eq + Hash> Default for CountedSet<T> {
    fn default() -> Self {
        Self {
            store: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash> CountedSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one occurrence of `member`.
    pub fn insert(&mut self, member: T) {
        *self.store.entry(member).or_insert(0) += 1;
    }

    /// Removes one occurrence of `member`; false if it was absent.
    pub fn remove(&mut self, member: &T) -> bool {
        let Some(count) = self.store.get_mut(member) else {
            return false;
        };
        *count -= 1;
        if *count == 0 {
            self.store.remove(member);
        }
        true
    }

    /// Occurrences of `member`; zero when absent.
    pub fn count(&self, member: &T) -> usize {
        self.store.get(member).copied().unwrap_or(0)
    }

    /// Distinct members, in hash-map iteration order.
    pub fn members(&self) -> impl Iterator<Item = &T> {
        self.store.keys()
    }

    /// Members paired with their counts, in hash-map iteration order.
    pub fn iter(&self) -> impl Iterator<Item = (&T, usize)> {
        self.store.iter().map(|(member, &count)| (member, count))
    }

    /// Sum of all counts.
    pub fn total_count(&self) -> usize {
        self.store.values().sum()
    }

    /// Highest count of any member, or `None` when empty.
    pub fn max_count(&self) -> Option<usize> {
        self.store.values().copied().max()
    }

    /// Number of distinct members.
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// True when no member has been inserted.
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

impl<T: Eq + Hash> FromIterator<T> for CountedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for member in iter {
            set.insert(member);
        }
        set
    }
}
