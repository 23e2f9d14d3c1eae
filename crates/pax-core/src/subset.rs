// crates/pax-core/src/subset.rs
// ============================================================================
// Module: Keyed Subsets
// Description: Ordered, keyed storage shared by node children and attributes.
// Purpose: Preserve insertion order while giving every entry a unique key.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`Subset`] keeps entries in insertion order and addresses each entry by a
//! unique string key. The first entry added for a tag is stored under the tag
//! itself; later entries with the same tag receive a derived key of the form
//! `"<tag> <n>"`, where `n` comes from a per-subset sequence that never
//! repeats. Lookups by the plain tag therefore always find the first entry.
//!
//! Invariants:
//! - Keys are unique within a subset.
//! - Iteration order equals insertion order; removals keep the order of the
//!   remaining entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;

// ============================================================================
// SECTION: Subset
// ============================================================================

/// Single keyed entry.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry<T> {
    /// Unique key of the entry.
    key: String,
    /// Stored item.
    item: T,
}

/// Ordered collection of uniquely keyed items.
///
/// # Invariants
/// - `index` maps every key to the position of its entry in `entries`.
/// - `sequence` only grows, so derived keys are never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subset<T> {
    /// Entries in insertion order.
    entries: Vec<Entry<T>>,
    /// Key to position lookup.
    index: HashMap<String, usize>,
    /// Sequence used for derived keys.
    sequence: u64,
}

impl<T> Default for Subset<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Subset<T> {
    /// Creates an empty subset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            sequence: 0,
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when the subset holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true when an entry is stored under `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the position of the entry stored under `key`.
    #[must_use]
    pub fn position(&self, key: &str) -> Option<usize> {
        self.index.get(key).copied()
    }

    /// Returns the item stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&T> {
        self.position(key).and_then(|position| self.at(position))
    }

    /// Returns a mutable reference to the item stored under `key`.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut T> {
        let position = self.position(key)?;
        self.entries.get_mut(position).map(|entry| &mut entry.item)
    }

    /// Returns the item at `position` in insertion order.
    #[must_use]
    pub fn at(&self, position: usize) -> Option<&T> {
        self.entries.get(position).map(|entry| &entry.item)
    }

    /// Returns the first item in insertion order.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.at(0)
    }

    /// Returns the key of the entry at `position`.
    #[must_use]
    pub fn key_at(&self, position: usize) -> Option<&str> {
        self.entries.get(position).map(|entry| entry.key.as_str())
    }

    /// Iterates over items in insertion order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &T> + '_ {
        self.entries.iter().map(|entry| &entry.item)
    }

    /// Iterates over `(key, item)` pairs in insertion order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &T)> + '_ {
        self.entries.iter().map(|entry| (entry.key.as_str(), &entry.item))
    }

    /// Iterates over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|entry| entry.key.as_str())
    }

    /// Stores `item` under `tag`, deriving a fresh key when `tag` is taken.
    ///
    /// Returns the key the item was stored under.
    pub fn insert(&mut self, tag: &str, item: T) -> String {
        let key = self.derive_key(tag);
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push(Entry {
            key: key.clone(),
            item,
        });
        key
    }

    /// Stores `item` under exactly `key`, returning the item it replaced.
    ///
    /// A new key is appended at the end; an existing key keeps its position.
    pub fn replace(&mut self, key: &str, item: T) -> Option<T> {
        if let Some(position) = self.position(key)
            && let Some(entry) = self.entries.get_mut(position)
        {
            return Some(std::mem::replace(&mut entry.item, item));
        }
        self.index.insert(key.to_string(), self.entries.len());
        self.entries.push(Entry {
            key: key.to_string(),
            item,
        });
        None
    }

    /// Removes and returns the item stored under `key`.
    pub fn remove(&mut self, key: &str) -> Option<T> {
        let position = self.position(key)?;
        self.remove_at(position).map(|(_, item)| item)
    }

    /// Removes the first entry whose item satisfies `predicate`.
    pub fn remove_where<F>(&mut self, predicate: F) -> Option<(String, T)>
    where
        F: Fn(&T) -> bool,
    {
        let position = self.entries.iter().position(|entry| predicate(&entry.item))?;
        self.remove_at(position)
    }

    /// Removes every entry, returning the items in insertion order.
    pub fn drain(&mut self) -> Vec<T> {
        self.index.clear();
        self.entries.drain(..).map(|entry| entry.item).collect()
    }

    /// Applies `map` to every stored item in place.
    pub(crate) fn map_in_place<F>(&mut self, mut map: F)
    where
        F: FnMut(&mut T),
    {
        for entry in &mut self.entries {
            map(&mut entry.item);
        }
    }

    /// Rebuilds the subset with items converted by `map`, keeping keys and sequence.
    pub(crate) fn map_into<U, F>(&self, mut map: F) -> Subset<U>
    where
        F: FnMut(&T) -> U,
    {
        Subset {
            entries: self
                .entries
                .iter()
                .map(|entry| Entry {
                    key: entry.key.clone(),
                    item: map(&entry.item),
                })
                .collect(),
            index: self.index.clone(),
            sequence: self.sequence,
        }
    }

    /// Removes the entry at `position` and reindexes the entries behind it.
    fn remove_at(&mut self, position: usize) -> Option<(String, T)> {
        if position >= self.entries.len() {
            return None;
        }
        let entry = self.entries.remove(position);
        self.index.remove(&entry.key);
        for (offset, later) in self.entries.iter().enumerate().skip(position) {
            self.index.insert(later.key.clone(), offset);
        }
        Some((entry.key, entry.item))
    }

    /// Returns `tag` when unused, otherwise the next free derived key.
    fn derive_key(&mut self, tag: &str) -> String {
        if !self.contains_key(tag) {
            return tag.to_string();
        }
        loop {
            self.sequence += 1;
            let candidate = format!("{tag} {}", self.sequence);
            if !self.contains_key(&candidate) {
                return candidate;
            }
        }
    }
}

impl<T: PartialEq> Subset<T> {
    /// Returns true when `item` is stored in the subset.
    #[must_use]
    pub fn contains(&self, item: &T) -> bool {
        self.entries.iter().any(|entry| entry.item == *item)
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::Subset;

    #[test]
    fn duplicate_tags_receive_derived_keys() {
        let mut subset = Subset::new();
        assert_eq!(subset.insert("item", 1), "item");
        assert_eq!(subset.insert("item", 2), "item 1");
        assert_eq!(subset.insert("item", 3), "item 2");
        assert_eq!(subset.get("item"), Some(&1));
        assert_eq!(subset.get("item 2"), Some(&3));
        assert_eq!(subset.len(), 3);
    }

    #[test]
    fn derived_keys_are_not_reused_after_removal() {
        let mut subset = Subset::new();
        subset.insert("a", 1);
        subset.insert("a", 2);
        assert_eq!(subset.remove("a 1"), Some(2));
        assert_eq!(subset.insert("a", 3), "a 2");
    }

    #[test]
    fn removal_keeps_order_and_index_consistent() {
        let mut subset = Subset::new();
        subset.insert("a", 1);
        subset.insert("b", 2);
        subset.insert("c", 3);
        assert_eq!(subset.remove("a"), Some(1));
        assert_eq!(subset.position("b"), Some(0));
        assert_eq!(subset.position("c"), Some(1));
        assert_eq!(subset.iter().copied().collect::<Vec<_>>(), vec![2, 3]);
    }

    #[test]
    fn replace_keeps_position_of_existing_key() {
        let mut subset = Subset::new();
        subset.insert("a", 1);
        subset.insert("b", 2);
        assert_eq!(subset.replace("a", 10), Some(1));
        assert_eq!(subset.first(), Some(&10));
        assert_eq!(subset.replace("z", 26), None);
        assert_eq!(subset.key_at(2), Some("z"));
    }

    #[test]
    fn drain_empties_the_subset() {
        let mut subset = Subset::new();
        subset.insert("a", 1);
        subset.insert("b", 2);
        assert_eq!(subset.drain(), vec![1, 2]);
        assert!(subset.is_empty());
        assert!(!subset.contains_key("a"));
    }
}
