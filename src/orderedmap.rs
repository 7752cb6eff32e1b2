//! Insertion-ordered persistent map layered over the CHAMP hash map.
//!
//! [`PersistentOrderedMap`] remembers the order in which keys were first
//! inserted: every entry carries links to its predecessor and successor
//! keys, and the map tracks the first and last key. Iteration follows the
//! links, so it is insertion-ordered at an extra O(log32 N) hop per step.
//!
//! Re-inserting an existing key updates its value in place within the
//! sequence; removing and re-adding a key moves it to the end.
//!
//! # Examples
//!
//! ```rust
//! use canopy::PersistentOrderedMap;
//!
//! let map = PersistentOrderedMap::new()
//!     .insert("b", 2)
//!     .insert("a", 1)
//!     .insert("c", 3);
//!
//! let keys: Vec<&&str> = map.keys().collect();
//! assert_eq!(keys, vec![&"b", &"a", &"c"]);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::hashmap::{PersistentHashMap, TransientHashMap};
use crate::traits::{Collection, PersistentMap, ToPersistent, ToTransient};

// =============================================================================
// Entry links
// =============================================================================

/// A value together with its neighbors in insertion order.
#[derive(Clone)]
struct Links<K, V> {
    value: V,
    previous: Option<K>,
    next: Option<K>,
}

// =============================================================================
// PersistentOrderedMap Definition
// =============================================================================

/// A persistent map iterating in key insertion order.
///
/// Backed by a CHAMP hash map of linked entries plus the first and last
/// keys of the sequence; all structural-sharing properties of the hash
/// map carry over.
#[derive(Clone)]
pub struct PersistentOrderedMap<K, V> {
    first: Option<K>,
    last: Option<K>,
    entries: PersistentHashMap<K, Links<K, V>>,
}

impl<K, V> PersistentOrderedMap<K, V> {
    /// Creates a new empty map.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            first: None,
            last: None,
            entries: PersistentHashMap::new(),
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentOrderedMap<K, V> {
    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|links| &links.value)
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.contains_key(key)
    }

    /// Inserts a key-value pair.
    ///
    /// A new key is appended at the end of the sequence; an existing key
    /// keeps its position and only the value changes.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        if let Some(links) = self.entries.get(&key) {
            let updated = Links {
                value,
                previous: links.previous.clone(),
                next: links.next.clone(),
            };
            return Self {
                first: self.first.clone(),
                last: self.last.clone(),
                entries: self.entries.insert(key, updated),
            };
        }

        let mut entries = self.entries.clone();
        if let Some(last_key) = &self.last {
            let tail = entries.get(last_key).expect("last key is linked");
            let relinked = Links {
                value: tail.value.clone(),
                previous: tail.previous.clone(),
                next: Some(key.clone()),
            };
            entries = entries.insert(last_key.clone(), relinked);
        }
        entries = entries.insert(
            key.clone(),
            Links {
                value,
                previous: self.last.clone(),
                next: None,
            },
        );
        Self {
            first: self.first.clone().or_else(|| Some(key.clone())),
            last: Some(key),
            entries,
        }
    }

    /// Removes a key, splicing its neighbors together.
    ///
    /// An absent key returns the receiver unchanged.
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(links) = self.entries.get(key) else {
            return self.clone();
        };
        let previous = links.previous.clone();
        let next = links.next.clone();

        let mut entries = self.entries.remove(key);
        let mut first = self.first.clone();
        let mut last = self.last.clone();

        match &previous {
            Some(previous_key) => {
                let neighbor = entries.get::<K>(previous_key).expect("previous key is linked");
                let relinked = Links {
                    value: neighbor.value.clone(),
                    previous: neighbor.previous.clone(),
                    next: next.clone(),
                };
                entries = entries.insert(previous_key.clone(), relinked);
            }
            None => first = next.clone(),
        }
        match &next {
            Some(next_key) => {
                let neighbor = entries.get::<K>(next_key).expect("next key is linked");
                let relinked = Links {
                    value: neighbor.value.clone(),
                    previous: previous.clone(),
                    next: neighbor.next.clone(),
                };
                entries = entries.insert(next_key.clone(), relinked);
            }
            None => last = previous,
        }

        Self {
            first,
            last,
            entries,
        }
    }

    /// Returns an empty map, or the receiver if already empty.
    #[must_use]
    pub fn clear(&self) -> Self {
        if self.is_empty() { self.clone() } else { Self::new() }
    }

    /// Returns the first-inserted entry. `None` signals the empty map.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        let key = self.first.as_ref()?;
        self.entries.get(key).map(|links| (key, &links.value))
    }

    /// Returns the last-inserted entry, or `None` for the empty map.
    #[must_use]
    pub fn last(&self) -> Option<(&K, &V)> {
        let key = self.last.as_ref()?;
        self.entries.get(key).map(|links| (key, &links.value))
    }

    /// Returns a map without its first-inserted entry, or the receiver
    /// if empty.
    #[must_use]
    pub fn remove_first(&self) -> Self {
        match self.first.clone() {
            Some(key) => self.remove(&key),
            None => self.clone(),
        }
    }

    /// Returns a map without its last-inserted entry, or the receiver if
    /// empty.
    #[must_use]
    pub fn remove_last(&self) -> Self {
        match self.last.clone() {
            Some(key) => self.remove(&key),
            None => self.clone(),
        }
    }

    /// Returns an iterator over key-value pairs in insertion order.
    #[must_use]
    pub fn iter(&self) -> PersistentOrderedMapIterator<'_, K, V> {
        PersistentOrderedMapIterator {
            entries: &self.entries,
            cursor: self.first.as_ref(),
            remaining: self.len(),
        }
    }

    /// Returns an iterator over keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the entries of a [`PersistentOrderedMap`] in
/// insertion order.
pub struct PersistentOrderedMapIterator<'a, K, V> {
    entries: &'a PersistentHashMap<K, Links<K, V>>,
    cursor: Option<&'a K>,
    remaining: usize,
}

impl<'a, K: Clone + Hash + Eq, V: Clone> Iterator for PersistentOrderedMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.cursor.take()?;
        let links = self.entries.get(key)?;
        self.cursor = links.next.as_ref();
        self.remaining -= 1;
        Some((key, &links.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K: Clone + Hash + Eq, V: Clone> ExactSizeIterator for PersistentOrderedMapIterator<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentOrderedMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for PersistentOrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (key, value) in iter {
            map = map.insert(key, value);
        }
        map
    }
}

impl<'a, K: Clone + Hash + Eq, V: Clone> IntoIterator for &'a PersistentOrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentOrderedMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone + Hash + Eq, V: Clone + PartialEq> PartialEq for PersistentOrderedMap<K, V> {
    /// Map-content equality; the insertion sequence is not compared.
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Clone + Hash + Eq, V: Clone + Eq> Eq for PersistentOrderedMap<K, V> {}

impl<K: Clone + Hash + Eq + fmt::Debug, V: Clone + fmt::Debug> fmt::Debug
    for PersistentOrderedMap<K, V>
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Capability Trait Implementations
// =============================================================================

impl<K, V> Collection for PersistentOrderedMap<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentMap<K, V> for PersistentOrderedMap<K, V> {
    fn insert(&self, key: K, value: V) -> Self {
        Self::insert(self, key, value)
    }

    fn remove(&self, key: &K) -> Self {
        Self::remove(self, key)
    }

    fn clear(&self) -> Self {
        Self::clear(self)
    }

    fn get(&self, key: &K) -> Option<&V> {
        Self::get(self, key)
    }

    fn insert_all<I: IntoIterator<Item = (K, V)>>(&self, entries: I) -> Self {
        let mut map = self.clone();
        let mut touched = false;
        for (key, value) in entries {
            map = map.insert(key, value);
            touched = true;
        }
        if touched { map } else { self.clone() }
    }

    fn remove_all<'a, I: IntoIterator<Item = &'a K>>(&self, keys: I) -> Self
    where
        K: 'a,
    {
        let mut map = self.clone();
        for key in keys {
            map = map.remove(key);
        }
        map
    }

    fn retain_keys<'a, I: IntoIterator<Item = &'a K>>(&self, keys: I) -> Self
    where
        K: 'a,
    {
        let kept: std::collections::HashSet<&K> = keys.into_iter().collect();
        let doomed: Vec<K> = self
            .iter()
            .filter(|(key, _)| !kept.contains(key))
            .map(|(key, _)| key.clone())
            .collect();
        let mut map = self.clone();
        for key in &doomed {
            map = map.remove(key);
        }
        map
    }
}

impl<K: Clone + Hash + Eq, V: Clone> ToTransient for PersistentOrderedMap<K, V> {
    type Transient = TransientOrderedMap<K, V>;

    fn transient(&self) -> TransientOrderedMap<K, V> {
        TransientOrderedMap {
            first: self.first.clone(),
            last: self.last.clone(),
            entries: self.entries.transient(),
            _marker: PhantomData,
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentOrderedMap<K, V> {
    /// Returns a transient working copy sharing this map's trie.
    #[must_use]
    pub fn transient(&self) -> TransientOrderedMap<K, V> {
        ToTransient::transient(self)
    }
}

// =============================================================================
// TransientOrderedMap Definition
// =============================================================================

/// A transient insertion-ordered map for batch updates.
pub struct TransientOrderedMap<K, V> {
    first: Option<K>,
    last: Option<K>,
    entries: TransientHashMap<K, Links<K, V>>,
    /// Marker to keep transients off other threads.
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientOrderedMap<String, i32>: Send, Sync);

impl<K, V> TransientOrderedMap<K, V> {
    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> TransientOrderedMap<K, V> {
    /// Creates a new empty transient map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            first: None,
            last: None,
            entries: TransientHashMap::new(),
            _marker: PhantomData,
        }
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.get(key).map(|links| &links.value)
    }

    /// Inserts a key-value pair, returning the previously bound value if
    /// any. New keys append at the end of the sequence.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let existing = self
            .entries
            .get(&key)
            .map(|links| (links.previous.clone(), links.next.clone()));
        if let Some((previous, next)) = existing {
            return self
                .entries
                .insert(
                    key,
                    Links {
                        value,
                        previous,
                        next,
                    },
                )
                .map(|links| links.value);
        }

        if let Some(last_key) = self.last.clone() {
            let relinked = self.entries.get(&last_key).map(|tail| Links {
                value: tail.value.clone(),
                previous: tail.previous.clone(),
                next: Some(key.clone()),
            });
            if let Some(relinked) = relinked {
                self.entries.insert(last_key, relinked);
            }
        }
        self.entries.insert(
            key.clone(),
            Links {
                value,
                previous: self.last.clone(),
                next: None,
            },
        );
        if self.first.is_none() {
            self.first = Some(key.clone());
        }
        self.last = Some(key);
        None
    }

    /// Removes a key, returning the value that was bound to it if any.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let (previous, next) = self
            .entries
            .get(key)
            .map(|links| (links.previous.clone(), links.next.clone()))?;
        let removed = self.entries.remove(key)?;

        match &previous {
            Some(previous_key) => {
                let relinked = self.entries.get::<K>(previous_key).map(|neighbor| Links {
                    value: neighbor.value.clone(),
                    previous: neighbor.previous.clone(),
                    next: next.clone(),
                });
                if let Some(relinked) = relinked {
                    self.entries.insert(previous_key.clone(), relinked);
                }
            }
            None => self.first = next.clone(),
        }
        match &next {
            Some(next_key) => {
                let relinked = self.entries.get::<K>(next_key).map(|neighbor| Links {
                    value: neighbor.value.clone(),
                    previous: previous.clone(),
                    next: neighbor.next.clone(),
                });
                if let Some(relinked) = relinked {
                    self.entries.insert(next_key.clone(), relinked);
                }
            }
            None => self.last = previous,
        }

        Some(removed.value)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.first = None;
        self.last = None;
        self.entries.clear();
    }

    /// Publishes the current state as a persistent snapshot.
    pub fn persistent(&mut self) -> PersistentOrderedMap<K, V> {
        ToPersistent::persistent(self)
    }
}

impl<K: Clone + Hash + Eq, V: Clone> ToPersistent for TransientOrderedMap<K, V> {
    type Persistent = PersistentOrderedMap<K, V>;

    fn persistent(&mut self) -> PersistentOrderedMap<K, V> {
        PersistentOrderedMap {
            first: self.first.clone(),
            last: self.last.clone(),
            entries: self.entries.persistent(),
        }
    }
}

impl<K, V> Collection for TransientOrderedMap<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Default for TransientOrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Extend<(K, V)> for TransientOrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, entries: I) {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
mod serde_support {
    use super::{PersistentOrderedMap, TransientOrderedMap};
    use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use serde::ser::{Serialize, SerializeMap, Serializer};
    use std::hash::Hash;
    use std::marker::PhantomData;

    /// Serialized in insertion order, so the sequence survives a
    /// round-trip.
    impl<K, V> Serialize for PersistentOrderedMap<K, V>
    where
        K: Clone + Hash + Eq + Serialize,
        V: Clone + Serialize,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (key, value) in self {
                map.serialize_entry(key, value)?;
            }
            map.end()
        }
    }

    struct PersistentOrderedMapVisitor<K, V>(PhantomData<(K, V)>);

    impl<'de, K, V> Visitor<'de> for PersistentOrderedMapVisitor<K, V>
    where
        K: Clone + Hash + Eq + Deserialize<'de>,
        V: Clone + Deserialize<'de>,
    {
        type Value = PersistentOrderedMap<K, V>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a map in insertion order")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut transient = TransientOrderedMap::new();
            while let Some((key, value)) = access.next_entry()? {
                transient.insert(key, value);
            }
            Ok(transient.persistent())
        }
    }

    impl<'de, K, V> Deserialize<'de> for PersistentOrderedMap<K, V>
    where
        K: Clone + Hash + Eq + Deserialize<'de>,
        V: Clone + Deserialize<'de>,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(PersistentOrderedMapVisitor(PhantomData))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_iteration_follows_insertion_order() {
        let map = PersistentOrderedMap::new()
            .insert("b", 2)
            .insert("a", 1)
            .insert("c", 3);
        let keys: Vec<&str> = map.keys().copied().collect();
        assert_eq!(keys, vec!["b", "a", "c"]);
    }

    #[rstest]
    fn test_reinsert_keeps_position() {
        let map = PersistentOrderedMap::new()
            .insert("b", 2)
            .insert("a", 1)
            .insert("b", 20);
        let entries: Vec<(&str, i32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(entries, vec![("b", 20), ("a", 1)]);
    }

    #[rstest]
    fn test_remove_splices_neighbors() {
        let map = PersistentOrderedMap::new()
            .insert(1, 'a')
            .insert(2, 'b')
            .insert(3, 'c');
        let spliced = map.remove(&2);
        let keys: Vec<i32> = spliced.keys().copied().collect();
        assert_eq!(keys, vec![1, 3]);
        assert_eq!(map.len(), 3);
    }

    #[rstest]
    fn test_first_last_and_sequence_removal() {
        let map = PersistentOrderedMap::new()
            .insert(1, 'a')
            .insert(2, 'b')
            .insert(3, 'c');
        assert_eq!(map.first(), Some((&1, &'a')));
        assert_eq!(map.last(), Some((&3, &'c')));

        let without_first = map.remove_first();
        assert_eq!(without_first.first(), Some((&2, &'b')));

        let without_last = map.remove_last();
        assert_eq!(without_last.last(), Some((&2, &'b')));
    }

    #[rstest]
    fn test_empty_map_sequence_accessors() {
        let map: PersistentOrderedMap<i32, char> = PersistentOrderedMap::new();
        assert_eq!(map.first(), None);
        assert_eq!(map.last(), None);
        assert!(map.remove_first().is_empty());
    }

    #[rstest]
    fn test_transient_preserves_order() {
        let map: PersistentOrderedMap<i32, i32> = (0..50).map(|i| (i, i)).collect();
        let mut transient = map.transient();
        transient.insert(50, 50);
        transient.remove(&0);
        let updated = transient.persistent();

        let keys: Vec<i32> = updated.keys().copied().collect();
        let expected: Vec<i32> = (1..=50).collect();
        assert_eq!(keys, expected);

        // The snapshot taken before the batch still starts at 0.
        assert_eq!(map.first(), Some((&0, &0)));
    }

    #[rstest]
    fn test_removing_only_entry_clears_endpoints() {
        let map = PersistentOrderedMap::new().insert("solo", 1);
        let empty = map.remove("solo");
        assert!(empty.is_empty());
        assert_eq!(empty.first(), None);
        assert_eq!(empty.last(), None);
    }
}
