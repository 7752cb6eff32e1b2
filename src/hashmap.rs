//! Persistent and transient hash maps backed by a CHAMP trie.
//!
//! # Overview
//!
//! [`PersistentHashMap`] is an immutable hash map: every update returns a
//! new map sharing all unchanged substructure with the original. Its
//! sibling [`TransientHashMap`] is a destructively-mutable working copy
//! for batch updates; conversion between the two is O(1) in both
//! directions.
//!
//! - O(log32 N) `get`, `insert`, `remove` (effectively constant: the trie
//!   is at most 13 levels deep for a 64-bit hash)
//! - O(1) `len` and `is_empty`
//! - O(1) `transient` / `persistent`
//!
//! Keys are hashed with a process-lifetime random salt by default, so
//! adversarially chosen keys cannot cluster reproducibly across runs. The
//! `fxhash` feature swaps in a deterministic hasher.
//!
//! # Examples
//!
//! ```rust
//! use canopy::PersistentHashMap;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));
//! assert_eq!(updated.get("one"), Some(&100));
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::ReferenceCounter;
use crate::champ::edit::{Change, EditOwner};
use crate::champ::iter::Cursor;
use crate::champ::node::{Node, NodeRef};
use crate::champ::hash_key;
use crate::traits::{Collection, PersistentMap, ToPersistent, ToTransient};

// =============================================================================
// PersistentHashMap Definition
// =============================================================================

/// A persistent (immutable) hash map backed by a CHAMP trie.
///
/// `PersistentHashMap` is an immutable value object; cloning is O(1) and
/// updates share unchanged substructure with the original.
///
/// # Time Complexity
///
/// | Operation      | Complexity |
/// |----------------|------------|
/// | `new`          | O(1)       |
/// | `get`          | O(log32 N) |
/// | `insert`       | O(log32 N) |
/// | `remove`       | O(log32 N) |
/// | `len`          | O(1)       |
/// | `transient`    | O(1)       |
///
/// # Examples
///
/// ```rust
/// use canopy::PersistentHashMap;
///
/// let map = PersistentHashMap::singleton("key".to_string(), 42);
/// assert_eq!(map.get("key"), Some(&42));
/// ```
#[derive(Clone)]
pub struct PersistentHashMap<K, V> {
    /// Root node of the trie.
    root: NodeRef<K, V>,
    /// Number of entries.
    length: usize,
}

impl<K, V> PersistentHashMap<K, V> {
    /// Creates a new empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::PersistentHashMap;
    ///
    /// let map: PersistentHashMap<String, i32> = PersistentHashMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: ReferenceCounter::new(Node::empty()),
            length: 0,
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> &NodeRef<K, V> {
        &self.root
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentHashMap<K, V> {
    /// Creates a map containing a single key-value pair.
    #[inline]
    #[must_use]
    pub fn singleton(key: K, value: V) -> Self {
        Self::new().insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// The key may be any borrowed form of the map's key type, but `Hash`
    /// and `Eq` on the borrowed form must match those for the key type.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new().insert("hello".to_string(), 42);
    ///
    /// // Can use &str to look up String keys
    /// assert_eq!(map.get("hello"), Some(&42));
    /// assert_eq!(map.get("world"), None);
    /// ```
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.root.find(key, hash_key(key), 0)
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contains the key, the value is replaced.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::PersistentHashMap;
    ///
    /// let map1 = PersistentHashMap::new().insert("key".to_string(), 1);
    /// let map2 = map1.insert("key".to_string(), 2);
    ///
    /// assert_eq!(map1.get("key"), Some(&1)); // Original unchanged
    /// assert_eq!(map2.get("key"), Some(&2)); // New version
    /// ```
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let hash = hash_key(&key);
        let mut root = self.root.clone();
        let mut change = Change::new();
        Node::insert(&mut root, None, key, value, hash, 0, &mut change, &|key| {
            hash_key(key)
        });

        let length = if change.is_replacement() {
            self.length
        } else {
            self.length + 1
        };
        Self { root, length }
    }

    /// Removes a key from the map.
    ///
    /// If the key is absent, the receiver is returned unchanged (same
    /// root), which callers may use for cheap change detection.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::PersistentHashMap;
    ///
    /// let map = PersistentHashMap::new()
    ///     .insert("a".to_string(), 1)
    ///     .insert("b".to_string(), 2);
    /// let removed = map.remove("a");
    ///
    /// assert_eq!(map.len(), 2);     // Original unchanged
    /// assert_eq!(removed.len(), 1);
    /// assert_eq!(removed.get("a"), None);
    /// ```
    #[must_use]
    pub fn remove<Q>(&self, key: &Q) -> Self
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = hash_key(key);
        if self.root.find(key, hash, 0).is_none() {
            return self.clone();
        }

        let mut root = self.root.clone();
        let mut change = Change::new();
        Node::remove(&mut root, None, key, hash, 0, &mut change);
        debug_assert!(change.is_modified());
        Self {
            root,
            length: self.length - 1,
        }
    }

    /// Returns an empty map, or the receiver if already empty.
    #[must_use]
    pub fn clear(&self) -> Self {
        if self.is_empty() { self.clone() } else { Self::new() }
    }

    /// Returns a map with every binding of `entries` applied, later
    /// bindings overwriting earlier ones.
    ///
    /// Batched through a transient working copy; an empty iterator
    /// returns the receiver unchanged.
    #[must_use]
    pub fn insert_all<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut transient = self.transient();
        let mut touched = false;
        for (key, value) in entries {
            transient.insert(key, value);
            touched = true;
        }
        if touched {
            transient.persistent()
        } else {
            self.clone()
        }
    }

    /// Returns a map with every key of `keys` unbound.
    ///
    /// Returns the receiver unchanged when none of the keys were present.
    #[must_use]
    pub fn remove_all<'a, I>(&self, keys: I) -> Self
    where
        K: 'a,
        I: IntoIterator<Item = &'a K>,
    {
        let mut transient = self.transient();
        let mut touched = false;
        for key in keys {
            touched |= transient.remove(key).is_some();
        }
        if touched {
            transient.persistent()
        } else {
            self.clone()
        }
    }

    /// Returns a map retaining only the bindings whose key is in `keys`.
    ///
    /// Returns the receiver unchanged when every binding survives.
    #[must_use]
    pub fn retain_keys<'a, I>(&self, keys: I) -> Self
    where
        K: 'a,
        I: IntoIterator<Item = &'a K>,
    {
        let kept: std::collections::HashSet<&K> = keys.into_iter().collect();
        let doomed: Vec<K> = self
            .iter()
            .filter(|(key, _)| !kept.contains(key))
            .map(|(key, _)| key.clone())
            .collect();
        self.remove_all(doomed.iter())
    }

    /// Merges two maps, with bindings from `other` taking precedence on
    /// key conflicts.
    #[must_use]
    pub fn merge(&self, other: &Self) -> Self {
        self.insert_all(other.iter().map(|(key, value)| (key.clone(), value.clone())))
    }

    /// Returns an iterator over key-value pairs.
    ///
    /// CHAMP guarantees no particular key order; a node's inline entries
    /// are visited before its subtrees.
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        PersistentHashMapIterator {
            cursor: Cursor::new(&self.root, self.length),
        }
    }

    /// Returns an iterator over keys.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over values.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, value)| value)
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over key-value pairs of a [`PersistentHashMap`].
pub struct PersistentHashMapIterator<'a, K, V> {
    cursor: Cursor<'a, K, V>,
}

impl<'a, K, V> Iterator for PersistentHashMapIterator<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.cursor.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.cursor.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIterator<'_, K, V> {
    fn len(&self) -> usize {
        self.cursor.len()
    }
}

/// An owning iterator over key-value pairs of a [`PersistentHashMap`].
pub struct PersistentHashMapIntoIterator<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for PersistentHashMapIntoIterator<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> ExactSizeIterator for PersistentHashMapIntoIterator<K, V> {
    fn len(&self) -> usize {
        self.entries.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for PersistentHashMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> FromIterator<(K, V)> for PersistentHashMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut transient = TransientHashMap::new();
        for (key, value) in iter {
            transient.insert(key, value);
        }
        transient.persistent()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> IntoIterator for PersistentHashMap<K, V> {
    type Item = (K, V);
    type IntoIter = PersistentHashMapIntoIterator<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let entries: Vec<(K, V)> = self
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();
        PersistentHashMapIntoIterator {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K: Clone + Hash + Eq, V: Clone> IntoIterator for &'a PersistentHashMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = PersistentHashMapIterator<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Clone + Hash + Eq, V: Clone + PartialEq> PartialEq for PersistentHashMap<K, V> {
    /// Content equality, independent of how either trie was built.
    fn eq(&self, other: &Self) -> bool {
        if self.length != other.length {
            return false;
        }
        self.iter()
            .all(|(key, value)| other.get(key) == Some(value))
    }
}

impl<K: Clone + Hash + Eq, V: Clone + Eq> Eq for PersistentHashMap<K, V> {}

impl<K: Clone + Hash + Eq + fmt::Debug, V: Clone + fmt::Debug> fmt::Debug
    for PersistentHashMap<K, V>
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Capability Trait Implementations
// =============================================================================

impl<K, V> Collection for PersistentHashMap<K, V> {
    fn len(&self) -> usize {
        self.length
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentMap<K, V> for PersistentHashMap<K, V> {
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
        Self::insert_all(self, entries)
    }

    fn remove_all<'a, I: IntoIterator<Item = &'a K>>(&self, keys: I) -> Self
    where
        K: 'a,
    {
        Self::remove_all(self, keys)
    }

    fn retain_keys<'a, I: IntoIterator<Item = &'a K>>(&self, keys: I) -> Self
    where
        K: 'a,
    {
        Self::retain_keys(self, keys)
    }
}

impl<K: Clone + Hash + Eq, V: Clone> ToTransient for PersistentHashMap<K, V> {
    type Transient = TransientHashMap<K, V>;

    fn transient(&self) -> TransientHashMap<K, V> {
        TransientHashMap {
            root: self.root.clone(),
            length: self.length,
            owner: None,
            _marker: PhantomData,
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> PersistentHashMap<K, V> {
    /// Returns a transient working copy sharing this map's root.
    ///
    /// O(1); the first write acquires an edit owner and copies only the
    /// path it touches.
    #[must_use]
    pub fn transient(&self) -> TransientHashMap<K, V> {
        ToTransient::transient(self)
    }
}

// =============================================================================
// TransientHashMap Definition
// =============================================================================

/// A transient (destructively-mutable) hash map for efficient batch
/// updates.
///
/// A transient shares its node tree with the snapshot it was thawed from
/// until a write diverges them: nodes allocated during this edit session
/// are revised in place, everything else is copied on first touch. Calling
/// [`persistent`](Self::persistent) publishes the current tree and
/// discards the edit owner, so the published snapshot can never again be
/// written through.
///
/// Transients are intentionally neither `Send` nor `Sync`, and not
/// `Clone`: a single writer owns the edit session.
///
/// # Examples
///
/// ```rust
/// use canopy::{PersistentHashMap, TransientHashMap};
///
/// let mut transient = TransientHashMap::new();
/// transient.insert("one".to_string(), 1);
/// transient.insert("two".to_string(), 2);
///
/// let map: PersistentHashMap<String, i32> = transient.persistent();
/// assert_eq!(map.len(), 2);
/// ```
pub struct TransientHashMap<K, V> {
    root: NodeRef<K, V>,
    length: usize,
    /// Owner of the current edit session; `None` until the first write
    /// after creation or freezing.
    owner: Option<EditOwner>,
    /// Marker to keep transients off other threads.
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientHashMap<String, i32>: Send, Sync);

impl<K, V> TransientHashMap<K, V> {
    /// Returns the number of entries in the map.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl<K: Clone + Hash + Eq, V: Clone> TransientHashMap<K, V> {
    /// Creates a new empty transient map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: ReferenceCounter::new(Node::empty()),
            length: 0,
            owner: None,
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
        self.root.find(key, hash_key(key), 0)
    }

    /// Returns `true` if the map contains a value for the specified key.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Inserts a key-value pair, returning the previously bound value if
    /// any.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let hash = hash_key(&key);
        let owner = self.owner.get_or_insert_with(EditOwner::new).clone();
        let mut change = Change::new();
        Node::insert(
            &mut self.root,
            Some(&owner),
            key,
            value,
            hash,
            0,
            &mut change,
            &|key| hash_key(key),
        );
        if !change.is_replacement() {
            self.length += 1;
        }
        change.into_previous()
    }

    /// Removes a key, returning the value that was bound to it if any.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = hash_key(key);
        if self.root.find(key, hash, 0).is_none() {
            return None;
        }

        let owner = self.owner.get_or_insert_with(EditOwner::new).clone();
        let mut change = Change::new();
        Node::remove(&mut self.root, Some(&owner), key, hash, 0, &mut change);
        debug_assert!(change.is_modified());
        self.length -= 1;
        change.into_previous()
    }

    /// Retains only the entries for which `keep` returns `true`.
    ///
    /// This is the guarded-removal facility of the traversal cursor: the
    /// predicate observes each entry, and the doomed keys are removed
    /// after the walk, never through the live cursor itself.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &V) -> bool,
    {
        let doomed: Vec<K> = self
            .iter()
            .filter(|&(key, value)| !keep(key, value))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &doomed {
            self.remove(key);
        }
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.root = ReferenceCounter::new(Node::empty());
        self.length = 0;
    }

    /// Returns an iterator over key-value pairs.
    #[must_use]
    pub fn iter(&self) -> PersistentHashMapIterator<'_, K, V> {
        PersistentHashMapIterator {
            cursor: Cursor::new(&self.root, self.length),
        }
    }

    /// Publishes the current tree as a persistent snapshot.
    ///
    /// O(1). The edit owner is discarded: nodes reachable from the
    /// snapshot can never again be revised in place, and further writes
    /// on this transient acquire a fresh owner.
    pub fn persistent(&mut self) -> PersistentHashMap<K, V> {
        ToPersistent::persistent(self)
    }
}

impl<K: Clone + Hash + Eq, V: Clone> ToPersistent for TransientHashMap<K, V> {
    type Persistent = PersistentHashMap<K, V>;

    fn persistent(&mut self) -> PersistentHashMap<K, V> {
        self.owner = None;
        PersistentHashMap {
            root: self.root.clone(),
            length: self.length,
        }
    }
}

impl<K, V> Collection for TransientHashMap<K, V> {
    fn len(&self) -> usize {
        self.length
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Default for TransientHashMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Hash + Eq, V: Clone> Extend<(K, V)> for TransientHashMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, entries: I) {
        for (key, value) in entries {
            self.insert(key, value);
        }
    }
}

impl<K: Clone + Hash + Eq + fmt::Debug, V: Clone + fmt::Debug> fmt::Debug
    for TransientHashMap<K, V>
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
mod serde_support {
    use super::{PersistentHashMap, TransientHashMap};
    use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
    use serde::ser::{Serialize, SerializeMap, Serializer};
    use std::hash::Hash;
    use std::marker::PhantomData;

    /// Logical serialization: the flat entry sequence, never the trie
    /// shape.
    impl<K, V> Serialize for PersistentHashMap<K, V>
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

    struct PersistentHashMapVisitor<K, V>(PhantomData<(K, V)>);

    impl<'de, K, V> Visitor<'de> for PersistentHashMapVisitor<K, V>
    where
        K: Clone + Hash + Eq + Deserialize<'de>,
        V: Clone + Deserialize<'de>,
    {
        type Value = PersistentHashMap<K, V>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a map")
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut transient = TransientHashMap::new();
            while let Some((key, value)) = access.next_entry()? {
                transient.insert(key, value);
            }
            Ok(transient.persistent())
        }
    }

    /// Reconstructed by bulk insertion through a transient.
    impl<'de, K, V> Deserialize<'de> for PersistentHashMap<K, V>
    where
        K: Clone + Hash + Eq + Deserialize<'de>,
        V: Clone + Deserialize<'de>,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_map(PersistentHashMapVisitor(PhantomData))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
