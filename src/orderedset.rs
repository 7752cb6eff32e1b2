//! Insertion-ordered persistent set over the ordered map.
//!
//! [`PersistentOrderedSet`] wraps [`PersistentOrderedMap`] with unit
//! values: elements iterate in the order they were first inserted, and
//! the sequence endpoints support `remove_first`/`remove_last`.
//!
//! # Examples
//!
//! ```rust
//! use canopy::PersistentOrderedSet;
//!
//! let set = PersistentOrderedSet::new().insert("b").insert("a").insert("c");
//! let elements: Vec<&&str> = set.iter().collect();
//! assert_eq!(elements, vec![&"b", &"a", &"c"]);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::orderedmap::{PersistentOrderedMap, PersistentOrderedMapIterator, TransientOrderedMap};
use crate::traits::{Collection, PersistentSet, ToPersistent, ToTransient};

// =============================================================================
// PersistentOrderedSet Definition
// =============================================================================

/// A persistent set iterating in element insertion order.
#[derive(Clone)]
pub struct PersistentOrderedSet<T> {
    inner: PersistentOrderedMap<T, ()>,
}

impl<T> PersistentOrderedSet<T> {
    /// Creates a new empty set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: PersistentOrderedMap::new(),
        }
    }

    /// Returns the number of elements in the set.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Clone + Hash + Eq> PersistentOrderedSet<T> {
    /// Returns `true` if the set contains the specified element.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(element)
    }

    /// Returns a set with `element` added at the end of the sequence.
    ///
    /// An element already present keeps its position.
    #[must_use]
    pub fn insert(&self, element: T) -> Self {
        if self.contains(&element) {
            return self.clone();
        }
        Self {
            inner: self.inner.insert(element, ()),
        }
    }

    /// Returns a set with `element` removed.
    #[must_use]
    pub fn remove<Q>(&self, element: &Q) -> Self
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Self {
            inner: self.inner.remove(element),
        }
    }

    /// Returns an empty set, or the receiver if already empty.
    #[must_use]
    pub fn clear(&self) -> Self {
        Self {
            inner: self.inner.clear(),
        }
    }

    /// Returns the first-inserted element. `None` signals the empty set.
    #[must_use]
    pub fn first(&self) -> Option<&T> {
        self.inner.first().map(|(element, _)| element)
    }

    /// Returns the last-inserted element, or `None` for the empty set.
    #[must_use]
    pub fn last(&self) -> Option<&T> {
        self.inner.last().map(|(element, _)| element)
    }

    /// Returns a set without its first-inserted element.
    #[must_use]
    pub fn remove_first(&self) -> Self {
        Self {
            inner: self.inner.remove_first(),
        }
    }

    /// Returns a set without its last-inserted element.
    #[must_use]
    pub fn remove_last(&self) -> Self {
        Self {
            inner: self.inner.remove_last(),
        }
    }

    /// Returns an iterator over the elements in insertion order.
    #[must_use]
    pub fn iter(&self) -> PersistentOrderedSetIterator<'_, T> {
        PersistentOrderedSetIterator {
            inner: self.inner.iter(),
        }
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the elements of a [`PersistentOrderedSet`] in
/// insertion order.
pub struct PersistentOrderedSetIterator<'a, T> {
    inner: PersistentOrderedMapIterator<'a, T, ()>,
}

impl<'a, T: Clone + Hash + Eq> Iterator for PersistentOrderedSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, _)| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T: Clone + Hash + Eq> ExactSizeIterator for PersistentOrderedSetIterator<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentOrderedSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> FromIterator<T> for PersistentOrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        for element in iter {
            set = set.insert(element);
        }
        set
    }
}

impl<'a, T: Clone + Hash + Eq> IntoIterator for &'a PersistentOrderedSet<T> {
    type Item = &'a T;
    type IntoIter = PersistentOrderedSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + Hash + Eq> PartialEq for PersistentOrderedSet<T> {
    /// Set-content equality; the insertion sequence is not compared.
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Clone + Hash + Eq> Eq for PersistentOrderedSet<T> {}

impl<T: Clone + Hash + Eq + fmt::Debug> fmt::Debug for PersistentOrderedSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Capability Trait Implementations
// =============================================================================

impl<T> Collection for PersistentOrderedSet<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T: Clone + Hash + Eq> PersistentSet<T> for PersistentOrderedSet<T> {
    fn insert(&self, element: T) -> Self {
        Self::insert(self, element)
    }

    fn remove(&self, element: &T) -> Self {
        Self::remove(self, element)
    }

    fn clear(&self) -> Self {
        Self::clear(self)
    }

    fn contains(&self, element: &T) -> bool {
        Self::contains(self, element)
    }

    fn insert_all<I: IntoIterator<Item = T>>(&self, elements: I) -> Self {
        let mut set = self.clone();
        for element in elements {
            set = set.insert(element);
        }
        set
    }

    fn remove_all<'a, I: IntoIterator<Item = &'a T>>(&self, elements: I) -> Self
    where
        T: 'a,
    {
        let mut set = self.clone();
        for element in elements {
            set = set.remove(element);
        }
        set
    }

    fn retain_all<'a, I: IntoIterator<Item = &'a T>>(&self, elements: I) -> Self
    where
        T: 'a,
    {
        let kept: std::collections::HashSet<&T> = elements.into_iter().collect();
        let doomed: Vec<T> = self
            .iter()
            .filter(|element| !kept.contains(element))
            .cloned()
            .collect();
        let mut set = self.clone();
        for element in &doomed {
            set = set.remove(element);
        }
        set
    }
}

impl<T: Clone + Hash + Eq> ToTransient for PersistentOrderedSet<T> {
    type Transient = TransientOrderedSet<T>;

    fn transient(&self) -> TransientOrderedSet<T> {
        TransientOrderedSet {
            inner: self.inner.transient(),
            _marker: PhantomData,
        }
    }
}

impl<T: Clone + Hash + Eq> PersistentOrderedSet<T> {
    /// Returns a transient working copy sharing this set's trie.
    #[must_use]
    pub fn transient(&self) -> TransientOrderedSet<T> {
        ToTransient::transient(self)
    }
}

// =============================================================================
// TransientOrderedSet Definition
// =============================================================================

/// A transient insertion-ordered set for batch updates.
pub struct TransientOrderedSet<T> {
    inner: TransientOrderedMap<T, ()>,
    /// Marker to keep transients off other threads.
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientOrderedSet<String>: Send, Sync);

impl<T> TransientOrderedSet<T> {
    /// Returns the number of elements in the set.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Clone + Hash + Eq> TransientOrderedSet<T> {
    /// Creates a new empty transient set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: TransientOrderedMap::new(),
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the set contains the specified element.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.get(element).is_some()
    }

    /// Inserts an element, returning `true` if it was newly added.
    pub fn insert(&mut self, element: T) -> bool {
        if self.contains(&element) {
            return false;
        }
        self.inner.insert(element, ());
        true
    }

    /// Removes an element, returning `true` if it was present.
    pub fn remove<Q>(&mut self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.remove(element).is_some()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Publishes the current state as a persistent snapshot.
    pub fn persistent(&mut self) -> PersistentOrderedSet<T> {
        ToPersistent::persistent(self)
    }
}

impl<T: Clone + Hash + Eq> ToPersistent for TransientOrderedSet<T> {
    type Persistent = PersistentOrderedSet<T>;

    fn persistent(&mut self) -> PersistentOrderedSet<T> {
        PersistentOrderedSet {
            inner: self.inner.persistent(),
        }
    }
}

impl<T> Collection for TransientOrderedSet<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T: Clone + Hash + Eq> Default for TransientOrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> Extend<T> for TransientOrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, elements: I) {
        for element in elements {
            self.insert(element);
        }
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
mod serde_support {
    use super::{PersistentOrderedSet, TransientOrderedSet};
    use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
    use serde::ser::{Serialize, SerializeSeq, Serializer};
    use std::hash::Hash;
    use std::marker::PhantomData;

    /// Serialized in insertion order, so the sequence survives a
    /// round-trip.
    impl<T> Serialize for PersistentOrderedSet<T>
    where
        T: Clone + Hash + Eq + Serialize,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for element in self {
                seq.serialize_element(element)?;
            }
            seq.end()
        }
    }

    struct PersistentOrderedSetVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for PersistentOrderedSetVisitor<T>
    where
        T: Clone + Hash + Eq + Deserialize<'de>,
    {
        type Value = PersistentOrderedSet<T>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a sequence of set elements")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut transient = TransientOrderedSet::new();
            while let Some(element) = access.next_element()? {
                transient.insert(element);
            }
            Ok(transient.persistent())
        }
    }

    impl<'de, T> Deserialize<'de> for PersistentOrderedSet<T>
    where
        T: Clone + Hash + Eq + Deserialize<'de>,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_seq(PersistentOrderedSetVisitor(PhantomData))
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
        let set = PersistentOrderedSet::new().insert(3).insert(1).insert(2);
        let elements: Vec<i32> = set.iter().copied().collect();
        assert_eq!(elements, vec![3, 1, 2]);
    }

    #[rstest]
    fn test_reinsert_keeps_position() {
        let set = PersistentOrderedSet::new().insert(3).insert(1).insert(3);
        let elements: Vec<i32> = set.iter().copied().collect();
        assert_eq!(elements, vec![3, 1]);
        assert_eq!(set.len(), 2);
    }

    #[rstest]
    fn test_sequence_endpoints() {
        let set = PersistentOrderedSet::new().insert('x').insert('y').insert('z');
        assert_eq!(set.first(), Some(&'x'));
        assert_eq!(set.last(), Some(&'z'));

        let trimmed = set.remove_first().remove_last();
        let elements: Vec<char> = trimmed.iter().copied().collect();
        assert_eq!(elements, vec!['y']);
    }

    #[rstest]
    fn test_transient_roundtrip_preserves_order() {
        let set: PersistentOrderedSet<i32> = [5, 3, 9].into_iter().collect();
        let mut transient = set.transient();
        transient.insert(1);
        transient.remove(&3);
        let updated = transient.persistent();

        let elements: Vec<i32> = updated.iter().copied().collect();
        assert_eq!(elements, vec![5, 9, 1]);
    }
}
