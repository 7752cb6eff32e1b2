//! Persistent and transient hash sets backed by the CHAMP hash map.
//!
//! [`PersistentHashSet`] wraps [`PersistentHashMap`] with unit values, so
//! every trie property of the map (structural sharing, edit ownership,
//! collision handling) carries over unchanged.
//!
//! # Examples
//!
//! ```rust
//! use canopy::PersistentHashSet;
//!
//! let set = PersistentHashSet::new().insert(1).insert(2).insert(3);
//! assert!(set.contains(&1));
//!
//! // Structural sharing: the original set is preserved
//! let updated = set.insert(4);
//! assert_eq!(set.len(), 3);
//! assert_eq!(updated.len(), 4);
//!
//! let other: PersistentHashSet<i32> = [2, 3, 4].into_iter().collect();
//! assert_eq!(set.union(&other).len(), 4);
//! assert_eq!(set.intersection(&other).len(), 2);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::hash::Hash;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::hashmap::{PersistentHashMap, PersistentHashMapIterator, TransientHashMap};
use crate::traits::{Collection, PersistentSet, ToPersistent, ToTransient};

// =============================================================================
// PersistentHashSet Definition
// =============================================================================

/// A persistent (immutable) hash set backed by a CHAMP trie.
///
/// # Time Complexity
///
/// | Operation   | Complexity |
/// |-------------|------------|
/// | `contains`  | O(log32 N) |
/// | `insert`    | O(log32 N) |
/// | `remove`    | O(log32 N) |
/// | `len`       | O(1)       |
/// | `transient` | O(1)       |
#[derive(Clone)]
pub struct PersistentHashSet<T> {
    inner: PersistentHashMap<T, ()>,
}

impl<T> PersistentHashSet<T> {
    /// Creates a new empty set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::PersistentHashSet;
    ///
    /// let set: PersistentHashSet<i32> = PersistentHashSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: PersistentHashMap::new(),
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

impl<T: Clone + Hash + Eq> PersistentHashSet<T> {
    /// Creates a set containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().insert(element)
    }

    /// Returns `true` if the set contains the specified element.
    ///
    /// The element may be any borrowed form of the set's element type.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.inner.contains_key(element)
    }

    /// Returns a set with `element` added.
    #[must_use]
    pub fn insert(&self, element: T) -> Self {
        Self {
            inner: self.inner.insert(element, ()),
        }
    }

    /// Returns a set with `element` removed.
    ///
    /// An absent element returns the receiver unchanged.
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

    /// Returns the union of `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut transient = self.transient();
        for element in other {
            transient.insert(element.clone());
        }
        transient.persistent()
    }

    /// Returns the intersection of `self` and `other`.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        smaller
            .iter()
            .filter(|element| larger.contains(*element))
            .cloned()
            .collect()
    }

    /// Returns the elements of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        let mut transient = self.transient();
        for element in other {
            transient.remove(element);
        }
        transient.persistent()
    }

    /// Returns `true` if every element of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|element| other.contains(element))
    }

    /// Returns `true` if `self` and `other` share no element.
    #[must_use]
    pub fn is_disjoint(&self, other: &Self) -> bool {
        let (smaller, larger) = if self.len() <= other.len() {
            (self, other)
        } else {
            (other, self)
        };
        !smaller.iter().any(|element| larger.contains(element))
    }

    /// Returns an iterator over the elements. No element order is
    /// guaranteed.
    #[must_use]
    pub fn iter(&self) -> PersistentHashSetIterator<'_, T> {
        PersistentHashSetIterator {
            inner: self.inner.iter(),
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIterator<'a, T> {
    inner: PersistentHashMapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for PersistentHashSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, _)| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIterator<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// An owning iterator over the elements of a [`PersistentHashSet`].
pub struct PersistentHashSetIntoIterator<T> {
    elements: std::vec::IntoIter<T>,
}

impl<T> Iterator for PersistentHashSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.elements.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.elements.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentHashSetIntoIterator<T> {
    fn len(&self) -> usize {
        self.elements.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentHashSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> FromIterator<T> for PersistentHashSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = TransientHashSet::new();
        for element in iter {
            transient.insert(element);
        }
        transient.persistent()
    }
}

impl<T: Clone + Hash + Eq> IntoIterator for PersistentHashSet<T> {
    type Item = T;
    type IntoIter = PersistentHashSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        let elements: Vec<T> = self.iter().cloned().collect();
        PersistentHashSetIntoIterator {
            elements: elements.into_iter(),
        }
    }
}

impl<'a, T: Clone + Hash + Eq> IntoIterator for &'a PersistentHashSet<T> {
    type Item = &'a T;
    type IntoIter = PersistentHashSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + Hash + Eq> PartialEq for PersistentHashSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T: Clone + Hash + Eq> Eq for PersistentHashSet<T> {}

impl<T: Clone + Hash + Eq + fmt::Debug> fmt::Debug for PersistentHashSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Capability Trait Implementations
// =============================================================================

impl<T> Collection for PersistentHashSet<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T: Clone + Hash + Eq> PersistentSet<T> for PersistentHashSet<T> {
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
        let mut transient = self.transient();
        let mut touched = false;
        for element in elements {
            transient.insert(element);
            touched = true;
        }
        if touched {
            transient.persistent()
        } else {
            self.clone()
        }
    }

    fn remove_all<'a, I: IntoIterator<Item = &'a T>>(&self, elements: I) -> Self
    where
        T: 'a,
    {
        let mut transient = self.transient();
        let mut touched = false;
        for element in elements {
            touched |= transient.remove(element);
        }
        if touched {
            transient.persistent()
        } else {
            self.clone()
        }
    }

    fn retain_all<'a, I: IntoIterator<Item = &'a T>>(&self, elements: I) -> Self
    where
        T: 'a,
    {
        Self {
            inner: self.inner.retain_keys(elements),
        }
    }
}

impl<T: Clone + Hash + Eq> ToTransient for PersistentHashSet<T> {
    type Transient = TransientHashSet<T>;

    fn transient(&self) -> TransientHashSet<T> {
        TransientHashSet {
            inner: self.inner.transient(),
            _marker: PhantomData,
        }
    }
}

impl<T: Clone + Hash + Eq> PersistentHashSet<T> {
    /// Returns a transient working copy sharing this set's root.
    #[must_use]
    pub fn transient(&self) -> TransientHashSet<T> {
        ToTransient::transient(self)
    }
}

// =============================================================================
// TransientHashSet Definition
// =============================================================================

/// A transient (destructively-mutable) hash set for efficient batch
/// updates.
///
/// Wraps a [`TransientHashMap`] with unit values; neither `Send`, `Sync`,
/// nor `Clone` — a single writer owns the edit session.
///
/// # Examples
///
/// ```rust
/// use canopy::TransientHashSet;
///
/// let mut transient = TransientHashSet::new();
/// transient.insert(1);
/// transient.insert(2);
///
/// let set = transient.persistent();
/// assert!(set.contains(&1));
/// assert_eq!(set.len(), 2);
/// ```
pub struct TransientHashSet<T> {
    inner: TransientHashMap<T, ()>,
    /// Marker to keep transients off other threads.
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientHashSet<String>: Send, Sync);

impl<T> TransientHashSet<T> {
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

impl<T: Clone + Hash + Eq> TransientHashSet<T> {
    /// Creates a new empty transient set.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: TransientHashMap::new(),
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
        self.inner.contains_key(element)
    }

    /// Inserts an element, returning `true` if it was newly added.
    pub fn insert(&mut self, element: T) -> bool {
        self.inner.insert(element, ()).is_none()
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

    /// Publishes the current tree as a persistent snapshot.
    pub fn persistent(&mut self) -> PersistentHashSet<T> {
        ToPersistent::persistent(self)
    }
}

impl<T: Clone + Hash + Eq> ToPersistent for TransientHashSet<T> {
    type Persistent = PersistentHashSet<T>;

    fn persistent(&mut self) -> PersistentHashSet<T> {
        PersistentHashSet {
            inner: self.inner.persistent(),
        }
    }
}

impl<T> Collection for TransientHashSet<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T: Clone + Hash + Eq> Default for TransientHashSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Hash + Eq> Extend<T> for TransientHashSet<T> {
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
    use super::{PersistentHashSet, TransientHashSet};
    use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
    use serde::ser::{Serialize, SerializeSeq, Serializer};
    use std::hash::Hash;
    use std::marker::PhantomData;

    impl<T> Serialize for PersistentHashSet<T>
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

    struct PersistentHashSetVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for PersistentHashSetVisitor<T>
    where
        T: Clone + Hash + Eq + Deserialize<'de>,
    {
        type Value = PersistentHashSet<T>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a sequence of set elements")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut transient = TransientHashSet::new();
            while let Some(element) = access.next_element()? {
                transient.insert(element);
            }
            Ok(transient.persistent())
        }
    }

    impl<'de, T> Deserialize<'de> for PersistentHashSet<T>
    where
        T: Clone + Hash + Eq + Deserialize<'de>,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_seq(PersistentHashSetVisitor(PhantomData))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
