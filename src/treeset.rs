//! Persistent and transient sorted sets backed by the red-black tree.
//!
//! [`PersistentTreeSet`] wraps [`PersistentTreeMap`] with unit values.
//! Its set algebra (`union`/`intersection`/`difference`) runs on the
//! tree's join/split machinery, so it costs time proportional to the
//! smaller operand rather than element-by-element insertion.
//!
//! # Examples
//!
//! ```rust
//! use canopy::PersistentTreeSet;
//!
//! let set: PersistentTreeSet<i32> = [3, 1, 2].into_iter().collect();
//! let elements: Vec<&i32> = set.iter().collect();
//! assert_eq!(elements, vec![&1, &2, &3]);
//!
//! let other: PersistentTreeSet<i32> = [2, 3, 4].into_iter().collect();
//! let union = set.union(&other);
//! assert_eq!(union.len(), 4);
//! ```

use std::borrow::Borrow;
use std::fmt;
use std::iter::FromIterator;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::treemap::{PersistentTreeMap, PersistentTreeMapIterator, TransientTreeMap};
use crate::traits::{Collection, NavigableSet, PersistentSet, ToPersistent, ToTransient};

// =============================================================================
// PersistentTreeSet Definition
// =============================================================================

/// A persistent (immutable) sorted set backed by a red-black tree.
///
/// # Time Complexity
///
/// | Operation                       | Complexity |
/// |---------------------------------|------------|
/// | `contains` / `insert` / `remove`| O(log N)   |
/// | `min` / `max` / `ceiling` …     | O(log N)   |
/// | `union` / `intersection` / …    | O(M log(N/M + 1)), M = smaller size |
/// | `len`                           | O(1)       |
#[derive(Clone)]
pub struct PersistentTreeSet<T> {
    inner: PersistentTreeMap<T, ()>,
}

impl<T> PersistentTreeSet<T> {
    /// Creates a new empty set.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use canopy::PersistentTreeSet;
    ///
    /// let set: PersistentTreeSet<i32> = PersistentTreeSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: PersistentTreeMap::new(),
        }
    }

    /// Returns the number of elements in the set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Clone + Ord> PersistentTreeSet<T> {
    /// Creates a set containing a single element.
    #[inline]
    #[must_use]
    pub fn singleton(element: T) -> Self {
        Self::new().insert(element)
    }

    /// Returns `true` if the set contains the specified element.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
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
        Q: Ord + ?Sized,
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

    /// Returns the smallest element. `None` signals the empty set.
    #[must_use]
    pub fn min(&self) -> Option<&T> {
        self.inner.min().map(|(element, _)| element)
    }

    /// Returns the largest element, or `None` for the empty set.
    #[must_use]
    pub fn max(&self) -> Option<&T> {
        self.inner.max().map(|(element, _)| element)
    }

    /// Returns the smallest element `>= bound`.
    #[must_use]
    pub fn ceiling<Q>(&self, bound: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.ceiling(bound).map(|(element, _)| element)
    }

    /// Returns the largest element `<= bound`.
    #[must_use]
    pub fn floor<Q>(&self, bound: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.floor(bound).map(|(element, _)| element)
    }

    /// Returns the smallest element `> bound`.
    #[must_use]
    pub fn higher<Q>(&self, bound: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.higher(bound).map(|(element, _)| element)
    }

    /// Returns the largest element `< bound`.
    #[must_use]
    pub fn lower<Q>(&self, bound: &Q) -> Option<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.lower(bound).map(|(element, _)| element)
    }

    /// Returns the union of `self` and `other` via tree join/split.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            inner: PersistentTreeMap::from_root(self.inner.root().union(other.inner.root())),
        }
    }

    /// Returns the intersection of `self` and `other`.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            inner: PersistentTreeMap::from_root(
                self.inner.root().intersection(other.inner.root()),
            ),
        }
    }

    /// Returns the elements of `self` that are not in `other`.
    #[must_use]
    pub fn difference(&self, other: &Self) -> Self {
        Self {
            inner: PersistentTreeMap::from_root(self.inner.root().difference(other.inner.root())),
        }
    }

    /// Returns `true` if every element of `self` is in `other`.
    #[must_use]
    pub fn is_subset(&self, other: &Self) -> bool {
        self.len() <= other.len() && self.iter().all(|element| other.contains(element))
    }

    /// Returns an iterator over the elements in ascending order.
    #[must_use]
    pub fn iter(&self) -> PersistentTreeSetIterator<'_, T> {
        PersistentTreeSetIterator {
            inner: self.inner.iter(),
        }
    }
}

// =============================================================================
// Iterator Implementations
// =============================================================================

/// An iterator over the elements of a [`PersistentTreeSet`] in ascending
/// order.
pub struct PersistentTreeSetIterator<'a, T> {
    inner: PersistentTreeMapIterator<'a, T, ()>,
}

impl<'a, T> Iterator for PersistentTreeSetIterator<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(element, _)| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentTreeSetIterator<'_, T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// An owning iterator over the elements of a [`PersistentTreeSet`].
pub struct PersistentTreeSetIntoIterator<T> {
    elements: std::vec::IntoIter<T>,
}

impl<T> Iterator for PersistentTreeSetIntoIterator<T> {
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        self.elements.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.elements.size_hint()
    }
}

impl<T> ExactSizeIterator for PersistentTreeSetIntoIterator<T> {
    fn len(&self) -> usize {
        self.elements.len()
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<T> Default for PersistentTreeSet<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Ord> FromIterator<T> for PersistentTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut transient = TransientTreeSet::new();
        for element in iter {
            transient.insert(element);
        }
        transient.persistent()
    }
}

impl<T: Clone + Ord> IntoIterator for PersistentTreeSet<T> {
    type Item = T;
    type IntoIter = PersistentTreeSetIntoIterator<T>;

    fn into_iter(self) -> Self::IntoIter {
        let elements: Vec<T> = self.iter().cloned().collect();
        PersistentTreeSetIntoIterator {
            elements: elements.into_iter(),
        }
    }
}

impl<'a, T: Clone + Ord> IntoIterator for &'a PersistentTreeSet<T> {
    type Item = &'a T;
    type IntoIter = PersistentTreeSetIterator<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T: Clone + Ord> PartialEq for PersistentTreeSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<T: Clone + Ord> Eq for PersistentTreeSet<T> {}

impl<T: Clone + Ord + fmt::Debug> fmt::Debug for PersistentTreeSet<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_set().entries(self.iter()).finish()
    }
}

// =============================================================================
// Capability Trait Implementations
// =============================================================================

impl<T> Collection for PersistentTreeSet<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T: Clone + Ord> PersistentSet<T> for PersistentTreeSet<T> {
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

impl<T: Clone + Ord> NavigableSet<T> for PersistentTreeSet<T> {
    fn min(&self) -> Option<&T> {
        Self::min(self)
    }

    fn max(&self) -> Option<&T> {
        Self::max(self)
    }

    fn ceiling(&self, bound: &T) -> Option<&T> {
        Self::ceiling(self, bound)
    }

    fn floor(&self, bound: &T) -> Option<&T> {
        Self::floor(self, bound)
    }

    fn higher(&self, bound: &T) -> Option<&T> {
        Self::higher(self, bound)
    }

    fn lower(&self, bound: &T) -> Option<&T> {
        Self::lower(self, bound)
    }
}

impl<T: Clone + Ord> ToTransient for PersistentTreeSet<T> {
    type Transient = TransientTreeSet<T>;

    fn transient(&self) -> TransientTreeSet<T> {
        TransientTreeSet {
            inner: self.inner.transient(),
            _marker: PhantomData,
        }
    }
}

impl<T: Clone + Ord> PersistentTreeSet<T> {
    /// Returns a transient working copy sharing this set's tree.
    #[must_use]
    pub fn transient(&self) -> TransientTreeSet<T> {
        ToTransient::transient(self)
    }
}

// =============================================================================
// TransientTreeSet Definition
// =============================================================================

/// A transient sorted set for batch updates behind `&mut self`.
///
/// # Examples
///
/// ```rust
/// use canopy::TransientTreeSet;
///
/// let mut transient = TransientTreeSet::new();
/// transient.insert(2);
/// transient.insert(1);
///
/// let set = transient.persistent();
/// assert_eq!(set.iter().collect::<Vec<_>>(), vec![&1, &2]);
/// ```
pub struct TransientTreeSet<T> {
    inner: TransientTreeMap<T, ()>,
    /// Marker to keep transients off other threads.
    _marker: PhantomData<Rc<()>>,
}

static_assertions::assert_not_impl_any!(TransientTreeSet<String>: Send, Sync);

impl<T> TransientTreeSet<T> {
    /// Returns the number of elements in the set.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if the set contains no elements.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<T: Clone + Ord> TransientTreeSet<T> {
    /// Creates a new empty transient set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            inner: TransientTreeMap::new(),
            _marker: PhantomData,
        }
    }

    /// Returns `true` if the set contains the specified element.
    #[must_use]
    pub fn contains<Q>(&self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.get(element).is_some()
    }

    /// Inserts an element, returning `true` if it was newly added.
    pub fn insert(&mut self, element: T) -> bool {
        self.inner.insert(element, ()).is_none()
    }

    /// Removes an element, returning `true` if it was present.
    pub fn remove<Q>(&mut self, element: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.inner.remove(element).is_some()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.inner.clear();
    }

    /// Publishes the current tree as a persistent snapshot.
    pub fn persistent(&mut self) -> PersistentTreeSet<T> {
        ToPersistent::persistent(self)
    }
}

impl<T: Clone + Ord> ToPersistent for TransientTreeSet<T> {
    type Persistent = PersistentTreeSet<T>;

    fn persistent(&mut self) -> PersistentTreeSet<T> {
        PersistentTreeSet {
            inner: self.inner.persistent(),
        }
    }
}

impl<T> Collection for TransientTreeSet<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T: Clone + Ord> Default for TransientTreeSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Ord> Extend<T> for TransientTreeSet<T> {
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
    use super::{PersistentTreeSet, TransientTreeSet};
    use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
    use serde::ser::{Serialize, SerializeSeq, Serializer};
    use std::marker::PhantomData;

    impl<T> Serialize for PersistentTreeSet<T>
    where
        T: Clone + Ord + Serialize,
    {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut seq = serializer.serialize_seq(Some(self.len()))?;
            for element in self {
                seq.serialize_element(element)?;
            }
            seq.end()
        }
    }

    struct PersistentTreeSetVisitor<T>(PhantomData<T>);

    impl<'de, T> Visitor<'de> for PersistentTreeSetVisitor<T>
    where
        T: Clone + Ord + Deserialize<'de>,
    {
        type Value = PersistentTreeSet<T>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a sequence of set elements")
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
            let mut transient = TransientTreeSet::new();
            while let Some(element) = access.next_element()? {
                transient.insert(element);
            }
            Ok(transient.persistent())
        }
    }

    impl<'de, T> Deserialize<'de> for PersistentTreeSet<T>
    where
        T: Clone + Ord + Deserialize<'de>,
    {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_seq(PersistentTreeSetVisitor(PhantomData))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
