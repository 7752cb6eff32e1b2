//! Capability contracts shared by every persistent container.
//!
//! Instead of parallel interface hierarchies per container shape, each
//! capability is one small trait, and every concrete backend implements
//! exactly the traits matching what it can do:
//!
//! - [`Collection`]: sized containers
//! - [`PersistentSet`] / [`PersistentMap`]: element/keyed update contracts
//! - [`Sequence`]: double-ended sequences
//! - [`NavigableSet`] / [`NavigableMap`]: order-based neighbor queries
//! - [`ToTransient`] / [`ToPersistent`]: the O(1) conversions between a
//!   published snapshot and a destructively-mutable working copy
//!
//! # Identity-preserving no-ops
//!
//! Every updating method on the persistent contracts returns the unchanged
//! receiver (a cheap clone sharing the same root) when nothing actually
//! changed. Callers may rely on this for inexpensive change detection.

/// A sized container.
pub trait Collection {
    /// Returns the number of elements.
    fn len(&self) -> usize;

    /// Returns `true` if the container holds no elements.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Element-keyed update contract of persistent sets.
pub trait PersistentSet<T>: Collection + Clone {
    /// Returns a set with `element` added.
    #[must_use]
    fn insert(&self, element: T) -> Self;

    /// Returns a set with `element` removed.
    #[must_use]
    fn remove(&self, element: &T) -> Self;

    /// Returns an empty set, or the receiver if already empty.
    #[must_use]
    fn clear(&self) -> Self;

    /// Returns `true` if `element` is present.
    fn contains(&self, element: &T) -> bool;

    /// Returns a set with every element of `elements` added.
    #[must_use]
    fn insert_all<I: IntoIterator<Item = T>>(&self, elements: I) -> Self;

    /// Returns a set with every element of `elements` removed.
    #[must_use]
    fn remove_all<'a, I: IntoIterator<Item = &'a T>>(&self, elements: I) -> Self
    where
        T: 'a;

    /// Returns a set retaining only the elements of `elements`.
    #[must_use]
    fn retain_all<'a, I: IntoIterator<Item = &'a T>>(&self, elements: I) -> Self
    where
        T: 'a;
}

/// Keyed update contract of persistent maps.
pub trait PersistentMap<K, V>: Collection + Clone {
    /// Returns a map with `key` bound to `value`.
    #[must_use]
    fn insert(&self, key: K, value: V) -> Self;

    /// Returns a map with `key` unbound.
    #[must_use]
    fn remove(&self, key: &K) -> Self;

    /// Returns an empty map, or the receiver if already empty.
    #[must_use]
    fn clear(&self) -> Self;

    /// Returns the value bound to `key`, if any.
    fn get(&self, key: &K) -> Option<&V>;

    /// Returns `true` if `key` is bound.
    fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns a map with every binding of `entries` applied.
    #[must_use]
    fn insert_all<I: IntoIterator<Item = (K, V)>>(&self, entries: I) -> Self;

    /// Returns a map with every key of `keys` unbound.
    #[must_use]
    fn remove_all<'a, I: IntoIterator<Item = &'a K>>(&self, keys: I) -> Self
    where
        K: 'a;

    /// Returns a map retaining only the bindings whose key is in `keys`.
    #[must_use]
    fn retain_keys<'a, I: IntoIterator<Item = &'a K>>(&self, keys: I) -> Self
    where
        K: 'a;
}

/// Double-ended sequence contract.
pub trait Sequence<T>: Collection + Clone {
    /// Returns a sequence with `element` prepended.
    #[must_use]
    fn push_front(&self, element: T) -> Self;

    /// Returns a sequence with `element` appended.
    #[must_use]
    fn push_back(&self, element: T) -> Self;

    /// Returns a sequence without its first element, or the receiver if
    /// empty.
    #[must_use]
    fn pop_front(&self) -> Self;

    /// Returns a sequence without its last element, or the receiver if
    /// empty.
    #[must_use]
    fn pop_back(&self) -> Self;

    /// Returns the first element. `None` signals the empty sequence,
    /// distinct from any element lookup.
    fn first(&self) -> Option<&T>;

    /// Returns the last element, or `None` for the empty sequence.
    fn last(&self) -> Option<&T>;
}

/// Order-based neighbor queries over sorted sets.
pub trait NavigableSet<T>: PersistentSet<T> {
    /// Returns the smallest element, or `None` for the empty set.
    fn min(&self) -> Option<&T>;

    /// Returns the largest element, or `None` for the empty set.
    fn max(&self) -> Option<&T>;

    /// Returns the smallest element `>= bound`.
    fn ceiling(&self, bound: &T) -> Option<&T>;

    /// Returns the largest element `<= bound`.
    fn floor(&self, bound: &T) -> Option<&T>;

    /// Returns the smallest element `> bound`.
    fn higher(&self, bound: &T) -> Option<&T>;

    /// Returns the largest element `< bound`.
    fn lower(&self, bound: &T) -> Option<&T>;
}

/// Order-based neighbor queries over sorted maps.
pub trait NavigableMap<K, V>: PersistentMap<K, V> {
    /// Returns the entry with the smallest key, or `None` for the empty
    /// map.
    fn min_entry(&self) -> Option<(&K, &V)>;

    /// Returns the entry with the largest key, or `None` for the empty
    /// map.
    fn max_entry(&self) -> Option<(&K, &V)>;

    /// Returns the entry with the smallest key `>= bound`.
    fn ceiling_entry(&self, bound: &K) -> Option<(&K, &V)>;

    /// Returns the entry with the largest key `<= bound`.
    fn floor_entry(&self, bound: &K) -> Option<(&K, &V)>;

    /// Returns the entry with the smallest key `> bound`.
    fn higher_entry(&self, bound: &K) -> Option<(&K, &V)>;

    /// Returns the entry with the largest key `< bound`.
    fn lower_entry(&self, bound: &K) -> Option<(&K, &V)>;
}

/// O(1) conversion from a persistent snapshot to a transient working
/// copy.
pub trait ToTransient {
    /// The transient counterpart.
    type Transient;

    /// Wraps the current root for destructive batch updates. The snapshot
    /// stays valid and unchanged; the transient pays copy-on-write only
    /// for the paths it rewrites.
    fn transient(&self) -> Self::Transient;
}

/// O(1) conversion from a transient working copy to a persistent
/// snapshot.
pub trait ToPersistent {
    /// The persistent counterpart.
    type Persistent;

    /// Publishes the current root as an immutable snapshot and discards
    /// the edit owner. The transient stays usable; its next write acquires
    /// a fresh owner and copies only what it touches.
    fn persistent(&mut self) -> Self::Persistent;
}
