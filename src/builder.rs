//! Fold-style bulk construction.
//!
//! [`ChunkedBuilder`] accumulates elements into fixed-size chunks, turns
//! each full chunk into a small persistent container, and merges the
//! containers pairwise smallest-first. For containers whose bulk union is
//! cheaper than element-by-element insertion (the tree-backed ones run
//! union on join/split), this builds large collections markedly faster
//! than a fold of single inserts.
//!
//! # Examples
//!
//! ```rust
//! use canopy::PersistentTreeSet;
//! use canopy::builder::ChunkedBuilder;
//!
//! let mut builder: ChunkedBuilder<PersistentTreeSet<i32>> = ChunkedBuilder::new();
//! for element in (0..1000).rev() {
//!     builder.push(element);
//! }
//! let set = builder.build();
//! assert_eq!(set.len(), 1000);
//! assert_eq!(set.min(), Some(&0));
//! ```

use std::hash::Hash;

use smallvec::SmallVec;

use crate::hashmap::PersistentHashMap;
use crate::hashset::PersistentHashSet;
use crate::traits::Collection;
use crate::treemap::PersistentTreeMap;
use crate::treeset::PersistentTreeSet;

/// Elements buffered before a chunk becomes a container.
const CHUNK_CAPACITY: usize = 64;

/// A container that can be built from a chunk of items and merged with a
/// peer in bulk.
pub trait BulkMerge: Collection + Sized {
    /// The item the container collects.
    type Item;

    /// Builds a small container from one chunk of items.
    fn from_chunk(chunk: Vec<Self::Item>) -> Self;

    /// Merges two containers; on key conflicts the entries of `other`
    /// win.
    #[must_use]
    fn merge_with(&self, other: &Self) -> Self;
}

// =============================================================================
// ChunkedBuilder Definition
// =============================================================================

/// A fold-style collector merging intermediate containers smallest-first.
///
/// Segments are kept largest-first; pushing a chunk merges trailing
/// segments while the newcomer has caught up with its predecessor in
/// size, which keeps every merge between operands of comparable size.
pub struct ChunkedBuilder<C: BulkMerge> {
    chunk: Vec<C::Item>,
    segments: SmallVec<[C; 8]>,
}

impl<C: BulkMerge> ChunkedBuilder<C> {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            chunk: Vec::with_capacity(CHUNK_CAPACITY),
            segments: SmallVec::new(),
        }
    }

    /// Adds one item.
    pub fn push(&mut self, item: C::Item) {
        self.chunk.push(item);
        if self.chunk.len() == CHUNK_CAPACITY {
            self.flush_chunk();
        }
    }

    /// Finishes the fold, merging the remaining segments smallest-first.
    #[must_use]
    pub fn build(mut self) -> C {
        self.flush_chunk();
        let mut result = match self.segments.pop() {
            Some(segment) => segment,
            None => return C::from_chunk(Vec::new()),
        };
        while let Some(segment) = self.segments.pop() {
            result = segment.merge_with(&result);
        }
        result
    }

    fn flush_chunk(&mut self) {
        if self.chunk.is_empty() {
            return;
        }
        let chunk = std::mem::replace(&mut self.chunk, Vec::with_capacity(CHUNK_CAPACITY));
        self.segments.push(C::from_chunk(chunk));
        // Collapse trailing segments while the newest has grown to its
        // predecessor's size, the binary-counter discipline of merge
        // sort.
        while self.segments.len() >= 2 {
            let last = self.segments.len() - 1;
            if self.segments[last - 1].len() > self.segments[last].len() {
                break;
            }
            let newest = self.segments.pop().expect("two segments present");
            let previous = self.segments.pop().expect("two segments present");
            self.segments.push(previous.merge_with(&newest));
        }
    }
}

impl<C: BulkMerge> Default for ChunkedBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: BulkMerge> Extend<C::Item> for ChunkedBuilder<C> {
    fn extend<I: IntoIterator<Item = C::Item>>(&mut self, items: I) {
        for item in items {
            self.push(item);
        }
    }
}

// =============================================================================
// BulkMerge Implementations
// =============================================================================

impl<T: Clone + Ord> BulkMerge for PersistentTreeSet<T> {
    type Item = T;

    fn from_chunk(chunk: Vec<T>) -> Self {
        chunk.into_iter().collect()
    }

    fn merge_with(&self, other: &Self) -> Self {
        self.union(other)
    }
}

impl<K: Clone + Ord, V: Clone> BulkMerge for PersistentTreeMap<K, V> {
    type Item = (K, V);

    fn from_chunk(chunk: Vec<(K, V)>) -> Self {
        chunk.into_iter().collect()
    }

    fn merge_with(&self, other: &Self) -> Self {
        self.merge(other)
    }
}

impl<T: Clone + Hash + Eq> BulkMerge for PersistentHashSet<T> {
    type Item = T;

    fn from_chunk(chunk: Vec<T>) -> Self {
        chunk.into_iter().collect()
    }

    fn merge_with(&self, other: &Self) -> Self {
        // The CHAMP union batches the smaller operand into a transient of
        // the larger one.
        if self.len() >= other.len() {
            self.union(other)
        } else {
            let mut transient = other.transient();
            for element in self {
                transient.insert(element.clone());
            }
            transient.persistent()
        }
    }
}

impl<K: Clone + Hash + Eq, V: Clone> BulkMerge for PersistentHashMap<K, V> {
    type Item = (K, V);

    fn from_chunk(chunk: Vec<(K, V)>) -> Self {
        chunk.into_iter().collect()
    }

    fn merge_with(&self, other: &Self) -> Self {
        self.merge(other)
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
    fn test_empty_builder_yields_empty_container() {
        let builder: ChunkedBuilder<PersistentTreeSet<i32>> = ChunkedBuilder::new();
        let set = builder.build();
        assert!(set.is_empty());
    }

    #[rstest]
    fn test_small_input_stays_in_one_chunk() {
        let mut builder: ChunkedBuilder<PersistentTreeSet<i32>> = ChunkedBuilder::new();
        builder.extend([3, 1, 2]);
        let set = builder.build();
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[rstest]
    fn test_large_input_merges_segments() {
        let mut builder: ChunkedBuilder<PersistentTreeSet<i32>> = ChunkedBuilder::new();
        builder.extend((0..1000).rev());
        let set = builder.build();
        assert_eq!(set.len(), 1000);
        assert_eq!(set.min(), Some(&0));
        assert_eq!(set.max(), Some(&999));
    }

    #[rstest]
    fn test_duplicates_collapse() {
        let mut builder: ChunkedBuilder<PersistentTreeSet<i32>> = ChunkedBuilder::new();
        builder.extend((0..200).chain(0..200));
        let set = builder.build();
        assert_eq!(set.len(), 200);
    }

    #[rstest]
    fn test_map_builder_later_entries_win() {
        let mut builder: ChunkedBuilder<PersistentTreeMap<i32, i32>> = ChunkedBuilder::new();
        for index in 0..300 {
            builder.push((index, index));
        }
        for index in 0..300 {
            builder.push((index, index + 1000));
        }
        let map = builder.build();
        assert_eq!(map.len(), 300);
        assert_eq!(map.get(&7), Some(&1007));
    }

    #[rstest]
    fn test_hash_builder() {
        let mut builder: ChunkedBuilder<PersistentHashSet<u32>> = ChunkedBuilder::new();
        builder.extend(0..500);
        let set = builder.build();
        assert_eq!(set.len(), 500);
        assert!(set.contains(&499));
    }
}
