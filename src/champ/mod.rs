//! CHAMP trie internals shared by the hash map and hash set façades.
//!
//! The Compressed Hash-Array Mapped Prefix-tree stores entries in
//! bitmap-indexed nodes of 32 slots, keyed by successive 5-bit fragments of
//! a 64-bit key hash. Each node carries two occupancy bitmaps: `data_map`
//! for slots holding an inline key/value pair and `node_map` for slots
//! holding a child subtree. Keys whose full hash collides through every
//! level fall into a linear collision bucket.
//!
//! Mutation is gated by an [`EditOwner`](edit::EditOwner): nodes allocated
//! during a transient edit session are revised in place; everything else is
//! copied along the touched path, leaving published snapshots untouched.

pub(crate) mod edit;
pub(crate) mod iter;
pub(crate) mod node;

/// Bits consumed per trie level (2^5 = 32-way branching).
pub(crate) const BITS_PER_LEVEL: u32 = 5;

/// Maximum bit-shift value (depth 12; the last level uses 4 bits).
pub(crate) const MAX_SHIFT: u32 = 60;

/// Upper bound on the number of bitmap levels above a collision bucket.
pub(crate) const MAX_LEVELS: usize = 13;

/// Extracts the 5-bit hash fragment at the given bit-shift depth.
#[inline]
pub(crate) const fn fragment(hash: u64, shift: u32) -> u32 {
    ((hash >> shift) & 0x1F) as u32
}

/// Returns the single-bit mask for the given fragment (0..31).
#[inline]
pub(crate) const fn mask(fragment: u32) -> u32 {
    1 << fragment
}

/// Returns the compact index of `bit` within `bitmap`.
///
/// Counts the number of set bits below `bit`.
#[inline]
pub(crate) const fn index(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

// =============================================================================
// Key hashing
// =============================================================================

#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
mod hashing {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hash};
    use std::sync::OnceLock;

    /// Process-lifetime random salt. Two maps built in the same process
    /// hash consistently with each other; the salt is not stable across
    /// process restarts, which blunts adversarially chosen key sets.
    static SALT: OnceLock<RandomState> = OnceLock::new();

    pub(crate) fn hash_key<Q: Hash + ?Sized>(key: &Q) -> u64 {
        SALT.get_or_init(RandomState::new).hash_one(key)
    }
}

#[cfg(all(feature = "fxhash", not(feature = "ahash")))]
mod hashing {
    use rustc_hash::FxBuildHasher;
    use std::hash::{BuildHasher, Hash};

    /// Deterministic hashing: stable across processes, at the cost of the
    /// anti-clustering salt.
    pub(crate) fn hash_key<Q: Hash + ?Sized>(key: &Q) -> u64 {
        FxBuildHasher.hash_one(key)
    }
}

#[cfg(feature = "ahash")]
mod hashing {
    use std::hash::{BuildHasher, Hash};
    use std::sync::OnceLock;

    static SALT: OnceLock<ahash::RandomState> = OnceLock::new();

    pub(crate) fn hash_key<Q: Hash + ?Sized>(key: &Q) -> u64 {
        SALT.get_or_init(ahash::RandomState::new).hash_one(key)
    }
}

pub(crate) use hashing::hash_key;

// =============================================================================
// Tests
// =============================================================================
