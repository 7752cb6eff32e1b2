//! # canopy
//!
//! A persistent collection engine built on two structurally-shared node
//! families: a Compressed Hash-Array Mapped Prefix-tree (CHAMP) backing
//! hash maps and sets, and a persistent red-black tree backing sorted maps
//! and sets.
//!
//! ## Overview
//!
//! Every container in this crate comes in two flavors sharing one node
//! tree:
//!
//! - **Persistent**: an immutable value object. Updates return a new
//!   container; unchanged substructure is shared, so "copying" is O(1)
//!   regardless of size.
//! - **Transient**: a destructively-mutable working copy for batch
//!   updates. Conversion between the two directions is O(1) in both
//!   directions — freezing shares the current root, thawing wraps it with
//!   a fresh edit owner and pays copy-on-write only for the paths a write
//!   actually touches.
//!
//! Containers:
//!
//! - [`PersistentHashMap`] / [`TransientHashMap`]: CHAMP hash map
//! - [`PersistentHashSet`] / [`TransientHashSet`]: CHAMP hash set
//! - [`PersistentTreeMap`] / [`TransientTreeMap`]: sorted map (red-black)
//! - [`PersistentTreeSet`] / [`TransientTreeSet`]: sorted set (red-black)
//! - [`PersistentOrderedMap`] / [`PersistentOrderedSet`]: insertion-ordered
//!   map/set layered over the CHAMP map
//! - [`PersistentList`] / [`TransientList`]: double-ended sequence
//!
//! ## Feature Flags
//!
//! - `arc`: use `Arc` instead of `Rc` for node sharing (thread-safe
//!   persistent values)
//! - `serde`: logical serialization — containers persist as their flat
//!   entry sequence and are rebuilt by bulk insertion
//! - `fxhash`: deterministic key hashing via `rustc-hash` (replaces the
//!   default per-process random salt)
//! - `ahash`: salted key hashing via `ahash`
//!
//! ## Example
//!
//! ```rust
//! use canopy::prelude::*;
//!
//! let map = PersistentHashMap::new()
//!     .insert("one".to_string(), 1)
//!     .insert("two".to_string(), 2);
//!
//! // Structural sharing: the original map is preserved
//! let updated = map.insert("one".to_string(), 100);
//! assert_eq!(map.get("one"), Some(&1));
//! assert_eq!(updated.get("one"), Some(&100));
//!
//! // Batch updates through a transient working copy
//! let mut transient = map.transient();
//! for index in 0..100 {
//!     transient.insert(index.to_string(), index);
//! }
//! let frozen = transient.persistent();
//! assert_eq!(frozen.len(), 102);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

// =============================================================================
// Reference Counter Type Alias
// =============================================================================

/// Reference-counted smart pointer type.
///
/// When the `arc` feature is enabled, this is `std::sync::Arc`, which is
/// thread-safe but has slightly higher overhead.
///
/// When the `arc` feature is disabled (default), this is `std::rc::Rc`,
/// which is faster but not thread-safe.
#[cfg(feature = "arc")]
pub(crate) type ReferenceCounter<T> = std::sync::Arc<T>;

#[cfg(not(feature = "arc"))]
pub(crate) type ReferenceCounter<T> = std::rc::Rc<T>;

/// Prelude module for convenient imports.
///
/// Re-exports every container type and the capability traits.
///
/// # Usage
///
/// ```rust
/// use canopy::prelude::*;
/// ```
pub mod prelude {
    pub use crate::builder::{BulkMerge, ChunkedBuilder};
    pub use crate::hashmap::{PersistentHashMap, TransientHashMap};
    pub use crate::hashset::{PersistentHashSet, TransientHashSet};
    pub use crate::list::{PersistentList, TransientList};
    pub use crate::orderedmap::PersistentOrderedMap;
    pub use crate::orderedset::PersistentOrderedSet;
    pub use crate::traits::{
        Collection, NavigableMap, NavigableSet, PersistentMap, PersistentSet, Sequence,
        ToPersistent, ToTransient,
    };
    pub use crate::treemap::{PersistentTreeMap, TransientTreeMap};
    pub use crate::treeset::{PersistentTreeSet, TransientTreeSet};
}

mod champ;
mod redblack;

pub mod builder;
pub mod hashmap;
pub mod hashset;
pub mod list;
pub mod orderedmap;
pub mod orderedset;
pub mod traits;
pub mod treemap;
pub mod treeset;

pub use hashmap::{PersistentHashMap, TransientHashMap};
pub use hashset::{PersistentHashSet, TransientHashSet};
pub use list::{PersistentList, TransientList};
pub use orderedmap::PersistentOrderedMap;
pub use orderedset::PersistentOrderedSet;
pub use treemap::{PersistentTreeMap, TransientTreeMap};
pub use treeset::{PersistentTreeSet, TransientTreeSet};

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod reference_counter_tests {
    use super::ReferenceCounter;
    use rstest::rstest;

    #[rstest]
    fn test_reference_counter_clone_shares() {
        let reference_counter: ReferenceCounter<i32> = ReferenceCounter::new(42);
        let reference_counter_clone = reference_counter.clone();
        assert_eq!(*reference_counter, *reference_counter_clone);
        assert_eq!(ReferenceCounter::strong_count(&reference_counter), 2);
    }
}
