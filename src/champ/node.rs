//! CHAMP trie node family: bitmap-indexed branch nodes and collision
//! buckets.
//!
//! A bitmap node keeps its inline entries and child pointers in two
//! parallel vectors ordered by bit position. Invariants:
//!
//! - `data_map & node_map == 0`
//! - `entries.len() == data_map.count_ones()`
//! - `children.len() == node_map.count_ones()`
//!
//! A collision bucket holds at least two entries sharing one full 64-bit
//! hash and only ever appears below the deepest bitmap level.

use std::borrow::Borrow;
use std::mem;

use crate::ReferenceCounter;
use crate::champ::edit::{Change, EditOwner};
use crate::champ::{BITS_PER_LEVEL, MAX_SHIFT, fragment, index, mask};

/// Shared reference to a trie node.
pub(crate) type NodeRef<K, V> = ReferenceCounter<Node<K, V>>;

// =============================================================================
// Node Definition
// =============================================================================

/// A CHAMP trie node.
#[derive(Clone)]
pub(crate) enum Node<K, V> {
    /// Bitmap-indexed branch node.
    Bitmap(BitmapNode<K, V>),
    /// Linear bucket for keys whose hash collides through every level.
    Collision(CollisionNode<K, V>),
}

/// Bitmap-indexed branch node.
#[derive(Clone)]
pub(crate) struct BitmapNode<K, V> {
    /// Owner of the edit session this node was allocated in, if any.
    pub(crate) edit: Option<EditOwner>,
    /// Occupancy bitmap for inline entries.
    pub(crate) data_map: u32,
    /// Occupancy bitmap for child subtrees.
    pub(crate) node_map: u32,
    /// Inline entries, in `data_map` bit-position order.
    pub(crate) entries: Vec<(K, V)>,
    /// Child subtrees, in `node_map` bit-position order.
    pub(crate) children: Vec<NodeRef<K, V>>,
}

/// Collision bucket for one fully-exhausted hash value.
#[derive(Clone)]
pub(crate) struct CollisionNode<K, V> {
    /// Owner of the edit session this node was allocated in, if any.
    pub(crate) edit: Option<EditOwner>,
    /// The shared 64-bit hash value.
    pub(crate) hash: u64,
    /// Colliding entries, scanned linearly by key equality.
    pub(crate) entries: Vec<(K, V)>,
}

/// Where a removal will land within a node, decided before any copying.
enum RemoveSite {
    /// The key sits inline at this entry position.
    InlineEntry { position: usize, bit: u32 },
    /// The key, if present, lives under this child.
    ChildSubtree { position: usize, bit: u32 },
    /// The key sits at this position of a collision bucket.
    CollisionEntry { position: usize },
    /// The key is not here.
    Absent,
}

impl<K, V> Node<K, V> {
    /// The canonical empty node: a bitmap node with no occupancy.
    pub(crate) const fn empty() -> Self {
        Self::Bitmap(BitmapNode {
            edit: None,
            data_map: 0,
            node_map: 0,
            entries: Vec::new(),
            children: Vec::new(),
        })
    }

    /// Returns `true` if this node was allocated under `owner`'s session.
    fn edit_matches(&self, owner: &EditOwner) -> bool {
        let edit = match self {
            Self::Bitmap(node) => &node.edit,
            Self::Collision(node) => &node.edit,
        };
        edit.as_ref().is_some_and(|edit| edit.is_same(owner))
    }

    /// Returns `true` if this node holds exactly one inline entry and
    /// nothing else, making it a candidate for inlining into its parent.
    fn is_singleton(&self) -> bool {
        match self {
            Self::Bitmap(node) => node.node_map == 0 && node.data_map.count_ones() == 1,
            Self::Collision(node) => node.entries.len() == 1,
        }
    }
}

impl<K: Clone, V: Clone> Node<K, V> {
    /// Copies this node for an edit under `owner` (or for a persistent
    /// update when `owner` is `None`).
    fn cloned_for(&self, owner: Option<&EditOwner>) -> Self {
        match self {
            Self::Bitmap(node) => Self::Bitmap(BitmapNode {
                edit: owner.cloned(),
                data_map: node.data_map,
                node_map: node.node_map,
                entries: node.entries.clone(),
                children: node.children.clone(),
            }),
            Self::Collision(node) => Self::Collision(CollisionNode {
                edit: owner.cloned(),
                hash: node.hash,
                entries: node.entries.clone(),
            }),
        }
    }

    /// Grants mutable access to the node behind `this`.
    ///
    /// The node is reused in place only when it was allocated under the
    /// presented owner and nothing else holds a reference to it; otherwise
    /// `this` is replaced with a copy first, so shared snapshots are never
    /// written through.
    fn editable<'a>(this: &'a mut NodeRef<K, V>, owner: Option<&EditOwner>) -> &'a mut Self {
        let reusable = owner
            .is_some_and(|owner| this.edit_matches(owner) && ReferenceCounter::strong_count(this) == 1);
        if !reusable {
            let copied = this.cloned_for(owner);
            *this = ReferenceCounter::new(copied);
        }
        ReferenceCounter::get_mut(this).expect("node is uniquely referenced after copy-on-write")
    }

    /// Moves the sole entry out of a singleton node.
    fn take_single_entry(this: NodeRef<K, V>) -> (K, V) {
        let node =
            ReferenceCounter::try_unwrap(this).unwrap_or_else(|shared| (*shared).clone());
        let entry = match node {
            Self::Bitmap(mut node) => node.entries.pop(),
            Self::Collision(mut node) => node.entries.pop(),
        };
        entry.expect("singleton node holds exactly one entry")
    }
}

// =============================================================================
// Lookup
// =============================================================================

impl<K, V> Node<K, V> {
    /// Finds the value stored for `key`, whose salted hash is `hash`.
    pub(crate) fn find<'a, Q>(&'a self, key: &Q, hash: u64, shift: u32) -> Option<&'a V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        match self {
            Self::Bitmap(node) => {
                let bit = mask(fragment(hash, shift));
                if node.data_map & bit != 0 {
                    let position = index(node.data_map, bit);
                    let (entry_key, value) = &node.entries[position];
                    (entry_key.borrow() == key).then_some(value)
                } else if node.node_map & bit != 0 {
                    let position = index(node.node_map, bit);
                    node.children[position].find(key, hash, shift + BITS_PER_LEVEL)
                } else {
                    None
                }
            }
            Self::Collision(node) => {
                if node.hash != hash {
                    return None;
                }
                node.entries
                    .iter()
                    .find(|(entry_key, _)| entry_key.borrow() == key)
                    .map(|(_, value)| value)
            }
        }
    }
}

// =============================================================================
// Insertion
// =============================================================================

impl<K: Clone + Eq, V: Clone> Node<K, V> {
    /// Inserts `key`/`value` into the subtree behind `this`, threading the
    /// edit owner and change record. `hash_of` recovers the salted hash of
    /// an already-stored key when two entries must be pushed a level down.
    pub(crate) fn insert<H>(
        this: &mut NodeRef<K, V>,
        owner: Option<&EditOwner>,
        key: K,
        value: V,
        hash: u64,
        shift: u32,
        change: &mut Change<V>,
        hash_of: &H,
    ) where
        H: Fn(&K) -> u64,
    {
        match Self::editable(this, owner) {
            Self::Bitmap(node) => {
                let bit = mask(fragment(hash, shift));
                if node.data_map & bit != 0 {
                    let position = index(node.data_map, bit);
                    if node.entries[position].0 == key {
                        let previous = mem::replace(&mut node.entries[position].1, value);
                        change.record_replace(previous);
                    } else {
                        // Same fragment, different key: push both entries
                        // one level deeper.
                        let (existing_key, existing_value) = node.entries.remove(position);
                        let existing_hash = hash_of(&existing_key);
                        let subtree = Self::merge_entries(
                            owner,
                            existing_key,
                            existing_value,
                            existing_hash,
                            key,
                            value,
                            hash,
                            shift + BITS_PER_LEVEL,
                        );
                        node.data_map &= !bit;
                        node.node_map |= bit;
                        let child_position = index(node.node_map, bit);
                        node.children
                            .insert(child_position, ReferenceCounter::new(subtree));
                        change.record_insert();
                    }
                } else if node.node_map & bit != 0 {
                    let position = index(node.node_map, bit);
                    Self::insert(
                        &mut node.children[position],
                        owner,
                        key,
                        value,
                        hash,
                        shift + BITS_PER_LEVEL,
                        change,
                        hash_of,
                    );
                } else {
                    node.data_map |= bit;
                    let position = index(node.data_map, bit);
                    node.entries.insert(position, (key, value));
                    change.record_insert();
                }
            }
            Self::Collision(node) => {
                // A bucket sits below the deepest bitmap level, so every
                // key descending to it shares the full 64-bit hash.
                debug_assert_eq!(node.hash, hash);
                if let Some(position) = node.entries.iter().position(|(entry_key, _)| *entry_key == key)
                {
                    let previous = mem::replace(&mut node.entries[position].1, value);
                    change.record_replace(previous);
                } else {
                    node.entries.push((key, value));
                    change.record_insert();
                }
            }
        }
    }

    /// Builds the smallest subtree separating two entries, recursing
    /// fragment-by-fragment until they diverge or the hash is exhausted.
    #[allow(clippy::too_many_arguments)]
    fn merge_entries(
        owner: Option<&EditOwner>,
        existing_key: K,
        existing_value: V,
        existing_hash: u64,
        key: K,
        value: V,
        hash: u64,
        shift: u32,
    ) -> Self {
        if shift > MAX_SHIFT {
            debug_assert_eq!(existing_hash, hash);
            return Self::Collision(CollisionNode {
                edit: owner.cloned(),
                hash,
                entries: vec![(existing_key, existing_value), (key, value)],
            });
        }

        let existing_fragment = fragment(existing_hash, shift);
        let new_fragment = fragment(hash, shift);

        if existing_fragment == new_fragment {
            let child = Self::merge_entries(
                owner,
                existing_key,
                existing_value,
                existing_hash,
                key,
                value,
                hash,
                shift + BITS_PER_LEVEL,
            );
            Self::Bitmap(BitmapNode {
                edit: owner.cloned(),
                data_map: 0,
                node_map: mask(existing_fragment),
                entries: Vec::new(),
                children: vec![ReferenceCounter::new(child)],
            })
        } else {
            let entries = if existing_fragment < new_fragment {
                vec![(existing_key, existing_value), (key, value)]
            } else {
                vec![(key, value), (existing_key, existing_value)]
            };
            Self::Bitmap(BitmapNode {
                edit: owner.cloned(),
                data_map: mask(existing_fragment) | mask(new_fragment),
                node_map: 0,
                entries,
                children: Vec::new(),
            })
        }
    }
}

// =============================================================================
// Removal
// =============================================================================

impl<K: Clone + Eq, V: Clone> Node<K, V> {
    /// Removes `key` from the subtree behind `this`.
    ///
    /// Callers probe for membership first, so a miss leaves the change
    /// record untouched and the node tree unchanged. After a child
    /// removal, a child collapsed to a single inline entry is pulled back
    /// into this node to keep the trie maximally flat.
    pub(crate) fn remove<Q>(
        this: &mut NodeRef<K, V>,
        owner: Option<&EditOwner>,
        key: &Q,
        hash: u64,
        shift: u32,
        change: &mut Change<V>,
    ) where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
    {
        let site = match &**this {
            Self::Bitmap(node) => {
                let bit = mask(fragment(hash, shift));
                if node.data_map & bit != 0 {
                    let position = index(node.data_map, bit);
                    if node.entries[position].0.borrow() == key {
                        RemoveSite::InlineEntry { position, bit }
                    } else {
                        RemoveSite::Absent
                    }
                } else if node.node_map & bit != 0 {
                    RemoveSite::ChildSubtree {
                        position: index(node.node_map, bit),
                        bit,
                    }
                } else {
                    RemoveSite::Absent
                }
            }
            Self::Collision(node) => {
                if node.hash == hash {
                    node.entries
                        .iter()
                        .position(|(entry_key, _)| entry_key.borrow() == key)
                        .map_or(RemoveSite::Absent, |position| RemoveSite::CollisionEntry {
                            position,
                        })
                } else {
                    RemoveSite::Absent
                }
            }
        };

        match site {
            RemoveSite::Absent => {}
            RemoveSite::InlineEntry { position, bit } => {
                let Self::Bitmap(node) = Self::editable(this, owner) else {
                    unreachable!("editable copy preserves the node variant");
                };
                let (_, previous) = node.entries.remove(position);
                node.data_map &= !bit;
                change.record_remove(previous);
            }
            RemoveSite::ChildSubtree { position, bit } => {
                let Self::Bitmap(node) = Self::editable(this, owner) else {
                    unreachable!("editable copy preserves the node variant");
                };
                Self::remove(
                    &mut node.children[position],
                    owner,
                    key,
                    hash,
                    shift + BITS_PER_LEVEL,
                    change,
                );
                if change.is_modified() && node.children[position].is_singleton() {
                    let child = node.children.remove(position);
                    let (entry_key, entry_value) = Self::take_single_entry(child);
                    node.node_map &= !bit;
                    node.data_map |= bit;
                    let entry_position = index(node.data_map, bit);
                    node.entries.insert(entry_position, (entry_key, entry_value));
                }
            }
            RemoveSite::CollisionEntry { position } => {
                let Self::Collision(node) = Self::editable(this, owner) else {
                    unreachable!("editable copy preserves the node variant");
                };
                let (_, previous) = node.entries.remove(position);
                change.record_remove(previous);
            }
        }
    }
}

// =============================================================================
// Integrity checks (test support)
// =============================================================================

#[cfg(test)]
impl<K, V> Node<K, V> {
    /// Asserts the structural invariants of this subtree.
    pub(crate) fn assert_invariants(&self, shift: u32) {
        match self {
            Self::Bitmap(node) => {
                assert_eq!(node.data_map & node.node_map, 0, "bitmaps must be disjoint");
                assert_eq!(
                    node.entries.len(),
                    node.data_map.count_ones() as usize,
                    "entry count must match data_map"
                );
                assert_eq!(
                    node.children.len(),
                    node.node_map.count_ones() as usize,
                    "child count must match node_map"
                );
                assert!(shift <= MAX_SHIFT, "bitmap node below the deepest level");
                for child in &node.children {
                    child.assert_invariants(shift + BITS_PER_LEVEL);
                }
            }
            Self::Collision(node) => {
                assert!(shift > MAX_SHIFT, "collision bucket above the deepest level");
                assert!(
                    node.entries.len() >= 2,
                    "collision bucket must hold at least two entries"
                );
            }
        }
    }

    /// Counts the entries stored in this subtree.
    pub(crate) fn count_entries(&self) -> usize {
        match self {
            Self::Bitmap(node) => {
                node.entries.len()
                    + node
                        .children
                        .iter()
                        .map(|child| child.count_entries())
                        .sum::<usize>()
            }
            Self::Collision(node) => node.entries.len(),
        }
    }
}
