//! Persistent red-black tree shared by the sorted map and set façades.
//!
//! The tree has two states: the unique terminal [`Tree::Empty`] (black by
//! definition, size 0) and branching nodes carrying color, black-height,
//! subtree size and an entry. Invariants:
//!
//! - no red node has a red child
//! - every path from a node to a terminal crosses the same number of
//!   black nodes (the stored `black_height` counts them including the
//!   node itself when it is black; `Empty` counts 0)
//! - `size == left.size + right.size + 1`
//!
//! Updates are purely functional: every operation returns a new tree
//! sharing untouched subtrees with the input. Besides single-entry
//! insertion and deletion, the tree supports `join`/`split`, which make
//! `union`/`intersection`/`difference` run in time proportional to the
//! smaller operand instead of element-by-element insertion.
//!
//! Deletion follows the splice-or-successor scheme: a node without a
//! right child is spliced out directly; otherwise its entry is replaced
//! by the in-order successor extracted from the right subtree. Removing a
//! black node leaves a black-deficiency that propagates upward through
//! the deficit rebalancers until a sibling shape absorbs it. A deficit
//! with no sibling to borrow from is an invariant violation and aborts.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::ops::Bound;

use smallvec::SmallVec;

use crate::ReferenceCounter;

// =============================================================================
// Node Definition
// =============================================================================

/// The color of a red-black tree node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Color {
    Red,
    Black,
}

/// A branching node.
pub(crate) struct TreeNode<K, V> {
    pub(crate) color: Color,
    pub(crate) black_height: u8,
    pub(crate) size: usize,
    pub(crate) left: Tree<K, V>,
    pub(crate) entry: (K, V),
    pub(crate) right: Tree<K, V>,
}

/// A persistent red-black tree.
pub(crate) enum Tree<K, V> {
    /// The unique terminal: black, size 0.
    Empty,
    /// A branching node.
    Node(ReferenceCounter<TreeNode<K, V>>),
}

impl<K, V> Clone for Tree<K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Empty => Self::Empty,
            Self::Node(node) => Self::Node(node.clone()),
        }
    }
}

/// Builds a node, deriving black-height and size from its parts.
fn make<K, V>(color: Color, left: Tree<K, V>, entry: (K, V), right: Tree<K, V>) -> Tree<K, V> {
    let black_height = left.black_height() + u8::from(color == Color::Black);
    let size = left.len() + right.len() + 1;
    Tree::Node(ReferenceCounter::new(TreeNode {
        color,
        black_height,
        size,
        left,
        entry,
        right,
    }))
}

impl<K, V> Tree<K, V> {
    /// The number of entries in this subtree.
    pub(crate) fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Node(node) => node.size,
        }
    }

    /// Returns `true` if this subtree holds no entries.
    pub(crate) const fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    fn black_height(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Node(node) => node.black_height,
        }
    }

    /// The terminal is black by definition.
    fn is_black(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Node(node) => matches!(node.color, Color::Black),
        }
    }

    fn is_red(&self) -> bool {
        !self.is_black()
    }
}

impl<K: Clone, V: Clone> Tree<K, V> {
    /// Copies the root with a new color. Painting the terminal is
    /// meaningless and therefore rejected.
    fn paint(&self, color: Color) -> Self {
        match self {
            Self::Empty => unreachable!("cannot paint the terminal node"),
            Self::Node(node) => make(
                color,
                node.left.clone(),
                node.entry.clone(),
                node.right.clone(),
            ),
        }
    }

    /// Forces the root black; used at every public boundary.
    fn blacken(self) -> Self {
        match &self {
            Self::Node(node) if node.color == Color::Red => self.paint(Color::Black),
            _ => self,
        }
    }
}

// =============================================================================
// Lookup and navigation
// =============================================================================

impl<K, V> Tree<K, V> {
    /// Finds the value stored for `key`.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self;
        while let Self::Node(node) = cursor {
            match key.cmp(node.entry.0.borrow()) {
                Ordering::Less => cursor = &node.left,
                Ordering::Greater => cursor = &node.right,
                Ordering::Equal => return Some(&node.entry.1),
            }
        }
        None
    }

    /// The entry with the smallest key, or `None` for the terminal.
    pub(crate) fn min(&self) -> Option<&(K, V)> {
        let mut cursor = self;
        let mut smallest = None;
        while let Self::Node(node) = cursor {
            smallest = Some(&node.entry);
            cursor = &node.left;
        }
        smallest
    }

    /// The entry with the largest key, or `None` for the terminal.
    pub(crate) fn max(&self) -> Option<&(K, V)> {
        let mut cursor = self;
        let mut largest = None;
        while let Self::Node(node) = cursor {
            largest = Some(&node.entry);
            cursor = &node.right;
        }
        largest
    }

    /// The entry with the smallest key `>= bound`.
    pub(crate) fn ceiling<Q>(&self, bound: &Q) -> Option<&(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self;
        let mut candidate = None;
        while let Self::Node(node) = cursor {
            match bound.cmp(node.entry.0.borrow()) {
                Ordering::Less => {
                    candidate = Some(&node.entry);
                    cursor = &node.left;
                }
                Ordering::Equal => return Some(&node.entry),
                Ordering::Greater => cursor = &node.right,
            }
        }
        candidate
    }

    /// The entry with the largest key `<= bound`.
    pub(crate) fn floor<Q>(&self, bound: &Q) -> Option<&(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self;
        let mut candidate = None;
        while let Self::Node(node) = cursor {
            match bound.cmp(node.entry.0.borrow()) {
                Ordering::Greater => {
                    candidate = Some(&node.entry);
                    cursor = &node.right;
                }
                Ordering::Equal => return Some(&node.entry),
                Ordering::Less => cursor = &node.left,
            }
        }
        candidate
    }

    /// The entry with the smallest key `> bound`.
    pub(crate) fn higher<Q>(&self, bound: &Q) -> Option<&(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self;
        let mut candidate = None;
        while let Self::Node(node) = cursor {
            if bound.cmp(node.entry.0.borrow()) == Ordering::Less {
                candidate = Some(&node.entry);
                cursor = &node.left;
            } else {
                cursor = &node.right;
            }
        }
        candidate
    }

    /// The entry with the largest key `< bound`.
    pub(crate) fn lower<Q>(&self, bound: &Q) -> Option<&(K, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut cursor = self;
        let mut candidate = None;
        while let Self::Node(node) = cursor {
            if bound.cmp(node.entry.0.borrow()) == Ordering::Greater {
                candidate = Some(&node.entry);
                cursor = &node.right;
            } else {
                cursor = &node.left;
            }
        }
        candidate
    }
}

// =============================================================================
// Insertion
// =============================================================================

impl<K: Clone + Ord, V: Clone> Tree<K, V> {
    /// Inserts an entry, returning the new tree and the replaced value if
    /// the key was already present.
    pub(crate) fn insert(&self, key: K, value: V) -> (Self, Option<V>) {
        let (tree, previous) = self.insert_rec(key, value);
        (tree.blacken(), previous)
    }

    fn insert_rec(&self, key: K, value: V) -> (Self, Option<V>) {
        match self {
            Self::Empty => (make(Color::Red, Self::Empty, (key, value), Self::Empty), None),
            Self::Node(node) => match key.cmp(&node.entry.0) {
                Ordering::Less => {
                    let (left, previous) = node.left.insert_rec(key, value);
                    (
                        balance(node.color, left, node.entry.clone(), node.right.clone()),
                        previous,
                    )
                }
                Ordering::Greater => {
                    let (right, previous) = node.right.insert_rec(key, value);
                    (
                        balance(node.color, node.left.clone(), node.entry.clone(), right),
                        previous,
                    )
                }
                Ordering::Equal => (
                    make(
                        node.color,
                        node.left.clone(),
                        (key, value),
                        node.right.clone(),
                    ),
                    Some(node.entry.1.clone()),
                ),
            },
        }
    }
}

/// Restructures the local three-node shape when a red node has gained a
/// red child, recoloring the grandparent red and both of its new children
/// black; anywhere else it just rebuilds the node.
fn balance<K: Clone, V: Clone>(
    color: Color,
    left: Tree<K, V>,
    entry: (K, V),
    right: Tree<K, V>,
) -> Tree<K, V> {
    if color == Color::Black {
        if let Tree::Node(l) = &left
            && l.color == Color::Red
        {
            if let Tree::Node(ll) = &l.left
                && ll.color == Color::Red
            {
                return make(
                    Color::Red,
                    l.left.paint(Color::Black),
                    l.entry.clone(),
                    make(Color::Black, l.right.clone(), entry, right),
                );
            }
            if let Tree::Node(lr) = &l.right
                && lr.color == Color::Red
            {
                return make(
                    Color::Red,
                    make(Color::Black, l.left.clone(), l.entry.clone(), lr.left.clone()),
                    lr.entry.clone(),
                    make(Color::Black, lr.right.clone(), entry, right),
                );
            }
        }
        if let Tree::Node(r) = &right
            && r.color == Color::Red
        {
            if let Tree::Node(rl) = &r.left
                && rl.color == Color::Red
            {
                return make(
                    Color::Red,
                    make(Color::Black, left, entry, rl.left.clone()),
                    rl.entry.clone(),
                    make(
                        Color::Black,
                        rl.right.clone(),
                        r.entry.clone(),
                        r.right.clone(),
                    ),
                );
            }
            if let Tree::Node(rr) = &r.right
                && rr.color == Color::Red
            {
                return make(
                    Color::Red,
                    make(Color::Black, left, entry, r.left.clone()),
                    r.entry.clone(),
                    r.right.paint(Color::Black),
                );
            }
        }
    }
    make(color, left, entry, right)
}

// =============================================================================
// Deletion
// =============================================================================

impl<K: Clone + Ord, V: Clone> Tree<K, V> {
    /// Removes `key`, returning the new tree and the removed value, or
    /// `None` if the key is absent.
    pub(crate) fn remove<Q>(&self, key: &Q) -> Option<(Self, V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (tree, removed, _) = self.remove_rec(key)?;
        Some((tree.blacken(), removed))
    }

    /// Recursive removal; the third component flags a black-deficiency in
    /// the returned subtree.
    fn remove_rec<Q>(&self, key: &Q) -> Option<(Self, V, bool)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Self::Node(node) = self else {
            return None;
        };
        match key.cmp(node.entry.0.borrow()) {
            Ordering::Less => {
                let (left, removed, deficient) = node.left.remove_rec(key)?;
                let (tree, still_deficient) = if deficient {
                    rebalance_left_deficit(node.color, left, node.entry.clone(), node.right.clone())
                } else {
                    (
                        make(node.color, left, node.entry.clone(), node.right.clone()),
                        false,
                    )
                };
                Some((tree, removed, still_deficient))
            }
            Ordering::Greater => {
                let (right, removed, deficient) = node.right.remove_rec(key)?;
                let (tree, still_deficient) = if deficient {
                    rebalance_right_deficit(node.color, node.left.clone(), node.entry.clone(), right)
                } else {
                    (
                        make(node.color, node.left.clone(), node.entry.clone(), right),
                        false,
                    )
                };
                Some((tree, removed, still_deficient))
            }
            Ordering::Equal => {
                let removed = node.entry.1.clone();
                if node.right.is_empty() {
                    // No right child: splice out directly.
                    let (tree, deficient) = splice(node.color, &node.left);
                    Some((tree, removed, deficient))
                } else {
                    // Replace with the in-order successor extracted from
                    // the right subtree.
                    let (right, successor, deficient) = node.right.remove_min();
                    let (tree, still_deficient) = if deficient {
                        rebalance_right_deficit(node.color, node.left.clone(), successor, right)
                    } else {
                        (make(node.color, node.left.clone(), successor, right), false)
                    };
                    Some((tree, removed, still_deficient))
                }
            }
        }
    }

    /// Removes the smallest entry of a non-empty subtree.
    fn remove_min(&self) -> (Self, (K, V), bool) {
        let Self::Node(node) = self else {
            unreachable!("remove_min on the terminal node");
        };
        if node.left.is_empty() {
            let (tree, deficient) = splice(node.color, &node.right);
            (tree, node.entry.clone(), deficient)
        } else {
            let (left, smallest, deficient) = node.left.remove_min();
            let (tree, still_deficient) = if deficient {
                rebalance_left_deficit(node.color, left, node.entry.clone(), node.right.clone())
            } else {
                (
                    make(node.color, left, node.entry.clone(), node.right.clone()),
                    false,
                )
            };
            (tree, smallest, still_deficient)
        }
    }
}

/// Splices a node out, leaving its only child (if any) in its place.
///
/// Removing a red node costs no black; removing a black node with a red
/// child repaints the child; removing a black node with no child leaves a
/// deficit for the caller to absorb.
fn splice<K: Clone, V: Clone>(color: Color, child: &Tree<K, V>) -> (Tree<K, V>, bool) {
    match child {
        Tree::Empty => (Tree::Empty, color == Color::Black),
        Tree::Node(node) if node.color == Color::Red => (child.paint(Color::Black), false),
        Tree::Node(_) => {
            unreachable!("red-black invariant violated: black child under a spliced node")
        }
    }
}

/// Absorbs a black-deficiency in the left subtree of `(color, left,
/// entry, right)`, borrowing structure from the right sibling. Returns
/// the rebuilt tree and whether the deficit moved up a level.
fn rebalance_left_deficit<K: Clone, V: Clone>(
    color: Color,
    left: Tree<K, V>,
    entry: (K, V),
    right: Tree<K, V>,
) -> (Tree<K, V>, bool) {
    match &right {
        Tree::Node(sibling) if sibling.color == Color::Black => {
            if sibling.right.is_red() {
                // Far nephew red: one rotation absorbs the deficit.
                let tree = make(
                    color,
                    make(Color::Black, left, entry, sibling.left.clone()),
                    sibling.entry.clone(),
                    sibling.right.paint(Color::Black),
                );
                (tree, false)
            } else if sibling.left.is_red() {
                // Near nephew red: double rotation.
                let Tree::Node(near) = &sibling.left else {
                    unreachable!("red subtree is a node");
                };
                let tree = make(
                    color,
                    make(Color::Black, left, entry, near.left.clone()),
                    near.entry.clone(),
                    make(
                        Color::Black,
                        near.right.clone(),
                        sibling.entry.clone(),
                        sibling.right.clone(),
                    ),
                );
                (tree, false)
            } else {
                // Both nephews black: repaint the sibling red; the deficit
                // moves up unless this node was red.
                let tree = make(Color::Black, left, entry, right.paint(Color::Red));
                (tree, color == Color::Black)
            }
        }
        Tree::Node(sibling) => {
            // Red sibling: rotate it above; the exposed black sibling
            // resolves the deficit one level down.
            debug_assert_eq!(color, Color::Black);
            let (fixed, still_deficient) =
                rebalance_left_deficit(Color::Red, left, entry, sibling.left.clone());
            debug_assert!(!still_deficient);
            (
                make(
                    Color::Black,
                    fixed,
                    sibling.entry.clone(),
                    sibling.right.clone(),
                ),
                false,
            )
        }
        Tree::Empty => {
            unreachable!("red-black invariant violated: deficit with no sibling to borrow from")
        }
    }
}

/// Mirror image of [`rebalance_left_deficit`] for a deficit in the right
/// subtree.
fn rebalance_right_deficit<K: Clone, V: Clone>(
    color: Color,
    left: Tree<K, V>,
    entry: (K, V),
    right: Tree<K, V>,
) -> (Tree<K, V>, bool) {
    match &left {
        Tree::Node(sibling) if sibling.color == Color::Black => {
            if sibling.left.is_red() {
                let tree = make(
                    color,
                    sibling.left.paint(Color::Black),
                    sibling.entry.clone(),
                    make(Color::Black, sibling.right.clone(), entry, right),
                );
                (tree, false)
            } else if sibling.right.is_red() {
                let Tree::Node(near) = &sibling.right else {
                    unreachable!("red subtree is a node");
                };
                let tree = make(
                    color,
                    make(
                        Color::Black,
                        sibling.left.clone(),
                        sibling.entry.clone(),
                        near.left.clone(),
                    ),
                    near.entry.clone(),
                    make(Color::Black, near.right.clone(), entry, right),
                );
                (tree, false)
            } else {
                let tree = make(Color::Black, left.paint(Color::Red), entry, right);
                (tree, color == Color::Black)
            }
        }
        Tree::Node(sibling) => {
            debug_assert_eq!(color, Color::Black);
            let (fixed, still_deficient) =
                rebalance_right_deficit(Color::Red, sibling.right.clone(), entry, right);
            debug_assert!(!still_deficient);
            (
                make(
                    Color::Black,
                    sibling.left.clone(),
                    sibling.entry.clone(),
                    fixed,
                ),
                false,
            )
        }
        Tree::Empty => {
            unreachable!("red-black invariant violated: deficit with no sibling to borrow from")
        }
    }
}

// =============================================================================
// Join and split
// =============================================================================

impl<K: Clone + Ord, V: Clone> Tree<K, V> {
    /// Glues `left`, `entry` and `right` into one tree; every key of
    /// `left` must order below `entry`'s key and every key of `right`
    /// above. O(|Δ black-height|).
    pub(crate) fn join(left: Self, entry: (K, V), right: Self) -> Self {
        match left.black_height().cmp(&right.black_height()) {
            Ordering::Greater => {
                let joined = join_right(left, entry, right);
                fixup_join_root(joined)
            }
            Ordering::Less => {
                let joined = join_left(left, entry, right);
                fixup_join_root(joined)
            }
            Ordering::Equal => {
                let color = if left.is_black() && right.is_black() {
                    Color::Red
                } else {
                    Color::Black
                };
                make(color, left, entry, right)
            }
        }
    }

    /// Joins two trees whose key ranges are already separated, using the
    /// largest key of `left` as the pivot.
    pub(crate) fn join2(left: Self, right: Self) -> Self {
        match left {
            Self::Empty => right,
            _ => {
                let (rest, pivot) = left.split_max();
                Self::join(rest, pivot, right)
            }
        }
    }

    /// Removes the largest entry, rejoining the remainder.
    fn split_max(&self) -> (Self, (K, V)) {
        let Self::Node(node) = self else {
            unreachable!("split_max on the terminal node");
        };
        match &node.right {
            Self::Empty => (node.left.clone(), node.entry.clone()),
            _ => {
                let (rest, largest) = node.right.split_max();
                (
                    Self::join(node.left.clone(), node.entry.clone(), rest),
                    largest,
                )
            }
        }
    }

    /// Partitions this tree around `key` into the entries ordering below
    /// it, the entry for the key itself if present, and the entries
    /// ordering above it.
    pub(crate) fn split<Q>(&self, key: &Q) -> (Self, Option<(K, V)>, Self)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self {
            Self::Empty => (Self::Empty, None, Self::Empty),
            Self::Node(node) => match key.cmp(node.entry.0.borrow()) {
                Ordering::Less => {
                    let (below, hit, above) = node.left.split(key);
                    (
                        below,
                        hit,
                        Self::join(above, node.entry.clone(), node.right.clone()),
                    )
                }
                Ordering::Greater => {
                    let (below, hit, above) = node.right.split(key);
                    (
                        Self::join(node.left.clone(), node.entry.clone(), below),
                        hit,
                        above,
                    )
                }
                Ordering::Equal => (
                    node.left.clone(),
                    Some(node.entry.clone()),
                    node.right.clone(),
                ),
            },
        }
    }

    /// Union of two trees; entries of `other` win on key conflicts.
    /// Runs in time proportional to the smaller operand.
    pub(crate) fn union(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Empty, _) => other.clone(),
            (_, Self::Empty) => self.clone(),
            (Self::Node(node), _) => {
                let (below, hit, above) = other.split(&node.entry.0);
                let left = node.left.union(&below);
                let right = node.right.union(&above);
                let entry = hit.unwrap_or_else(|| node.entry.clone());
                Self::join(left, entry, right)
            }
        }
    }

    /// Intersection of two trees, keeping the entries of `self`.
    pub(crate) fn intersection(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Empty, _) | (_, Self::Empty) => Self::Empty,
            (Self::Node(node), _) => {
                let (below, hit, above) = other.split(&node.entry.0);
                let left = node.left.intersection(&below);
                let right = node.right.intersection(&above);
                if hit.is_some() {
                    Self::join(left, node.entry.clone(), right)
                } else {
                    Self::join2(left, right)
                }
            }
        }
    }

    /// The entries of `self` whose keys are not in `other`.
    pub(crate) fn difference(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Empty, _) => Self::Empty,
            (_, Self::Empty) => self.clone(),
            (Self::Node(node), _) => {
                let (below, hit, above) = other.split(&node.entry.0);
                let left = node.left.difference(&below);
                let right = node.right.difference(&above);
                if hit.is_none() {
                    Self::join(left, node.entry.clone(), right)
                } else {
                    Self::join2(left, right)
                }
            }
        }
    }
}

/// A join may leave a red root with a red child on the joined side; the
/// root is repainted black to restore the invariant.
fn fixup_join_root<K: Clone, V: Clone>(tree: Tree<K, V>) -> Tree<K, V> {
    if let Tree::Node(node) = &tree
        && node.color == Color::Red
        && (node.left.is_red() || node.right.is_red())
    {
        return tree.paint(Color::Black);
    }
    tree
}

/// Descends the right spine of the taller `left` tree until reaching a
/// black node level with `right`, gluing there and fixing red-red pairs
/// on the way back up.
fn join_right<K: Clone + Ord, V: Clone>(
    left: Tree<K, V>,
    entry: (K, V),
    right: Tree<K, V>,
) -> Tree<K, V> {
    if left.is_black() && left.black_height() == right.black_height() {
        return make(Color::Red, left, entry, right);
    }
    let Tree::Node(node) = left else {
        unreachable!("red-black invariant violated: join descended past the terminal");
    };
    let joined = join_right(node.right.clone(), entry, right);

    if node.color == Color::Black
        && let Tree::Node(j) = &joined
        && j.color == Color::Red
        && j.right.is_red()
    {
        // Rotate the red pair leftward under a repainted nephew.
        return make(
            Color::Red,
            make(
                Color::Black,
                node.left.clone(),
                node.entry.clone(),
                j.left.clone(),
            ),
            j.entry.clone(),
            j.right.paint(Color::Black),
        );
    }
    make(node.color, node.left.clone(), node.entry.clone(), joined)
}

/// Mirror image of [`join_right`] for a taller `right` tree.
fn join_left<K: Clone + Ord, V: Clone>(
    left: Tree<K, V>,
    entry: (K, V),
    right: Tree<K, V>,
) -> Tree<K, V> {
    if right.is_black() && right.black_height() == left.black_height() {
        return make(Color::Red, left, entry, right);
    }
    let Tree::Node(node) = right else {
        unreachable!("red-black invariant violated: join descended past the terminal");
    };
    let joined = join_left(left, entry, node.left.clone());

    if node.color == Color::Black
        && let Tree::Node(j) = &joined
        && j.color == Color::Red
        && j.left.is_red()
    {
        return make(
            Color::Red,
            j.left.paint(Color::Black),
            j.entry.clone(),
            make(
                Color::Black,
                j.right.clone(),
                node.entry.clone(),
                node.right.clone(),
            ),
        );
    }
    make(node.color, joined, node.entry.clone(), node.right.clone())
}

// =============================================================================
// In-order traversal
// =============================================================================

/// In-order cursor over a tree; the stack holds the left spine of the
/// subtrees still to be visited.
pub(crate) struct InOrderCursor<'a, K, V> {
    stack: SmallVec<[&'a TreeNode<K, V>; 16]>,
}

impl<'a, K, V> InOrderCursor<'a, K, V> {
    pub(crate) fn new(tree: &'a Tree<K, V>) -> Self {
        let mut cursor = Self {
            stack: SmallVec::new(),
        };
        cursor.push_left_spine(tree);
        cursor
    }

    fn push_left_spine(&mut self, mut tree: &'a Tree<K, V>) {
        while let Tree::Node(node) = tree {
            self.stack.push(node);
            tree = &node.left;
        }
    }
}

impl<'a, K, V> Iterator for InOrderCursor<'a, K, V> {
    type Item = &'a (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(&node.right);
        Some(&node.entry)
    }
}

/// In-order cursor clamped to a key range. The bounds are owned, cloned
/// from the caller's range.
pub(crate) struct RangeCursor<'a, K, V> {
    inner: InOrderCursor<'a, K, V>,
    upper: Bound<K>,
    exhausted: bool,
}

impl<'a, K: Ord, V> RangeCursor<'a, K, V> {
    /// Opens a cursor over the entries of `tree` within `(lower, upper)`.
    pub(crate) fn new(tree: &'a Tree<K, V>, lower: Bound<K>, upper: Bound<K>) -> Self {
        let mut inner = InOrderCursor {
            stack: SmallVec::new(),
        };
        // Seed the stack with the left spine clipped at the lower bound;
        // everything reached later through a stacked node's right subtree
        // is above the bound already.
        let mut cursor = tree;
        while let Tree::Node(node) = cursor {
            let above_lower = match &lower {
                Bound::Unbounded => true,
                Bound::Included(bound) => node.entry.0 >= *bound,
                Bound::Excluded(bound) => node.entry.0 > *bound,
            };
            if above_lower {
                inner.stack.push(node);
                cursor = &node.left;
            } else {
                cursor = &node.right;
            }
        }
        Self {
            inner,
            upper,
            exhausted: false,
        }
    }
}

impl<'a, K: Ord, V> Iterator for RangeCursor<'a, K, V> {
    type Item = &'a (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let entry = self.inner.next()?;
        let within_upper = match &self.upper {
            Bound::Unbounded => true,
            Bound::Included(bound) => entry.0 <= *bound,
            Bound::Excluded(bound) => entry.0 < *bound,
        };
        if within_upper {
            Some(entry)
        } else {
            self.exhausted = true;
            None
        }
    }
}

// =============================================================================
// Integrity checks (test support)
// =============================================================================

#[cfg(test)]
impl<K: Ord, V> Tree<K, V> {
    /// Asserts every red-black invariant of this subtree and returns its
    /// black height.
    pub(crate) fn validate(&self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Node(node) => {
                if node.color == Color::Red {
                    assert!(
                        node.left.is_black() && node.right.is_black(),
                        "red node with a red child"
                    );
                }
                if let Self::Node(left) = &node.left {
                    assert!(left.entry.0 < node.entry.0, "left subtree out of order");
                }
                if let Self::Node(right) = &node.right {
                    assert!(node.entry.0 < right.entry.0, "right subtree out of order");
                }
                let left_height = node.left.validate();
                let right_height = node.right.validate();
                assert_eq!(left_height, right_height, "black height is path-dependent");
                assert_eq!(
                    node.size,
                    node.left.len() + node.right.len() + 1,
                    "stored size disagrees with subtree sizes"
                );
                let expected = left_height + u8::from(node.color == Color::Black);
                assert_eq!(node.black_height, expected, "stored black height is stale");
                expected
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
