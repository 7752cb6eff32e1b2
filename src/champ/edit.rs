//! Edit ownership token and per-call change record.

use crate::ReferenceCounter;

// =============================================================================
// EditOwner
// =============================================================================

/// Identity-only capability gating in-place node mutation.
///
/// Each transient façade owns at most one `EditOwner` at a time. A node may
/// be revised destructively only when the owner presented at the call site
/// is the same allocation as the owner recorded in the node — compared by
/// pointer identity, never by value. Freezing a transient drops its owner,
/// so nodes reachable from the frozen snapshot can never again match.
#[derive(Clone)]
pub(crate) struct EditOwner(ReferenceCounter<()>);

impl EditOwner {
    /// Creates a fresh owner, distinct from every other owner in the
    /// process.
    pub(crate) fn new() -> Self {
        Self(ReferenceCounter::new(()))
    }

    /// Returns `true` if `other` is the same owner allocation.
    pub(crate) fn is_same(&self, other: &Self) -> bool {
        ReferenceCounter::ptr_eq(&self.0, &other.0)
    }
}

impl std::fmt::Debug for EditOwner {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "EditOwner({:p})", ReferenceCounter::as_ptr(&self.0))
    }
}

// =============================================================================
// Change
// =============================================================================

/// Out-parameter describing what a single trie update actually did.
///
/// Exactly one node on the recursion path records the outcome; the façade
/// reads it exactly once after the call returns, to adjust its size counter
/// and to detect identity-preserving no-ops.
#[derive(Debug)]
pub(crate) struct Change<V> {
    modified: bool,
    previous: Option<V>,
}

impl<V> Change<V> {
    /// A record reporting no modification yet.
    pub(crate) const fn new() -> Self {
        Self {
            modified: false,
            previous: None,
        }
    }

    /// Records that a new entry was added.
    pub(crate) const fn record_insert(&mut self) {
        self.modified = true;
    }

    /// Records that an existing entry's value was overwritten.
    pub(crate) fn record_replace(&mut self, previous: V) {
        self.modified = true;
        self.previous = Some(previous);
    }

    /// Records that an existing entry was removed.
    pub(crate) fn record_remove(&mut self, previous: V) {
        self.modified = true;
        self.previous = Some(previous);
    }

    /// Returns `true` if any structural or value change happened.
    pub(crate) const fn is_modified(&self) -> bool {
        self.modified
    }

    /// Returns `true` if an existing entry was overwritten or removed.
    pub(crate) const fn is_replacement(&self) -> bool {
        self.previous.is_some()
    }

    /// Consumes the record, yielding the displaced value if any.
    pub(crate) fn into_previous(self) -> Option<V> {
        self.previous
    }
}

// =============================================================================
// Tests
// =============================================================================
