use std::fmt::Debug;
use std::hash::Hash;

/// Bound shared by every identity type the reconciler can track.
///
/// Identities only need equality (plus hashing for the mirror index); they are
/// never compared for ordering.
pub trait Identity: Clone + Eq + Hash + Debug {}

impl<T: Clone + Eq + Hash + Debug> Identity for T {}

/// Ordering metadata of one element.
///
/// `group_key` is private: the only way to build a key is through
/// [`crate::Normalizer::key`], so the stored group label is always the
/// case-folded, prefix-stripped form.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SortKey {
    pub(crate) group_key: String,
    /// Lexicographically comparable secondary key (e.g. `1969-09-26`).
    pub sub_key: String,
    /// Integer ordering inside equal `sub_key`s (e.g. disc/track position).
    pub tie_break: i64,
}

impl SortKey {
    pub fn group_key(&self) -> &str {
        &self.group_key
    }
}

/// One item of the remote ordered collection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element<I> {
    pub id: I,
    pub key: SortKey,
}

impl<I> Element<I> {
    pub fn new(id: I, key: SortKey) -> Self {
        Self { id, key }
    }
}

/// Single-element relocation: remove at `from`, reinsert so it lands at `to`.
///
/// Both indices are 0-based positions in the collection's state at the moment
/// the move is issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MoveOp {
    pub from: usize,
    pub to: usize,
}

impl MoveOp {
    pub fn new(from: usize, to: usize) -> Self {
        Self { from, to }
    }
}

/// Outcome of one reconciliation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconcileReport {
    pub collection: String,
    /// Number of elements in the collection.
    pub total: usize,
    /// Moves in issue order. For a dry run these were planned, not applied.
    pub moves: Vec<MoveOp>,
    pub dry_run: bool,
}

impl ReconcileReport {
    pub fn is_noop(&self) -> bool {
        self.moves.is_empty()
    }
}
