//! Local mirror of the remote order.
//!
//! Array-backed list plus an identity -> position index. A relocation shifts
//! every element between `from` and `to` by one, so it costs O(|from - to|)
//! for both the list and the index; lookups are O(1).

use std::collections::HashMap;

use crate::{Identity, ReconcileError};

#[derive(Clone, Debug)]
pub struct Mirror<I: Identity> {
    order: Vec<I>,
    index: HashMap<I, usize>,
}

impl<I: Identity> Mirror<I> {
    /// Build a mirror from the observed remote order.
    ///
    /// Fails with [`ReconcileError::DuplicateIdentity`] if an identity repeats.
    pub fn new<It>(ids: It) -> Result<Self, ReconcileError>
    where
        It: IntoIterator<Item = I>,
    {
        let order: Vec<I> = ids.into_iter().collect();
        let mut index = HashMap::with_capacity(order.len());
        for (pos, id) in order.iter().enumerate() {
            if index.insert(id.clone(), pos).is_some() {
                return Err(ReconcileError::DuplicateIdentity {
                    identity: format!("{id:?}"),
                });
            }
        }
        Ok(Self { order, index })
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn position(&self, id: &I) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn as_slice(&self) -> &[I] {
        &self.order
    }

    pub fn into_vec(self) -> Vec<I> {
        self.order
    }

    /// Move the element at `from` so it ends up at `to`.
    ///
    /// Remove, reinsert and reindex all happen inside this call; no caller can
    /// observe the intermediate state. Out-of-range indices are a no-op that
    /// returns `false`.
    pub fn relocate(&mut self, from: usize, to: usize) -> bool {
        let len = self.order.len();
        if from >= len || to >= len {
            return false;
        }
        if from == to {
            return true;
        }

        let item = self.order.remove(from);
        self.order.insert(to, item);

        let (lo, hi) = if from < to { (from, to) } else { (to, from) };
        for pos in lo..=hi {
            if let Some(slot) = self.index.get_mut(&self.order[pos]) {
                *slot = pos;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mirror(ids: &[&'static str]) -> Mirror<&'static str> {
        Mirror::new(ids.iter().copied()).unwrap()
    }

    #[test]
    fn relocate_backward_shifts_range_right() {
        let mut m = mirror(&["a", "b", "c", "d"]);
        assert!(m.relocate(3, 1));
        assert_eq!(m.as_slice(), &["a", "d", "b", "c"]);
        assert_eq!(m.position(&"d"), Some(1));
        assert_eq!(m.position(&"b"), Some(2));
        assert_eq!(m.position(&"c"), Some(3));
        assert_eq!(m.position(&"a"), Some(0));
    }

    #[test]
    fn relocate_forward_shifts_range_left() {
        let mut m = mirror(&["a", "b", "c", "d"]);
        assert!(m.relocate(0, 2));
        assert_eq!(m.as_slice(), &["b", "c", "a", "d"]);
        for (pos, id) in m.as_slice().iter().enumerate() {
            assert_eq!(m.position(id), Some(pos));
        }
    }

    #[test]
    fn relocate_out_of_range_is_rejected() {
        let mut m = mirror(&["a", "b"]);
        assert!(!m.relocate(2, 0));
        assert!(!m.relocate(0, 5));
        assert_eq!(m.as_slice(), &["a", "b"]);
    }

    #[test]
    fn duplicate_identity_is_rejected() {
        let err = Mirror::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, ReconcileError::DuplicateIdentity { .. }));
    }

    #[test]
    fn empty_mirror() {
        let m: Mirror<u8> = Mirror::new(Vec::new()).unwrap();
        assert!(m.is_empty());
        assert_eq!(m.position(&1), None);
    }
}
