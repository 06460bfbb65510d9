use std::collections::HashSet;

use tracing::{debug, info};

use crate::{Element, Identity, Mirror, MoveExecutor, MoveOp, ReconcileError, ReconcileReport};

/// Up-front checks that do not depend on mirror state: no repeated identity
/// in the target, and equal sizes.
///
/// When the sizes differ the identity sets cannot match, so the offending
/// identity is reported right away: first one the mirror holds but the target
/// lacks (a remote deletion), else the first target identity the mirror lacks.
fn check_target<I: Identity>(mirror: &Mirror<I>, target: &[Element<I>]) -> Result<(), ReconcileError> {
    let mut seen: HashSet<&I> = HashSet::with_capacity(target.len());
    for el in target {
        if !seen.insert(&el.id) {
            return Err(ReconcileError::DuplicateIdentity {
                identity: format!("{:?}", el.id),
            });
        }
    }

    if mirror.len() == target.len() {
        return Ok(());
    }
    if let Some(gone) = mirror.as_slice().iter().find(|id| !seen.contains(id)) {
        return Err(ReconcileError::InputInconsistency {
            identity: format!("{gone:?}"),
            target_index: None,
            moves_applied: 0,
        });
    }
    match target
        .iter()
        .enumerate()
        .find(|(_, el)| mirror.position(&el.id).is_none())
    {
        Some((idx, el)) => Err(ReconcileError::InputInconsistency {
            identity: format!("{:?}", el.id),
            target_index: Some(idx),
            moves_applied: 0,
        }),
        // Unreachable with a duplicate-free mirror and target.
        None => Ok(()),
    }
}

/// Decide what (if anything) must move so that `target[new_index]` sits at
/// `new_index` in the current mirror.
fn step<I: Identity>(
    mirror: &Mirror<I>,
    new_index: usize,
    element: &Element<I>,
    moves_applied: usize,
) -> Result<Option<MoveOp>, ReconcileError> {
    let old_index = mirror
        .position(&element.id)
        .ok_or_else(|| ReconcileError::InputInconsistency {
            identity: format!("{:?}", element.id),
            target_index: Some(new_index),
            moves_applied,
        })?;

    if old_index == new_index {
        Ok(None)
    } else {
        Ok(Some(MoveOp::new(old_index, new_index)))
    }
}

/// Compute the move sequence turning `initial` into `target` without touching
/// anything remote.
///
/// Applying the returned moves one by one (remove at `from`, insert at `to`)
/// to `initial` yields exactly `target`.
pub fn plan_moves<I: Identity>(
    initial: &[Element<I>],
    target: &[Element<I>],
) -> Result<Vec<MoveOp>, ReconcileError> {
    let mut mirror = Mirror::new(initial.iter().map(|e| e.id.clone()))?;
    check_target(&mirror, target)?;

    let mut moves = Vec::new();
    for (new_index, element) in target.iter().enumerate() {
        if let Some(mv) = step(&mirror, new_index, element, moves.len())? {
            let relocated = mirror.relocate(mv.from, mv.to);
            debug_assert!(relocated, "planned move {mv:?} out of mirror range");
            moves.push(mv);
        }
    }
    Ok(moves)
}

/// Issue the moves that converge the remote collection (mirrored by `mirror`)
/// onto `target`.
///
/// Single left-to-right pass. For every target position the element's current
/// index is looked up in the mirror as it stands *now*; if it differs, the
/// move is sent to `executor`, awaited, and only then replayed on the mirror.
/// After position `k` is processed, `mirror[..=k] == target[..=k]`.
///
/// On error the mirror reflects exactly the moves that succeeded remotely.
pub async fn reconcile<I, E>(
    collection: &str,
    mirror: &mut Mirror<I>,
    target: &[Element<I>],
    executor: &E,
) -> Result<ReconcileReport, ReconcileError>
where
    I: Identity,
    E: MoveExecutor + ?Sized,
{
    check_target(mirror, target)?;

    let mut moves: Vec<MoveOp> = Vec::new();
    for (new_index, element) in target.iter().enumerate() {
        let Some(mv) = step(mirror, new_index, element, moves.len())? else {
            continue;
        };

        debug!(collection, from = mv.from, to = mv.to, "move");
        executor
            .move_one(collection, mv.from, mv.to)
            .await
            .map_err(|source| ReconcileError::RemoteMoveFailure {
                from: mv.from,
                to: mv.to,
                moves_applied: moves.len(),
                source,
            })?;

        let relocated = mirror.relocate(mv.from, mv.to);
        debug_assert!(relocated, "applied move {mv:?} out of mirror range");
        moves.push(mv);
    }

    info!(collection, total = target.len(), moves = moves.len(), "reconciled");

    Ok(ReconcileReport {
        collection: collection.to_string(),
        total: target.len(),
        moves,
        dry_run: false,
    })
}
