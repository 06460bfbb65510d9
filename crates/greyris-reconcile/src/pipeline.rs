//! Collaborator boundary and the fetch -> sort -> reconcile flow.
//!
//! Concrete fetchers and executors (HTTP clients) live in other crates; this
//! module only defines what the core needs from them.

use tracing::info;

use crate::{
    engine, sort_elements, BoxError, Element, Identity, Mirror, ReconcileError, ReconcileReport,
};

/// Retrieves every element of a remote collection.
///
/// Implementations must return elements in the collection's true current
/// order and follow pagination themselves.
#[async_trait::async_trait]
pub trait CollectionFetcher: Send + Sync {
    type Id: Identity + Send + Sync;

    async fn fetch_all(&self, collection: &str) -> Result<Vec<Element<Self::Id>>, BoxError>;
}

/// Performs one remote single-element move.
///
/// `from` and `to` are valid positions in the collection's current state at
/// call time; `to` is the element's final position.
#[async_trait::async_trait]
pub trait MoveExecutor: Send + Sync {
    async fn move_one(&self, collection: &str, from: usize, to: usize) -> Result<(), BoxError>;
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortOptions {
    /// Plan the moves but never call the executor.
    pub dry_run: bool,
}

/// Fetch the collection, sort a copy, and reconcile the remote order onto it.
///
/// Each call owns its own mirror, so independent collections never share
/// state.
pub async fn sort_collection<F, E>(
    collection: &str,
    fetcher: &F,
    executor: &E,
    opts: SortOptions,
) -> Result<ReconcileReport, ReconcileError>
where
    F: CollectionFetcher + ?Sized,
    E: MoveExecutor + ?Sized,
{
    let snapshot = fetcher
        .fetch_all(collection)
        .await
        .map_err(|source| ReconcileError::RemoteFetchFailure { source })?;
    info!(collection, items = snapshot.len(), "fetched");

    let target = sort_elements(&snapshot);

    if opts.dry_run {
        let moves = engine::plan_moves(&snapshot, &target)?;
        info!(collection, moves = moves.len(), "dry run planned");
        return Ok(ReconcileReport {
            collection: collection.to_string(),
            total: target.len(),
            moves,
            dry_run: true,
        });
    }

    let mut mirror = Mirror::new(snapshot.into_iter().map(|e| e.id))?;
    engine::reconcile(collection, &mut mirror, &target, executor).await
}
