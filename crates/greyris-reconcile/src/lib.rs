//! greyris-reconcile
//!
//! Playlist ordering core.
//!
//! Architectural decisions:
//! - Ordering is a total order over (artist, release date, track position)
//! - Identity is used only to locate an element, never to order it
//! - The remote side only supports single-element moves, so the target order
//!   is reached by a left-to-right positional alignment against a local mirror
//! - The mirror is mutated exactly like the remote side after every move
//! - No rollback: a failed move leaves a partial reorder
//!
//! Deterministic, pure logic. No HTTP, no storage. Remote access goes through
//! the [`CollectionFetcher`] and [`MoveExecutor`] traits.

mod engine;
mod error;
mod mirror;
mod order;
mod pipeline;
mod types;

pub use engine::{plan_moves, reconcile};
pub use error::{BoxError, ReconcileError};
pub use mirror::Mirror;
pub use order::{compare, is_sorted, sort_elements, Normalizer, DEFAULT_STRIP_PREFIXES};
pub use pipeline::{sort_collection, CollectionFetcher, MoveExecutor, SortOptions};
pub use types::*;
