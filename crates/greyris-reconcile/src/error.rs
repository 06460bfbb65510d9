use std::fmt;

/// Error type crossing the collaborator traits.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Everything that can stop a reconciliation run. None of these are retried
/// here; retry policy belongs to the collaborator implementations.
#[derive(Debug)]
pub enum ReconcileError {
    /// Mirror and target disagree on an identity: the remote collection most
    /// likely changed between fetch and reconcile. `target_index` is `None`
    /// when the identity is in the mirror but absent from the target.
    InputInconsistency {
        identity: String,
        target_index: Option<usize>,
        moves_applied: usize,
    },
    /// The snapshot listed the same identity twice.
    DuplicateIdentity { identity: String },
    /// Fetch failed before any move was attempted.
    RemoteFetchFailure { source: BoxError },
    /// A remote move failed. Earlier moves stay applied.
    RemoteMoveFailure {
        from: usize,
        to: usize,
        moves_applied: usize,
        source: BoxError,
    },
}

impl ReconcileError {
    /// Number of moves that reached the remote side before the failure.
    pub fn moves_applied(&self) -> usize {
        match self {
            ReconcileError::InputInconsistency { moves_applied, .. }
            | ReconcileError::RemoteMoveFailure { moves_applied, .. } => *moves_applied,
            _ => 0,
        }
    }
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::InputInconsistency {
                identity,
                target_index,
                moves_applied,
            } => {
                match target_index {
                    Some(idx) => write!(
                        f,
                        "input inconsistency: {identity} (target index {idx}) not found in mirror"
                    )?,
                    None => write!(
                        f,
                        "input inconsistency: {identity} is in the mirror but missing from the target"
                    )?,
                }
                write!(
                    f,
                    "; the remote collection likely changed concurrently ({moves_applied} move(s) already applied)"
                )
            }
            ReconcileError::DuplicateIdentity { identity } => {
                write!(f, "duplicate identity in snapshot: {identity}")
            }
            ReconcileError::RemoteFetchFailure { source } => {
                write!(f, "remote fetch failed: {source}")
            }
            ReconcileError::RemoteMoveFailure {
                from,
                to,
                moves_applied,
                source,
            } => write!(
                f,
                "remote move {from}->{to} failed after {moves_applied} successful move(s); \
                 collection left partially reordered: {source}"
            ),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::RemoteFetchFailure { source }
            | ReconcileError::RemoteMoveFailure { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}
