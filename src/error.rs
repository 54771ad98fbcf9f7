use std::time::Duration;

use thiserror::Error;

/// Failure talking to a backend, before any snapshot is looked at.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("backend i/o: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed message: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("backend closed the connection without answering")]
    Closed,

    #[error("backend rejected the request: {0}")]
    Remote(String),
}

/// A wire snapshot that does not satisfy the state invariants.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("unknown input mode {0:?}")]
    UnknownMode(String),

    #[error("modal input mode without a modal kind")]
    MissingModalKind,

    #[error("unknown modal kind {0:?}")]
    UnknownModalKind(String),

    #[error("modal kind {0:?} reported outside modal mode")]
    UnexpectedModal(String),

    #[error("editing slot {0} is out of range")]
    EditingOutOfRange(usize),

    #[error("editing_index {reported:?} disagrees with input mode slot {mode:?}")]
    EditingMismatch {
        mode: Option<usize>,
        reported: Option<usize>,
    },

    #[error("expected 4 todos, got {0}")]
    TodoCount(usize),

    #[error("selected_todo {0} is out of range")]
    SelectionOutOfRange(usize),

    #[error("progress {0} is outside [0, 1]")]
    ProgressOutOfRange(f64),

    #[error("history_index {index} is out of range for {len} notes")]
    HistoryOutOfRange { index: usize, len: usize },
}

/// Why a round-trip did not produce a new snapshot.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(#[from] SnapshotError),
}

impl SyncError {
    /// Whether the backend failed to answer at all. A rejected request or a
    /// garbled reply still proves it is reachable.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SyncError::Timeout(_) | SyncError::Backend(BackendError::Io(_) | BackendError::Closed)
        )
    }
}
