//! Error types shared across the pacer core and its storage adapters.

use thiserror::Error;

/// Contract violations surfaced by the session lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// `finish` was called twice without a new session in between
    #[error("session already finished")]
    SessionAlreadyFinished,
    /// `finish` was called before any session was begun
    #[error("no session has been started")]
    SessionNotStarted,
}

/// Failures reported by persistence collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while fetching document text.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("document not found: {0}")]
    NotFound(String),
    #[error("failed to read document {id}: {source}")]
    Io {
        id: String,
        #[source]
        source: std::io::Error,
    },
}

/// Everything that can go wrong while opening a reading session.
#[derive(Debug, Error)]
pub enum OpenError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
