//! Error types for the editing session.

use blockpad_doc::DocError;

/// Errors loading an [`EditorConfig`](crate::EditorConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
}

/// Errors reading or writing a snapshot file.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("could not replace snapshot: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Errors from the editing session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A command addressed something the active document does not have.
    #[error("document error: {0}")]
    Doc(#[from] DocError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("session shut down")]
    Shutdown,
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;
