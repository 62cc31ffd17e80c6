//! Error types for the notebook core.

use thiserror::Error;

/// Errors raised by the document tree and its gateway.
///
/// Most tree operations never fail: stale references are no-ops and broken
/// cursors are repaired in place. Only [`NotebookState::set_active`] reports
/// an unknown reference, because its caller asked for a specific page.
///
/// [`NotebookState::set_active`]: crate::NotebookState::set_active
#[derive(Debug, Error)]
pub enum NotebookError {
    /// An id passed to the tree does not resolve to an existing entity.
    #[error("Unknown reference: {0}")]
    UnknownReference(String),

    /// The persistence gateway failed.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Failures of the key-value persistence slot.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The host storage backend refused the operation (quota, permissions).
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Convenience alias that pins the error type to [`NotebookError`].
pub type Result<T> = std::result::Result<T, NotebookError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_errors_convert_into_notebook_errors() {
        let err: NotebookError = StoreError::Backend("quota exceeded".into()).into();
        assert!(err.to_string().contains("quota exceeded"));
    }
}
