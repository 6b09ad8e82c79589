//! Error types for node store operations.

/// Result type alias for node store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a [`NodeStore`](crate::NodeStore).
///
/// `NotFound` and `NodeExists` describe the state of the tree and are
/// ordinary outcomes for callers to interpret. `Unavailable` and `Timeout`
/// describe the connection to the store and must never be read as "absent".
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The addressed node does not exist.
    #[error("Node not found: {path}")]
    NotFound { path: String },

    /// A node already exists at the addressed path.
    #[error("Node already exists: {path}")]
    NodeExists { path: String },

    /// The path is not a well-formed absolute node path.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The store session is gone or the store cannot be reached.
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    /// The store did not answer in time.
    #[error("Store operation timed out")]
    Timeout,

    /// Any other store-side failure.
    #[error("Internal store error: {message}")]
    Internal { message: String },
}

impl StoreError {
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn node_exists(path: impl Into<String>) -> Self {
        Self::NodeExists { path: path.into() }
    }

    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath { path: path.into(), reason: reason.into() }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into() }
    }

    pub fn timeout() -> Self {
        Self::Timeout
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }

    /// Whether this error reflects the connection rather than the tree.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Timeout)
    }
}
