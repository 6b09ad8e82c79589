//! Repository error types for identity operations.
//!
//! This module provides a [`RepositoryError`] enum that wraps node store errors
//! and adds the identity-level failures: uniqueness violations and bad
//! credentials.

use keystone_identity_store::StoreError;

/// Result type alias for repository operations.
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Errors that can occur during repository operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The entity or node targeted by a read-modify-write was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// An entity with the same id already exists.
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// Another entity of the same kind already uses the name.
    #[error("Duplicate name: {0}")]
    DuplicateName(String),

    /// A node the operation meant to create already holds a value.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unknown user, wrong password, or tenant the user does not belong to.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// The store could not be reached. Never means "absent".
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store did not answer in time.
    #[error("Operation timed out")]
    Timeout,

    /// A stored value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Input rejected before touching the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Internal error in the repository or store.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for RepositoryError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { path } => RepositoryError::NotFound(path),
            StoreError::NodeExists { path } => RepositoryError::Conflict(path),
            StoreError::InvalidPath { path, reason } => {
                RepositoryError::Validation(format!("{}: {}", path, reason))
            },
            StoreError::Unavailable { message } => RepositoryError::StoreUnavailable(message),
            StoreError::Timeout => RepositoryError::Timeout,
            StoreError::Internal { message } => RepositoryError::Internal(message),
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Serialization(err.to_string())
    }
}
