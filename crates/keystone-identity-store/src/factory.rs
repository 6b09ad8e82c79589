//! Store factory for creating node store handles
//!
//! Provides a way to build the store handle the identity layer is given,
//! without exposing backend types to the composing service.
//!
//! ```no_run
//! use keystone_identity_store::{StorageConfig, StoreFactory};
//!
//! let store = StoreFactory::create(&StorageConfig::memory())?;
//! # Ok::<(), keystone_identity_store::StoreError>(())
//! ```

use std::{str::FromStr, sync::Arc};

use crate::{MemoryNodeStore, NodeStore, StoreError, StoreResult};

/// Node store backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// In-memory tree (for testing and development)
    Memory,
}

impl FromStr for BackendType {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(BackendType::Memory),
            _ => Err(StoreError::internal(format!("Unknown backend type: {}", s))),
        }
    }
}

impl BackendType {
    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendType::Memory => "memory",
        }
    }
}

/// Configuration for the node store backend
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Backend type to use
    pub backend: BackendType,
    /// Optional connection string, e.g. an ensemble address such as `host:2181`
    pub connect_string: Option<String>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::memory()
    }
}

impl StorageConfig {
    /// Create config for the in-memory backend
    pub fn memory() -> Self {
        Self { backend: BackendType::Memory, connect_string: None }
    }
}

/// Factory for node store handles
pub struct StoreFactory;

impl StoreFactory {
    /// Create a node store handle from configuration.
    ///
    /// The returned handle is connected and ready; the caller owns its
    /// lifetime.
    pub fn create(config: &StorageConfig) -> StoreResult<Arc<dyn NodeStore>> {
        match config.backend {
            BackendType::Memory => {
                if let Some(connect) = config.connect_string.as_deref() {
                    tracing::debug!(
                        connect_string = connect,
                        "Ignoring connect string for in-memory node store"
                    );
                }
                tracing::info!(backend = config.backend.as_str(), "Node store created");
                Ok(Arc::new(MemoryNodeStore::new()))
            },
        }
    }

    /// Create a node store handle from a backend name.
    pub fn from_str(
        backend_str: &str,
        connect_string: Option<String>,
    ) -> StoreResult<Arc<dyn NodeStore>> {
        let backend = BackendType::from_str(backend_str)?;
        Self::create(&StorageConfig { backend, connect_string })
    }
}
