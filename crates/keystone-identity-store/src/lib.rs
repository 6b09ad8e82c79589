//! # Keystone Identity Store - Hierarchical Node Store Abstraction
//!
//! Defines the contract the identity layer expects from a coordination-service
//! style store: a tree of nodes addressed by absolute slash-delimited paths,
//! each node holding an opaque byte payload, with children enumerable under a
//! parent.
//!
//! The store knows nothing about users or tenants. Value encoding, uniqueness
//! and relationship mirroring all live in `keystone-identity-repository`.
//!
//! ## Implementations
//!
//! - [`MemoryNodeStore`] - in-process tree for tests and development, with an
//!   explicit connect/disconnect lifecycle.
//!
//! Use [`StoreFactory`] to build a shared handle from a [`StorageConfig`].

#![deny(unsafe_code)]

use std::sync::Arc;

use async_trait::async_trait;

pub mod error;
pub mod factory;
pub mod memory;
pub mod metrics;
pub mod path;

pub use error::{StoreError, StoreResult};
pub use factory::{BackendType, StorageConfig, StoreFactory};
pub use memory::MemoryNodeStore;
pub use metrics::{MetricsSnapshot, OpTimer, StoreMetrics, StoreOp};

/// The abstract hierarchical node store interface.
///
/// Every path is absolute (`/keystone/user/42`). The root `/` always exists.
/// Implementations must report connection problems as
/// [`StoreError::Unavailable`] or [`StoreError::Timeout`], never as a missing
/// node.
#[async_trait]
pub trait NodeStore: Send + Sync {
    /// Read the payload of a node. Returns `None` if the node does not exist.
    async fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>>;

    /// List the names of the immediate children of a node, in store order.
    ///
    /// Fails with [`StoreError::NotFound`] if the node does not exist.
    async fn list_children(&self, path: &str) -> StoreResult<Vec<String>>;

    /// Create a node holding `data`, creating missing ancestors with an empty
    /// payload.
    ///
    /// Fails with [`StoreError::NodeExists`] if the node is already present.
    async fn create(&self, path: &str, data: Vec<u8>) -> StoreResult<()>;

    /// Replace the payload of an existing node.
    ///
    /// Fails with [`StoreError::NotFound`] if the node does not exist.
    async fn set(&self, path: &str, data: Vec<u8>) -> StoreResult<()>;

    /// Delete a node together with all of its descendants.
    ///
    /// Fails with [`StoreError::NotFound`] if the node does not exist.
    async fn delete_recursive(&self, path: &str) -> StoreResult<()>;

    /// Establish the session to the store. Stores without sessions succeed
    /// immediately.
    async fn connect(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Close the session. Operations fail with [`StoreError::Unavailable`]
    /// until the next [`connect`](Self::connect).
    async fn disconnect(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_connected(&self) -> bool {
        true
    }

    /// Get metrics snapshot (optional, returns None if not supported)
    fn metrics(&self) -> Option<MetricsSnapshot> {
        None
    }
}

#[async_trait]
impl<T: NodeStore + ?Sized> NodeStore for Arc<T> {
    async fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(path).await
    }

    async fn list_children(&self, path: &str) -> StoreResult<Vec<String>> {
        (**self).list_children(path).await
    }

    async fn create(&self, path: &str, data: Vec<u8>) -> StoreResult<()> {
        (**self).create(path, data).await
    }

    async fn set(&self, path: &str, data: Vec<u8>) -> StoreResult<()> {
        (**self).set(path, data).await
    }

    async fn delete_recursive(&self, path: &str) -> StoreResult<()> {
        (**self).delete_recursive(path).await
    }

    async fn connect(&self) -> StoreResult<()> {
        (**self).connect().await
    }

    async fn disconnect(&self) -> StoreResult<()> {
        (**self).disconnect().await
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn metrics(&self) -> Option<MetricsSnapshot> {
        (**self).metrics()
    }
}
