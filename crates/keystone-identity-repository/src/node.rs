//! Typed access to the node store.
//!
//! [`NodeClient`] translates segment lists into paths under a [`Namespace`],
//! encodes values as JSON, and applies the identity layer's policies on top of
//! the raw store results:
//!
//! | Operation | Missing node | Node exists | Store failure |
//! |-----------|--------------|-------------|---------------|
//! | `get`     | `Ok(None)`   | decoded value, `Ok(None)` for placeholders | `Err` |
//! | `list`    | `Ok(vec![])` | child names | `Err` |
//! | `create`  | created      | fills a placeholder, otherwise `Conflict` | `Err` |
//! | `set`     | `NotFound`   | overwritten | `Err` |
//! | `delete`  | `Ok(())`     | subtree removed | `Err` |
//!
//! A placeholder is a node with an empty payload: the store materializes one
//! for every missing ancestor of a created node. It holds no entity.

use keystone_identity_store::{NodeStore, StoreError};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::{RepositoryError, RepositoryResult},
    paths::{Namespace, Segment},
};

/// Namespaced, JSON-encoding client over a [`NodeStore`].
#[derive(Clone)]
pub struct NodeClient<S: NodeStore> {
    store: S,
    namespace: Namespace,
}

impl<S: NodeStore> NodeClient<S> {
    pub fn new(store: S, namespace: Namespace) -> Self {
        Self { store, namespace }
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Access the underlying store handle.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read and decode the value at `segments`.
    ///
    /// Returns `Ok(None)` for missing nodes and placeholders. Store failures and
    /// undecodable payloads are errors, never `None`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[Segment<'_>],
    ) -> RepositoryResult<Option<T>> {
        let path = self.namespace.path(segments)?;
        match self.store.get(&path).await? {
            Some(data) if data.is_empty() => Ok(None),
            Some(data) => {
                let value = serde_json::from_slice(&data).map_err(|e| {
                    RepositoryError::Serialization(format!("{}: {}", path, e))
                })?;
                Ok(Some(value))
            },
            None => Ok(None),
        }
    }

    /// Whether the node at `segments` exists and holds a value.
    pub async fn holds_value(&self, segments: &[Segment<'_>]) -> RepositoryResult<bool> {
        let path = self.namespace.path(segments)?;
        Ok(self.store.get(&path).await?.is_some_and(|data| !data.is_empty()))
    }

    /// Names of the immediate children at `segments`; empty if the node is
    /// missing.
    pub async fn list(&self, segments: &[Segment<'_>]) -> RepositoryResult<Vec<String>> {
        let path = self.namespace.path(segments)?;
        match self.store.list_children(&path).await {
            Ok(children) => Ok(children),
            Err(StoreError::NotFound { .. }) => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    /// Create the node at `segments` holding `value`, creating ancestors as
    /// needed.
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the node already holds a value. Filling an empty
    /// placeholder is a read followed by a write, so two creates racing over
    /// the same placeholder can both succeed and the last write wins.
    pub async fn create<T: Serialize + ?Sized>(
        &self,
        segments: &[Segment<'_>],
        value: &T,
    ) -> RepositoryResult<()> {
        let path = self.namespace.path(segments)?;
        let data = serde_json::to_vec(value)?;

        match self.store.create(&path, data.clone()).await {
            Ok(()) => {
                tracing::debug!(path = %path, "Created node");
                Ok(())
            },
            // Not atomic: the node may be filled between this get and the set
            Err(StoreError::NodeExists { .. }) => match self.store.get(&path).await? {
                Some(existing) if existing.is_empty() => {
                    self.store.set(&path, data).await?;
                    tracing::debug!(path = %path, "Filled placeholder node");
                    Ok(())
                },
                _ => Err(RepositoryError::Conflict(path)),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Overwrite the value of the existing node at `segments`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the node does not exist.
    pub async fn set<T: Serialize + ?Sized>(
        &self,
        segments: &[Segment<'_>],
        value: &T,
    ) -> RepositoryResult<()> {
        let path = self.namespace.path(segments)?;
        let data = serde_json::to_vec(value)?;
        self.store.set(&path, data).await?;
        tracing::debug!(path = %path, "Updated node");
        Ok(())
    }

    /// Delete the node at `segments` and its descendants. A missing node is
    /// not an error.
    pub async fn delete(&self, segments: &[Segment<'_>]) -> RepositoryResult<()> {
        let path = self.namespace.path(segments)?;
        self.delete_path(&path).await
    }

    /// Delete the namespace root and everything under it.
    pub async fn purge(&self) -> RepositoryResult<()> {
        let root = self.namespace.root().to_string();
        self.delete_path(&root).await
    }

    async fn delete_path(&self, path: &str) -> RepositoryResult<()> {
        match self.store.delete_recursive(path).await {
            Ok(()) => {
                tracing::debug!(path = %path, "Deleted subtree");
                Ok(())
            },
            Err(StoreError::NotFound { .. }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
