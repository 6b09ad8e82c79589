//! In-memory node store for testing and development

use std::{
    collections::{BTreeMap, btree_map::Entry},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    MetricsSnapshot, NodeStore, OpTimer, StoreError, StoreMetrics, StoreOp, StoreResult,
    path::{self, ROOT},
};

/// In-memory hierarchical node store.
///
/// Nodes are kept in a single ordered map keyed by absolute path, so children
/// are listed in lexicographic order. The root is implicit and never stored.
///
/// Cloning the handle shares the tree. The handle starts connected; while
/// [`disconnect`](Self::disconnect)ed every operation fails with
/// [`StoreError::Unavailable`], mirroring a coordination-service session that
/// has been lost.
#[derive(Clone)]
pub struct MemoryNodeStore {
    inner: Arc<Inner>,
}

struct Inner {
    nodes: RwLock<BTreeMap<String, Vec<u8>>>,
    connected: AtomicBool,
    metrics: StoreMetrics,
}

impl MemoryNodeStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                nodes: RwLock::new(BTreeMap::new()),
                connected: AtomicBool::new(true),
                metrics: StoreMetrics::new(),
            }),
        }
    }

    /// Re-establish the session. Data written before the disconnect is kept.
    pub fn connect(&self) {
        if !self.inner.connected.swap(true, Ordering::SeqCst) {
            tracing::info!("In-memory node store session established");
        }
    }

    /// Drop the session. Subsequent operations fail until [`connect`](Self::connect).
    pub fn disconnect(&self) {
        if self.inner.connected.swap(false, Ordering::SeqCst) {
            tracing::info!("In-memory node store session closed");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::SeqCst)
    }

    /// Number of stored nodes, excluding the root.
    pub async fn node_count(&self) -> usize {
        self.inner.nodes.read().await.len()
    }

    fn ensure_connected(&self) -> StoreResult<()> {
        if self.is_connected() {
            Ok(())
        } else {
            Err(StoreError::unavailable("session to in-memory node store is closed"))
        }
    }

    /// Total payload bytes, placeholders counting as zero.
    pub async fn payload_bytes(&self) -> usize {
        self.inner.nodes.read().await.values().map(Vec::len).sum()
    }

    async fn do_get(&self, node: &str) -> StoreResult<Option<Vec<u8>>> {
        self.ensure_connected()?;
        path::validate(node)?;
        if node == ROOT {
            return Ok(Some(Vec::new()));
        }
        Ok(self.inner.nodes.read().await.get(node).cloned())
    }

    async fn do_list_children(&self, node: &str) -> StoreResult<Vec<String>> {
        self.ensure_connected()?;
        path::validate(node)?;

        let nodes = self.inner.nodes.read().await;
        if node != ROOT && !nodes.contains_key(node) {
            return Err(StoreError::not_found(node));
        }

        let prefix = path::descendant_prefix(node);
        let children = nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter_map(|(key, _)| {
                let rest = &key[prefix.len()..];
                (!rest.contains('/')).then(|| rest.to_string())
            })
            .collect();
        Ok(children)
    }

    async fn do_create(&self, node: &str, data: Vec<u8>) -> StoreResult<()> {
        self.ensure_connected()?;
        path::validate(node)?;
        if node == ROOT {
            return Err(StoreError::node_exists(node));
        }

        let mut nodes = self.inner.nodes.write().await;
        if nodes.contains_key(node) {
            return Err(StoreError::node_exists(node));
        }
        let mut added = 1;
        for ancestor in path::ancestors(node) {
            if let Entry::Vacant(slot) = nodes.entry(ancestor.to_string()) {
                slot.insert(Vec::new());
                added += 1;
            }
        }
        let bytes = data.len() as u64;
        nodes.insert(node.to_string(), data);
        self.inner.metrics.tree_grew(added, bytes);
        Ok(())
    }

    async fn do_set(&self, node: &str, data: Vec<u8>) -> StoreResult<()> {
        self.ensure_connected()?;
        path::validate(node)?;
        if node == ROOT {
            return Err(StoreError::invalid_path(node, "the root node holds no data"));
        }

        let mut nodes = self.inner.nodes.write().await;
        match nodes.get_mut(node) {
            Some(slot) => {
                let (old_len, new_len) = (slot.len() as u64, data.len() as u64);
                *slot = data;
                if new_len >= old_len {
                    self.inner.metrics.tree_grew(0, new_len - old_len);
                } else {
                    self.inner.metrics.tree_shrank(0, old_len - new_len);
                }
                Ok(())
            },
            None => Err(StoreError::not_found(node)),
        }
    }

    async fn do_delete_recursive(&self, node: &str) -> StoreResult<()> {
        self.ensure_connected()?;
        path::validate(node)?;
        if node == ROOT {
            return Err(StoreError::invalid_path(node, "the root node cannot be deleted"));
        }

        let mut nodes = self.inner.nodes.write().await;
        if !nodes.contains_key(node) {
            return Err(StoreError::not_found(node));
        }
        let prefix = path::descendant_prefix(node);
        let doomed: Vec<String> = nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .map(|(key, _)| key.clone())
            .chain(std::iter::once(node.to_string()))
            .collect();

        let mut freed = 0;
        for key in &doomed {
            freed += nodes.remove(key).map_or(0, |data| data.len() as u64);
        }
        self.inner.metrics.tree_shrank(doomed.len() as u64, freed);
        Ok(())
    }
}

impl Default for MemoryNodeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NodeStore for MemoryNodeStore {
    async fn get(&self, path: &str) -> StoreResult<Option<Vec<u8>>> {
        let timer = OpTimer::start(StoreOp::Get);
        let result = self.do_get(path).await;
        timer.finish(&self.inner.metrics, result.is_err());
        result
    }

    async fn list_children(&self, path: &str) -> StoreResult<Vec<String>> {
        let timer = OpTimer::start(StoreOp::List);
        let result = self.do_list_children(path).await;
        timer.finish(&self.inner.metrics, result.is_err());
        result
    }

    async fn create(&self, path: &str, data: Vec<u8>) -> StoreResult<()> {
        let timer = OpTimer::start(StoreOp::Create);
        let result = self.do_create(path, data).await;
        timer.finish(&self.inner.metrics, result.is_err());
        result
    }

    async fn set(&self, path: &str, data: Vec<u8>) -> StoreResult<()> {
        let timer = OpTimer::start(StoreOp::Set);
        let result = self.do_set(path, data).await;
        timer.finish(&self.inner.metrics, result.is_err());
        result
    }

    async fn delete_recursive(&self, path: &str) -> StoreResult<()> {
        let timer = OpTimer::start(StoreOp::Delete);
        let result = self.do_delete_recursive(path).await;
        timer.finish(&self.inner.metrics, result.is_err());
        result
    }

    async fn connect(&self) -> StoreResult<()> {
        MemoryNodeStore::connect(self);
        Ok(())
    }

    async fn disconnect(&self) -> StoreResult<()> {
        MemoryNodeStore::disconnect(self);
        Ok(())
    }

    fn is_connected(&self) -> bool {
        MemoryNodeStore::is_connected(self)
    }

    fn metrics(&self) -> Option<MetricsSnapshot> {
        Some(self.inner.metrics.snapshot())
    }
}
