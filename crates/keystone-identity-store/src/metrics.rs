//! Node store operation metrics
//!
//! Every store call is counted per [`StoreOp`] with its latency and whether it
//! failed. Child listings are kept apart from point reads so callers can see
//! how much of their read traffic is name scans.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::{Duration, Instant},
};

/// The node store primitive being measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Get,
    List,
    Create,
    Set,
    Delete,
}

impl StoreOp {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            StoreOp::Get => 0,
            StoreOp::List => 1,
            StoreOp::Create => 2,
            StoreOp::Set => 3,
            StoreOp::Delete => 4,
        }
    }
}

#[derive(Debug, Default)]
struct OpCounter {
    calls: AtomicU64,
    failures: AtomicU64,
    micros: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default)]
struct OpTotals {
    calls: u64,
    failures: u64,
    micros: u64,
}

impl OpCounter {
    fn totals(&self) -> OpTotals {
        OpTotals {
            calls: self.calls.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            micros: self.micros.load(Ordering::Relaxed),
        }
    }

    fn clear(&self) {
        self.calls.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
        self.micros.store(0, Ordering::Relaxed);
    }
}

impl std::ops::Add for OpTotals {
    type Output = OpTotals;

    fn add(self, other: OpTotals) -> OpTotals {
        OpTotals {
            calls: self.calls + other.calls,
            failures: self.failures + other.failures,
            micros: self.micros + other.micros,
        }
    }
}

impl OpTotals {
    fn avg_micros(&self) -> u64 {
        if self.calls > 0 { self.micros / self.calls } else { 0 }
    }
}

/// Counters for node store operations plus the current tree size.
#[derive(Debug, Default)]
pub struct StoreMetrics {
    ops: [OpCounter; StoreOp::COUNT],
    nodes: AtomicU64,
    bytes: AtomicU64,
}

impl StoreMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, op: StoreOp, elapsed: Duration, failed: bool) {
        let counter = &self.ops[op.index()];
        counter.calls.fetch_add(1, Ordering::Relaxed);
        counter.micros.fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
        if failed {
            counter.failures.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Nodes and payload bytes added to the tree, placeholders included.
    pub fn tree_grew(&self, nodes: u64, bytes: u64) {
        self.nodes.fetch_add(nodes, Ordering::Relaxed);
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Nodes and payload bytes removed from the tree.
    pub fn tree_shrank(&self, nodes: u64, bytes: u64) {
        self.nodes.fetch_sub(nodes, Ordering::Relaxed);
        self.bytes.fetch_sub(bytes, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let totals = |op: StoreOp| self.ops[op.index()].totals();
        let (get, list) = (totals(StoreOp::Get), totals(StoreOp::List));
        let (create, set) = (totals(StoreOp::Create), totals(StoreOp::Set));
        let delete = totals(StoreOp::Delete);
        let reads = get + list;
        let writes = create + set;

        MetricsSnapshot {
            get_count: get.calls,
            list_count: list.calls,
            read_errors: reads.failures,
            read_avg_latency_us: reads.avg_micros(),
            create_count: create.calls,
            set_count: set.calls,
            write_count: writes.calls,
            write_errors: writes.failures,
            write_avg_latency_us: writes.avg_micros(),
            delete_count: delete.calls,
            delete_errors: delete.failures,
            total_nodes: self.nodes.load(Ordering::Relaxed),
            total_bytes: self.bytes.load(Ordering::Relaxed),
        }
    }

    /// Zero the operation counters. Tree size describes the store, not the
    /// traffic, and is kept.
    pub fn reset(&self) {
        for counter in &self.ops {
            counter.clear();
        }
    }
}

/// Point-in-time copy of [`StoreMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub get_count: u64,
    pub list_count: u64,
    pub read_errors: u64,
    pub read_avg_latency_us: u64,
    pub create_count: u64,
    pub set_count: u64,
    /// Creates plus sets.
    pub write_count: u64,
    pub write_errors: u64,
    pub write_avg_latency_us: u64,
    pub delete_count: u64,
    pub delete_errors: u64,
    pub total_nodes: u64,
    pub total_bytes: u64,
}

/// Times one store call and records it on completion.
pub struct OpTimer {
    op: StoreOp,
    start: Instant,
}

impl OpTimer {
    pub fn start(op: StoreOp) -> Self {
        Self { op, start: Instant::now() }
    }

    pub fn finish(self, metrics: &StoreMetrics, failed: bool) {
        metrics.record(self.op, self.start.elapsed(), failed);
    }
}
