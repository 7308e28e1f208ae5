//! Core domain types: identifiers, executors, worker slots, nodes.
//!
//! All types serialize to/from JSON so snapshots can be captured and
//! replayed in tests.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique identifier for a node (supervisor) in the cluster.
pub type NodeId = String;

/// Unique identifier for a rack in the network topography.
pub type RackId = String;

/// Unique identifier for a component within a topology.
pub type ComponentId = String;

/// Unique identifier for a topology.
pub type TopologyId = String;

// ── Executor ──────────────────────────────────────────────────────

/// The smallest schedulable unit of a topology.
///
/// An executor covers a contiguous range of task ids; the range is its
/// stable identity. Resource demands are resolved through
/// [`TopologyDetails`](crate::topology::TopologyDetails).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ExecutorId {
    pub start_task: u32,
    pub end_task: u32,
}

impl ExecutorId {
    pub fn new(start_task: u32, end_task: u32) -> Self {
        Self {
            start_task,
            end_task,
        }
    }
}

impl fmt::Display for ExecutorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start_task, self.end_task)
    }
}

// ── Worker slot ───────────────────────────────────────────────────

/// A (node, port) pair that can host one or more executors, subject to
/// the topology's per-worker heap cap.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerSlot {
    pub node_id: NodeId,
    pub port: u16,
}

impl WorkerSlot {
    pub fn new(node_id: impl Into<NodeId>, port: u16) -> Self {
        Self {
            node_id: node_id.into(),
            port,
        }
    }
}

impl fmt::Display for WorkerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.node_id, self.port)
    }
}

// ── Node ──────────────────────────────────────────────────────────

/// A worker machine with resource capacity and free worker slots.
///
/// Availability is mutated in place as executors are assigned; a node
/// lives for one scheduling call. Free slots are kept as a sorted port
/// set so slot iteration is deterministic. A slot stays in `free_slots`
/// for the whole call: the per-worker heap budget, not slot occupancy,
/// decides when no more executors fit on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub hostname: String,
    pub total_cpu: f64,
    pub total_mem: f64,
    pub avail_cpu: f64,
    pub avail_mem: f64,
    pub free_slots: BTreeSet<u16>,
}

impl Node {
    /// Create a node with full availability and the given slot ports.
    pub fn new(
        id: impl Into<NodeId>,
        hostname: impl Into<String>,
        total_cpu: f64,
        total_mem: f64,
        ports: impl IntoIterator<Item = u16>,
    ) -> Self {
        Self {
            id: id.into(),
            hostname: hostname.into(),
            total_cpu,
            total_mem,
            avail_cpu: total_cpu,
            avail_mem: total_mem,
            free_slots: ports.into_iter().collect(),
        }
    }

    pub fn has_free_slot(&self) -> bool {
        !self.free_slots.is_empty()
    }

    /// Whether the node can absorb the given demand at node granularity.
    pub fn can_fit(&self, cpu: f64, mem: f64) -> bool {
        self.avail_cpu >= cpu && self.avail_mem >= mem
    }

    pub fn slot(&self, port: u16) -> WorkerSlot {
        WorkerSlot::new(self.id.clone(), port)
    }
}
