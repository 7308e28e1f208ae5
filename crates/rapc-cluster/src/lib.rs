//! rapc-cluster — cluster and topology views for the RAPC placement engine.
//!
//! Holds the data the scheduler consumes: a mutable [`ClusterState`]
//! snapshot (nodes, worker slots, rack topography, unassigned executors)
//! and a read-only [`TopologyDetails`] view (components, executor
//! resource demands, the per-worker heap cap).
//!
//! The cluster state is exclusively owned for the duration of one
//! scheduling call: ranking and selection take immutable borrows, and
//! only [`ClusterState::consume`] mutates node availability.

pub mod cluster;
pub mod error;
pub mod topology;
pub mod types;

pub use cluster::ClusterState;
pub use error::{ClusterError, ClusterResult};
pub use topology::{Component, ComponentKind, TopologyDetails};
pub use types::{ComponentId, ExecutorId, Node, NodeId, RackId, TopologyId, WorkerSlot};
