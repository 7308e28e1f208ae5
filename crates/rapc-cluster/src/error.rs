//! Error types for cluster state mutations.

use thiserror::Error;

use crate::types::NodeId;

/// Result type alias for cluster state operations.
pub type ClusterResult<T> = Result<T, ClusterError>;

/// Contract violations while mutating cluster state.
///
/// These indicate programmer error in the caller (the placement engine
/// filters candidates so that neither can occur during a normal run).
#[derive(Debug, Error)]
pub enum ClusterError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("resource underflow on node {node}: requested cpu {cpu} mem {mem}")]
    ResourceUnderflow { node: NodeId, cpu: f64, mem: f64 },
}
