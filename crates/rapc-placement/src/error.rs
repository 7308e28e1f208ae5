//! Placement engine error types.

use thiserror::Error;

use rapc_cluster::{ClusterError, ExecutorId};

/// Result type alias for placement operations.
pub type PlacementResult<T> = Result<T, PlacementError>;

/// Contract violations during a placement run.
///
/// Distinct from [`SchedulingResult::Failure`](crate::SchedulingResult):
/// a failure is a business outcome (the cluster cannot host the
/// topology), an error means the inputs broke the engine's contract.
#[derive(Debug, Error)]
pub enum PlacementError {
    #[error("executor {0} has no resource declaration in the topology")]
    UnknownExecutor(ExecutorId),

    #[error(transparent)]
    Cluster(#[from] ClusterError),
}
