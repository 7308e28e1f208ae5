//! Scheduling outcome types.

use std::collections::BTreeMap;

use rapc_cluster::{ExecutorId, WorkerSlot};

/// Why a scheduling call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulingStatus {
    /// One or more executors could not be placed anywhere.
    NotEnoughResources,
    /// The topology has no source component.
    InvalidTopology,
}

/// Outcome of one scheduling call.
///
/// On success the assignment maps every slot used to the executors
/// co-located on it. On failure no assignment is returned — partial
/// placements are discarded wholesale by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulingResult {
    Success {
        assignment: BTreeMap<WorkerSlot, Vec<ExecutorId>>,
        message: String,
    },
    Failure {
        status: SchedulingStatus,
        message: String,
    },
}

impl SchedulingResult {
    pub fn success(
        assignment: BTreeMap<WorkerSlot, Vec<ExecutorId>>,
        message: impl Into<String>,
    ) -> Self {
        Self::Success {
            assignment,
            message: message.into(),
        }
    }

    pub fn failure(status: SchedulingStatus, message: impl Into<String>) -> Self {
        Self::Failure {
            status,
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn assignment(&self) -> Option<&BTreeMap<WorkerSlot, Vec<ExecutorId>>> {
        match self {
            Self::Success { assignment, .. } => Some(assignment),
            Self::Failure { .. } => None,
        }
    }

    pub fn status(&self) -> Option<SchedulingStatus> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { status, .. } => Some(*status),
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_exposes_assignment() {
        let mut assignment = BTreeMap::new();
        assignment.insert(WorkerSlot::new("n1", 6700), vec![ExecutorId::new(0, 0)]);
        let result = SchedulingResult::success(assignment, "fully scheduled");

        assert!(result.is_success());
        assert_eq!(result.assignment().unwrap().len(), 1);
        assert_eq!(result.status(), None);
        assert_eq!(result.message(), "fully scheduled");
    }

    #[test]
    fn failure_withholds_assignment() {
        let result = SchedulingResult::failure(
            SchedulingStatus::NotEnoughResources,
            "0/1 executors scheduled",
        );

        assert!(!result.is_success());
        assert!(result.assignment().is_none());
        assert_eq!(result.status(), Some(SchedulingStatus::NotEnoughResources));
    }
}
