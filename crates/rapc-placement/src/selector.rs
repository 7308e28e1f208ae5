//! Slot selection under the per-worker heap budget.
//!
//! Walks nodes in rank order and each node's slots in port order,
//! returning the first slot whose remaining heap budget covers the
//! task. Only memory is checked at slot granularity — CPU is accounted
//! at the node level, where the ranker's eligibility filter already
//! applied it.

use std::collections::BTreeMap;

use rapc_cluster::{ClusterState, ExecutorId, TopologyDetails, WorkerSlot};

use crate::error::{PlacementError, PlacementResult};
use crate::scorer::RankedNode;

/// Memory already committed to a slot by the in-progress assignment.
pub fn slot_scheduled_mem(
    assignment: &BTreeMap<WorkerSlot, Vec<ExecutorId>>,
    td: &TopologyDetails,
    slot: &WorkerSlot,
) -> PlacementResult<f64> {
    let Some(execs) = assignment.get(slot) else {
        return Ok(0.0);
    };
    let mut total = 0.0;
    for exec in execs {
        total += td
            .total_mem_req_task(exec)
            .ok_or(PlacementError::UnknownExecutor(*exec))?;
    }
    Ok(total)
}

/// First slot, in rank then port order, that can take `task_mem` more
/// memory under the topology's per-worker heap cap. `None` means no
/// slot fits anywhere.
pub fn find_slot(
    cluster: &ClusterState,
    ranked: &[RankedNode],
    assignment: &BTreeMap<WorkerSlot, Vec<ExecutorId>>,
    td: &TopologyDetails,
    task_mem: f64,
) -> PlacementResult<Option<WorkerSlot>> {
    let max_heap = td.worker_max_heap_size();
    for candidate in ranked {
        let Some(node) = cluster.node(&candidate.node_id) else {
            continue;
        };
        for port in &node.free_slots {
            let slot = node.slot(*port);
            let used = slot_scheduled_mem(assignment, td, &slot)?;
            if max_heap - used >= task_mem {
                return Ok(Some(slot));
            }
        }
    }
    Ok(None)
}
