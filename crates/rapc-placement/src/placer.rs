//! Placement engine — anchors, drifts, and records assignments.
//!
//! One call to [`compute_placement`] schedules every unassigned
//! executor of one topology, or reports a structured failure. The first
//! placement is anchored to the rack with the most aggregate free
//! resources; every later placement ranks all nodes against the
//! reference node (the node of the most recent success), so the
//! trajectory drifts through the cluster one best local choice at a
//! time. Resource accounting is immediate-write and never rolled back;
//! on failure the whole assignment is discarded here instead.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, error, warn};

use rapc_cluster::{ClusterState, ExecutorId, Node, NodeId, RackId, TopologyDetails, WorkerSlot};

use crate::error::{PlacementError, PlacementResult};
use crate::interleave::{interleave, rank_executors};
use crate::result::{SchedulingResult, SchedulingStatus};
use crate::scorer::{rank_nodes, ScoringWeights};
use crate::selector::find_slot;
use crate::walker::{bfs_order, source_components};

/// Rack with the greatest aggregate free CPU + memory.
///
/// The two axes are summed as unit-free scalars — a cheap "fattest
/// rack" heuristic, not a dimensionally consistent measure. Ties keep
/// the first rack in rack-id order; a cluster whose racks all sum to
/// zero yields `None` and the caller falls back to ranking every node.
pub fn best_rack(cluster: &ClusterState) -> Option<RackId> {
    let mut best: Option<RackId> = None;
    let mut most_res = 0.0;
    for (rack, hostnames) in cluster.racks() {
        let total: f64 = hostnames
            .iter()
            .filter_map(|h| cluster.node_by_hostname(h))
            .map(|n| n.avail_cpu + n.avail_mem)
            .sum();
        if total > most_res {
            most_res = total;
            best = Some(rack.clone());
        }
    }
    best
}

/// Per-call scheduling state: the growing assignment, the set of
/// executors placed so far, and the reference node.
struct PlacementRun<'a> {
    cluster: &'a mut ClusterState,
    td: &'a TopologyDetails,
    weights: &'a ScoringWeights,
    assignment: BTreeMap<WorkerSlot, Vec<ExecutorId>>,
    scheduled: BTreeSet<ExecutorId>,
    ref_node: Option<NodeId>,
}

impl<'a> PlacementRun<'a> {
    fn new(
        cluster: &'a mut ClusterState,
        td: &'a TopologyDetails,
        weights: &'a ScoringWeights,
    ) -> Self {
        Self {
            cluster,
            td,
            weights,
            assignment: BTreeMap::new(),
            scheduled: BTreeSet::new(),
            ref_node: None,
        }
    }

    /// Place one executor: rank candidates, pick a slot, commit.
    ///
    /// Returns `Ok(false)` when nothing fits — per-executor misses are
    /// accumulated, and only the end-of-call aggregate decides failure.
    fn place(&mut self, exec: ExecutorId) -> PlacementResult<bool> {
        let task_cpu = self
            .td
            .total_cpu_req_task(&exec)
            .ok_or(PlacementError::UnknownExecutor(exec))?;
        let task_mem = self
            .td
            .total_mem_req_task(&exec)
            .ok_or(PlacementError::UnknownExecutor(exec))?;

        // Before the first success, stay inside the fattest rack (the
        // network term is zero anyway); afterwards every free node
        // competes, weighted by distance to the reference node.
        let ranked = {
            let candidates: Vec<&Node> = if self.ref_node.is_none() {
                match best_rack(self.cluster) {
                    Some(rack) => self.cluster.rack_nodes(&rack),
                    None => self.cluster.free_nodes(),
                }
            } else {
                self.cluster.free_nodes()
            };
            rank_nodes(
                self.cluster,
                &candidates,
                task_cpu,
                task_mem,
                self.ref_node.as_ref(),
                self.weights,
            )
        };

        let Some(slot) = find_slot(self.cluster, &ranked, &self.assignment, self.td, task_mem)?
        else {
            error!(executor = %exec, "not enough resources to place executor");
            return Ok(false);
        };

        let node_id = slot.node_id.clone();
        self.assignment.entry(slot.clone()).or_default().push(exec);
        self.cluster.consume(&node_id, task_cpu, task_mem)?;
        self.scheduled.insert(exec);
        if let Some(node) = self.cluster.node(&node_id) {
            debug!(
                executor = %exec,
                slot = %slot,
                avail_cpu = node.avail_cpu,
                avail_mem = node.avail_mem,
                "executor placed"
            );
        }
        self.ref_node = Some(node_id);
        Ok(true)
    }
}

/// Schedule one topology's unassigned executors onto the cluster.
///
/// Returns `Ok` with a [`SchedulingResult`] for every well-formed
/// input; `Err` is reserved for contract violations (executors without
/// resource declarations, broken cluster bookkeeping).
pub fn compute_placement(
    cluster: &mut ClusterState,
    td: &TopologyDetails,
    weights: &ScoringWeights,
) -> PlacementResult<SchedulingResult> {
    debug!(topology = td.id(), "{}", cluster.summary());

    if cluster.free_nodes().is_empty() {
        warn!("no available nodes to schedule tasks on");
        return Ok(SchedulingResult::failure(
            SchedulingStatus::NotEnoughResources,
            "no available nodes to schedule tasks on",
        ));
    }

    let sources = source_components(td);
    if sources.is_empty() {
        error!(topology = td.id(), "cannot find a source component");
        return Ok(SchedulingResult::failure(
            SchedulingStatus::InvalidTopology,
            "cannot find a source component",
        ));
    }

    let unassigned = cluster.unassigned_executors(td.id());
    debug!(
        topology = td.id(),
        executors = unassigned.len(),
        "executors needing placement"
    );

    let order = bfs_order(td, &sources);
    let stream = interleave(&rank_executors(&order, td, &unassigned));

    let mut run = PlacementRun::new(cluster, td, weights);
    for exec in stream {
        run.place(exec)?;
    }

    // Executors in no component (system tasks) never entered the
    // interleaved stream; give them, and anything the first pass could
    // not fit, one best-effort pass in executor-id order.
    let leftovers: Vec<ExecutorId> = unassigned
        .iter()
        .filter(|e| !run.scheduled.contains(e))
        .copied()
        .collect();
    for exec in leftovers {
        run.place(exec)?;
    }

    let unplaced = unassigned
        .iter()
        .filter(|e| !run.scheduled.contains(e))
        .count();
    if unplaced > 0 {
        error!(
            topology = td.id(),
            unplaced, "not all executors could be placed; discarding assignment"
        );
        let placed_before = td.executor_count() - unassigned.len();
        return Ok(SchedulingResult::failure(
            SchedulingStatus::NotEnoughResources,
            format!(
                "{placed_before}/{} executors scheduled",
                td.executor_count()
            ),
        ));
    }

    debug!(topology = td.id(), "all executors placed");
    Ok(SchedulingResult::success(run.assignment, "fully scheduled"))
}
