//! Priority interleaver — round-robin executor stream across ranks.
//!
//! Rank = a component's position in the BFS order. Emitting position 0
//! of every rank, then position 1 of every rank, and so on spreads the
//! first-considered (and thus most desirable) nodes across components
//! instead of letting one component monopolize them.

use std::collections::{BTreeMap, BTreeSet};

use rapc_cluster::{ComponentId, ExecutorId, TopologyDetails};

/// Map each BFS rank to its component's unassigned executors, in the
/// component's executor-list order. Components with no unassigned
/// executors still occupy their rank (with an empty list).
pub fn rank_executors(
    order: &[ComponentId],
    td: &TopologyDetails,
    unassigned: &BTreeSet<ExecutorId>,
) -> BTreeMap<usize, Vec<ExecutorId>> {
    let mut ranked = BTreeMap::new();
    for (rank, comp_id) in order.iter().enumerate() {
        let execs = td
            .component(comp_id)
            .map(|comp| {
                comp.execs
                    .iter()
                    .filter(|e| unassigned.contains(e))
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        ranked.insert(rank, execs);
    }
    ranked
}

/// Flatten the rank map into one round-robin stream: position 0 of
/// rank 0, position 0 of rank 1, …, then position 1 of rank 0, and so
/// on. Exhausted ranks are silently skipped.
pub fn interleave(ranked: &BTreeMap<usize, Vec<ExecutorId>>) -> Vec<ExecutorId> {
    let longest = ranked.values().map(Vec::len).max().unwrap_or(0);
    let mut stream = Vec::with_capacity(ranked.values().map(Vec::len).sum());
    for position in 0..longest {
        for execs in ranked.values() {
            if let Some(exec) = execs.get(position) {
                stream.push(*exec);
            }
        }
    }
    stream
}
