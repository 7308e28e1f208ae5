//! Topology walker — breadth-first partial order over components.
//!
//! Traversal is undirected on purpose: feedback edges and loosely
//! connected DAGs still get fully enumerated. Do not topo-sort here.

use std::collections::{BTreeSet, VecDeque};

use rapc_cluster::{Component, ComponentId, ComponentKind, TopologyDetails};

/// Source components of a topology, in declaration order.
pub fn source_components(td: &TopologyDetails) -> Vec<&Component> {
    td.components()
        .filter(|c| c.kind == ComponentKind::Source)
        .collect()
}

/// Breadth-first partial order of components, seeded from each source
/// in the order the sources were declared.
///
/// Neighbors are the union of a component's children and parents,
/// children first. A component reachable over two paths is enqueued
/// twice but emitted once: the visited set is checked again at pop so
/// every component gets exactly one rank.
pub fn bfs_order(td: &TopologyDetails, sources: &[&Component]) -> Vec<ComponentId> {
    let mut order = Vec::new();
    let mut visited: BTreeSet<&str> = BTreeSet::new();

    for source in sources {
        if visited.contains(source.id.as_str()) {
            continue;
        }
        let mut queue: VecDeque<&Component> = VecDeque::new();
        queue.push_back(source);
        while let Some(comp) = queue.pop_front() {
            if !visited.insert(comp.id.as_str()) {
                continue;
            }
            order.push(comp.id.clone());
            let neighbors = comp.children.iter().chain(comp.parents.iter());
            for neighbor in neighbors {
                if !visited.contains(neighbor.as_str()) {
                    if let Some(next) = td.component(neighbor) {
                        queue.push_back(next);
                    }
                }
            }
        }
    }
    order
}
