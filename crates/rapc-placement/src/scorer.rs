//! Node ranking for placement decisions.
//!
//! Each eligible node gets a scalar distance from the executor's demand
//! vector: CPU pressure and memory pressure relative to the node's
//! remaining availability, plus network distance to the reference node.
//! Lower is better; a node that ends up fullest after the placement
//! ranks first, so the topology packs tight and stays local.

use tracing::warn;

use rapc_cluster::{ClusterState, Node, NodeId};

/// Weights for the three distance terms.
#[derive(Debug, Clone, Copy)]
pub struct ScoringWeights {
    /// Scales the CPU pressure term.
    pub cpu: f64,
    /// Scales the memory pressure term.
    pub mem: f64,
    /// Scales the network distance term.
    pub network: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            cpu: 1.0,
            mem: 1.0,
            network: 1.0,
        }
    }
}

/// One node's composite distance for the executor under consideration.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedNode {
    pub node_id: NodeId,
    pub distance: f64,
}

/// Topological distance between two nodes: 0.0 same node, 0.5 same
/// rack, 1.0 otherwise. A node whose rack cannot be identified is
/// maximally remote (the miss is logged by `rack_of`).
pub fn topo_dist(cluster: &ClusterState, src: &Node, dest: &Node) -> f64 {
    if src.id == dest.id {
        return 0.0;
    }
    match (cluster.rack_of(src), cluster.rack_of(dest)) {
        (Some(a), Some(b)) if a == b => 0.5,
        _ => 1.0,
    }
}

/// Rank candidate nodes by ascending distance from the task's demand.
///
/// Candidates missing a free slot or lacking the resources at node
/// granularity are dropped. Equal distances are broken by node id so
/// the ordering is stable across runs.
pub fn rank_nodes(
    cluster: &ClusterState,
    candidates: &[&Node],
    task_cpu: f64,
    task_mem: f64,
    ref_node: Option<&NodeId>,
    weights: &ScoringWeights,
) -> Vec<RankedNode> {
    let ref_node = ref_node.and_then(|id| {
        let node = cluster.node(id);
        if node.is_none() {
            warn!(node = %id, "reference node missing from cluster state");
        }
        node
    });

    let mut ranked: Vec<RankedNode> = candidates
        .iter()
        .filter(|n| n.has_free_slot() && n.can_fit(task_cpu, task_mem))
        .map(|n| {
            let a = (task_cpu - n.avail_cpu) / (n.avail_cpu + 1.0) * weights.cpu;
            let b = (task_mem - n.avail_mem) / (n.avail_mem + 1.0) * weights.mem;
            let c = match ref_node {
                Some(r) => topo_dist(cluster, r, n) * weights.network,
                None => 0.0,
            };
            RankedNode {
                node_id: n.id.clone(),
                distance: (a * a + b * b + c * c).sqrt(),
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.node_id.cmp(&b.node_id))
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_node(id: &str, host: &str, avail_cpu: f64, avail_mem: f64) -> Node {
        let mut node = Node::new(id, host, 100.0, 100.0, [6700]);
        node.avail_cpu = avail_cpu;
        node.avail_mem = avail_mem;
        node
    }

    fn cluster_with(nodes: Vec<Node>) -> ClusterState {
        let mut cluster = ClusterState::new();
        let hostnames: Vec<String> = nodes.iter().map(|n| n.hostname.clone()).collect();
        for node in nodes {
            cluster.add_node(node);
        }
        cluster.add_rack("r1", hostnames);
        cluster
    }

    fn ids(ranked: &[RankedNode]) -> Vec<&str> {
        ranked.iter().map(|r| r.node_id.as_str()).collect()
    }

    #[test]
    fn fuller_node_ranks_first() {
        // n1 will be nearly saturated by the task; n2 has plenty left.
        let cluster = cluster_with(vec![
            make_node("n1", "h1", 2.0, 2.0),
            make_node("n2", "h2", 50.0, 50.0),
        ]);
        let candidates = cluster.free_nodes();

        let ranked = rank_nodes(
            &cluster,
            &candidates,
            1.0,
            1.0,
            None,
            &ScoringWeights::default(),
        );

        assert_eq!(ids(&ranked), vec!["n1", "n2"]);
        assert!(ranked[0].distance < ranked[1].distance);
    }

    #[test]
    fn nodes_that_cannot_fit_are_dropped() {
        let cluster = cluster_with(vec![
            make_node("n1", "h1", 0.5, 10.0),
            make_node("n2", "h2", 10.0, 0.5),
            make_node("n3", "h3", 10.0, 10.0),
        ]);
        let candidates = cluster.free_nodes();

        let ranked = rank_nodes(
            &cluster,
            &candidates,
            1.0,
            1.0,
            None,
            &ScoringWeights::default(),
        );

        assert_eq!(ids(&ranked), vec!["n3"]);
    }

    #[test]
    fn slotless_nodes_are_dropped() {
        let mut slotless = make_node("n1", "h1", 10.0, 10.0);
        slotless.free_slots.clear();
        let cluster = cluster_with(vec![slotless, make_node("n2", "h2", 10.0, 10.0)]);
        let candidates: Vec<&Node> = cluster.nodes().collect();

        let ranked = rank_nodes(
            &cluster,
            &candidates,
            1.0,
            1.0,
            None,
            &ScoringWeights::default(),
        );

        assert_eq!(ids(&ranked), vec!["n2"]);
    }

    #[test]
    fn reference_node_pulls_ranking_toward_its_rack() {
        let mut cluster = ClusterState::new();
        cluster.add_node(make_node("n1", "h1", 10.0, 10.0));
        cluster.add_node(make_node("n2", "h2", 10.0, 10.0));
        cluster.add_node(make_node("n3", "h3", 10.0, 10.0));
        cluster.add_rack("r1", ["h1", "h2"]);
        cluster.add_rack("r2", ["h3"]);
        let candidates = cluster.free_nodes();

        let ref_node = "n1".to_string();
        let ranked = rank_nodes(
            &cluster,
            &candidates,
            1.0,
            1.0,
            Some(&ref_node),
            &ScoringWeights::default(),
        );

        // Same node < same rack < other rack; resource terms are equal.
        assert_eq!(ids(&ranked), vec!["n1", "n2", "n3"]);
    }

    #[test]
    fn rackless_node_is_maximally_remote() {
        let mut cluster = ClusterState::new();
        cluster.add_node(make_node("n1", "h1", 10.0, 10.0));
        cluster.add_node(make_node("n2", "h2", 10.0, 10.0));
        cluster.add_rack("r1", ["h1"]);

        let n1 = cluster.node("n1").unwrap();
        let n2 = cluster.node("n2").unwrap();
        assert_eq!(topo_dist(&cluster, n1, n2), 1.0);
        assert_eq!(topo_dist(&cluster, n2, n2), 0.0);
    }

    #[test]
    fn no_reference_node_zeroes_the_network_term() {
        let mut cluster = ClusterState::new();
        cluster.add_node(make_node("n1", "h1", 10.0, 10.0));
        cluster.add_node(make_node("n2", "h2", 10.0, 10.0));
        cluster.add_rack("r1", ["h1"]);
        cluster.add_rack("r2", ["h2"]);
        let candidates = cluster.free_nodes();

        let ranked = rank_nodes(
            &cluster,
            &candidates,
            1.0,
            1.0,
            None,
            &ScoringWeights::default(),
        );

        // Identical resources, no network term: pure id tie-break.
        assert_eq!(ranked[0].distance, ranked[1].distance);
        assert_eq!(ids(&ranked), vec!["n1", "n2"]);
    }

    #[test]
    fn zero_weights_tie_every_node() {
        let cluster = cluster_with(vec![
            make_node("n1", "h1", 2.0, 2.0),
            make_node("n2", "h2", 50.0, 50.0),
        ]);
        let candidates = cluster.free_nodes();
        let weights = ScoringWeights {
            cpu: 0.0,
            mem: 0.0,
            network: 0.0,
        };

        let ranked = rank_nodes(&cluster, &candidates, 1.0, 1.0, None, &weights);

        assert_eq!(ranked[0].distance, 0.0);
        assert_eq!(ranked[1].distance, 0.0);
        assert_eq!(ids(&ranked), vec!["n1", "n2"]);
    }

    #[test]
    fn zeroed_axis_is_ignored() {
        // n1 is much emptier on memory; with mem weight zero the two
        // nodes differ only by CPU, where n2 is tighter.
        let cluster = cluster_with(vec![
            make_node("n1", "h1", 5.0, 90.0),
            make_node("n2", "h2", 2.0, 2.0),
        ]);
        let candidates = cluster.free_nodes();
        let weights = ScoringWeights {
            cpu: 1.0,
            mem: 0.0,
            network: 1.0,
        };

        let ranked = rank_nodes(&cluster, &candidates, 1.0, 1.0, None, &weights);

        assert_eq!(ids(&ranked), vec!["n2", "n1"]);
    }

    #[test]
    fn exact_fit_node_ranks_at_zero_pressure() {
        let cluster = cluster_with(vec![make_node("n1", "h1", 1.0, 1.0)]);
        let candidates = cluster.free_nodes();

        let ranked = rank_nodes(
            &cluster,
            &candidates,
            1.0,
            1.0,
            None,
            &ScoringWeights::default(),
        );

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].distance, 0.0);
    }
}
