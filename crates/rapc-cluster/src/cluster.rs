//! Mutable cluster state snapshot.
//!
//! Indexes nodes by id, hostname, and rack, and tracks per-topology
//! unassigned executors. Maps are ordered so every iteration the
//! placement engine performs is reproducible: nodes by id, racks by id,
//! slot ports ascending.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

use tracing::warn;

use crate::error::{ClusterError, ClusterResult};
use crate::types::{ExecutorId, Node, NodeId, RackId, TopologyId};

/// One scheduling call's view of the cluster.
///
/// The caller hands over exclusive logical ownership for the duration
/// of the call; `consume` is the only mutation the engine performs.
#[derive(Debug, Clone, Default)]
pub struct ClusterState {
    nodes: BTreeMap<NodeId, Node>,
    network_topography: BTreeMap<RackId, Vec<String>>,
    unassigned: BTreeMap<TopologyId, BTreeSet<ExecutorId>>,
}

impl ClusterState {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Construction ──────────────────────────────────────────────

    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Register a rack as an ordered list of member hostnames.
    pub fn add_rack<S: Into<String>>(
        &mut self,
        rack: impl Into<RackId>,
        hostnames: impl IntoIterator<Item = S>,
    ) {
        self.network_topography
            .insert(rack.into(), hostnames.into_iter().map(Into::into).collect());
    }

    pub fn set_unassigned(
        &mut self,
        topology: impl Into<TopologyId>,
        execs: impl IntoIterator<Item = ExecutorId>,
    ) {
        self.unassigned
            .insert(topology.into(), execs.into_iter().collect());
    }

    // ── Lookups ───────────────────────────────────────────────────

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Resolve a hostname from the network topography to its node.
    ///
    /// A hostname with no matching node is a logged anomaly; callers
    /// treat it as "skip".
    pub fn node_by_hostname(&self, hostname: &str) -> Option<&Node> {
        let found = self.nodes.values().find(|n| n.hostname == hostname);
        if found.is_none() {
            warn!(hostname, "no node registered for hostname");
        }
        found
    }

    /// All nodes, in id order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Nodes with at least one free worker slot, in id order.
    pub fn free_nodes(&self) -> Vec<&Node> {
        self.nodes.values().filter(|n| n.has_free_slot()).collect()
    }

    /// Racks in id order, each with its ordered member hostnames.
    pub fn racks(&self) -> impl Iterator<Item = (&RackId, &Vec<String>)> {
        self.network_topography.iter()
    }

    /// The rack a node belongs to, if any.
    ///
    /// A node outside every rack is a logged anomaly, not an error; the
    /// ranker treats such nodes as maximally remote.
    pub fn rack_of(&self, node: &Node) -> Option<&RackId> {
        let rack = self
            .network_topography
            .iter()
            .find(|(_, hosts)| hosts.iter().any(|h| *h == node.hostname))
            .map(|(rack, _)| rack);
        if rack.is_none() {
            warn!(node = %node.id, hostname = %node.hostname, "node not found in any rack");
        }
        rack
    }

    /// Resolve a rack's member hostnames to nodes, skipping hostnames
    /// with no registered node.
    pub fn rack_nodes(&self, rack: &str) -> Vec<&Node> {
        let Some(hostnames) = self.network_topography.get(rack) else {
            warn!(rack, "unknown rack");
            return Vec::new();
        };
        hostnames
            .iter()
            .filter_map(|h| self.node_by_hostname(h))
            .collect()
    }

    /// Executors of a topology that still need a slot.
    pub fn unassigned_executors(&self, topology: &str) -> BTreeSet<ExecutorId> {
        self.unassigned.get(topology).cloned().unwrap_or_default()
    }

    // ── Mutation ──────────────────────────────────────────────────

    /// Decrement a node's availability for one placed executor.
    ///
    /// Demands exceeding current availability are a contract violation:
    /// the engine only places on nodes that passed the eligibility
    /// filter. Tiny negative float residue is clamped so availability
    /// stays non-negative.
    pub fn consume(&mut self, node_id: &str, cpu: f64, mem: f64) -> ClusterResult<()> {
        let node = self
            .nodes
            .get_mut(node_id)
            .ok_or_else(|| ClusterError::UnknownNode(node_id.to_string()))?;
        if cpu > node.avail_cpu || mem > node.avail_mem {
            return Err(ClusterError::ResourceUnderflow {
                node: node_id.to_string(),
                cpu,
                mem,
            });
        }
        node.avail_cpu = (node.avail_cpu - cpu).max(0.0);
        node.avail_mem = (node.avail_mem - mem).max(0.0);
        Ok(())
    }

    // ── Diagnostics ───────────────────────────────────────────────

    /// Per-rack resource dump for debug logging.
    pub fn summary(&self) -> String {
        let mut out = String::from("cluster info:\n");
        for (rack, hostnames) in &self.network_topography {
            let _ = writeln!(out, "rack: {rack}");
            for hostname in hostnames {
                let Some(node) = self.node_by_hostname(hostname) else {
                    let _ = writeln!(out, "-> {hostname}: unresolved");
                    continue;
                };
                let _ = writeln!(
                    out,
                    "-> {} ({}): avail cpu {} mem {} / total cpu {} mem {}",
                    node.hostname,
                    node.id,
                    node.avail_cpu,
                    node.avail_mem,
                    node.total_cpu,
                    node.total_mem,
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_rack_cluster() -> ClusterState {
        let mut cluster = ClusterState::new();
        cluster.add_node(Node::new("n1", "host-1", 4.0, 16.0, [6700, 6701]));
        cluster.add_node(Node::new("n2", "host-2", 8.0, 32.0, [6700]));
        cluster.add_node(Node::new("n3", "host-3", 2.0, 8.0, []));
        cluster.add_rack("r1", ["host-1", "host-2"]);
        cluster.add_rack("r2", ["host-3"]);
        cluster
    }

    #[test]
    fn indexes_nodes_by_id_and_hostname() {
        let cluster = two_rack_cluster();

        assert_eq!(cluster.node("n2").unwrap().hostname, "host-2");
        assert_eq!(cluster.node_by_hostname("host-1").unwrap().id, "n1");
        assert!(cluster.node("n9").is_none());
        assert!(cluster.node_by_hostname("host-9").is_none());
    }

    #[test]
    fn free_nodes_excludes_slotless_nodes() {
        let cluster = two_rack_cluster();
        let free: Vec<&str> = cluster.free_nodes().iter().map(|n| n.id.as_str()).collect();
        assert_eq!(free, vec!["n1", "n2"]);
    }

    #[test]
    fn rack_membership_resolves_by_hostname() {
        let cluster = two_rack_cluster();

        let n1 = cluster.node("n1").unwrap();
        assert_eq!(cluster.rack_of(n1), Some(&"r1".to_string()));

        let members: Vec<&str> = cluster
            .rack_nodes("r1")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(members, vec!["n1", "n2"]);
    }

    #[test]
    fn node_outside_every_rack_has_no_rack() {
        let mut cluster = two_rack_cluster();
        cluster.add_node(Node::new("n4", "host-4", 1.0, 1.0, [6700]));

        let n4 = cluster.node("n4").unwrap();
        assert_eq!(cluster.rack_of(n4), None);
    }

    #[test]
    fn rack_nodes_skips_unresolved_hostnames() {
        let mut cluster = two_rack_cluster();
        cluster.add_rack("r3", ["host-ghost", "host-1"]);

        let members: Vec<&str> = cluster
            .rack_nodes("r3")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(members, vec!["n1"]);
    }

    #[test]
    fn consume_decrements_availability() {
        let mut cluster = two_rack_cluster();

        cluster.consume("n1", 1.0, 2.0).unwrap();
        let n1 = cluster.node("n1").unwrap();
        assert_eq!(n1.avail_cpu, 3.0);
        assert_eq!(n1.avail_mem, 14.0);
        assert_eq!(n1.total_cpu, 4.0);
    }

    #[test]
    fn consume_rejects_underflow() {
        let mut cluster = two_rack_cluster();

        let err = cluster.consume("n1", 5.0, 1.0).unwrap_err();
        assert!(matches!(err, ClusterError::ResourceUnderflow { .. }));

        let err = cluster.consume("n9", 1.0, 1.0).unwrap_err();
        assert!(matches!(err, ClusterError::UnknownNode(_)));
    }

    #[test]
    fn consume_allows_exact_fit() {
        let mut cluster = two_rack_cluster();

        cluster.consume("n1", 4.0, 16.0).unwrap();
        let n1 = cluster.node("n1").unwrap();
        assert_eq!(n1.avail_cpu, 0.0);
        assert_eq!(n1.avail_mem, 0.0);
    }

    #[test]
    fn unassigned_executors_default_to_empty() {
        let mut cluster = two_rack_cluster();
        assert!(cluster.unassigned_executors("topo-1").is_empty());

        cluster.set_unassigned("topo-1", [ExecutorId::new(0, 0), ExecutorId::new(1, 1)]);
        assert_eq!(cluster.unassigned_executors("topo-1").len(), 2);
        assert!(cluster.unassigned_executors("topo-2").is_empty());
    }

    #[test]
    fn summary_lists_racks_and_nodes() {
        let cluster = two_rack_cluster();
        let summary = cluster.summary();

        assert!(summary.contains("rack: r1"));
        assert!(summary.contains("host-3 (n3)"));
    }
}
