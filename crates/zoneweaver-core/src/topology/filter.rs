// ── Node/edge filtering ──
//
// The only pipeline stage that removes elements. The unattached-node pass
// runs last, so nodes orphaned by an earlier pass are dropped too.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::graph::{GraphEdge, GraphNode, NodeKind};

/// Per-kind visibility toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeTypeFilter {
    pub physical_nic: bool,
    pub aggregate: bool,
    pub etherstub: bool,
    pub vnic: bool,
    pub zone: bool,
}

impl Default for NodeTypeFilter {
    fn default() -> Self {
        Self {
            physical_nic: true,
            aggregate: true,
            etherstub: true,
            vnic: true,
            zone: true,
        }
    }
}

impl NodeTypeFilter {
    pub fn allows(&self, kind: NodeKind) -> bool {
        match kind {
            NodeKind::PhysicalNic => self.physical_nic,
            NodeKind::Aggregate => self.aggregate,
            NodeKind::Etherstub => self.etherstub,
            NodeKind::Vnic => self.vnic,
            NodeKind::Zone => self.zone,
        }
    }

    pub fn set(&mut self, kind: NodeKind, visible: bool) {
        match kind {
            NodeKind::PhysicalNic => self.physical_nic = visible,
            NodeKind::Aggregate => self.aggregate = visible,
            NodeKind::Etherstub => self.etherstub = visible,
            NodeKind::Vnic => self.vnic = visible,
            NodeKind::Zone => self.zone = visible,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TopologyFilters {
    pub node_types: NodeTypeFilter,
    /// When non-empty, only VNICs tagged with one of these VLANs are kept.
    pub vlans: Vec<u16>,
    /// When non-empty, only these zones (and VNICs not assigned elsewhere)
    /// are kept.
    pub zones: Vec<String>,
    pub show_idle_links: bool,
    pub show_unattached_nodes: bool,
}

impl Default for TopologyFilters {
    fn default() -> Self {
        Self {
            node_types: NodeTypeFilter::default(),
            vlans: Vec::new(),
            zones: Vec::new(),
            show_idle_links: true,
            show_unattached_nodes: false,
        }
    }
}

impl TopologyFilters {
    /// Keep everything.
    pub fn show_all() -> Self {
        Self {
            show_unattached_nodes: true,
            ..Self::default()
        }
    }
}

fn node_passes(node: &GraphNode, filters: &TopologyFilters) -> bool {
    if !filters.node_types.allows(node.kind) {
        return false;
    }
    match node.kind {
        NodeKind::Vnic => {
            let vlan_ok = filters.vlans.is_empty()
                || node.data.vlan_id.is_some_and(|v| filters.vlans.contains(&v));
            let zone_ok = filters.zones.is_empty()
                || node
                    .data
                    .zone
                    .as_ref()
                    .is_none_or(|z| filters.zones.contains(z));
            vlan_ok && zone_ok
        }
        NodeKind::Zone => filters.zones.is_empty() || filters.zones.contains(&node.id),
        _ => true,
    }
}

/// Apply `filters`, returning the surviving nodes and edges.
pub fn apply_filters(
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
    filters: &TopologyFilters,
) -> (Vec<GraphNode>, Vec<GraphEdge>) {
    let (node_total, edge_total) = (nodes.len(), edges.len());

    let mut nodes: Vec<GraphNode> = nodes
        .into_iter()
        .filter(|n| node_passes(n, filters))
        .collect();

    let edges: Vec<GraphEdge> = {
        let ids: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        edges
            .into_iter()
            .filter(|e| ids.contains(e.source.as_str()) && ids.contains(e.target.as_str()))
            .filter(|e| {
                filters.show_idle_links
                    || e.data.bandwidth.rx_mbps + e.data.bandwidth.tx_mbps > 0.0
            })
            .collect()
    };

    if !filters.show_unattached_nodes {
        let attached: HashSet<&str> = edges
            .iter()
            .flat_map(|e| [e.source.as_str(), e.target.as_str()])
            .collect();
        nodes.retain(|n| attached.contains(n.id.as_str()));
    }

    debug!(
        nodes = nodes.len(),
        dropped_nodes = node_total - nodes.len(),
        edges = edges.len(),
        dropped_edges = edge_total - edges.len(),
        "filters applied"
    );

    (nodes, edges)
}
