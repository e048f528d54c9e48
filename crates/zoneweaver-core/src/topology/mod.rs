// ── Network topology pipeline ──
//
// inventory -> indexes -> nodes/edges -> patterns -> filters -> view -> layout
//
// Every stage is a plain function; `compute_graph` runs them all and keeps
// no state between calls.

pub mod color;
pub mod edges;
pub mod filter;
pub mod graph;
pub mod index;
pub mod layout;
pub mod nodes;
pub mod patterns;
pub mod view;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::model::Inventory;

pub use edges::map_edges;
pub use filter::{NodeTypeFilter, TopologyFilters, apply_filters};
pub use graph::{
    AlertLevel, EdgeBandwidth, EdgeData, EdgeKind, EdgeStyle, FlowDirection, GraphEdge, GraphNode,
    LinkBandwidth, NodeData, NodeKind, NodeStyle, Position, Topology, incident_bandwidth,
};
pub use index::{BandwidthMap, IpMap, bandwidth_map, ip_map};
pub use layout::{LayoutType, apply_layout};
pub use nodes::map_nodes;
pub use patterns::{Pattern, PatternKind, detect_patterns};
pub use view::{ViewType, apply_view};

/// Everything a caller can choose about how the graph is drawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GraphOptions {
    pub view: ViewType,
    pub layout: LayoutType,
    pub filters: TopologyFilters,
}

/// Run the whole pipeline over one inventory snapshot.
pub fn compute_graph(inventory: &Inventory, options: &GraphOptions) -> Topology {
    let bandwidth = bandwidth_map(&inventory.bandwidth);
    let ips = ip_map(&inventory.ip_addresses);

    let nodes = map_nodes(inventory, &bandwidth, &ips);
    let edges = map_edges(inventory, &bandwidth);
    let patterns = detect_patterns(
        &inventory.aggregates,
        &inventory.etherstubs,
        &inventory.vnics,
        &inventory.zones,
    );

    let (mut nodes, mut edges) = apply_filters(nodes, edges, &options.filters);
    apply_view(options.view, &mut nodes, &mut edges);
    apply_layout(&mut nodes, &edges, options.layout, options.view);

    debug!(
        view = %options.view,
        layout = %options.layout,
        nodes = nodes.len(),
        edges = edges.len(),
        patterns = patterns.len(),
        "topology computed"
    );

    Topology {
        nodes,
        edges,
        patterns,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use serde_json::json;
    use strum::IntoEnumIterator;

    use super::*;

    fn inventory(v: serde_json::Value) -> Inventory {
        serde_json::from_value(v).unwrap()
    }

    /// nic0 -> vnic0 (VLAN 10) -> zone1, with traffic on vnic0.
    fn scenario() -> Inventory {
        inventory(json!({
            "physical_nics": [{ "link": "nic0", "state": "up", "speed_mbps": 10000.0 }],
            "vnics": [{ "link": "vnic0", "over": "nic0", "zone": "zone1", "vid": 10, "state": "up" }],
            "zones": [{ "name": "zone1", "state": "running" }],
            "bandwidth": [{ "link": "vnic0", "rx_mbps": 5.0, "tx_mbps": 2.0 }]
        }))
    }

    fn busy_host() -> Inventory {
        inventory(json!({
            "physical_nics": [
                { "link": "e1000g0" }, { "link": "e1000g1" }, { "link": "ixgbe0" }
            ],
            "aggregates": [{ "link": "aggr0", "members": ["e1000g0", "e1000g1"] }],
            "etherstubs": [{ "link": "stub0" }],
            "vnics": [
                { "link": "web0", "over": "aggr0", "zone": "web", "vid": 10 },
                { "link": "web1", "over": "stub0", "zone": "web" },
                { "link": "db0", "over": "aggr0", "zone": "db", "vid": 20 },
                { "link": "lost0", "over": "nowhere0" }
            ],
            "zones": [{ "name": "web" }, { "name": "db" }, { "name": "idle" }],
            "bandwidth": [
                { "link": "e1000g0", "rx_mbps": 40.0, "tx_mbps": 10.0 },
                { "link": "web0", "rx_mbps": 30.0, "tx_mbps": 12.0 },
                { "link": "db0", "rx_mbps": 900.0, "tx_mbps": 100.0 }
            ]
        }))
    }

    fn show_all() -> GraphOptions {
        GraphOptions {
            filters: TopologyFilters::show_all(),
            ..GraphOptions::default()
        }
    }

    #[test]
    fn scenario_produces_vlan_and_assignment_pairs() {
        let topo = compute_graph(&scenario(), &GraphOptions::default());

        assert_eq!(topo.nodes.len(), 3);
        let mut ids: Vec<&str> = topo.edges.iter().map(|e| e.id.as_str()).collect();
        ids.sort_unstable();
        insta::assert_json_snapshot!(ids, @r#"
        [
          "nic0-vnic0-rx",
          "nic0-vnic0-tx",
          "vnic0-to-zone1-rx",
          "vnic0-to-zone1-tx"
        ]
        "#);

        let edge = |id: &str| topo.edges.iter().find(|e| e.id == id).unwrap();
        let rx = edge("nic0-vnic0-rx");
        assert_eq!(rx.data.kind, EdgeKind::Vlan);
        assert_eq!(rx.data.vlan_id, Some(10));
        assert_eq!((rx.source.as_str(), rx.target.as_str()), ("nic0", "vnic0"));
        assert!((rx.data.bandwidth.total_mbps - 5.0).abs() < f64::EPSILON);
        assert!((rx.data.link_speed - 10000.0).abs() < f64::EPSILON);

        let tx = edge("nic0-vnic0-tx");
        assert_eq!((tx.source.as_str(), tx.target.as_str()), ("vnic0", "nic0"));
        assert!((tx.data.bandwidth.total_mbps - 2.0).abs() < f64::EPSILON);

        assert_eq!(edge("vnic0-to-zone1-rx").data.kind, EdgeKind::Assignment);
        assert_eq!(edge("vnic0-to-zone1-tx").target, "vnic0");
    }

    #[test]
    fn edges_come_in_swapped_rx_tx_pairs() {
        let inv = busy_host();
        let edges = map_edges(&inv, &bandwidth_map(&inv.bandwidth));
        assert_eq!(edges.len() % 2, 0);

        for rx in edges.iter().filter(|e| e.data.flow_direction == FlowDirection::Rx) {
            let tx_id = format!("{}tx", rx.id.trim_end_matches("rx"));
            let tx = edges.iter().find(|e| e.id == tx_id).unwrap();
            assert_eq!(tx.data.flow_direction, FlowDirection::Tx);
            assert_eq!((tx.source.as_str(), tx.target.as_str()), (rx.target.as_str(), rx.source.as_str()));
            assert!((rx.data.bandwidth.total_mbps - rx.data.bandwidth.rx_mbps).abs() < f64::EPSILON);
            assert!((tx.data.bandwidth.total_mbps - tx.data.bandwidth.tx_mbps).abs() < f64::EPSILON);
        }
        assert!(edges.iter().all(|e| e.visual_type == "floating"));

        // aggregation 2 + vnic parents 3 + zone assignments 3
        assert_eq!(edges.len(), 16);
    }

    #[test]
    fn node_count_is_conserved_and_unique() {
        let inv = busy_host();
        let bw = bandwidth_map(&inv.bandwidth);
        let nodes = map_nodes(&inv, &bw, &ip_map(&inv.ip_addresses));

        assert_eq!(nodes.len(), inv.node_count());
        let unique: HashSet<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(unique.len(), nodes.len());
    }

    #[test]
    fn orphan_vnic_is_mapped_then_filtered() {
        let inv = busy_host();
        let bw = bandwidth_map(&inv.bandwidth);
        let nodes = map_nodes(&inv, &bw, &ip_map(&inv.ip_addresses));
        let edges = map_edges(&inv, &bw);

        assert!(nodes.iter().any(|n| n.id == "lost0"));
        assert!(!edges.iter().any(|e| e.touches("lost0")));

        let topo = compute_graph(&inv, &GraphOptions::default());
        assert!(!topo.nodes.iter().any(|n| n.id == "lost0"));
        assert!(!topo.nodes.iter().any(|n| n.id == "idle"));
        assert!(!topo.nodes.iter().any(|n| n.id == "ixgbe0"));

        let all = compute_graph(&inv, &show_all());
        assert_eq!(all.nodes.len(), inv.node_count());
    }

    #[test]
    fn filtering_is_idempotent() {
        let inv = busy_host();
        let bw = bandwidth_map(&inv.bandwidth);
        let nodes = map_nodes(&inv, &bw, &ip_map(&inv.ip_addresses));
        let edges = map_edges(&inv, &bw);

        let mut filters = TopologyFilters::default();
        filters.node_types.set(NodeKind::Aggregate, false);
        filters.show_idle_links = false;

        let (n1, e1) = apply_filters(nodes, edges, &filters);
        let (n2, e2) = apply_filters(n1.clone(), e1.clone(), &filters);
        assert_eq!(n1, n2);
        assert_eq!(e1, e2);

        // members lose their only edges with the aggregate gone
        assert!(!n1.iter().any(|n| n.kind == NodeKind::Aggregate));
        assert!(!n1.iter().any(|n| n.id == "e1000g0" || n.id == "stub0"));
        let ids: Vec<&str> = n1.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["web0", "db0", "web", "db"]);
    }

    #[test]
    fn idle_links_can_be_hidden() {
        let mut options = show_all();
        options.filters.show_idle_links = false;
        let topo = compute_graph(&busy_host(), &options);

        assert!(topo.edges.iter().all(|e| {
            e.data.bandwidth.rx_mbps + e.data.bandwidth.tx_mbps > 0.0
        }));
        assert!(!topo.edges.iter().any(|e| e.touches("web1")));
        // unattached nodes are still shown when asked for
        assert!(topo.nodes.iter().any(|n| n.id == "web1"));
    }

    #[test]
    fn vlan_and_zone_filters() {
        let mut options = GraphOptions::default();
        options.filters.vlans = vec![20];
        let topo = compute_graph(&busy_host(), &options);
        let vnics: Vec<&str> = topo
            .nodes
            .iter()
            .filter(|n| n.kind == NodeKind::Vnic)
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(vnics, vec!["db0"]);

        let mut options = GraphOptions::default();
        options.filters.zones = vec!["web".into()];
        let topo = compute_graph(&busy_host(), &options);
        assert!(topo.nodes.iter().any(|n| n.id == "web"));
        assert!(!topo.nodes.iter().any(|n| n.id == "db" || n.id == "db0"));
    }

    #[test]
    fn bandwidth_view_tiers_of_five() {
        let zones: Vec<serde_json::Value> = (0..12)
            .map(|i| json!({ "name": format!("zone{i:02}") }))
            .collect();
        let inv = inventory(json!({ "zones": zones }));
        let options = GraphOptions {
            view: ViewType::Bandwidth,
            layout: LayoutType::Circular,
            filters: TopologyFilters::show_all(),
        };
        let topo = compute_graph(&inv, &options);

        let tiers: Vec<f64> = topo
            .nodes
            .iter()
            .map(|n| (n.position.y - layout::MARGIN) / layout::LAYER_HEIGHT)
            .collect();
        let expected = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0];
        for (got, want) in tiers.iter().zip(expected) {
            assert!((got - want).abs() < 1e-9);
        }
    }

    #[test]
    fn bandwidth_view_ranks_busiest_first() {
        let options = GraphOptions {
            view: ViewType::Bandwidth,
            ..GraphOptions::default()
        };
        let topo = compute_graph(&busy_host(), &options);
        let first = topo
            .nodes
            .iter()
            .find(|n| {
                (n.position.x - layout::MARGIN).abs() < 1e-9
                    && (n.position.y - layout::MARGIN).abs() < 1e-9
            })
            .unwrap();
        assert!(first.id == "db0" || first.id == "aggr0");
    }

    #[test]
    fn every_combination_is_total() {
        for inv in [Inventory::default(), scenario(), busy_host()] {
            for view in ViewType::iter() {
                for layout in LayoutType::iter() {
                    let options = GraphOptions {
                        view,
                        layout,
                        filters: TopologyFilters::show_all(),
                    };
                    let topo = compute_graph(&inv, &options);
                    assert_eq!(topo.nodes.len(), inv.node_count());
                    assert!(topo.nodes.iter().all(|n| n.position.is_finite()));
                }
            }
        }
    }

    #[test]
    fn single_node_is_centered() {
        let inv = inventory(json!({ "zones": [{ "name": "solo" }] }));
        let topo = compute_graph(&inv, &show_all());
        assert_eq!(topo.nodes[0].position, layout::CENTER);
    }

    #[test]
    fn patterns_ride_along() {
        let topo = compute_graph(&busy_host(), &GraphOptions::default());
        let kinds: Vec<PatternKind> = topo.patterns.iter().map(|p| p.kind).collect();
        assert_eq!(
            kinds,
            vec![
                PatternKind::HighAvailability,
                PatternKind::VirtualizedSwitching,
                PatternKind::NetworkSegmentation,
                PatternKind::MultiHomedZones,
            ]
        );
    }

    #[test]
    fn serializes_camel_case() {
        let topo = compute_graph(&scenario(), &GraphOptions::default());
        let value = serde_json::to_value(&topo).unwrap();
        let node = &value["nodes"][0];
        assert_eq!(node["type"], "physicalNic");
        assert!(node["data"]["bandwidth"].get("rxMbps").is_some());
        let edge = &value["edges"][0];
        assert_eq!(edge["type"], "floating");
        assert_eq!(edge["data"]["flowDirection"], "rx");
        assert_eq!(edge["data"]["vlanId"], 10);
    }

    #[test]
    fn options_deserialize_with_defaults() {
        let options: GraphOptions =
            serde_json::from_value(json!({ "view": "zone-centric" })).unwrap();
        assert_eq!(options.view, ViewType::ZoneCentric);
        assert_eq!(options.layout, LayoutType::Hierarchical);
        assert!(options.filters.show_idle_links);
        assert!(!options.filters.show_unattached_nodes);
    }
}
