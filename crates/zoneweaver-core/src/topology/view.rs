// ── View emphasis ──
//
// Six lenses that restyle the graph. Emphasis works on mutable slices,
// so it can change how elements look but never how many there are.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::LinkState;

use super::color::{
    ALERT_CRITICAL, ALERT_WARNING, MUTED, edge_stroke_width, node_kind_color, utilization_color,
    vlan_color,
};
use super::edges::DEFAULT_LINK_SPEED;
use super::graph::{
    AlertLevel, EdgeKind, EdgeStyle, GraphEdge, GraphNode, NodeKind, NodeStyle,
    incident_bandwidth,
};

/// Traffic on a single edge above which a node is flagged (Mbps).
pub const HIGH_UTILIZATION_MBPS: f64 = 800.0;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ViewType {
    #[default]
    Physical,
    Logical,
    ZoneCentric,
    Bandwidth,
    Vlan,
    Troubleshoot,
}

fn emphasized(kind: NodeKind) -> NodeStyle {
    NodeStyle {
        border_color: node_kind_color(kind).to_owned(),
        border_width: 3.0,
        glow: None,
        opacity: 1.0,
        z_index: 10,
    }
}

fn normal(kind: NodeKind) -> NodeStyle {
    NodeStyle {
        border_color: node_kind_color(kind).to_owned(),
        border_width: 1.5,
        glow: None,
        opacity: 0.9,
        z_index: 5,
    }
}

fn dimmed() -> NodeStyle {
    NodeStyle {
        border_color: MUTED.to_owned(),
        border_width: 1.0,
        glow: None,
        opacity: 0.4,
        z_index: 1,
    }
}

fn edge_style(stroke: impl Into<String>, width: f64, opacity: f64, animated: bool) -> EdgeStyle {
    EdgeStyle {
        stroke: stroke.into(),
        stroke_width: width,
        opacity,
        animated,
    }
}

fn active(edge: &GraphEdge) -> bool {
    edge.data.bandwidth.total_mbps > 0.0
}

/// Restyle `nodes` and `edges` for `view`.
pub fn apply_view(view: ViewType, nodes: &mut [GraphNode], edges: &mut [GraphEdge]) {
    match view {
        ViewType::Physical => physical(nodes, edges),
        ViewType::Logical => logical(nodes, edges),
        ViewType::ZoneCentric => zone_centric(nodes, edges),
        ViewType::Bandwidth => bandwidth(nodes, edges),
        ViewType::Vlan => vlan(nodes, edges),
        ViewType::Troubleshoot => troubleshoot(nodes, edges),
    }
}

fn physical(nodes: &mut [GraphNode], edges: &mut [GraphEdge]) {
    for node in nodes.iter_mut() {
        node.data.style = Some(match node.kind {
            NodeKind::PhysicalNic | NodeKind::Aggregate => emphasized(node.kind),
            NodeKind::Etherstub | NodeKind::Vnic => normal(node.kind),
            NodeKind::Zone => dimmed(),
        });
    }
    for edge in edges.iter_mut() {
        edge.data.style = Some(match edge.data.kind {
            EdgeKind::Aggregation => edge_style(
                node_kind_color(NodeKind::Aggregate),
                3.0,
                1.0,
                active(edge),
            ),
            EdgeKind::Vlan | EdgeKind::Direct => {
                edge_style(node_kind_color(NodeKind::PhysicalNic), 2.0, 0.8, active(edge))
            }
            EdgeKind::Assignment => edge_style(MUTED, 1.0, 0.4, false),
        });
    }
}

fn logical(nodes: &mut [GraphNode], edges: &mut [GraphEdge]) {
    for node in nodes.iter_mut() {
        node.data.style = Some(match node.kind {
            NodeKind::Vnic | NodeKind::Etherstub => emphasized(node.kind),
            NodeKind::Zone | NodeKind::Aggregate => normal(node.kind),
            NodeKind::PhysicalNic => dimmed(),
        });
    }
    for edge in edges.iter_mut() {
        let stroke = match edge.data.vlan_id {
            Some(vid) => vlan_color(vid),
            None => node_kind_color(NodeKind::Vnic).to_owned(),
        };
        edge.data.style = Some(match edge.data.kind {
            EdgeKind::Aggregation => edge_style(MUTED, 1.0, 0.5, false),
            _ => edge_style(stroke, 2.0, 1.0, active(edge)),
        });
    }
}

fn zone_centric(nodes: &mut [GraphNode], edges: &mut [GraphEdge]) {
    for node in nodes.iter_mut() {
        node.data.style = Some(match node.kind {
            NodeKind::Zone => NodeStyle {
                glow: Some(node_kind_color(NodeKind::Zone).to_owned()),
                border_width: 4.0,
                z_index: 20,
                ..emphasized(NodeKind::Zone)
            },
            NodeKind::Vnic if node.data.zone.is_some() => normal(NodeKind::Vnic),
            _ => dimmed(),
        });
    }
    for edge in edges.iter_mut() {
        edge.data.style = Some(match edge.data.kind {
            EdgeKind::Assignment => {
                edge_style(node_kind_color(NodeKind::Zone), 3.0, 1.0, active(edge))
            }
            _ => edge_style(MUTED, 1.0, 0.4, false),
        });
    }
}

fn bandwidth(nodes: &mut [GraphNode], edges: &mut [GraphEdge]) {
    let totals: HashMap<String, f64> = incident_bandwidth(edges)
        .into_iter()
        .map(|(id, mbps)| (id.to_owned(), mbps))
        .collect();

    for node in nodes.iter_mut() {
        let total = totals.get(&node.id).copied().unwrap_or_default();
        let capacity = node.data.speed_mbps.unwrap_or(DEFAULT_LINK_SPEED);
        let color = utilization_color(total, capacity);
        node.data.style = Some(NodeStyle {
            glow: (total > capacity * 0.5).then(|| color.clone()),
            border_color: color,
            border_width: if total > 0.0 { 3.0 } else { 1.0 },
            opacity: if total > 0.0 { 1.0 } else { 0.5 },
            z_index: if total > 0.0 { 10 } else { 1 },
        });
    }
    for edge in edges.iter_mut() {
        let total = edge.data.bandwidth.total_mbps;
        edge.data.style = Some(edge_style(
            utilization_color(total, edge.data.link_speed),
            edge_stroke_width(total),
            if total > 0.0 { 1.0 } else { 0.3 },
            total > 0.0,
        ));
    }
}

fn vlan(nodes: &mut [GraphNode], edges: &mut [GraphEdge]) {
    for node in nodes.iter_mut() {
        node.data.style = Some(match (node.kind, node.data.vlan_id) {
            (NodeKind::Vnic, Some(vid)) => NodeStyle {
                border_color: vlan_color(vid),
                border_width: 3.0,
                glow: Some(vlan_color(vid)),
                opacity: 1.0,
                z_index: 10,
            },
            (NodeKind::Vnic, None) => normal(NodeKind::Vnic),
            _ => dimmed(),
        });
    }
    for edge in edges.iter_mut() {
        edge.data.style = Some(match edge.data.vlan_id {
            Some(vid) => edge_style(vlan_color(vid), 2.5, 1.0, active(edge)),
            None => edge_style(MUTED, 1.0, 0.4, false),
        });
    }
}

fn troubleshoot(nodes: &mut [GraphNode], edges: &mut [GraphEdge]) {
    let present: HashSet<String> = nodes.iter().map(|n| n.id.clone()).collect();
    let mut hot: HashSet<&str> = HashSet::new();
    let mut fed: HashSet<&str> = HashSet::new();
    for edge in edges.iter() {
        if edge.data.bandwidth.total_mbps > HIGH_UTILIZATION_MBPS {
            hot.insert(edge.source.as_str());
            hot.insert(edge.target.as_str());
        }
        fed.insert(edge.target.as_str());
    }

    let mut flagged: HashSet<String> = HashSet::new();
    for node in nodes.iter_mut() {
        let mut issues: Vec<(AlertLevel, String)> = Vec::new();

        if hot.contains(node.id.as_str()) {
            issues.push((
                AlertLevel::Warning,
                format!("Link utilization above {HIGH_UTILIZATION_MBPS} Mbps"),
            ));
        }
        if node.data.link_state == Some(LinkState::Down) {
            issues.push((AlertLevel::Critical, "Link is down".into()));
        }
        if node.kind == NodeKind::Vnic {
            if let Some(parent) = node.data.over.as_deref() {
                if !present.contains(parent) {
                    issues.push((
                        AlertLevel::Critical,
                        format!("Parent link {parent} not found"),
                    ));
                }
            }
        }
        if node.kind == NodeKind::Zone && !fed.contains(node.id.as_str()) {
            issues.push((AlertLevel::Warning, "Zone has no network attachment".into()));
        }

        let level = issues.iter().map(|(level, _)| *level).max();
        node.data.style = Some(match level {
            Some(level) => {
                let color = if level == AlertLevel::Critical {
                    ALERT_CRITICAL
                } else {
                    ALERT_WARNING
                };
                NodeStyle {
                    border_color: color.to_owned(),
                    border_width: 4.0,
                    glow: Some(color.to_owned()),
                    opacity: 1.0,
                    z_index: 30,
                }
            }
            None => dimmed(),
        });
        node.data.alert_level = level;
        node.data.alert_message = (!issues.is_empty()).then(|| {
            issues
                .iter()
                .map(|(_, msg)| msg.as_str())
                .collect::<Vec<_>>()
                .join("; ")
        });
        if level.is_some() {
            flagged.insert(node.id.clone());
        }
    }

    for edge in edges.iter_mut() {
        let total = edge.data.bandwidth.total_mbps;
        edge.data.style = Some(if total > HIGH_UTILIZATION_MBPS {
            edge_style(ALERT_CRITICAL, edge_stroke_width(total), 1.0, true)
        } else if flagged.contains(&edge.source) || flagged.contains(&edge.target) {
            edge_style(ALERT_WARNING, 2.0, 0.9, active(edge))
        } else {
            edge_style(MUTED, 1.0, 0.4, false)
        });
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Inventory;
    use crate::topology::{edges::map_edges, index::bandwidth_map, nodes::map_nodes};

    fn graph(inv: &Inventory) -> (Vec<GraphNode>, Vec<GraphEdge>) {
        let bw = bandwidth_map(&inv.bandwidth);
        (
            map_nodes(inv, &bw, &Default::default()),
            map_edges(inv, &bw),
        )
    }

    fn inventory(v: serde_json::Value) -> Inventory {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn every_view_keeps_all_elements() {
        let inv = inventory(serde_json::json!({
            "physical_nics": [{ "link": "nic0" }],
            "vnics": [{ "link": "vnic0", "over": "nic0", "zone": "z1", "vid": 5 }],
            "zones": [{ "name": "z1" }]
        }));
        for view in <ViewType as strum::IntoEnumIterator>::iter() {
            let (mut nodes, mut edges) = graph(&inv);
            let before = (nodes.len(), edges.len());
            apply_view(view, &mut nodes, &mut edges);
            assert_eq!((nodes.len(), edges.len()), before, "{view}");
            assert!(nodes.iter().all(|n| n.data.style.is_some()), "{view}");
            assert!(edges.iter().all(|e| e.data.style.is_some()), "{view}");
        }
    }

    #[test]
    fn troubleshoot_flags_issues() {
        let inv = inventory(serde_json::json!({
            "physical_nics": [{ "link": "nic0", "state": "down" }],
            "vnics": [
                { "link": "vnic0", "over": "nic0", "zone": "busy" },
                { "link": "orphan0", "over": "missing0" }
            ],
            "zones": [{ "name": "busy" }, { "name": "lonely" }],
            "bandwidth": [{ "link": "vnic0", "rx_mbps": 900.0, "tx_mbps": 10.0 }]
        }));
        let (mut nodes, mut edges) = graph(&inv);
        apply_view(ViewType::Troubleshoot, &mut nodes, &mut edges);

        let by_id = |id: &str| nodes.iter().find(|n| n.id == id).unwrap();

        assert_eq!(by_id("nic0").data.alert_level, Some(AlertLevel::Critical));
        assert!(by_id("nic0").data.alert_message.as_deref().unwrap().contains("down"));
        assert_eq!(by_id("orphan0").data.alert_level, Some(AlertLevel::Critical));
        assert_eq!(by_id("lonely").data.alert_level, Some(AlertLevel::Warning));
        assert_eq!(by_id("busy").data.alert_level, Some(AlertLevel::Warning));
        assert!(by_id("busy").data.alert_message.as_deref().unwrap().contains("utilization"));
    }

    #[test]
    fn view_names_are_kebab_case() {
        assert_eq!(ViewType::ZoneCentric.to_string(), "zone-centric");
        assert_eq!("troubleshoot".parse::<ViewType>().unwrap(), ViewType::Troubleshoot);
    }
}
