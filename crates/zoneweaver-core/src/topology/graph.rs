// ── Renderable graph types ──
//
// The serialized `{nodes, edges}` shape handed to any renderer. Field
// names are camelCase on the wire.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::{IpAssignment, LinkState, ZoneState};

use super::patterns::Pattern;

// ── Nodes ───────────────────────────────────────────────────────────

/// Device class of a graph node, in top-to-bottom hierarchy order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase", ascii_case_insensitive)]
pub enum NodeKind {
    PhysicalNic,
    Aggregate,
    Etherstub,
    Vnic,
    Zone,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Indexed traffic for one link. Zeros when the link has no sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkBandwidth {
    pub rx_mbps: f64,
    pub tx_mbps: f64,
    pub total_mbps: f64,
    pub rx_bytes_per_second: f64,
    pub tx_bytes_per_second: f64,
}

/// Visual hints set by the view emphasis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStyle {
    pub border_color: String,
    pub border_width: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub glow: Option<String>,
    pub opacity: f64,
    pub z_index: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Critical,
}

/// Denormalized display data for a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeData {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_state: Option<LinkState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone_state: Option<ZoneState>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed_mbps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    /// VNIC parent link.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub over: Option<String>,
    /// Aggregate member links.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<String>,
    /// Zone owning a VNIC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<String>,
    pub bandwidth: LinkBandwidth,
    pub ip_addresses: Vec<IpAssignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<NodeStyle>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_level: Option<AlertLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alert_message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Link or zone name; unique across the node set.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub position: Position,
    pub data: NodeData,
}

// ── Edges ───────────────────────────────────────────────────────────

/// Relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EdgeKind {
    Aggregation,
    Vlan,
    Direct,
    Assignment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FlowDirection {
    Rx,
    Tx,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeBandwidth {
    pub rx_mbps: f64,
    pub tx_mbps: f64,
    /// Traffic in this edge's direction only.
    pub total_mbps: f64,
    pub direction: FlowDirection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeStyle {
    pub stroke: String,
    pub stroke_width: f64,
    pub opacity: f64,
    pub animated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeData {
    #[serde(rename = "type")]
    pub kind: EdgeKind,
    pub bandwidth: EdgeBandwidth,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
    pub link_speed: f64,
    pub source_interface: String,
    pub target_interface: String,
    pub flow_direction: FlowDirection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
}

/// Renderer edge type: floating edges attach to the nearest node border.
pub const FLOATING_EDGE: &str = "floating";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Stable across polls so renderers can diff.
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub visual_type: String,
    pub data: EdgeData,
}

impl GraphEdge {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

// ── Result ──────────────────────────────────────────────────────────

/// A positioned graph plus the advisory patterns detected on its inventory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub patterns: Vec<Pattern>,
}

/// Sum of `totalMbps` over every edge touching each node.
pub fn incident_bandwidth(edges: &[GraphEdge]) -> HashMap<&str, f64> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for edge in edges {
        *totals.entry(edge.source.as_str()).or_default() += edge.data.bandwidth.total_mbps;
        *totals.entry(edge.target.as_str()).or_default() += edge.data.bandwidth.total_mbps;
    }
    totals
}
