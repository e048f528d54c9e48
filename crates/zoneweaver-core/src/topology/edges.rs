// ── Edge mapper ──
//
// Relationships come from three fields only: aggregate `over` (members),
// VNIC `over` (parent link) and VNIC `zone`. Every relationship becomes an
// rx/tx pair of unidirectional edges.
//
// Each relationship has an upstream end (member NIC, VNIC parent, VNIC),
// a downstream end (aggregate, VNIC, zone) and a metered link whose
// counters it displays (member NIC, VNIC, VNIC). The rx edge runs
// upstream -> downstream, the tx edge the other way.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::model::Inventory;

use super::graph::{
    EdgeBandwidth, EdgeData, EdgeKind, FLOATING_EDGE, FlowDirection, GraphEdge, LinkBandwidth,
};
use super::index::BandwidthMap;

/// Assumed link speed (Mbps) when the parent does not advertise one.
pub const DEFAULT_LINK_SPEED: f64 = 1000.0;

struct Relationship<'a> {
    upstream: &'a str,
    downstream: &'a str,
    metered: &'a str,
    kind: EdgeKind,
    vlan_id: Option<u16>,
    link_speed: f64,
    /// Zone edges use `{vnic}-to-{zone}` ids.
    zone_link: bool,
}

impl Relationship<'_> {
    fn id(&self, direction: FlowDirection) -> String {
        if self.zone_link {
            format!("{}-to-{}-{direction}", self.upstream, self.downstream)
        } else {
            format!("{}-{}-{direction}", self.upstream, self.downstream)
        }
    }

    fn edge(&self, direction: FlowDirection, traffic: LinkBandwidth) -> GraphEdge {
        let (source, target, total) = match direction {
            FlowDirection::Rx => (self.upstream, self.downstream, traffic.rx_mbps),
            FlowDirection::Tx => (self.downstream, self.upstream, traffic.tx_mbps),
        };
        GraphEdge {
            id: self.id(direction),
            source: source.to_owned(),
            target: target.to_owned(),
            visual_type: FLOATING_EDGE.to_owned(),
            data: EdgeData {
                kind: self.kind,
                bandwidth: EdgeBandwidth {
                    rx_mbps: traffic.rx_mbps,
                    tx_mbps: traffic.tx_mbps,
                    total_mbps: total,
                    direction,
                },
                vlan_id: self.vlan_id,
                link_speed: self.link_speed,
                source_interface: source.to_owned(),
                target_interface: target.to_owned(),
                flow_direction: direction,
                style: None,
            },
        }
    }
}

/// Infer every rx/tx edge pair from the inventory.
///
/// Relationships whose parent record is missing are skipped.
pub fn map_edges(inventory: &Inventory, bandwidth: &BandwidthMap) -> Vec<GraphEdge> {
    // advertised speed per link; `None` when the link exists but is silent
    let mut speeds: HashMap<&str, Option<f64>> = HashMap::new();
    for nic in &inventory.physical_nics {
        speeds.entry(nic.link.as_str()).or_insert(nic.speed_mbps);
    }
    for aggr in &inventory.aggregates {
        speeds.entry(aggr.link.as_str()).or_insert(aggr.speed_mbps);
    }
    for stub in &inventory.etherstubs {
        speeds.entry(stub.link.as_str()).or_insert(None);
    }
    let vnic_speeds: HashMap<&str, Option<f64>> = inventory
        .vnics
        .iter()
        .map(|v| (v.link.as_str(), v.speed_mbps))
        .collect();
    let zones: HashSet<&str> = inventory.zones.iter().map(|z| z.name.as_str()).collect();
    let physical: HashSet<&str> = inventory
        .physical_nics
        .iter()
        .map(|n| n.link.as_str())
        .collect();

    let mut relationships = Vec::new();

    for aggr in &inventory.aggregates {
        for member in &aggr.members {
            if !physical.contains(member.as_str()) {
                debug!(aggregate = %aggr.link, member, "aggregate member not found, skipping");
                continue;
            }
            relationships.push(Relationship {
                upstream: member,
                downstream: &aggr.link,
                metered: member,
                kind: EdgeKind::Aggregation,
                vlan_id: None,
                link_speed: speeds
                    .get(member.as_str())
                    .copied()
                    .flatten()
                    .unwrap_or(DEFAULT_LINK_SPEED),
                zone_link: false,
            });
        }
    }

    for vnic in &inventory.vnics {
        let Some(parent) = vnic.over.as_deref() else {
            continue;
        };
        let Some(parent_speed) = speeds.get(parent) else {
            debug!(vnic = %vnic.link, parent, "vnic parent not found, skipping");
            continue;
        };
        relationships.push(Relationship {
            upstream: parent,
            downstream: &vnic.link,
            metered: &vnic.link,
            kind: if vnic.vid.is_some() {
                EdgeKind::Vlan
            } else {
                EdgeKind::Direct
            },
            vlan_id: vnic.vid,
            link_speed: parent_speed.unwrap_or(DEFAULT_LINK_SPEED),
            zone_link: false,
        });
    }

    for vnic in &inventory.vnics {
        let Some(zone) = vnic.zone.as_deref() else {
            continue;
        };
        if !zones.contains(zone) {
            debug!(vnic = %vnic.link, zone, "zone not found, skipping");
            continue;
        }
        relationships.push(Relationship {
            upstream: &vnic.link,
            downstream: zone,
            metered: &vnic.link,
            kind: EdgeKind::Assignment,
            vlan_id: vnic.vid,
            link_speed: vnic_speeds
                .get(vnic.link.as_str())
                .copied()
                .flatten()
                .unwrap_or(DEFAULT_LINK_SPEED),
            zone_link: true,
        });
    }

    relationships
        .iter()
        .flat_map(|rel| {
            let traffic = bandwidth.get(rel.metered).copied().unwrap_or_default();
            [
                rel.edge(FlowDirection::Rx, traffic),
                rel.edge(FlowDirection::Tx, traffic),
            ]
        })
        .collect()
}
