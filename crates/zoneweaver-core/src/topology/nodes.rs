// ── Node mapper ──
//
// One node per inventory record, in hierarchy order. Nothing is dropped
// here except duplicate ids; filtering happens later.

use std::collections::HashSet;

use tracing::warn;

use crate::model::{Aggregate, Etherstub, Inventory, PhysicalNic, Vnic, Zone};

use super::graph::{GraphNode, NodeData, NodeKind, Position};
use super::index::{BandwidthMap, IpMap};

/// Placeholder grid used until the layout step runs.
const PLACEHOLDER_COLUMNS: usize = 8;
const PLACEHOLDER_SPACING: f64 = 150.0;

#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
fn placeholder(index: usize) -> Position {
    Position::new(
        (index % PLACEHOLDER_COLUMNS) as f64 * PLACEHOLDER_SPACING,
        (index / PLACEHOLDER_COLUMNS) as f64 * PLACEHOLDER_SPACING,
    )
}

fn physical_data(nic: &PhysicalNic) -> NodeData {
    NodeData {
        label: nic.link.clone(),
        link_state: Some(nic.state),
        speed_mbps: nic.speed_mbps,
        mtu: nic.mtu,
        mac_address: nic.mac.as_ref().map(ToString::to_string),
        ..NodeData::default()
    }
}

fn aggregate_data(aggr: &Aggregate) -> NodeData {
    NodeData {
        label: aggr.link.clone(),
        link_state: Some(aggr.state),
        speed_mbps: aggr.speed_mbps,
        mtu: aggr.mtu,
        mac_address: aggr.mac.as_ref().map(ToString::to_string),
        members: aggr.members.clone(),
        policy: aggr.policy.clone(),
        ..NodeData::default()
    }
}

fn etherstub_data(stub: &Etherstub) -> NodeData {
    NodeData {
        label: stub.link.clone(),
        link_state: Some(stub.state),
        mtu: stub.mtu,
        ..NodeData::default()
    }
}

fn vnic_data(vnic: &Vnic) -> NodeData {
    NodeData {
        label: vnic.link.clone(),
        link_state: Some(vnic.state),
        speed_mbps: vnic.speed_mbps,
        mtu: vnic.mtu,
        mac_address: vnic.mac.as_ref().map(ToString::to_string),
        over: vnic.over.clone(),
        zone: vnic.zone.clone(),
        vlan_id: vnic.vid,
        ..NodeData::default()
    }
}

fn zone_data(zone: &Zone) -> NodeData {
    NodeData {
        label: zone.name.clone(),
        zone_state: Some(zone.state),
        brand: zone.brand.clone(),
        ..NodeData::default()
    }
}

/// Build one node per NIC, aggregate, etherstub, VNIC and zone.
///
/// `bandwidth` defaults to zeros for links without a sample. If two
/// records share an id the first one wins.
pub fn map_nodes(inventory: &Inventory, bandwidth: &BandwidthMap, ips: &IpMap) -> Vec<GraphNode> {
    let records = inventory
        .physical_nics
        .iter()
        .map(|n| (NodeKind::PhysicalNic, n.link.as_str(), physical_data(n)))
        .chain(
            inventory
                .aggregates
                .iter()
                .map(|a| (NodeKind::Aggregate, a.link.as_str(), aggregate_data(a))),
        )
        .chain(
            inventory
                .etherstubs
                .iter()
                .map(|e| (NodeKind::Etherstub, e.link.as_str(), etherstub_data(e))),
        )
        .chain(
            inventory
                .vnics
                .iter()
                .map(|v| (NodeKind::Vnic, v.link.as_str(), vnic_data(v))),
        )
        .chain(
            inventory
                .zones
                .iter()
                .map(|z| (NodeKind::Zone, z.name.as_str(), zone_data(z))),
        );

    let mut seen: HashSet<&str> = HashSet::new();
    let mut nodes = Vec::with_capacity(inventory.node_count());

    for (kind, id, mut data) in records {
        if !seen.insert(id) {
            warn!(id, %kind, "duplicate node id, keeping first record");
            continue;
        }
        data.bandwidth = bandwidth.get(id).copied().unwrap_or_default();
        data.ip_addresses = ips.get(id).cloned().unwrap_or_default();
        nodes.push(GraphNode {
            id: id.to_owned(),
            kind,
            position: placeholder(nodes.len()),
            data,
        });
    }

    nodes
}
