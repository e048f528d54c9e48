// ── Network inventory domain types ──
//
// One snapshot of a host's datalinks, zones and traffic counters. The
// snapshot is read-only: it is rebuilt on every poll and replaced whole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::mac::MacAddress;

/// Operational state of a datalink.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkState {
    Up,
    Down,
    #[default]
    Unknown,
}

/// Lifecycle state of a zone, as reported by `zoneadm`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ZoneState {
    Running,
    Installed,
    Configured,
    Down,
    #[default]
    Unknown,
}

/// A physical NIC (`dladm show-phys`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalNic {
    pub link: String,
    #[serde(default)]
    pub state: LinkState,
    /// Advertised speed in Mbps.
    #[serde(default)]
    pub speed_mbps: Option<f64>,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub mac: Option<MacAddress>,
    #[serde(default)]
    pub duplex: Option<String>,
}

/// A link aggregation bundling physical NICs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aggregate {
    pub link: String,
    /// Member links, in the order the host reports them.
    #[serde(default)]
    pub members: Vec<String>,
    #[serde(default)]
    pub policy: Option<String>,
    #[serde(default)]
    pub lacp_activity: Option<String>,
    #[serde(default)]
    pub state: LinkState,
    #[serde(default)]
    pub speed_mbps: Option<f64>,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub mac: Option<MacAddress>,
}

/// A virtual switch with no physical backing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Etherstub {
    pub link: String,
    #[serde(default)]
    pub state: LinkState,
    #[serde(default)]
    pub mtu: Option<u32>,
}

/// A VNIC layered on a NIC, aggregate or etherstub.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vnic {
    pub link: String,
    /// Parent link.
    #[serde(default)]
    pub over: Option<String>,
    /// Owning zone.
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub vid: Option<u16>,
    #[serde(default)]
    pub state: LinkState,
    #[serde(default)]
    pub speed_mbps: Option<f64>,
    #[serde(default)]
    pub mtu: Option<u32>,
    #[serde(default)]
    pub mac: Option<MacAddress>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub name: String,
    #[serde(default)]
    pub state: ZoneState,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub zonepath: Option<String>,
    #[serde(default)]
    pub autoboot: Option<bool>,
}

/// Traffic counters for one link at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandwidthSample {
    pub link: String,
    #[serde(default)]
    pub rx_mbps: f64,
    #[serde(default)]
    pub tx_mbps: f64,
    /// Receive rate in bytes per second.
    #[serde(default)]
    pub rx_bps: f64,
    /// Transmit rate in bytes per second.
    #[serde(default)]
    pub tx_bps: f64,
    #[serde(default)]
    pub scan_timestamp: Option<DateTime<Utc>>,
}

/// An address configured on a link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAssignment {
    pub interface: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub destination: String,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub flags: Option<String>,
}

/// Everything the topology pipeline consumes, gathered in one poll.
///
/// Serializable so a snapshot can be saved (`zw topology inventory`) and
/// rendered later without a live host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Inventory {
    pub physical_nics: Vec<PhysicalNic>,
    pub aggregates: Vec<Aggregate>,
    pub etherstubs: Vec<Etherstub>,
    pub vnics: Vec<Vnic>,
    pub zones: Vec<Zone>,
    pub bandwidth: Vec<BandwidthSample>,
    pub ip_addresses: Vec<IpAssignment>,
    pub routes: Vec<Route>,
    pub collected_at: Option<DateTime<Utc>>,
}

impl Inventory {
    /// Number of records that become graph nodes.
    pub fn node_count(&self) -> usize {
        self.physical_nics.len()
            + self.aggregates.len()
            + self.etherstubs.len()
            + self.vnics.len()
            + self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_count() == 0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn sparse_snapshot_deserializes() {
        let inv: Inventory = serde_json::from_value(json!({
            "physical_nics": [{ "link": "nic0", "speed_mbps": 1000.0 }],
            "vnics": [{ "link": "vnic0", "over": "nic0", "vid": 10, "zone": "zone1" }],
            "zones": [{ "name": "zone1", "state": "running" }]
        }))
        .unwrap();

        assert_eq!(inv.node_count(), 3);
        assert_eq!(inv.physical_nics[0].state, LinkState::Unknown);
        assert_eq!(inv.zones[0].state, ZoneState::Running);
        assert!(inv.bandwidth.is_empty());
    }

    #[test]
    fn link_state_parses_lowercase() {
        assert_eq!("down".parse::<LinkState>().unwrap(), LinkState::Down);
        assert_eq!(LinkState::Up.to_string(), "up");
    }
}
