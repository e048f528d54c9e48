// ── API-to-domain type conversions ──
//
// Bridges raw `zoneweaver_api` records into canonical `zoneweaver_core::model`
// types. This is the only place that knows about field-name fallbacks
// (`link`/`name`, `ip_address`/`address`/`addr`) and numbers sent as strings.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::debug;

use zoneweaver_api::models::{
    NumOrString, RawAggregate, RawBootEnvironment, RawEtherstub, RawInterface, RawIpAddress,
    RawPackage, RawRepository, RawRoute, RawUsageSample, RawVnic, RawZone,
};

use crate::error::CoreError;
use crate::model::{
    Aggregate, BandwidthSample, BootEnvironment, Etherstub, Inventory, IpAssignment, LinkState,
    MacAddress, Package, PhysicalNic, Repository, Route, Vnic, Zone, ZoneState,
};

// ── Helpers ────────────────────────────────────────────────────────

/// First non-blank candidate, trimmed.
fn first_present(candidates: &[&Option<String>]) -> Option<String> {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_owned)
}

fn number(raw: Option<&NumOrString>) -> Option<f64> {
    raw.and_then(NumOrString::as_f64)
}

/// Link speed in Mbps. Zero and negative values mean "not negotiated".
fn speed(raw: Option<&NumOrString>) -> Option<f64> {
    number(raw).filter(|s| *s > 0.0)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn mtu(raw: Option<&NumOrString>) -> Option<u32> {
    number(raw)
        .filter(|m| *m > 0.0 && *m <= f64::from(u32::MAX))
        .map(|m| m as u32)
}

/// VLAN id; 0 means untagged.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
fn vlan_id(raw: Option<&NumOrString>) -> Option<u16> {
    number(raw)
        .filter(|v| (1.0..=4094.0).contains(v))
        .map(|v| v as u16)
}

fn mac(raw: &Option<String>) -> Option<MacAddress> {
    first_present(&[raw]).map(MacAddress::new)
}

fn link_state(state: &Option<String>, status: &Option<String>) -> LinkState {
    match first_present(&[state, status])
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("up" | "online" | "active") => LinkState::Up,
        Some("down" | "offline" | "failed") => LinkState::Down,
        _ => LinkState::Unknown,
    }
}

fn zone_state(status: &Option<String>, state: &Option<String>) -> ZoneState {
    match first_present(&[status, state])
        .map(|s| s.to_lowercase())
        .as_deref()
    {
        Some("running") => ZoneState::Running,
        Some("installed" | "ready") => ZoneState::Installed,
        Some("configured" | "incomplete") => ZoneState::Configured,
        Some("down" | "shutting_down" | "stopped") => ZoneState::Down,
        _ => ZoneState::Unknown,
    }
}

/// Parse a collector timestamp. Accepts RFC 3339 and the naive
/// `YYYY-MM-DD HH:MM:SS[.fff]` form (interpreted as UTC).
pub(crate) fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn timestamp(raw: &Option<String>) -> Option<DateTime<Utc>> {
    raw.as_deref().and_then(parse_timestamp)
}

fn missing(kind: &str) -> CoreError {
    CoreError::validation(format!("{kind} record has no identifier"))
}

/// Convert every record that carries an identifier, dropping the rest.
fn collect_records<R, T>(kind: &'static str, raws: Vec<R>) -> Vec<T>
where
    T: TryFrom<R, Error = CoreError>,
{
    let total = raws.len();
    let out: Vec<T> = raws.into_iter().filter_map(|r| T::try_from(r).ok()).collect();
    if out.len() < total {
        debug!(kind, skipped = total - out.len(), "dropped records without identifier");
    }
    out
}

// ── Datalinks ──────────────────────────────────────────────────────

/// `dladm` classes treated as physical. Rows with no class come from
/// collectors that only report physical links.
fn is_physical(raw: &RawInterface) -> bool {
    raw.class
        .as_deref()
        .is_none_or(|c| c.trim().is_empty() || c.eq_ignore_ascii_case("phys"))
}

impl TryFrom<RawInterface> for PhysicalNic {
    type Error = CoreError;

    fn try_from(raw: RawInterface) -> Result<Self, Self::Error> {
        let link = first_present(&[&raw.link, &raw.name]).ok_or_else(|| missing("interface"))?;
        Ok(PhysicalNic {
            link,
            state: link_state(&raw.state, &raw.status),
            speed_mbps: speed(raw.speed.as_ref()),
            mtu: mtu(raw.mtu.as_ref()),
            mac: mac(&raw.macaddress),
            duplex: first_present(&[&raw.duplex]),
        })
    }
}

/// Keep physical links only, one per link name, preferring the most
/// recent scan. Rows without a timestamp lose to any timestamped row;
/// on a tie the later row wins.
pub(crate) fn physical_nics(raws: Vec<RawInterface>) -> Vec<PhysicalNic> {
    let mut order: Vec<String> = Vec::new();
    let mut latest: HashMap<String, (Option<DateTime<Utc>>, PhysicalNic)> = HashMap::new();

    for raw in raws.into_iter().filter(is_physical) {
        let ts = timestamp(&raw.scan_timestamp);
        let Ok(nic) = PhysicalNic::try_from(raw) else {
            continue;
        };
        let newer_seen = matches!(latest.get(&nic.link), Some((prev, _)) if *prev > ts);
        if newer_seen {
            continue;
        }
        if !latest.contains_key(&nic.link) {
            order.push(nic.link.clone());
        }
        latest.insert(nic.link.clone(), (ts, nic));
    }

    order
        .into_iter()
        .filter_map(|link| latest.remove(&link).map(|(_, nic)| nic))
        .collect()
}

impl TryFrom<RawAggregate> for Aggregate {
    type Error = CoreError;

    fn try_from(raw: RawAggregate) -> Result<Self, Self::Error> {
        let link = first_present(&[&raw.link, &raw.name]).ok_or_else(|| missing("aggregate"))?;
        let members = raw
            .over
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
            .collect();
        Ok(Aggregate {
            link,
            members,
            policy: first_present(&[&raw.policy]),
            lacp_activity: first_present(&[&raw.lacp_activity]),
            state: link_state(&raw.state, &raw.status),
            speed_mbps: speed(raw.speed.as_ref()),
            mtu: mtu(raw.mtu.as_ref()),
            mac: mac(&raw.macaddress),
        })
    }
}

impl TryFrom<RawEtherstub> for Etherstub {
    type Error = CoreError;

    fn try_from(raw: RawEtherstub) -> Result<Self, Self::Error> {
        let link = first_present(&[&raw.link, &raw.name]).ok_or_else(|| missing("etherstub"))?;
        Ok(Etherstub {
            link,
            state: link_state(&raw.state, &None),
            mtu: mtu(raw.mtu.as_ref()),
        })
    }
}

impl TryFrom<RawVnic> for Vnic {
    type Error = CoreError;

    fn try_from(raw: RawVnic) -> Result<Self, Self::Error> {
        let link = first_present(&[&raw.link, &raw.name]).ok_or_else(|| missing("vnic"))?;
        Ok(Vnic {
            link,
            over: first_present(&[&raw.over]),
            // the global zone owns every unassigned link
            zone: first_present(&[&raw.zone]).filter(|z| z != "global"),
            vid: vlan_id(raw.vid.as_ref()),
            state: link_state(&raw.state, &raw.status),
            speed_mbps: speed(raw.speed.as_ref()),
            mtu: mtu(raw.mtu.as_ref()),
            mac: mac(&raw.macaddress),
        })
    }
}

impl TryFrom<RawZone> for Zone {
    type Error = CoreError;

    fn try_from(raw: RawZone) -> Result<Self, Self::Error> {
        let name = first_present(&[&raw.name]).ok_or_else(|| missing("zone"))?;
        Ok(Zone {
            name,
            state: zone_state(&raw.status, &raw.state),
            brand: first_present(&[&raw.brand]),
            zonepath: first_present(&[&raw.zonepath]),
            autoboot: raw.autoboot,
        })
    }
}

// ── Traffic & addressing ───────────────────────────────────────────

const BYTES_PER_SEC_PER_MBPS: f64 = 1_000_000.0 / 8.0;

impl TryFrom<RawUsageSample> for BandwidthSample {
    type Error = CoreError;

    fn try_from(raw: RawUsageSample) -> Result<Self, Self::Error> {
        let link = first_present(&[&raw.link]).ok_or_else(|| missing("usage"))?;
        let rx_bps = number(raw.rx_bps.as_ref());
        let tx_bps = number(raw.tx_bps.as_ref());
        let rx_mbps = number(raw.rx_mbps.as_ref())
            .or_else(|| rx_bps.map(|b| b / BYTES_PER_SEC_PER_MBPS))
            .unwrap_or(0.0);
        let tx_mbps = number(raw.tx_mbps.as_ref())
            .or_else(|| tx_bps.map(|b| b / BYTES_PER_SEC_PER_MBPS))
            .unwrap_or(0.0);
        Ok(BandwidthSample {
            link,
            rx_mbps,
            tx_mbps,
            rx_bps: rx_bps.unwrap_or(rx_mbps * BYTES_PER_SEC_PER_MBPS),
            tx_bps: tx_bps.unwrap_or(tx_mbps * BYTES_PER_SEC_PER_MBPS),
            scan_timestamp: timestamp(&raw.scan_timestamp),
        })
    }
}

impl TryFrom<RawIpAddress> for IpAssignment {
    type Error = CoreError;

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::as_conversions)]
    fn try_from(raw: RawIpAddress) -> Result<Self, Self::Error> {
        let full = first_present(&[&raw.ip_address, &raw.address, &raw.addr])
            .ok_or_else(|| missing("ip address"))?;
        // addrobj is `<interface>/<tag>`
        let interface = first_present(&[&raw.interface])
            .or_else(|| {
                raw.addrobj
                    .as_deref()
                    .and_then(|a| a.split('/').next())
                    .filter(|s| !s.is_empty())
                    .map(str::to_owned)
            })
            .ok_or_else(|| missing("ip address"))?;

        let split = full
            .split_once('/')
            .map(|(addr, prefix)| (addr.to_owned(), prefix.parse::<u8>().ok()));
        let (address, inline_prefix) = split.unwrap_or((full, None));
        let prefix_length = number(raw.prefix_length.as_ref())
            .filter(|p| (0.0..=128.0).contains(p))
            .map(|p| p as u8)
            .or(inline_prefix);

        Ok(IpAssignment {
            interface,
            address,
            prefix_length,
            ip_version: first_present(&[&raw.ip_version]),
            addr_type: first_present(&[&raw.addr_type]),
            state: first_present(&[&raw.state]),
        })
    }
}

impl TryFrom<RawRoute> for Route {
    type Error = CoreError;

    fn try_from(raw: RawRoute) -> Result<Self, Self::Error> {
        let destination = first_present(&[&raw.destination]).ok_or_else(|| missing("route"))?;
        Ok(Route {
            destination,
            gateway: first_present(&[&raw.gateway]),
            interface: first_present(&[&raw.interface]),
            flags: first_present(&[&raw.flags]),
        })
    }
}

// ── Inventory assembly ─────────────────────────────────────────────

/// The eight raw lists fetched during one inventory refresh.
#[derive(Debug, Default)]
pub struct RawInventory {
    pub interfaces: Vec<RawInterface>,
    pub aggregates: Vec<RawAggregate>,
    pub etherstubs: Vec<RawEtherstub>,
    pub vnics: Vec<RawVnic>,
    pub zones: Vec<RawZone>,
    pub usage: Vec<RawUsageSample>,
    pub ip_addresses: Vec<RawIpAddress>,
    pub routes: Vec<RawRoute>,
}

impl From<RawInventory> for Inventory {
    fn from(raw: RawInventory) -> Self {
        Inventory {
            physical_nics: physical_nics(raw.interfaces),
            aggregates: collect_records("aggregate", raw.aggregates),
            etherstubs: collect_records("etherstub", raw.etherstubs),
            vnics: collect_records("vnic", raw.vnics),
            zones: collect_records("zone", raw.zones),
            bandwidth: collect_records("usage", raw.usage),
            ip_addresses: collect_records("ip address", raw.ip_addresses),
            routes: collect_records("route", raw.routes),
            collected_at: Some(Utc::now()),
        }
    }
}

// ── Administration ─────────────────────────────────────────────────

impl From<RawBootEnvironment> for BootEnvironment {
    fn from(raw: RawBootEnvironment) -> Self {
        let flags = raw.active.as_deref().unwrap_or_default();
        BootEnvironment {
            name: raw.name,
            active_now: raw.is_active_now.unwrap_or_else(|| flags.contains('N')),
            active_on_reboot: raw.is_active_on_reboot.unwrap_or_else(|| flags.contains('R')),
            mountpoint: first_present(&[&raw.mountpoint]).filter(|m| m != "-"),
            space: first_present(&[&raw.space]),
            policy: first_present(&[&raw.policy]),
            created: first_present(&[&raw.created]),
        }
    }
}

impl From<RawRepository> for Repository {
    fn from(raw: RawRepository) -> Self {
        let mut origins = raw.origins;
        if let Some(origin) = first_present(&[&raw.origin]) {
            if !origins.contains(&origin) {
                origins.insert(0, origin);
            }
        }
        Repository {
            name: raw.name,
            origins,
            mirrors: raw.mirrors,
            enabled: raw.enabled.unwrap_or(true),
            sticky: raw.sticky.unwrap_or(true),
            proxy: first_present(&[&raw.proxy]),
            status: first_present(&[&raw.status]),
        }
    }
}

impl From<RawPackage> for Package {
    fn from(raw: RawPackage) -> Self {
        Package {
            name: raw.name,
            publisher: first_present(&[&raw.publisher]),
            version: first_present(&[&raw.version]),
            flags: first_present(&[&raw.flags, &raw.status]),
            summary: first_present(&[&raw.summary]),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw<T: serde::de::DeserializeOwned>(v: serde_json::Value) -> T {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn physical_nics_skip_virtual_classes() {
        let nics = physical_nics(vec![
            raw(json!({ "link": "e1000g0", "class": "phys", "speed": "1000", "state": "up" })),
            raw(json!({ "link": "vnic0", "class": "vnic" })),
            raw(json!({ "link": "ixgbe0" })),
        ]);
        let links: Vec<&str> = nics.iter().map(|n| n.link.as_str()).collect();
        assert_eq!(links, vec!["e1000g0", "ixgbe0"]);
        assert_eq!(nics[0].speed_mbps, Some(1000.0));
        assert_eq!(nics[0].state, LinkState::Up);
    }

    #[test]
    fn physical_nics_keep_latest_scan() {
        let nics = physical_nics(vec![
            raw(json!({ "link": "e1000g0", "state": "down", "scan_timestamp": "2024-05-01T10:00:00Z" })),
            raw(json!({ "link": "e1000g0", "state": "up", "scan_timestamp": "2024-05-01T10:05:00Z" })),
            raw(json!({ "link": "e1000g0", "state": "down" })),
        ]);
        assert_eq!(nics.len(), 1);
        assert_eq!(nics[0].state, LinkState::Up);
    }

    #[test]
    fn zero_speed_is_unknown() {
        let nic = PhysicalNic::try_from(raw::<RawInterface>(json!({ "link": "e1000g1", "speed": 0 })))
            .unwrap();
        assert_eq!(nic.speed_mbps, None);
    }

    #[test]
    fn aggregate_members_split_on_commas() {
        let aggr = Aggregate::try_from(raw::<RawAggregate>(json!({
            "link": "aggr0",
            "over": "e1000g0, e1000g1,"
        })))
        .unwrap();
        assert_eq!(aggr.members, vec!["e1000g0", "e1000g1"]);
    }

    #[test]
    fn vnic_vid_zero_is_untagged() {
        let vnic = Vnic::try_from(raw::<RawVnic>(json!({ "name": "vnic0", "vid": "0", "zone": "global" })))
            .unwrap();
        assert_eq!(vnic.link, "vnic0");
        assert_eq!(vnic.vid, None);
        assert_eq!(vnic.zone, None);
    }

    #[test]
    fn ip_address_field_fallbacks() {
        let a = IpAssignment::try_from(raw::<RawIpAddress>(json!({
            "interface": "vnic0", "ip_address": "10.0.0.5", "prefix_length": 24
        })))
        .unwrap();
        let b = IpAssignment::try_from(raw::<RawIpAddress>(json!({
            "addrobj": "vnic1/v4", "address": "10.0.1.5/24"
        })))
        .unwrap();
        let c = IpAssignment::try_from(raw::<RawIpAddress>(json!({
            "interface": "vnic2", "addr": "fe80::1"
        })))
        .unwrap();

        assert_eq!((a.interface.as_str(), a.address.as_str()), ("vnic0", "10.0.0.5"));
        assert_eq!(a.prefix_length, Some(24));
        assert_eq!((b.interface.as_str(), b.address.as_str()), ("vnic1", "10.0.1.5"));
        assert_eq!(b.prefix_length, Some(24));
        assert_eq!(c.address, "fe80::1");
    }

    #[test]
    fn usage_derives_mbps_from_bytes() {
        let s = BandwidthSample::try_from(raw::<RawUsageSample>(json!({
            "link": "vnic0", "rx_bps": 1_250_000, "tx_mbps": "2"
        })))
        .unwrap();
        assert!((s.rx_mbps - 10.0).abs() < 1e-9);
        assert!((s.tx_mbps - 2.0).abs() < 1e-9);
        assert!((s.tx_bps - 250_000.0).abs() < 1e-9);
    }

    #[test]
    fn naive_timestamps_parse_as_utc() {
        let ts = parse_timestamp("2024-05-01 10:05:00.250").unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-05-01T10:05:00.250+00:00");
    }

    #[test]
    fn boot_environment_flags() {
        let be = BootEnvironment::from(raw::<RawBootEnvironment>(json!({
            "name": "omnios-r151050", "active": "NR", "mountpoint": "/"
        })));
        assert!(be.active_now && be.active_on_reboot);
        assert_eq!(be.mountpoint.as_deref(), Some("/"));
    }

    #[test]
    fn inventory_drops_nameless_records() {
        let inv = Inventory::from(RawInventory {
            vnics: vec![raw(json!({ "over": "e1000g0" })), raw(json!({ "link": "vnic1" }))],
            zones: vec![raw(json!({ "name": "web01", "status": "running" }))],
            ..RawInventory::default()
        });
        assert_eq!(inv.vnics.len(), 1);
        assert_eq!(inv.zones[0].state, ZoneState::Running);
        assert!(inv.collected_at.is_some());
    }
}
