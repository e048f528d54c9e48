// Zoneweaver API wire types
//
// Models for the Zoneweaver JSON API. Every response is wrapped in the
// `ApiResponse` envelope. Fields use `#[serde(default)]` liberally because
// the monitoring collectors are inconsistent about field presence and
// about encoding numbers as strings.

use serde::{Deserialize, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// Standard Zoneweaver response envelope.
///
/// ```json
/// { "success": true, "data": ..., "message": "optional" }
/// ```
#[derive(Debug, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of a write/action endpoint: the server's message plus whatever
/// payload it returned (often a queued task id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionOutcome {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl ActionOutcome {
    /// The queued task id, if the backend scheduled the action asynchronously.
    pub fn task_id(&self) -> Option<String> {
        self.data.get("task_id").and_then(|v| match v {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
    }
}

// ── Loose scalars ────────────────────────────────────────────────────

/// A number the collectors may send as either JSON number or string
/// (`"speed": "1000"` vs `"speed": 1000`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumOrString {
    Num(f64),
    Str(String),
}

impl NumOrString {
    /// Numeric value, if the string form parses. Empty strings and
    /// placeholders like `"unknown"` yield `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(n) => Some(*n).filter(|v| v.is_finite()),
            Self::Str(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        }
    }
}

// ── Network inventory ────────────────────────────────────────────────

/// A datalink row from `monitoring/network/interfaces`.
///
/// Covers every dladm class (`phys`, `vnic`, `aggr`, `etherstub`); core
/// keeps only physical links from this endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawInterface {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub speed: Option<NumOrString>,
    #[serde(default)]
    pub mtu: Option<NumOrString>,
    #[serde(default, alias = "mac_address")]
    pub macaddress: Option<String>,
    #[serde(default)]
    pub duplex: Option<String>,
    #[serde(default)]
    pub scan_timestamp: Option<String>,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A link aggregation from `network/aggregates`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawAggregate {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    /// Comma-separated member links (`"e1000g0,e1000g1"`).
    #[serde(default)]
    pub over: Option<String>,
    #[serde(default)]
    pub policy: Option<String>,
    #[serde(default, alias = "lacp_mode")]
    pub lacp_activity: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub speed: Option<NumOrString>,
    #[serde(default)]
    pub mtu: Option<NumOrString>,
    #[serde(default, alias = "mac_address")]
    pub macaddress: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// An etherstub from `network/etherstubs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawEtherstub {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub mtu: Option<NumOrString>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A VNIC from `network/vnics`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawVnic {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub class: Option<String>,
    /// Parent link (physical NIC, aggregate, or etherstub).
    #[serde(default)]
    pub over: Option<String>,
    /// Owning zone, if assigned.
    #[serde(default)]
    pub zone: Option<String>,
    #[serde(default)]
    pub vid: Option<NumOrString>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub speed: Option<NumOrString>,
    #[serde(default)]
    pub mtu: Option<NumOrString>,
    #[serde(default, alias = "mac_address")]
    pub macaddress: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A zone from `zones`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawZone {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub zonepath: Option<String>,
    #[serde(default)]
    pub autoboot: Option<bool>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A per-link bandwidth sample from `monitoring/network/usage`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawUsageSample {
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub rx_mbps: Option<NumOrString>,
    #[serde(default)]
    pub tx_mbps: Option<NumOrString>,
    /// Receive rate in bytes per second.
    #[serde(default)]
    pub rx_bps: Option<NumOrString>,
    /// Transmit rate in bytes per second.
    #[serde(default)]
    pub tx_bps: Option<NumOrString>,
    #[serde(default)]
    pub scan_timestamp: Option<String>,
}

/// An address assignment from `monitoring/network/ipaddresses`.
///
/// Different collector versions name the address field differently; all
/// three spellings are kept and resolved in core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawIpAddress {
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub addrobj: Option<String>,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default)]
    pub prefix_length: Option<NumOrString>,
    #[serde(default)]
    pub ip_version: Option<String>,
    #[serde(default, rename = "type")]
    pub addr_type: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// A routing table entry from `monitoring/network/routes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRoute {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub gateway: Option<String>,
    #[serde(default)]
    pub interface: Option<String>,
    #[serde(default)]
    pub flags: Option<String>,
    #[serde(default)]
    pub ip_version: Option<String>,
}

// ── Package repositories (publishers) ────────────────────────────────

/// A pkg(5) publisher from `system/repositories`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawRepository {
    #[serde(alias = "publisher")]
    pub name: String,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub origins: Vec<String>,
    #[serde(default)]
    pub mirrors: Vec<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub sticky: Option<bool>,
    #[serde(default, rename = "type")]
    pub repo_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for adding or modifying a publisher.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepositoryRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mirrors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticky: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_first: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_before: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_after: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_cert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssl_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

// ── Boot environments ────────────────────────────────────────────────

/// A boot environment from `system/boot-environments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBootEnvironment {
    pub name: String,
    /// beadm flags: `N` active now, `R` active on reboot.
    #[serde(default)]
    pub active: Option<String>,
    #[serde(default)]
    pub is_active_now: Option<bool>,
    #[serde(default)]
    pub is_active_on_reboot: Option<bool>,
    #[serde(default)]
    pub mountpoint: Option<String>,
    #[serde(default)]
    pub space: Option<String>,
    #[serde(default)]
    pub policy: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for `POST system/boot-environments`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateBootEnvironmentRequest {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_be: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
    pub activate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Body for `POST system/boot-environments/{name}/mount`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MountBootEnvironmentRequest {
    pub mountpoint: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

// ── ZFS ARC ──────────────────────────────────────────────────────────

/// How an ARC change is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMethod {
    /// Live tunables only; lost on reboot.
    Runtime,
    /// `/etc/system` entries only; effective after reboot.
    Persistent,
    #[default]
    Both,
}

/// Body for `PUT system/zfs/arc/config` and `POST system/zfs/arc/validate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArcConfigRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arc_max_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arc_min_gb: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arc_max_percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_reserve_hint_pct: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vdev_max_pending: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefetch_disable: Option<bool>,
    pub apply_method: ApplyMethod,
}

/// Body for `POST system/zfs/arc/reset`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArcResetRequest {
    pub apply_method: ApplyMethod,
}

// ── Packages ─────────────────────────────────────────────────────────

/// An installed or available package from `system/packages[/search]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPackage {
    #[serde(alias = "fmri")]
    pub name: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub flags: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Body for `POST system/packages/install` and `.../uninstall`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PackageActionRequest {
    pub packages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_licenses: Option<bool>,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub be_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

// ── Time sync ────────────────────────────────────────────────────────

/// Body for `PUT system/time-sync/config`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSyncConfigRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<String>,
    pub backup_existing: bool,
    pub restart_service: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Body for `POST system/time-sync/sync`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSyncRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

/// Body for `PUT system/timezone`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimezoneRequest {
    pub timezone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn num_or_string_parses_both_encodings() {
        let a: NumOrString = serde_json::from_value(json!("1000")).unwrap();
        let b: NumOrString = serde_json::from_value(json!(1000)).unwrap();
        assert_eq!(a.as_f64(), Some(1000.0));
        assert_eq!(b.as_f64(), Some(1000.0));

        let unknown: NumOrString = serde_json::from_value(json!("unknown")).unwrap();
        assert_eq!(unknown.as_f64(), None);
    }

    #[test]
    fn vnic_tolerates_sparse_rows() {
        let v: RawVnic = serde_json::from_value(json!({
            "link": "vnic0",
            "over": "e1000g0",
            "vid": "10",
            "zone": "web01",
            "mac_address": "2:8:20:aa:bb:cc",
            "some_future_field": true
        }))
        .unwrap();
        assert_eq!(v.link.as_deref(), Some("vnic0"));
        assert_eq!(v.vid.and_then(|x| x.as_f64()), Some(10.0));
        assert_eq!(v.macaddress.as_deref(), Some("2:8:20:aa:bb:cc"));
        assert!(v.extra.contains_key("some_future_field"));
    }

    #[test]
    fn repository_request_skips_unset_fields() {
        let body = RepositoryRequest {
            name: Some("omnios".into()),
            origin: Some("https://pkg.omnios.org/r151050/core/".into()),
            ..RepositoryRequest::default()
        };
        let v = serde_json::to_value(&body).unwrap();
        assert_eq!(
            v,
            json!({
                "name": "omnios",
                "origin": "https://pkg.omnios.org/r151050/core/"
            })
        );
    }

    #[test]
    fn apply_method_serializes_lowercase() {
        let body = ArcResetRequest {
            apply_method: ApplyMethod::Runtime,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({ "apply_method": "runtime" })
        );
    }

    #[test]
    fn action_outcome_extracts_task_id() {
        let outcome = ActionOutcome {
            message: Some("queued".into()),
            data: json!({ "task_id": 42 }),
        };
        assert_eq!(outcome.task_id().as_deref(), Some("42"));
    }
}
