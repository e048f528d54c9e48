// ── Canonical domain model ──
//
// Every type here is the normalized form of a Zoneweaver record. Raw wire
// shapes from `zoneweaver_api::models` are converted once in `convert`,
// so consumers (topology pipeline, CLI) see a single clean interface.

pub mod admin;
pub mod inventory;
pub mod mac;

// ── Re-exports ──────────────────────────────────────────────────────

pub use admin::{BootEnvironment, Package, Repository};
pub use inventory::{
    Aggregate, BandwidthSample, Etherstub, Inventory, IpAssignment, LinkState, PhysicalNic, Route,
    Vnic, Zone, ZoneState,
};
pub use mac::MacAddress;
