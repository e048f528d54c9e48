// zoneweaver-core: Domain model, topology pipeline, and host lifecycle
// between zoneweaver-api and consumers (CLI or any graph renderer).

pub mod command;
pub mod config;
pub mod convert;
pub mod error;
pub mod host;
pub mod model;
pub mod store;
pub mod topology;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{
    ArcTuning, Command, CommandResult, NewBootEnvironment, PackageChange, RepositorySpec,
    TimeSyncSettings,
};
pub use config::{HostConfig, TlsVerification};
pub use error::CoreError;
pub use host::{ConnectionState, Host};
pub use store::{InventoryStore, InventoryStream};
pub use topology::{GraphOptions, LayoutType, Topology, TopologyFilters, ViewType, compute_graph};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    // Network inventory
    Aggregate, BandwidthSample, Etherstub, Inventory, IpAssignment, LinkState, MacAddress,
    PhysicalNic, Route, Vnic, Zone, ZoneState,
    // Administration
    BootEnvironment, Package, Repository,
};

// ApplyMethod is part of the command surface.
pub use zoneweaver_api::models::ApplyMethod;
