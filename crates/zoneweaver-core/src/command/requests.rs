// ── Typed request structs for Command payloads ──
//
// Domain-side inputs for write commands. Each converts into the matching
// API body once the host knows who is acting (`created_by`).

use serde::{Deserialize, Serialize};
use zoneweaver_api::models::{
    ApplyMethod, ArcConfigRequest, CreateBootEnvironmentRequest, MountBootEnvironmentRequest,
    PackageActionRequest, RepositoryRequest, TimeSyncConfigRequest,
};

use crate::error::CoreError;

// ── Repositories ───────────────────────────────────────────────────

/// Publisher settings. `None` fields are left unchanged on update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositorySpec {
    pub name: Option<String>,
    pub origin: Option<String>,
    #[serde(default)]
    pub mirrors: Vec<String>,
    pub enabled: Option<bool>,
    pub sticky: Option<bool>,
    pub search_first: Option<bool>,
    pub search_before: Option<String>,
    pub search_after: Option<String>,
    pub ssl_cert: Option<String>,
    pub ssl_key: Option<String>,
    pub proxy: Option<String>,
}

impl RepositorySpec {
    /// A new publisher needs both a name and an origin.
    pub fn validate_new(&self) -> Result<(), CoreError> {
        if self.name.as_deref().is_none_or(str::is_empty) {
            return Err(CoreError::validation("repository name is required"));
        }
        if self.origin.as_deref().is_none_or(str::is_empty) {
            return Err(CoreError::validation("repository origin URL is required"));
        }
        Ok(())
    }

    pub(crate) fn into_request(self, created_by: Option<String>) -> RepositoryRequest {
        RepositoryRequest {
            name: self.name,
            origin: self.origin,
            mirrors: self.mirrors,
            enabled: self.enabled,
            sticky: self.sticky,
            search_first: self.search_first,
            search_before: self.search_before,
            search_after: self.search_after,
            ssl_cert: self.ssl_cert,
            ssl_key: self.ssl_key,
            proxy: self.proxy,
            created_by,
        }
    }
}

// ── Boot environments ──────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewBootEnvironment {
    pub name: String,
    pub description: Option<String>,
    /// Clone from this BE instead of the active one.
    pub source_be: Option<String>,
    pub snapshot: Option<String>,
    #[serde(default)]
    pub activate: bool,
}

impl NewBootEnvironment {
    pub(crate) fn into_request(self, created_by: Option<String>) -> CreateBootEnvironmentRequest {
        CreateBootEnvironmentRequest {
            name: self.name,
            description: self.description,
            source_be: self.source_be,
            snapshot: self.snapshot,
            activate: self.activate,
            created_by,
        }
    }
}

pub(crate) fn mount_request(
    mountpoint: String,
    shared_mode: Option<String>,
    created_by: Option<String>,
) -> MountBootEnvironmentRequest {
    MountBootEnvironmentRequest {
        mountpoint,
        shared_mode,
        created_by,
    }
}

// ── ZFS ARC ────────────────────────────────────────────────────────

/// Proposed ARC limits. Only the fields that are set are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArcTuning {
    pub arc_max_gb: Option<f64>,
    pub arc_min_gb: Option<f64>,
    pub arc_max_percent: Option<f64>,
    pub user_reserve_hint_pct: Option<f64>,
    pub vdev_max_pending: Option<u32>,
    pub prefetch_disable: Option<bool>,
    #[serde(default)]
    pub apply_method: ApplyMethod,
}

fn percent_in_range(value: Option<f64>, field: &str) -> Result<(), CoreError> {
    match value {
        Some(p) if !(1.0..=100.0).contains(&p) => Err(CoreError::validation(format!(
            "{field} must be between 1 and 100, got {p}"
        ))),
        _ => Ok(()),
    }
}

impl ArcTuning {
    /// Local sanity checks before the host validates against real memory.
    pub fn validate(&self) -> Result<(), CoreError> {
        let any_set = self.arc_max_gb.is_some()
            || self.arc_min_gb.is_some()
            || self.arc_max_percent.is_some()
            || self.user_reserve_hint_pct.is_some()
            || self.vdev_max_pending.is_some()
            || self.prefetch_disable.is_some();
        if !any_set {
            return Err(CoreError::validation("no ARC setting given"));
        }

        for (value, field) in [(self.arc_max_gb, "arc_max_gb"), (self.arc_min_gb, "arc_min_gb")] {
            if value.is_some_and(|gb| gb <= 0.0 || !gb.is_finite()) {
                return Err(CoreError::validation(format!("{field} must be positive")));
            }
        }
        if let (Some(min), Some(max)) = (self.arc_min_gb, self.arc_max_gb) {
            if min > max {
                return Err(CoreError::validation(format!(
                    "arc_min_gb ({min}) exceeds arc_max_gb ({max})"
                )));
            }
        }
        percent_in_range(self.arc_max_percent, "arc_max_percent")?;
        percent_in_range(self.user_reserve_hint_pct, "user_reserve_hint_pct")?;
        Ok(())
    }

    pub(crate) fn to_request(&self) -> ArcConfigRequest {
        ArcConfigRequest {
            arc_max_gb: self.arc_max_gb,
            arc_min_gb: self.arc_min_gb,
            arc_max_percent: self.arc_max_percent,
            user_reserve_hint_pct: self.user_reserve_hint_pct,
            vdev_max_pending: self.vdev_max_pending,
            prefetch_disable: self.prefetch_disable,
            apply_method: self.apply_method,
        }
    }
}

// ── Packages ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageChange {
    pub packages: Vec<String>,
    pub accept_licenses: Option<bool>,
    #[serde(default)]
    pub dry_run: bool,
    /// Create a new boot environment with this name for the change.
    pub be_name: Option<String>,
}

impl PackageChange {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.packages.iter().all(|p| p.trim().is_empty()) {
            return Err(CoreError::validation("at least one package is required"));
        }
        Ok(())
    }

    pub(crate) fn into_request(self, created_by: Option<String>) -> PackageActionRequest {
        PackageActionRequest {
            packages: self
                .packages
                .into_iter()
                .filter(|p| !p.trim().is_empty())
                .collect(),
            accept_licenses: self.accept_licenses,
            dry_run: self.dry_run,
            be_name: self.be_name,
            created_by,
        }
    }
}

// ── Time sync ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSyncSettings {
    /// Raw ntp.conf / chrony.conf content. Wins over `servers` when set.
    pub config_content: Option<String>,
    #[serde(default)]
    pub servers: Vec<String>,
    pub backup_existing: bool,
    pub restart_service: bool,
}

impl Default for TimeSyncSettings {
    fn default() -> Self {
        Self {
            config_content: None,
            servers: Vec::new(),
            backup_existing: true,
            restart_service: true,
        }
    }
}

impl TimeSyncSettings {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.config_content.is_none() && self.servers.is_empty() {
            return Err(CoreError::validation(
                "either config content or at least one server is required",
            ));
        }
        Ok(())
    }

    pub(crate) fn into_request(self, created_by: Option<String>) -> TimeSyncConfigRequest {
        TimeSyncConfigRequest {
            config_content: self.config_content,
            servers: self.servers,
            backup_existing: self.backup_existing,
            restart_service: self.restart_service,
            created_by,
        }
    }
}
