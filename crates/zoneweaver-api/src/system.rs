// System administration endpoints
//
// Package publishers, boot environments, ZFS ARC tuning and pkg(5)
// packages. Writes return `ActionOutcome` since the backend usually queues
// the work as a task and answers with its id.

use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    ActionOutcome, ArcConfigRequest, ArcResetRequest, CreateBootEnvironmentRequest,
    MountBootEnvironmentRequest, PackageActionRequest, RawBootEnvironment, RawPackage,
    RawRepository, RepositoryRequest,
};

// ── Repositories ─────────────────────────────────────────────────────

impl ApiClient {
    /// `GET system/repositories`
    pub async fn list_repositories(&self) -> Result<Vec<RawRepository>, Error> {
        let url = self.url("system/repositories")?;
        debug!("listing repositories");
        self.get_list(url, "publishers").await
    }

    /// `POST system/repositories`
    pub async fn add_repository(&self, body: &RepositoryRequest) -> Result<ActionOutcome, Error> {
        let url = self.url("system/repositories")?;
        debug!(name = ?body.name, "adding repository");
        self.post_action(url, body).await
    }

    /// `PUT system/repositories/{name}`
    pub async fn update_repository(
        &self,
        name: &str,
        body: &RepositoryRequest,
    ) -> Result<ActionOutcome, Error> {
        let url = self.url_segments("system/repositories", &[name])?;
        debug!(name, "updating repository");
        self.put_action(url, body).await
    }

    /// `DELETE system/repositories/{name}`
    pub async fn delete_repository(&self, name: &str) -> Result<ActionOutcome, Error> {
        let url = self.url_segments("system/repositories", &[name])?;
        debug!(name, "removing repository");
        self.delete_action(url).await
    }
}

// ── Boot environments ────────────────────────────────────────────────

impl ApiClient {
    /// `GET system/boot-environments`
    pub async fn list_boot_environments(&self) -> Result<Vec<RawBootEnvironment>, Error> {
        let url = self.url("system/boot-environments")?;
        debug!("listing boot environments");
        self.get_list(url, "boot_environments").await
    }

    /// `POST system/boot-environments`
    pub async fn create_boot_environment(
        &self,
        body: &CreateBootEnvironmentRequest,
    ) -> Result<ActionOutcome, Error> {
        let url = self.url("system/boot-environments")?;
        debug!(name = %body.name, "creating boot environment");
        self.post_action(url, body).await
    }

    /// `DELETE system/boot-environments/{name}?force=...`
    pub async fn delete_boot_environment(
        &self,
        name: &str,
        force: bool,
    ) -> Result<ActionOutcome, Error> {
        let mut url = self.url_segments("system/boot-environments", &[name])?;
        if force {
            url.query_pairs_mut().append_pair("force", "true");
        }
        debug!(name, force, "deleting boot environment");
        self.delete_action(url).await
    }

    /// `POST system/boot-environments/{name}/activate`
    pub async fn activate_boot_environment(&self, name: &str) -> Result<ActionOutcome, Error> {
        let url = self.url_segments("system/boot-environments", &[name, "activate"])?;
        debug!(name, "activating boot environment");
        self.post_action(url, &serde_json::json!({})).await
    }

    /// `POST system/boot-environments/{name}/mount`
    pub async fn mount_boot_environment(
        &self,
        name: &str,
        body: &MountBootEnvironmentRequest,
    ) -> Result<ActionOutcome, Error> {
        let url = self.url_segments("system/boot-environments", &[name, "mount"])?;
        debug!(name, mountpoint = %body.mountpoint, "mounting boot environment");
        self.post_action(url, body).await
    }

    /// `POST system/boot-environments/{name}/unmount`
    pub async fn unmount_boot_environment(
        &self,
        name: &str,
        force: bool,
    ) -> Result<ActionOutcome, Error> {
        let url = self.url_segments("system/boot-environments", &[name, "unmount"])?;
        debug!(name, force, "unmounting boot environment");
        self.post_action(url, &serde_json::json!({ "force": force }))
            .await
    }
}

// ── ZFS ARC ──────────────────────────────────────────────────────────

impl ApiClient {
    /// Current ARC sizing, tunables and limits.
    ///
    /// `GET system/zfs/arc/config`
    ///
    /// Loosely typed: the field set depends on the kernel's kstat output.
    pub async fn get_arc_config(&self) -> Result<Value, Error> {
        let url = self.url("system/zfs/arc/config")?;
        debug!("fetching ARC config");
        self.get(url).await
    }

    /// `PUT system/zfs/arc/config`
    pub async fn update_arc_config(&self, body: &ArcConfigRequest) -> Result<ActionOutcome, Error> {
        let url = self.url("system/zfs/arc/config")?;
        debug!(apply_method = ?body.apply_method, "updating ARC config");
        self.put_action(url, body).await
    }

    /// Dry-run validation of a proposed ARC config.
    ///
    /// `POST system/zfs/arc/validate`
    pub async fn validate_arc_config(&self, body: &ArcConfigRequest) -> Result<Value, Error> {
        let url = self.url("system/zfs/arc/validate")?;
        debug!("validating ARC config");
        self.post(url, body).await
    }

    /// `POST system/zfs/arc/reset`
    pub async fn reset_arc_config(&self, body: &ArcResetRequest) -> Result<ActionOutcome, Error> {
        let url = self.url("system/zfs/arc/reset")?;
        debug!(apply_method = ?body.apply_method, "resetting ARC config");
        self.post_action(url, body).await
    }
}

// ── Packages ─────────────────────────────────────────────────────────

impl ApiClient {
    /// `GET system/packages?filter=...`
    pub async fn list_packages(&self, filter: Option<&str>) -> Result<Vec<RawPackage>, Error> {
        let url = self.url_with_query("system/packages", &[("filter", filter.map(String::from))])?;
        debug!(?filter, "listing packages");
        self.get_list(url, "packages").await
    }

    /// `GET system/packages/search?query=...`
    pub async fn search_packages(&self, query: &str) -> Result<Vec<RawPackage>, Error> {
        let url = self.url_with_query(
            "system/packages/search",
            &[("query", Some(query.to_owned()))],
        )?;
        debug!(query, "searching packages");
        self.get_list(url, "results").await
    }

    /// `GET system/packages/info?package=...`
    pub async fn package_info(&self, package: &str) -> Result<Value, Error> {
        let url = self.url_with_query(
            "system/packages/info",
            &[("package", Some(package.to_owned()))],
        )?;
        debug!(package, "fetching package info");
        self.get(url).await
    }

    /// `POST system/packages/install`
    pub async fn install_packages(
        &self,
        body: &PackageActionRequest,
    ) -> Result<ActionOutcome, Error> {
        let url = self.url("system/packages/install")?;
        debug!(packages = ?body.packages, dry_run = body.dry_run, "installing packages");
        self.post_action(url, body).await
    }

    /// `POST system/packages/uninstall`
    pub async fn uninstall_packages(
        &self,
        body: &PackageActionRequest,
    ) -> Result<ActionOutcome, Error> {
        let url = self.url("system/packages/uninstall")?;
        debug!(packages = ?body.packages, dry_run = body.dry_run, "uninstalling packages");
        self.post_action(url, body).await
    }
}
