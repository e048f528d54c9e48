// ── Host abstraction ──
//
// Connection lifecycle for one Zoneweaver host: client construction,
// inventory fan-out, periodic refresh, command routing, and topology
// computation over the stored snapshot.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use zoneweaver_api::ApiClient;
use zoneweaver_api::models::{ArcResetRequest, TimeSyncRequest, TimezoneRequest};
use zoneweaver_api::transport::{TlsMode, TransportConfig};

use crate::command::requests::mount_request;
use crate::command::{ArcTuning, Command, CommandEnvelope, CommandResult};
use crate::config::{HostConfig, TlsVerification};
use crate::convert::RawInventory;
use crate::error::CoreError;
use crate::model::{BootEnvironment, Inventory, Package, Repository};
use crate::store::{InventoryStore, InventoryStream};
use crate::topology::{GraphOptions, Topology, compute_graph};

const COMMAND_CHANNEL_SIZE: usize = 32;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Host ─────────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<HostInner>`. `connect()` builds the API
/// client, optionally loads the network inventory, then starts the
/// command processor and the periodic refresh task.
#[derive(Clone)]
pub struct Host {
    inner: Arc<HostInner>,
}

struct HostInner {
    config: HostConfig,
    store: Arc<InventoryStore>,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Token for the current connection. Cancelled on disconnect and
    /// replaced on the next connect.
    cancel_child: Mutex<CancellationToken>,
    client: Mutex<Option<Arc<ApiClient>>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Host {
    /// Create a new Host from configuration. Does NOT connect --
    /// call [`connect()`](Self::connect) to start.
    pub fn new(config: HostConfig) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(HostInner {
                config,
                store: Arc::new(InventoryStore::new()),
                connection_state,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                client: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn config(&self) -> &HostConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<InventoryStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Build the client, load the inventory (if configured), and spawn
    /// background tasks. The refresh task only starts once the initial
    /// load has landed.
    pub async fn connect(&self) -> Result<(), CoreError> {
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let client = match ApiClient::new(config.url.clone(), &config.api_key, &build_transport(config))
        {
            Ok(client) => client,
            Err(e) => {
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Failed);
                return Err(e.into());
            }
        };
        *self.inner.client.lock().await = Some(Arc::new(client));

        if config.preload_inventory {
            if let Err(e) = self.refresh_inventory().await {
                *self.inner.client.lock().await = None;
                self.inner
                    .connection_state
                    .send_replace(ConnectionState::Failed);
                return Err(e);
            }
        }

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let host = self.clone();
            handles.push(tokio::spawn(command_processor_task(host, rx, child.clone())));
        }

        let interval_secs = config.refresh_interval_secs;
        if interval_secs > 0 {
            let host = self.clone();
            handles.push(tokio::spawn(refresh_task(host, interval_secs, child)));
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(url = %config.url, "connected to host");
        Ok(())
    }

    /// Cancel background tasks (including an in-flight refresh) and drop
    /// the client. The host can be connected again afterwards.
    pub async fn disconnect(&self) {
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        *self.inner.client.lock().await = None;

        // The previous receiver was consumed by the command processor.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    async fn client(&self) -> Result<Arc<ApiClient>, CoreError> {
        self.inner
            .client
            .lock()
            .await
            .clone()
            .ok_or(CoreError::HostDisconnected)
    }

    /// Fetch the eight inventory sources concurrently and store the result.
    ///
    /// A failing source is logged and contributes an empty list. Only when
    /// every source fails is the first error returned.
    pub async fn refresh_inventory(&self) -> Result<Arc<Inventory>, CoreError> {
        let cancel = self.inner.cancel_child.lock().await.clone();
        let client = self.client().await?;

        let (interfaces, aggregates, etherstubs, vnics, zones, usage, ip_addresses, routes) = tokio::join!(
            client.list_interfaces(),
            client.list_aggregates(),
            client.list_etherstubs(),
            client.list_vnics(),
            client.list_zones(),
            client.list_usage(),
            client.list_ip_addresses(),
            client.list_routes(),
        );

        let mut fan_in = FanIn::default();
        let raw = RawInventory {
            interfaces: fan_in.take("interfaces", interfaces),
            aggregates: fan_in.take("aggregates", aggregates),
            etherstubs: fan_in.take("etherstubs", etherstubs),
            vnics: fan_in.take("vnics", vnics),
            zones: fan_in.take("zones", zones),
            usage: fan_in.take("usage", usage),
            ip_addresses: fan_in.take("ip_addresses", ip_addresses),
            routes: fan_in.take("routes", routes),
        };

        if let Some(err) = fan_in.all_failed() {
            return Err(err.into());
        }
        if cancel.is_cancelled() {
            debug!("discarding inventory fetched after disconnect");
            return Err(CoreError::HostDisconnected);
        }

        let inventory = Inventory::from(raw);
        debug!(
            nics = inventory.physical_nics.len(),
            aggregates = inventory.aggregates.len(),
            etherstubs = inventory.etherstubs.len(),
            vnics = inventory.vnics.len(),
            zones = inventory.zones.len(),
            failed_sources = fan_in.failures,
            "inventory refresh complete"
        );
        self.inner.store.apply(inventory);
        Ok(self.inner.store.snapshot())
    }

    // ── Command execution ────────────────────────────────────────

    /// Validate a command, send it to the command processor, and await
    /// the result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::HostDisconnected);
        }
        cmd.validate()?;

        let (tx, rx) = tokio::sync::oneshot::channel();

        let command_tx = self.inner.command_tx.lock().await.clone();
        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::HostDisconnected)?;

        rx.await.map_err(|_| CoreError::HostDisconnected)?
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Periodic refresh is disabled since only a single request-response
    /// cycle is needed.
    pub async fn oneshot<F, Fut, T>(config: HostConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Host) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;

        let host = Host::new(cfg);
        host.connect().await?;
        let result = f(host.clone()).await;
        host.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn inventory(&self) -> Arc<Inventory> {
        self.inner.store.snapshot()
    }

    pub fn subscribe_inventory(&self) -> InventoryStream {
        self.inner.store.subscribe()
    }

    /// Run the topology pipeline over the current inventory snapshot.
    pub fn topology(&self, options: &GraphOptions) -> Topology {
        compute_graph(&self.inner.store.snapshot(), options)
    }

    // ── Administration reads ─────────────────────────────────────

    pub async fn packages(&self, filter: Option<&str>) -> Result<Vec<Package>, CoreError> {
        let client = self.client().await?;
        let raw = client.list_packages(filter).await?;
        Ok(raw.into_iter().map(Package::from).collect())
    }

    pub async fn search_packages(&self, query: &str) -> Result<Vec<Package>, CoreError> {
        let client = self.client().await?;
        let raw = client.search_packages(query).await?;
        Ok(raw.into_iter().map(Package::from).collect())
    }

    pub async fn package_info(&self, package: &str) -> Result<Value, CoreError> {
        Ok(self.client().await?.package_info(package).await?)
    }

    pub async fn boot_environments(&self) -> Result<Vec<BootEnvironment>, CoreError> {
        let client = self.client().await?;
        let raw = client.list_boot_environments().await?;
        Ok(raw.into_iter().map(BootEnvironment::from).collect())
    }

    /// Look up one boot environment by name.
    pub async fn boot_environment(&self, name: &str) -> Result<BootEnvironment, CoreError> {
        self.boot_environments()
            .await?
            .into_iter()
            .find(|be| be.name == name)
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "boot environment".into(),
                identifier: name.into(),
            })
    }

    pub async fn repositories(&self) -> Result<Vec<Repository>, CoreError> {
        let client = self.client().await?;
        let raw = client.list_repositories().await?;
        Ok(raw.into_iter().map(Repository::from).collect())
    }

    pub async fn arc_config(&self) -> Result<Value, CoreError> {
        Ok(self.client().await?.get_arc_config().await?)
    }

    /// Ask the host whether `tuning` would be accepted, without applying it.
    pub async fn validate_arc(&self, tuning: &ArcTuning) -> Result<Value, CoreError> {
        tuning.validate()?;
        Ok(self
            .client()
            .await?
            .validate_arc_config(&tuning.to_request())
            .await?)
    }

    pub async fn time_sync_status(&self) -> Result<Value, CoreError> {
        Ok(self.client().await?.time_sync_status().await?)
    }

    pub async fn time_sync_config(&self) -> Result<Value, CoreError> {
        Ok(self.client().await?.time_sync_config().await?)
    }

    pub async fn timezone(&self) -> Result<Value, CoreError> {
        Ok(self.client().await?.get_timezone().await?)
    }

    pub async fn timezones(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.client().await?.list_timezones().await?)
    }
}

// ── Fan-in bookkeeping ───────────────────────────────────────────

const INVENTORY_SOURCES: usize = 8;

#[derive(Default)]
struct FanIn {
    failures: usize,
    first_error: Option<zoneweaver_api::Error>,
}

impl FanIn {
    fn take<T>(&mut self, source: &'static str, result: Result<Vec<T>, zoneweaver_api::Error>) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(e) => {
                warn!(source, error = %e, "inventory source failed, using empty list");
                self.failures += 1;
                if self.first_error.is_none() {
                    self.first_error = Some(e);
                }
                Vec::new()
            }
        }
    }

    fn all_failed(&mut self) -> Option<zoneweaver_api::Error> {
        if self.failures == INVENTORY_SOURCES {
            self.first_error.take()
        } else {
            None
        }
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh the inventory. Cancellation also aborts a
/// refresh that is still in flight.
async fn refresh_task(host: Host, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => break,
                    result = host.refresh_inventory() => {
                        if let Err(e) = result {
                            warn!(error = %e, "periodic refresh failed");
                        }
                    }
                }
            }
        }
    }
}

/// Process commands from the mpsc channel, routing each to one API call.
async fn command_processor_task(
    host: Host,
    mut rx: mpsc::Receiver<CommandEnvelope>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&host, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

async fn route_command(host: &Host, cmd: Command) -> Result<CommandResult, CoreError> {
    let client = host.client().await?;
    let actor = host.inner.config.actor.clone();
    debug!(command = cmd.name(), "routing command");

    let outcome = match cmd {
        // ── Repositories ─────────────────────────────────────────
        Command::AddRepository(spec) => client.add_repository(&spec.into_request(actor)).await?,
        Command::UpdateRepository { name, update } => {
            client
                .update_repository(&name, &update.into_request(actor))
                .await?
        }
        Command::RemoveRepository { name } => client.delete_repository(&name).await?,

        // ── Boot environments ────────────────────────────────────
        Command::CreateBootEnvironment(be) => {
            client
                .create_boot_environment(&be.into_request(actor))
                .await?
        }
        Command::DeleteBootEnvironment { name, force } => {
            client.delete_boot_environment(&name, force).await?
        }
        Command::ActivateBootEnvironment { name } => {
            client.activate_boot_environment(&name).await?
        }
        Command::MountBootEnvironment {
            name,
            mountpoint,
            shared_mode,
        } => {
            client
                .mount_boot_environment(&name, &mount_request(mountpoint, shared_mode, actor))
                .await?
        }
        Command::UnmountBootEnvironment { name, force } => {
            client.unmount_boot_environment(&name, force).await?
        }

        // ── ZFS ARC ──────────────────────────────────────────────
        Command::UpdateArcConfig(tuning) => client.update_arc_config(&tuning.to_request()).await?,
        Command::ResetArcConfig { apply_method } => {
            client
                .reset_arc_config(&ArcResetRequest { apply_method })
                .await?
        }

        // ── Packages ─────────────────────────────────────────────
        Command::InstallPackages(change) => {
            client.install_packages(&change.into_request(actor)).await?
        }
        Command::UninstallPackages(change) => {
            client.uninstall_packages(&change.into_request(actor)).await?
        }

        // ── Time ─────────────────────────────────────────────────
        Command::UpdateTimeSyncConfig(settings) => {
            client
                .update_time_sync_config(&settings.into_request(actor))
                .await?
        }
        Command::SyncTime { server } => {
            client
                .force_time_sync(&TimeSyncRequest {
                    server,
                    created_by: actor,
                })
                .await?
        }
        Command::SetTimezone { timezone } => {
            client
                .set_timezone(&TimezoneRequest {
                    timezone,
                    created_by: actor,
                })
                .await?
        }
    };

    Ok(CommandResult::from(outcome))
}

// ── Helpers ──────────────────────────────────────────────────────

fn build_transport(config: &HostConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
