// Time synchronization and timezone endpoints

use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{ActionOutcome, TimeSyncConfigRequest, TimeSyncRequest, TimezoneRequest};

impl ApiClient {
    /// NTP/chrony service status and peer list.
    ///
    /// `GET system/time-sync/status`
    pub async fn time_sync_status(&self) -> Result<Value, Error> {
        let url = self.url("system/time-sync/status")?;
        debug!("fetching time-sync status");
        self.get(url).await
    }

    /// `GET system/time-sync/config`
    pub async fn time_sync_config(&self) -> Result<Value, Error> {
        let url = self.url("system/time-sync/config")?;
        debug!("fetching time-sync config");
        self.get(url).await
    }

    /// `PUT system/time-sync/config`
    pub async fn update_time_sync_config(
        &self,
        body: &TimeSyncConfigRequest,
    ) -> Result<ActionOutcome, Error> {
        let url = self.url("system/time-sync/config")?;
        debug!(servers = body.servers.len(), "updating time-sync config");
        self.put_action(url, body).await
    }

    /// Force an immediate sync, optionally against a specific server.
    ///
    /// `POST system/time-sync/sync`
    pub async fn force_time_sync(&self, body: &TimeSyncRequest) -> Result<ActionOutcome, Error> {
        let url = self.url("system/time-sync/sync")?;
        debug!(server = ?body.server, "forcing time sync");
        self.post_action(url, body).await
    }

    /// `GET system/timezone`
    pub async fn get_timezone(&self) -> Result<Value, Error> {
        let url = self.url("system/timezone")?;
        debug!("fetching timezone");
        self.get(url).await
    }

    /// `PUT system/timezone`
    pub async fn set_timezone(&self, body: &TimezoneRequest) -> Result<ActionOutcome, Error> {
        let url = self.url("system/timezone")?;
        debug!(timezone = %body.timezone, "setting timezone");
        self.put_action(url, body).await
    }

    /// `GET system/timezones`
    pub async fn list_timezones(&self) -> Result<Vec<String>, Error> {
        let url = self.url("system/timezones")?;
        debug!("listing timezones");
        self.get_list(url, "timezones").await
    }
}
