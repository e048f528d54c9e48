// Network inventory endpoints
//
// Read-only sources feeding the topology pipeline. Each list endpoint
// accepts either a bare array or an object wrapping the array under the
// resource name.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::models::{
    RawAggregate, RawEtherstub, RawInterface, RawIpAddress, RawRoute, RawUsageSample, RawVnic,
    RawZone,
};

impl ApiClient {
    /// List datalinks known to the monitoring collector.
    ///
    /// `GET monitoring/network/interfaces`
    pub async fn list_interfaces(&self) -> Result<Vec<RawInterface>, Error> {
        let url = self.url("monitoring/network/interfaces")?;
        debug!("fetching interfaces");
        self.get_list(url, "interfaces").await
    }

    /// Per-link bandwidth samples.
    ///
    /// `GET monitoring/network/usage`
    ///
    /// Several samples per link may be returned; callers pick the latest.
    pub async fn list_usage(&self) -> Result<Vec<RawUsageSample>, Error> {
        let url = self.url("monitoring/network/usage")?;
        debug!("fetching bandwidth usage");
        self.get_list(url, "usage").await
    }

    /// IP address assignments.
    ///
    /// `GET monitoring/network/ipaddresses`
    pub async fn list_ip_addresses(&self) -> Result<Vec<RawIpAddress>, Error> {
        let url = self.url("monitoring/network/ipaddresses")?;
        debug!("fetching ip addresses");
        self.get_list(url, "addresses").await
    }

    /// Routing table.
    ///
    /// `GET monitoring/network/routes`
    pub async fn list_routes(&self) -> Result<Vec<RawRoute>, Error> {
        let url = self.url("monitoring/network/routes")?;
        debug!("fetching routes");
        self.get_list(url, "routes").await
    }

    /// `GET network/aggregates`
    pub async fn list_aggregates(&self) -> Result<Vec<RawAggregate>, Error> {
        let url = self.url("network/aggregates")?;
        debug!("fetching aggregates");
        self.get_list(url, "aggregates").await
    }

    /// `GET network/etherstubs`
    pub async fn list_etherstubs(&self) -> Result<Vec<RawEtherstub>, Error> {
        let url = self.url("network/etherstubs")?;
        debug!("fetching etherstubs");
        self.get_list(url, "etherstubs").await
    }

    /// `GET network/vnics`
    pub async fn list_vnics(&self) -> Result<Vec<RawVnic>, Error> {
        let url = self.url("network/vnics")?;
        debug!("fetching vnics");
        self.get_list(url, "vnics").await
    }

    /// `GET zones`
    pub async fn list_zones(&self) -> Result<Vec<RawZone>, Error> {
        let url = self.url("zones")?;
        debug!("fetching zones");
        self.get_list(url, "zones").await
    }
}
