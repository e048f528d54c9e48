// ── Runtime connection configuration ──
//
// These types describe *how* to reach one Zoneweaver host. They carry
// the API key and connection tuning but never touch disk; the CLI builds
// a `HostConfig` from its profile and hands it in.

use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification. Default, since hosts usually run self-signed.
    #[default]
    DangerAcceptInvalid,
}

/// Configuration for connecting to a single host.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// API root (e.g., `https://omnios01:5001`).
    pub url: Url,
    pub api_key: SecretString,
    pub tls: TlsVerification,
    /// Per-request timeout.
    pub timeout: Duration,
    /// How often to re-fetch the network inventory (seconds). 0 = never.
    pub refresh_interval_secs: u64,
    /// Fetch the network inventory during `connect()`.
    pub preload_inventory: bool,
    /// Recorded as `created_by` on write requests.
    pub actor: Option<String>,
}

impl HostConfig {
    pub fn new(url: Url, api_key: SecretString) -> Self {
        Self {
            url,
            api_key,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            refresh_interval_secs: 30,
            preload_inventory: true,
            actor: None,
        }
    }
}
