//! Shared configuration for zoneweaver tools.
//!
//! TOML profiles, API key resolution (env + keyring + plaintext), and
//! translation to `zoneweaver_core::HostConfig`. The CLI layers its
//! global flags on top.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use zoneweaver_core::{HostConfig, LayoutType, TlsVerification, ViewType};

/// Keyring service name; entries are keyed `{profile}/api-key`.
pub const KEYRING_SERVICE: &str = "zoneweaver";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "ZW_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("profile '{name}' not found")]
    UnknownProfile { name: String, available: Vec<String> },

    #[error("keyring error: {0}")]
    Keyring(String),

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl From<keyring::Error> for ConfigError {
    fn from(err: keyring::Error) -> Self {
        Self::Keyring(err.to_string())
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when `--profile` is not given.
    pub default_profile: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named host profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

impl Config {
    /// Profile names, sorted.
    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.sort();
        names
    }

    /// Resolve `requested` (or the default profile) to a name and profile.
    pub fn profile(&self, requested: Option<&str>) -> Result<(String, &Profile), ConfigError> {
        let name = requested
            .map(str::to_owned)
            .or_else(|| self.default_profile.clone())
            .unwrap_or_else(|| "default".into());
        match self.profiles.get(&name) {
            Some(profile) => Ok((name, profile)),
            None => Err(ConfigError::UnknownProfile {
                name,
                available: self.profile_names(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Inventory refresh interval (seconds) for long-running consumers.
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: u64,

    #[serde(default)]
    pub view: ViewType,

    #[serde(default)]
    pub layout: LayoutType,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            refresh_interval: default_refresh_interval(),
            view: ViewType::default(),
            layout: LayoutType::default(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_refresh_interval() -> u64 {
    30
}

/// A named host profile.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Profile {
    /// API root (e.g., "https://omnios01:5001").
    pub server: String,

    /// API key (plaintext; prefer keyring or env var).
    pub api_key: Option<String>,

    /// Environment variable name containing the API key.
    pub api_key_env: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override refresh interval.
    pub refresh_interval: Option<u64>,

    /// Recorded as `created_by` on write operations.
    pub actor: Option<String>,

    /// Default topology view for this host.
    pub view: Option<ViewType>,

    /// Default topology layout for this host.
    pub layout: Option<LayoutType>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path: `$ZW_CONFIG`, else platform conventions.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("org", "zoneweaver", "zoneweaver").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("zoneweaver");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, layered over defaults and under `ZW_*` variables.
///
/// Nested keys use a double underscore: `ZW_DEFAULTS__TIMEOUT=60`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("ZW_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── API key resolution (without CLI flags) ──────────────────────────

fn keyring_entry(profile_name: &str) -> Result<keyring::Entry, ConfigError> {
    Ok(keyring::Entry::new(
        KEYRING_SERVICE,
        &format!("{profile_name}/api-key"),
    )?)
}

/// Store an API key for `profile_name` in the system keyring.
pub fn store_api_key(profile_name: &str, api_key: &str) -> Result<(), ConfigError> {
    keyring_entry(profile_name)?.set_password(api_key)?;
    Ok(())
}

/// Resolve an API key from the credential chain (no CLI flag step):
/// profile's env var, then keyring, then plaintext.
pub fn resolve_api_key(profile: &Profile, profile_name: &str) -> Result<SecretString, ConfigError> {
    pick_api_key(profile, profile_name, || {
        keyring_entry(profile_name)
            .ok()
            .and_then(|entry| entry.get_password().ok())
    })
}

fn pick_api_key(
    profile: &Profile,
    profile_name: &str,
    from_keyring: impl FnOnce() -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's api_key_env -> env var lookup
    if let Some(ref env_name) = profile.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Ok(SecretString::from(val));
            }
        }
    }

    // 2. System keyring
    if let Some(secret) = from_keyring() {
        return Ok(SecretString::from(secret));
    }

    // 3. Plaintext in config
    if let Some(ref key) = profile.api_key {
        return Ok(SecretString::from(key.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

// ── Translation ─────────────────────────────────────────────────────

/// Parse a server URL, adding `https://` when no scheme is given.
pub fn parse_server(raw: &str) -> Result<url::Url, ConfigError> {
    let candidate = if raw.contains("://") {
        raw.to_owned()
    } else {
        format!("https://{raw}")
    };
    candidate.parse().map_err(|_| ConfigError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {raw}"),
    })
}

/// TLS mode from the profile and global default. Hosts usually run
/// self-signed certificates, so verification is off unless a CA is given
/// or `insecure = false` is set explicitly.
pub fn tls_for(profile: &Profile, defaults: &Defaults) -> TlsVerification {
    if profile.insecure.unwrap_or(defaults.insecure) {
        return TlsVerification::DangerAcceptInvalid;
    }
    if let Some(ref ca_path) = profile.ca_cert {
        return TlsVerification::CustomCa(ca_path.clone());
    }
    if profile.insecure == Some(false) {
        TlsVerification::SystemDefaults
    } else {
        TlsVerification::DangerAcceptInvalid
    }
}

/// Build a `HostConfig` from a profile, with no CLI flag overrides.
pub fn profile_to_host_config(
    profile: &Profile,
    profile_name: &str,
    defaults: &Defaults,
) -> Result<HostConfig, ConfigError> {
    let url = parse_server(&profile.server)?;
    let api_key = resolve_api_key(profile, profile_name)?;

    let mut config = HostConfig::new(url, api_key);
    config.tls = tls_for(profile, defaults);
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.refresh_interval_secs = profile.refresh_interval.unwrap_or(defaults.refresh_interval);
    config.actor = profile.actor.clone();
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use secrecy::ExposeSecret;

    use super::*;

    const SAMPLE: &str = r#"
default_profile = "lab"

[defaults]
timeout = 45
view = "zone-centric"

[profiles.lab]
server = "https://omnios01:5001"
api_key = "plain-key"
actor = "ops"

[profiles.prod]
server = "omnios02.example.net:5001"
api_key_env = "ZW_TEST_PROD_KEY"
insecure = false
layout = "circular"
"#;

    #[test]
    fn loads_profiles_over_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;

            assert_eq!(cfg.default_profile.as_deref(), Some("lab"));
            assert_eq!(cfg.defaults.timeout, 45);
            assert_eq!(cfg.defaults.output, "table");
            assert_eq!(cfg.defaults.view, ViewType::ZoneCentric);
            assert_eq!(cfg.defaults.layout, LayoutType::Hierarchical);
            assert_eq!(cfg.profile_names(), vec!["lab", "prod"]);
            assert_eq!(cfg.profiles["prod"].layout, Some(LayoutType::Circular));
            Ok(())
        });
    }

    #[test]
    fn environment_overrides_file() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("config.toml", SAMPLE)?;
            jail.set_env("ZW_DEFAULTS__TIMEOUT", "90");
            jail.set_env("ZW_DEFAULT_PROFILE", "prod");
            let cfg = load_config_from(Path::new("config.toml")).map_err(|e| e.to_string())?;

            assert_eq!(cfg.defaults.timeout, 90);
            assert_eq!(cfg.default_profile.as_deref(), Some("prod"));
            Ok(())
        });
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(cfg.profiles.is_empty());
        assert_eq!(cfg.defaults.refresh_interval, 30);
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                server: "https://omnios01:5001".into(),
                view: Some(ViewType::Bandwidth),
                ..Profile::default()
            },
        );
        save_config_to(&cfg, &path).unwrap();

        let loaded = load_config_from(&path).unwrap();
        let (name, profile) = loaded.profile(None).unwrap();
        assert_eq!(name, "default");
        assert_eq!(profile.view, Some(ViewType::Bandwidth));
    }

    #[test]
    fn unknown_profile_lists_alternatives() {
        let mut cfg = Config::default();
        cfg.profiles.insert("lab".into(), Profile::default());
        match cfg.profile(Some("prod")) {
            Err(ConfigError::UnknownProfile { name, available }) => {
                assert_eq!(name, "prod");
                assert_eq!(available, vec!["lab"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn api_key_chain_order() {
        figment::Jail::expect_with(|jail| {
            jail.set_env("ZW_TEST_CHAIN_KEY", "from-env");
            let profile = Profile {
                api_key_env: Some("ZW_TEST_CHAIN_KEY".into()),
                api_key: Some("from-file".into()),
                ..Profile::default()
            };
            let key = pick_api_key(&profile, "lab", || Some("from-keyring".into())).unwrap();
            assert_eq!(key.expose_secret(), "from-env");

            let profile = Profile {
                api_key: Some("from-file".into()),
                ..Profile::default()
            };
            let key = pick_api_key(&profile, "lab", || Some("from-keyring".into())).unwrap();
            assert_eq!(key.expose_secret(), "from-keyring");
            let key = pick_api_key(&profile, "lab", || None).unwrap();
            assert_eq!(key.expose_secret(), "from-file");

            assert!(matches!(
                pick_api_key(&Profile::default(), "lab", || None),
                Err(ConfigError::NoCredentials { .. })
            ));
            Ok(())
        });
    }

    #[test]
    fn server_without_scheme_gets_https() {
        assert_eq!(
            parse_server("omnios02:5001").unwrap().as_str(),
            "https://omnios02:5001/"
        );
        assert!(parse_server("http://[bad").is_err());
    }

    #[test]
    fn tls_selection() {
        let defaults = Defaults::default();
        let strict = Profile {
            insecure: Some(false),
            ..Profile::default()
        };
        assert_eq!(tls_for(&strict, &defaults), TlsVerification::SystemDefaults);

        let ca = Profile {
            ca_cert: Some(PathBuf::from("/etc/zw/ca.pem")),
            ..Profile::default()
        };
        assert_eq!(
            tls_for(&ca, &defaults),
            TlsVerification::CustomCa(PathBuf::from("/etc/zw/ca.pem"))
        );
        assert_eq!(
            tls_for(&Profile::default(), &defaults),
            TlsVerification::DangerAcceptInvalid
        );
    }
}
