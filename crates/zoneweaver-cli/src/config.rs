//! CLI configuration: thin wrapper around `zoneweaver_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--server, --api-key, --insecure, --timeout).

use std::time::Duration;

use secrecy::SecretString;

use zoneweaver_core::{HostConfig, LayoutType, TlsVerification, ViewType};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use zoneweaver_config::{
    Config, Profile, config_path, load_config_or_default, save_config, store_api_key,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build a `HostConfig` from the config file, active profile and flags.
///
/// With no matching profile, `--server` and `--api-key` alone are enough.
pub fn build_host_config(global: &GlobalOpts, cfg: &Config) -> Result<HostConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    if let Some(profile) = cfg.profiles.get(&profile_name) {
        return resolve_profile(profile, &profile_name, global, cfg);
    }

    // An explicitly requested profile must exist.
    if global.profile.is_some() {
        return Err(zoneweaver_config::ConfigError::UnknownProfile {
            name: profile_name,
            available: cfg.profile_names(),
        }
        .into());
    }

    let server = global.server.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url = zoneweaver_config::parse_server(server)?;
    let api_key = global
        .api_key
        .clone()
        .map(SecretString::from)
        .ok_or(CliError::NoCredentials {
            profile: profile_name,
        })?;

    let mut host = HostConfig::new(url, api_key);
    host.timeout = Duration::from_secs(global.timeout.unwrap_or(cfg.defaults.timeout));
    host.refresh_interval_secs = 0;
    host.preload_inventory = false;
    Ok(host)
}

/// Translate a `Profile` + global flags into a `HostConfig`.
///
/// CLI flag overrides take priority over profile values.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    global: &GlobalOpts,
    cfg: &Config,
) -> Result<HostConfig, CliError> {
    // 1. Server URL (flag > env > profile)
    let server = global.server.as_deref().unwrap_or(&profile.server);
    let url = zoneweaver_config::parse_server(server)?;

    // 2. API key (flag > profile env var > keyring > plaintext)
    let api_key = match global.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => zoneweaver_config::resolve_api_key(profile, profile_name)?,
    };

    // 3. TLS verification
    let tls = if global.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        zoneweaver_config::tls_for(profile, &cfg.defaults)
    };

    // 4. Timeout
    let timeout = global
        .timeout
        .or(profile.timeout)
        .unwrap_or(cfg.defaults.timeout);

    let mut host = HostConfig::new(url, api_key);
    host.tls = tls;
    host.timeout = Duration::from_secs(timeout);
    host.refresh_interval_secs = 0;
    host.preload_inventory = false;
    host.actor = profile.actor.clone();
    Ok(host)
}

/// Default view and layout: active profile first, then `[defaults]`.
pub fn graph_defaults(global: &GlobalOpts, cfg: &Config) -> (ViewType, LayoutType) {
    let profile = cfg.profiles.get(&active_profile_name(global, cfg));
    (
        profile
            .and_then(|p| p.view)
            .unwrap_or(cfg.defaults.view),
        profile
            .and_then(|p| p.layout)
            .unwrap_or(cfg.defaults.layout),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use clap::Parser;
    use secrecy::ExposeSecret;

    use super::*;
    use crate::cli::Cli;

    fn global(args: &[&str]) -> GlobalOpts {
        let mut argv = vec!["zw"];
        argv.extend_from_slice(args);
        argv.extend_from_slice(&["time", "status"]);
        Cli::try_parse_from(argv).unwrap().global
    }

    fn config_with_lab() -> Config {
        let mut cfg = Config::default();
        cfg.profiles.insert(
            "lab".into(),
            Profile {
                server: "omnios01:5001".into(),
                api_key: Some("lab-key".into()),
                timeout: Some(10),
                actor: Some("ops".into()),
                layout: Some(LayoutType::Grid),
                ..Profile::default()
            },
        );
        cfg.default_profile = Some("lab".into());
        cfg
    }

    #[test]
    fn flags_override_profile() {
        let cfg = config_with_lab();
        let host = build_host_config(
            &global(&["--api-key", "flag-key", "--timeout", "5", "-k"]),
            &cfg,
        )
        .unwrap();

        assert_eq!(host.url.as_str(), "https://omnios01:5001/");
        assert_eq!(host.api_key.expose_secret(), "flag-key");
        assert_eq!(host.timeout, Duration::from_secs(5));
        assert_eq!(host.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(host.actor.as_deref(), Some("ops"));
        assert!(!host.preload_inventory);
    }

    #[test]
    fn profile_values_apply_without_flags() {
        let cfg = config_with_lab();
        let host = build_host_config(&global(&[]), &cfg).unwrap();
        assert_eq!(host.api_key.expose_secret(), "lab-key");
        assert_eq!(host.timeout, Duration::from_secs(10));
    }

    #[test]
    fn flags_alone_are_enough() {
        let host = build_host_config(
            &global(&["--server", "https://omnios02:5001", "--api-key", "k"]),
            &Config::default(),
        )
        .unwrap();
        assert_eq!(host.url.host_str(), Some("omnios02"));
    }

    #[test]
    fn missing_server_is_reported() {
        let err = build_host_config(&global(&[]), &Config::default()).unwrap_err();
        assert!(matches!(err, CliError::NoConfig { .. }));

        let err = build_host_config(&global(&["--server", "omnios02"]), &Config::default())
            .unwrap_err();
        assert!(matches!(err, CliError::NoCredentials { .. }));
    }

    #[test]
    fn unknown_explicit_profile() {
        let err = build_host_config(&global(&["--profile", "prod"]), &config_with_lab())
            .unwrap_err();
        assert!(matches!(err, CliError::ProfileNotFound { .. }));
    }

    #[test]
    fn graph_defaults_prefer_profile() {
        let cfg = config_with_lab();
        assert_eq!(
            graph_defaults(&global(&[]), &cfg),
            (ViewType::Physical, LayoutType::Grid)
        );
    }
}
