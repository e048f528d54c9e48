//! Integration tests for the `zw` CLI binary.
//!
//! These tests validate argument parsing, help output, shell completions,
//! error handling and offline topology rendering, all without a live host.
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `zw` binary with env isolation.
///
/// Clears all `ZW_*` env vars and points the config file at a
/// nonexistent path so tests never touch the user's real configuration.
fn zw_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("zw");
    cmd.env("HOME", "/tmp/zw-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/zw-cli-test-nonexistent")
        .env("ZW_CONFIG", "/tmp/zw-cli-test-nonexistent/config.toml")
        .env_remove("ZW_PROFILE")
        .env_remove("ZW_SERVER")
        .env_remove("ZW_API_KEY")
        .env_remove("ZW_OUTPUT")
        .env_remove("ZW_INSECURE")
        .env_remove("ZW_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

fn fixture() -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/inventory.json")
        .display()
        .to_string()
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = zw_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    zw_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("OmniOS")
            .and(predicate::str::contains("topology"))
            .and(predicate::str::contains("packages"))
            .and(predicate::str::contains("be")),
    );
}

#[test]
fn test_version_flag() {
    zw_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("zw"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    zw_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    zw_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Offline topology ────────────────────────────────────────────────

#[test]
fn test_topology_from_file_json() {
    let output = zw_cmd()
        .args(["topology", "--from-file", &fixture(), "--output", "json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let topo: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let nodes = topo["nodes"].as_array().unwrap();
    let edges = topo["edges"].as_array().unwrap();

    // `spare` has no VNIC and is hidden by default.
    assert_eq!(nodes.len(), 4);
    assert_eq!(edges.len(), 8);
    assert!(edges.iter().any(|e| e["id"] == "nic0-vnic0-rx"));
    assert!(edges.iter().any(|e| e["id"] == "vnic1-to-zone1-tx"));
    assert!(nodes.iter().all(|n| n["position"]["x"].is_f64()));
}

#[test]
fn test_topology_show_unattached_and_vlan_filter() {
    zw_cmd()
        .args([
            "topology",
            "show",
            "--from-file",
            &fixture(),
            "--show-unattached",
            "--output",
            "plain",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("spare"));

    zw_cmd()
        .args([
            "topology",
            "--from-file",
            &fixture(),
            "--vlan",
            "20",
            "--output",
            "plain",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("vnic1").and(predicate::str::contains("vnic0").not()));
}

#[test]
fn test_topology_table_output() {
    zw_cmd()
        .args([
            "topology",
            "--from-file",
            &fixture(),
            "--view",
            "troubleshoot",
            "--layout",
            "circular",
            "--color",
            "never",
        ])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Nodes (4)")
                .and(predicate::str::contains("Edges (8)"))
                .and(predicate::str::contains("zone1")),
        );
}

#[test]
fn test_topology_patterns_from_file() {
    zw_cmd()
        .args(["topology", "patterns", "--from-file", &fixture(), "-o", "plain"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("network-segmentation")
                .and(predicate::str::contains("multi-homed-zones")),
        );
}

#[test]
fn test_topology_missing_file() {
    zw_cmd()
        .args(["topology", "--from-file", "/tmp/zw-cli-test-nonexistent/inv.json"])
        .assert()
        .failure();
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = zw_cmd().arg("foobar").output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_packages_list_without_host() {
    let output = zw_cmd().args(["packages", "list"]).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(
        text.contains("No host configured") || text.contains("config init"),
        "Expected missing-config diagnostic:\n{text}"
    );
}

#[test]
fn test_every_host_command_needs_a_host() {
    for args in [
        ["packages", "list"],
        ["be", "list"],
        ["arc", "show"],
        ["time", "status"],
        ["repos", "list"],
    ] {
        zw_cmd()
            .args(args)
            .assert()
            .code(2)
            .stderr(predicate::str::contains("No host configured"));
    }
}

#[test]
fn test_server_without_key_is_auth_error() {
    zw_cmd()
        .args(["--server", "omnios01:5001", "be", "list"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("ZW_API_KEY"));
}

#[test]
fn test_config_show_no_config() {
    // `config show` renders the default config when no file exists.
    zw_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_invalid_output_format() {
    let output = zw_cmd()
        .args(["--output", "invalid", "topology"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("possible values"),
        "Expected error about valid output formats:\n{text}"
    );
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_be_subcommands_exist() {
    zw_cmd().args(["be", "--help"]).assert().success().stdout(
        predicate::str::contains("list")
            .and(predicate::str::contains("create"))
            .and(predicate::str::contains("activate"))
            .and(predicate::str::contains("mount"))
            .and(predicate::str::contains("unmount")),
    );
}

#[test]
fn test_time_subcommands_exist() {
    zw_cmd().args(["time", "--help"]).assert().success().stdout(
        predicate::str::contains("status")
            .and(predicate::str::contains("sync"))
            .and(predicate::str::contains("set-timezone")),
    );
}

#[test]
fn test_config_subcommands_exist() {
    zw_cmd().args(["config", "--help"]).assert().success().stdout(
        predicate::str::contains("init")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("profiles"))
            .and(predicate::str::contains("set-key")),
    );
}
