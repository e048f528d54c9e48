// Integration tests for `Host` against a mocked Zoneweaver API.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use zoneweaver_core::{
    Command, CommandResult, ConnectionState, CoreError, GraphOptions, Host, HostConfig,
    PackageChange,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "success": true, "data": data }))
}

fn config(server: &MockServer, preload: bool) -> HostConfig {
    let mut cfg = HostConfig::new(
        Url::parse(&server.uri()).unwrap(),
        SecretString::from("zw-test-key"),
    );
    cfg.refresh_interval_secs = 0;
    cfg.preload_inventory = preload;
    cfg.actor = Some("tester".into());
    cfg
}

async fn mount_get(server: &MockServer, route: &str, data: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ok(data))
        .mount(server)
        .await;
}

// ── Inventory fan-out ───────────────────────────────────────────────

#[tokio::test]
async fn test_connect_degrades_failed_sources_to_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/monitoring/network/interfaces"))
        .and(header("authorization", "Bearer zw-test-key"))
        .respond_with(ok(json!([
            { "link": "e1000g0", "class": "phys", "state": "up", "speed": "1000" }
        ])))
        .mount(&server)
        .await;
    mount_get(
        &server,
        "/network/vnics",
        json!({ "vnics": [{ "link": "web0", "over": "e1000g0", "zone": "web", "vid": 10 }] }),
    )
    .await;
    mount_get(&server, "/zones", json!([{ "name": "web", "status": "running" }])).await;
    Mock::given(method("GET"))
        .and(path("/network/aggregates"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "success": false,
            "message": "dladm show-aggr failed"
        })))
        .mount(&server)
        .await;
    // etherstubs, usage, addresses and routes are not mounted -> 404

    let host = Host::new(config(&server, true));
    host.connect().await.unwrap();

    let inventory = host.inventory();
    assert_eq!(inventory.physical_nics.len(), 1);
    assert_eq!(inventory.physical_nics[0].speed_mbps, Some(1000.0));
    assert_eq!(inventory.vnics[0].vid, Some(10));
    assert_eq!(inventory.zones.len(), 1);
    assert!(inventory.aggregates.is_empty());
    assert!(inventory.bandwidth.is_empty());
    assert_eq!(host.store().version(), 1);

    let topo = host.topology(&GraphOptions::default());
    assert_eq!(topo.nodes.len(), 3);
    assert_eq!(topo.edges.len(), 4);

    host.disconnect().await;
    assert_eq!(*host.connection_state().borrow(), ConnectionState::Disconnected);
}

#[tokio::test]
async fn test_connect_fails_when_every_source_fails() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "success": false,
            "message": "Invalid API key"
        })))
        .mount(&server)
        .await;

    let host = Host::new(config(&server, true));
    let err = host.connect().await.unwrap_err();

    assert!(
        matches!(err, CoreError::AuthenticationFailed { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(*host.connection_state().borrow(), ConnectionState::Failed);
}

#[tokio::test]
async fn test_manual_refresh_bumps_version() {
    let server = MockServer::start().await;
    mount_get(&server, "/zones", json!([{ "name": "db" }])).await;

    let host = Host::new(config(&server, false));
    host.connect().await.unwrap();
    assert!(host.inventory().is_empty());

    let mut stream = host.subscribe_inventory();
    host.refresh_inventory().await.unwrap();

    let latest = stream.changed().await.unwrap();
    assert_eq!(latest.zones[0].name, "db");
    assert!(host.store().last_refresh().is_some());
    host.disconnect().await;
}

#[tokio::test]
async fn test_reconnect_after_disconnect() {
    let server = MockServer::start().await;
    mount_get(&server, "/zones", json!([{ "name": "db" }])).await;
    Mock::given(method("PUT"))
        .and(path("/system/timezone"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "Timezone updated",
            "data": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let host = Host::new(config(&server, true));
    host.connect().await.unwrap();
    host.disconnect().await;

    host.connect().await.unwrap();
    assert_eq!(*host.connection_state().borrow(), ConnectionState::Connected);

    let inventory = host.refresh_inventory().await.unwrap();
    assert_eq!(inventory.zones[0].name, "db");

    let result = host
        .execute(Command::SetTimezone {
            timezone: "Europe/Berlin".into(),
        })
        .await
        .unwrap();
    assert_eq!(result.message(), Some("Timezone updated"));
    host.disconnect().await;
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_execute_install_routes_with_actor() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/system/packages/install"))
        .and(body_json(json!({
            "packages": ["web/curl"],
            "dry_run": true,
            "created_by": "tester"
        })))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "success": true,
            "message": "Package installation task created",
            "data": { "task_id": 42 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let host = Host::new(config(&server, false));
    host.connect().await.unwrap();

    let result = host
        .execute(Command::InstallPackages(PackageChange {
            packages: vec!["web/curl".into()],
            dry_run: true,
            ..PackageChange::default()
        }))
        .await
        .unwrap();

    assert_eq!(
        result,
        CommandResult::Accepted {
            task_id: "42".into(),
            message: Some("Package installation task created".into()),
        }
    );
    host.disconnect().await;
}

#[tokio::test]
async fn test_execute_rejects_invalid_command_locally() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ok(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let host = Host::new(config(&server, false));
    host.connect().await.unwrap();

    let err = host
        .execute(Command::SetTimezone {
            timezone: String::new(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::ValidationFailed { .. }));
    host.disconnect().await;
}

#[tokio::test]
async fn test_execute_requires_connection() {
    let server = MockServer::start().await;
    let host = Host::new(config(&server, false));

    let err = host
        .execute(Command::RemoveRepository {
            name: "extra.omnios".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::HostDisconnected));

    host.connect().await.unwrap();
    host.disconnect().await;
    let err = host
        .execute(Command::RemoveRepository {
            name: "extra.omnios".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::HostDisconnected));
}

#[tokio::test]
async fn test_not_found_maps_to_domain_error() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/system/boot-environments/ghost"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "message": "Boot environment not found"
        })))
        .mount(&server)
        .await;

    let host = Host::new(config(&server, false));
    host.connect().await.unwrap();

    let err = host
        .execute(Command::DeleteBootEnvironment {
            name: "ghost".into(),
            force: false,
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }), "{err:?}");
    host.disconnect().await;
}

// ── One-shot reads ──────────────────────────────────────────────────

#[tokio::test]
async fn test_oneshot_lists_boot_environments() {
    let server = MockServer::start().await;
    mount_get(
        &server,
        "/system/boot-environments",
        json!({ "boot_environments": [
            { "name": "omnios-r151050", "active": "NR", "mountpoint": "/", "space": "2.1G" },
            { "name": "omnios-r151048", "active": "-", "mountpoint": "-" }
        ]}),
    )
    .await;

    let bes = Host::oneshot(config(&server, false), |host| async move {
        host.boot_environments().await
    })
    .await
    .unwrap();

    assert_eq!(bes.len(), 2);
    assert!(bes[0].active_now && bes[0].active_on_reboot);
    assert!(!bes[1].active_now);
    assert_eq!(bes[1].mountpoint, None);
}
