#![allow(clippy::unwrap_used)]
// Integration tests for `UnifiInput` against wiremock controllers.

use std::sync::Arc;

use futures::future::join_all;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unpoller_core::{
    ControllerConfig, Filter, Input, LogEntry, PollerError, UnifiConfig, UnifiInput,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": data }))
}

/// A classic controller with one site, `clients` stations and a switch
/// plus an AP.
async fn setup(clients: usize) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/stat/sites"))
        .respond_with(ok(json!([{ "_id": "s1", "name": "default", "desc": "Home" }])))
        .mount(&server)
        .await;

    let stations: Vec<_> = (0..clients)
        .map(|i| json!({ "mac": format!("00:00:00:00:00:{i:02x}"), "sw_mac": "sw", "is_wired": true }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sta"))
        .respond_with(ok(json!(stations)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ok(json!([
            { "type": "usw", "mac": "sw", "name": "Core Switch" },
            { "type": "uap", "mac": "ap", "name": "Office AP" }
        ])))
        .mount(&server)
        .await;

    server
}

async fn expect_logins(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(times)
        .mount(server)
        .await;
}

fn controller(server: &MockServer) -> ControllerConfig {
    ControllerConfig {
        url: server.uri(),
        ..ControllerConfig::default()
    }
}

fn input(controllers: Vec<ControllerConfig>, dynamic: bool) -> UnifiInput {
    UnifiInput::new(UnifiConfig {
        dynamic,
        controllers,
        ..UnifiConfig::default()
    })
}

// ── Metrics ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_metrics_augments_clients() {
    let server = setup(3).await;
    expect_logins(&server, 1).await;
    let input = input(vec![controller(&server)], false);

    let collected = input.metrics(&Filter::default()).await;
    assert!(collected.error.is_none(), "{:?}", collected.error);

    let metrics = collected.data.unwrap();
    let devices = metrics.devices.unwrap();
    assert_eq!(devices.len(), 2);
    assert_eq!(metrics.clients.len(), 3);
    assert!(metrics.clients.iter().all(|c| c.sw_name == "Core Switch"));
    assert_eq!(metrics.sites[0].site_name, "Home (default)");
}

#[tokio::test]
async fn test_save_sites_off_keeps_devices_and_clients() {
    let server = setup(2).await;
    expect_logins(&server, 1).await;
    let config = ControllerConfig {
        save_sites: false,
        ..controller(&server)
    };
    let input = input(vec![config], false);

    let metrics = input.metrics(&Filter::default()).await.data.unwrap();
    assert!(metrics.sites.is_empty());
    assert_eq!(metrics.clients.len(), 2);
    assert_eq!(metrics.devices.unwrap().len(), 2);
}

#[tokio::test]
async fn test_configured_sites_narrow_to_controller_sites() {
    let server = MockServer::start().await;
    expect_logins(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/stat/sites"))
        .respond_with(ok(json!([
            { "name": "default", "desc": "Home" },
            { "name": "office", "desc": "Office" },
            { "name": "lab", "desc": "Lab" }
        ])))
        .mount(&server)
        .await;
    for site in ["default", "office", "lab"] {
        Mock::given(method("GET"))
            .and(path(format!("/api/s/{site}/stat/sta")))
            .respond_with(ok(json!([{ "mac": format!("{site}-client"), "is_wired": true }])))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/api/s/{site}/stat/device")))
            .respond_with(ok(json!([])))
            .mount(&server)
            .await;
    }

    let config = ControllerConfig {
        sites: vec!["lab".into(), "office".into(), "missing".into()],
        ..controller(&server)
    };
    let input = input(vec![config], false);
    assert!(input.initialize().await.is_ok());
    assert_eq!(input.controllers()[0].sites().await, ["lab", "office"]);

    let collected = input.metrics(&Filter::default()).await;
    assert!(collected.error.is_none(), "{:?}", collected.error);
    let metrics = collected.data.unwrap();

    let sites: Vec<_> = metrics.sites.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(sites, ["office", "lab"]);
    let macs: Vec<_> = metrics.clients.iter().map(|c| c.mac.as_str()).collect();
    assert_eq!(macs, ["office-client", "lab-client"]);
}

#[tokio::test]
async fn test_failing_controller_keeps_healthy_one() {
    let a = setup(2).await;
    expect_logins(&a, 1).await;

    let b = MockServer::start().await;
    expect_logins(&b, 2).await;
    Mock::given(method("GET"))
        .and(path("/api/stat/sites"))
        .respond_with(ok(json!([{ "name": "default" }])))
        .mount(&b)
        .await;
    // Fails the first poll and its retry, then recovers.
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sta"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&b)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/sta"))
        .respond_with(ok(json!([{ "mac": "bb" }])))
        .mount(&b)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/stat/device"))
        .respond_with(ok(json!([])))
        .mount(&b)
        .await;

    let input = input(vec![controller(&a), controller(&b)], false);

    let first = input.metrics(&Filter::default()).await;
    assert_eq!(first.data.as_ref().unwrap().clients.len(), 2);
    let err = first.error.unwrap();
    assert!(
        err.to_string().starts_with(&format!("unifi.GetClients({})", b.uri())),
        "unexpected error: {err}"
    );

    let second = input.metrics(&Filter::default()).await;
    assert!(second.error.is_none(), "{:?}", second.error);
    assert_eq!(second.data.unwrap().clients.len(), 3);
}

#[tokio::test]
async fn test_auth_failure_is_not_fatal_at_startup() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let input = input(vec![controller(&server)], false);
    assert!(input.initialize().await.is_ok());
    assert!(input.controllers()[0].session().await.is_none());
}

#[tokio::test]
async fn test_initialize_without_controllers_fails() {
    let static_input = input(Vec::new(), false);
    let result = static_input.initialize().await;
    assert!(matches!(result, Err(PollerError::NoControllers)), "{result:?}");

    let dynamic_only = input(Vec::new(), true);
    assert!(dynamic_only.initialize().await.is_ok());
}

// ── Targeted and dynamic scrapes ────────────────────────────────────

#[tokio::test]
async fn test_dynamic_controller_logs_in_once() {
    let configured = MockServer::start().await;
    let dynamic = setup(1).await;
    expect_logins(&dynamic, 1).await;

    let input = Arc::new(input(vec![controller(&configured)], true));
    let filter = Filter {
        path: dynamic.uri(),
        ..Filter::default()
    };

    let results = join_all((0..5).map(|_| input.metrics(&filter))).await;
    for collected in &results {
        assert!(collected.error.is_none(), "{:?}", collected.error);
        assert_eq!(collected.data.as_ref().unwrap().clients.len(), 1);
    }

    let again = input.metrics(&filter).await;
    assert!(again.error.is_none());
    assert_eq!(input.dynamic_count().await, 1);
}

#[tokio::test]
async fn test_dynamic_disabled() {
    let configured = MockServer::start().await;
    let input = input(vec![controller(&configured)], false);
    let filter = Filter {
        path: "https://b.local:8443".into(),
        ..Filter::default()
    };

    let collected = input.metrics(&filter).await;
    assert!(collected.data.is_none());
    assert!(
        matches!(collected.error, Some(PollerError::DynamicDisabled)),
        "{:?}",
        collected.error
    );
}

#[tokio::test]
async fn test_dynamic_path_must_be_url() {
    let input = input(Vec::new(), true);
    let filter = Filter {
        role: "nowhere".into(),
        ..Filter::default()
    };

    let collected = input.metrics(&filter).await;
    assert!(
        matches!(collected.error, Some(PollerError::ScrapeFilterMatchFailed { .. })),
        "{:?}",
        collected.error
    );
}

#[tokio::test]
async fn test_role_selects_configured_controller() {
    let server = setup(4).await;
    expect_logins(&server, 1).await;
    let config = ControllerConfig {
        role: "office".into(),
        ..controller(&server)
    };
    let input = input(vec![config], false);
    let filter = Filter {
        role: "Office".into(),
        ..Filter::default()
    };

    let metrics = input.metrics(&filter).await.data.unwrap();
    assert_eq!(metrics.clients.len(), 4);
}

// ── Events ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_events_in_collection_order() {
    let server = setup(0).await;
    expect_logins(&server, 1).await;
    Mock::given(method("GET"))
        .and(path("/api/s/default/list/alarm"))
        .respond_with(ok(json!([{ "_id": "alarm1", "datetime": "2024-01-01T00:00:00Z" }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/s/default/stat/event"))
        .respond_with(ok(json!([{ "_id": "event1", "host": "nas" }])))
        .mount(&server)
        .await;

    let config = ControllerConfig {
        save_alarms: true,
        save_events: true,
        drop_pii: true,
        ..controller(&server)
    };
    let input = input(vec![config], false);

    let events = input.events(&Filter::skip_ids()).await.data.unwrap();
    assert_eq!(events.logs.len(), 2);
    assert!(matches!(&events.logs[0], LogEntry::Alarm(a) if a.id == "alarm1"));
    assert!(matches!(&events.logs[1], LogEntry::Event(e) if e.host.is_empty()));
}

// ── Raw dumps ───────────────────────────────────────────────────────

#[tokio::test]
async fn test_raw_metrics_wraps_sites_in_array() {
    let server = setup(1).await;
    expect_logins(&server, 1).await;
    let input = input(vec![controller(&server)], false);
    let filter = Filter {
        kind: "devices".into(),
        ..Filter::default()
    };

    let raw = input.raw_metrics(&filter).await.unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
    assert_eq!(parsed[0]["data"][0]["name"], "Core Switch");
}

#[tokio::test]
async fn test_raw_metrics_rejects_bad_unit_and_kind() {
    let server = MockServer::start().await;
    let input = input(vec![controller(&server)], false);

    let out_of_range = Filter {
        unit: 3,
        kind: "d".into(),
        ..Filter::default()
    };
    assert!(matches!(
        input.raw_metrics(&out_of_range).await,
        Err(PollerError::ControllerIndexOutOfRange)
    ));

    let unknown = Filter {
        kind: "sites".into(),
        ..Filter::default()
    };
    assert!(matches!(input.raw_metrics(&unknown).await, Err(PollerError::UnknownKind)));
}
