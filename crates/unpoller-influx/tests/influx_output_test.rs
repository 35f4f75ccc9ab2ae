#![allow(clippy::unwrap_used)]
// Integration tests for `InfluxOutput` using wiremock.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use wiremock::matchers::{basic_auth, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use unpoller_api::{Client, DpiApp, DpiTable, FlexBool, FlexInt};
use unpoller_core::{Collect, Collected, Events, Filter, Metrics, Output, PollerError};
use unpoller_influx::{InfluxConfig, InfluxError, InfluxOutput, InfluxWriter, build_report};

// ── Helpers ─────────────────────────────────────────────────────────

struct FakeCollect {
    metrics: Metrics,
    error: Option<&'static str>,
    logs: Mutex<Vec<String>>,
}

impl FakeCollect {
    fn new(metrics: Metrics) -> Self {
        Self {
            metrics,
            error: None,
            logs: Mutex::new(Vec::new()),
        }
    }

    fn logs(&self) -> Vec<String> {
        self.logs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Collect for FakeCollect {
    async fn metrics_from(&self, _filter: &Filter) -> Collected<Metrics> {
        match self.error {
            Some(_) => Collected::failed(self.metrics.clone(), PollerError::NoControllers),
            None => Collected::ok(self.metrics.clone()),
        }
    }

    async fn events(&self, _filter: &Filter) -> Collected<Events> {
        Collected::ok(Events::default())
    }

    fn inputs(&self) -> Vec<String> {
        vec!["unifi".into()]
    }

    fn outputs(&self) -> Vec<String> {
        vec!["influxdb".into()]
    }

    fn logf(&self, _plugin: &str, args: fmt::Arguments<'_>) {
        self.logs.lock().unwrap().push(format!("INFO {args}"));
    }

    fn log_errorf(&self, _plugin: &str, args: fmt::Arguments<'_>) {
        self.logs.lock().unwrap().push(format!("ERROR {args}"));
    }

    fn log_debugf(&self, _plugin: &str, args: fmt::Arguments<'_>) {
        self.logs.lock().unwrap().push(format!("DEBUG {args}"));
    }
}

fn config(url: &str) -> InfluxConfig {
    InfluxConfig {
        url: url.to_owned(),
        user: "writer".into(),
        pass: "s3cret".to_string().into(),
        db: "unifi".into(),
        ..InfluxConfig::default()
    }
}

fn wired_client() -> Client {
    Client {
        mac: "00:11:22:33:44:55".into(),
        name: "nas".into(),
        site_name: "Home (default)".into(),
        source_name: "https://ctrl:8443".into(),
        is_wired: FlexBool::new(true),
        wired_rx_bytes: 100,
        wired_tx_bytes: 200,
        rssi: 50,
        signal: -40,
        ccq: 980,
        ..Client::default()
    }
}

fn dpi(mac: &str) -> DpiTable {
    DpiTable {
        mac: mac.into(),
        name: mac.into(),
        site_name: "S".into(),
        source_name: "C".into(),
        by_app: vec![DpiApp {
            cat: FlexInt::new(1.0),
            app: FlexInt::new(5.0),
            tx_bytes: FlexInt::new(10.0),
            rx_bytes: FlexInt::new(20.0),
            ..DpiApp::default()
        }],
        ..DpiTable::default()
    }
}

fn bundle() -> Metrics {
    Metrics {
        ts: Utc::now(),
        clients: vec![wired_client()],
        clients_dpi: vec![dpi("aa:aa"), dpi("bb:bb")],
        devices: Some(unpoller_api::Devices::default()),
        ..Metrics::default()
    }
}

// ── Batch tests ─────────────────────────────────────────────────────

#[test]
fn test_wired_client_emits_one_clients_record() {
    let report = build_report(&InfluxConfig::default(), &bundle(), &Events::default());
    let body = report.body();

    let clients: Vec<_> = body.lines().filter(|l| l.starts_with("clients,")).collect();
    assert_eq!(clients.len(), 1);
    let line = clients[0];
    assert!(line.contains("rx_bytes=100i"), "{line}");
    assert!(line.contains("tx_bytes=200i"), "{line}");
    assert!(!line.contains("rssi=") && !line.contains("signal=") && !line.contains("ccq="));
}

#[test]
fn test_dpi_totals_follow_client_records() {
    let report = build_report(&InfluxConfig::default(), &bundle(), &Events::default());
    let body = report.body();

    let dpi: Vec<_> = body.lines().filter(|l| l.starts_with("clientdpi,")).collect();
    assert_eq!(dpi.len(), 3);

    let total = dpi.iter().find(|l| l.contains("name=TOTAL")).unwrap();
    assert!(total.contains("application=TOTAL"), "{total}");
    assert!(total.contains("mac=TOTAL"), "{total}");
    assert!(total.contains("site_name=S,source=C"), "{total}");
    assert!(total.contains("rx_bytes=40i,tx_bytes=20i"), "{total}");
    assert_eq!(report.clients_dpi, 2);
}

// ── Write tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_poll_once_posts_line_protocol() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/write"))
        .and(query_param("db", "unifi"))
        .and(query_param("precision", "ns"))
        .and(basic_auth("writer", "s3cret"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let output = InfluxOutput::new(config(&server.uri()));
    let writer = InfluxWriter::new(output.config()).unwrap();
    let collect = FakeCollect::new(bundle());

    let report = output.poll_once(&writer, &collect).await.unwrap();
    assert_eq!(report.clients, 1);
    assert!(report.errors.is_empty());

    let requests = server.received_requests().await.unwrap();
    let body = String::from_utf8(requests[0].body.clone()).unwrap();
    assert!(body.lines().any(|l| l.starts_with("clients,")), "{body}");
    assert_eq!(body.lines().count(), report.counts.points);
}

#[tokio::test]
async fn test_partial_collection_still_writes() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/write"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let output = InfluxOutput::new(config(&server.uri()));
    let writer = InfluxWriter::new(output.config()).unwrap();
    let mut collect = FakeCollect::new(bundle());
    collect.error = Some("controller B down");

    output.poll_once(&writer, &collect).await.unwrap();
    assert!(
        collect.logs().iter().any(|l| l.starts_with("ERROR metric fetch for InfluxDB failed")),
        "{:?}",
        collect.logs()
    );
}

#[tokio::test]
async fn test_write_failure_is_reported() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/write"))
        .respond_with(ResponseTemplate::new(401).set_body_string("authorization failed"))
        .mount(&server)
        .await;

    let output = InfluxOutput::new(config(&server.uri()));
    let writer = InfluxWriter::new(output.config()).unwrap();
    let result = output.poll_once(&writer, &FakeCollect::new(bundle())).await;

    assert!(
        matches!(&result, Err(InfluxError::Write { status: 401, body }) if body == "authorization failed"),
        "expected Write error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_run_once_logs_report_line() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/write"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let output = InfluxOutput::new(config(&server.uri()));
    let collect = FakeCollect::new(bundle());
    output.run_once(&collect).await.unwrap();

    let logs = collect.logs();
    assert!(
        logs.iter().any(|l| l.starts_with("INFO UniFi Metrics Recorded. Site: 0, Client: 1,")),
        "{logs:?}"
    );
}

#[tokio::test]
async fn test_disabled_output_returns_immediately() {
    let output = InfluxOutput::new(InfluxConfig {
        disable: true,
        ..InfluxConfig::default()
    });
    let collect: Arc<dyn Collect> = Arc::new(FakeCollect::new(Metrics::default()));
    assert!(output.run(collect).await.is_ok());
}

#[tokio::test]
async fn test_invalid_url_fails_run() {
    let output = InfluxOutput::new(config("not a url"));
    let collect: Arc<dyn Collect> = Arc::new(FakeCollect::new(Metrics::default()));
    let result = output.run(collect).await;

    assert!(
        matches!(&result, Err(PollerError::Output { plugin, .. }) if plugin == "influxdb"),
        "expected Output error, got: {result:?}"
    );
}
