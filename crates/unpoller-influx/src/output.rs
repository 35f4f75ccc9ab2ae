// InfluxDB push output
//
// Ticks every interval, pulls one bundle through `Collect`, builds the
// batch and writes it. Ticks never overlap and missed ticks are skipped.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use unpoller_core::{Collect, Filter, Output, PollerError};

use crate::batch::build_report;
use crate::config::InfluxConfig;
use crate::error::InfluxError;
use crate::report::Report;
use crate::writer::InfluxWriter;

pub const PLUGIN_NAME: &str = "influxdb";

pub struct InfluxOutput {
    config: InfluxConfig,
}

impl InfluxOutput {
    pub fn new(config: InfluxConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &InfluxConfig {
        &self.config
    }

    /// One collect, build and write cycle.
    ///
    /// Collection errors are logged and whatever data arrived is still
    /// written; only a failed write is returned.
    pub async fn poll_once(
        &self,
        writer: &InfluxWriter,
        collect: &dyn Collect,
    ) -> Result<Report, InfluxError> {
        let metrics = collect.metrics().await;
        if let Some(err) = &metrics.error {
            collect.log_errorf(PLUGIN_NAME, format_args!("metric fetch for InfluxDB failed: {err}"));
        }

        let filter = Filter {
            skip: true,
            dur: Some(self.config.interval()),
            ..Filter::default()
        };
        let events = collect.events(&filter).await;
        if let Some(err) = &events.error {
            collect.log_errorf(PLUGIN_NAME, format_args!("event fetch for InfluxDB failed: {err}"));
        }

        let mut report = build_report(&self.config, &metrics.data, &events.data);
        writer.write(report.body()).await?;
        report.finish();

        Ok(report)
    }

    /// Single cycle for lambda mode.
    pub async fn run_once(&self, collect: &dyn Collect) -> Result<Report, PollerError> {
        let writer = InfluxWriter::new(&self.config).map_err(output_error)?;
        let report = self.poll_once(&writer, collect).await.map_err(output_error)?;
        collect.logf(PLUGIN_NAME, format_args!("UniFi Metrics Recorded. {report}"));
        Ok(report)
    }

    /// Poll and write on every tick until the error budget runs out.
    async fn tick_loop(
        &self,
        writer: &InfluxWriter,
        collect: &dyn Collect,
        mut ticker: Interval,
    ) -> Result<(), PollerError> {
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut budget = ErrorBudget::new(self.config.max_errors);

        loop {
            ticker.tick().await;

            match self.poll_once(writer, collect).await {
                Ok(report) => {
                    budget.success();
                    for err in &report.errors {
                        collect.log_debugf(PLUGIN_NAME, format_args!("{err}"));
                    }
                    collect.logf(PLUGIN_NAME, format_args!("UniFi Metrics Recorded. {report}"));
                }
                Err(err) => {
                    collect.log_errorf(PLUGIN_NAME, format_args!("{err}"));

                    if budget.failure() {
                        return Err(PollerError::Output {
                            plugin: PLUGIN_NAME.into(),
                            message: format!(
                                "{} consecutive write failures, last: {err}",
                                budget.failures
                            ),
                        });
                    }
                }
            }
        }
    }
}

/// Consecutive failed writes; a limit of 0 never trips.
#[derive(Debug)]
struct ErrorBudget {
    limit: u32,
    failures: u32,
}

impl ErrorBudget {
    fn new(limit: u32) -> Self {
        Self { limit, failures: 0 }
    }

    fn success(&mut self) {
        self.failures = 0;
    }

    /// Record a failure; true once the limit is reached.
    fn failure(&mut self) -> bool {
        self.failures += 1;
        self.limit > 0 && self.failures >= self.limit
    }
}

fn output_error(err: InfluxError) -> PollerError {
    PollerError::Output {
        plugin: PLUGIN_NAME.into(),
        message: err.to_string(),
    }
}

#[async_trait]
impl Output for InfluxOutput {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    async fn run(&self, collect: Arc<dyn Collect>) -> Result<(), PollerError> {
        if self.config.disable {
            collect.log_debugf(
                PLUGIN_NAME,
                format_args!("InfluxDB config missing (or disabled), InfluxDB output disabled!"),
            );
            return Ok(());
        }

        let writer = InfluxWriter::new(&self.config).map_err(output_error)?;
        let period = self.config.interval();

        collect.logf(
            PLUGIN_NAME,
            format_args!(
                "Poller->InfluxDB started, interval: {period:?}, dp: {}, db: {}, url: {}",
                self.config.dead_ports, self.config.db, self.config.url
            ),
        );

        let ticker = time::interval_at(Instant::now() + period, period);
        self.tick_loop(&writer, collect.as_ref(), ticker).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fmt;
    use std::sync::Mutex;
    use std::time::Duration;

    use unpoller_api::{Client, Devices, FlexBool};
    use unpoller_core::{Collected, Events, Metrics};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    struct FakeCollect {
        logs: Mutex<Vec<String>>,
    }

    impl FakeCollect {
        fn new() -> Self {
            Self {
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
            Collected::ok(Metrics {
                clients: vec![Client {
                    mac: "00:11:22:33:44:55".into(),
                    is_wired: FlexBool::new(true),
                    wired_rx_bytes: 100,
                    ..Client::default()
                }],
                devices: Some(Devices::default()),
                ..Metrics::default()
            })
        }

        async fn events(&self, _filter: &Filter) -> Collected<Events> {
            Collected::ok(Events::default())
        }

        fn inputs(&self) -> Vec<String> {
            vec!["unifi".into()]
        }

        fn outputs(&self) -> Vec<String> {
            vec![PLUGIN_NAME.into()]
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

    fn output(server: &MockServer, max_errors: u32) -> (InfluxOutput, InfluxWriter) {
        let output = InfluxOutput::new(InfluxConfig {
            url: server.uri(),
            max_errors,
            ..InfluxConfig::default()
        });
        let writer = InfluxWriter::new(output.config()).unwrap();
        (output, writer)
    }

    fn fast_ticker() -> Interval {
        time::interval(Duration::from_millis(20))
    }

    async fn mount_writes(server: &MockServer, status: u16, times: Option<u64>) {
        let mock = Mock::given(method("POST"))
            .and(path("/write"))
            .respond_with(ResponseTemplate::new(status));
        match times {
            Some(n) => mock.up_to_n_times(n).mount(server).await,
            None => mock.mount(server).await,
        }
    }

    async fn writes(server: &MockServer) -> usize {
        server.received_requests().await.unwrap().len()
    }

    #[tokio::test]
    async fn tick_loop_stops_after_consecutive_failures() {
        let server = MockServer::start().await;
        mount_writes(&server, 500, None).await;
        let (output, writer) = output(&server, 3);
        let collect = FakeCollect::new();

        let result = time::timeout(
            Duration::from_secs(5),
            output.tick_loop(&writer, &collect, fast_ticker()),
        )
        .await
        .unwrap();

        assert!(
            matches!(&result, Err(PollerError::Output { plugin, message })
                if plugin == PLUGIN_NAME && message.starts_with("3 consecutive write failures")),
            "{result:?}"
        );
        assert_eq!(writes(&server).await, 3);
        assert_eq!(collect.logs().len(), 3);
    }

    #[tokio::test]
    async fn tick_loop_success_resets_the_failure_count() {
        let server = MockServer::start().await;
        mount_writes(&server, 500, Some(1)).await;
        mount_writes(&server, 204, Some(1)).await;
        mount_writes(&server, 500, None).await;
        let (output, writer) = output(&server, 2);
        let collect = FakeCollect::new();

        let result = time::timeout(
            Duration::from_secs(5),
            output.tick_loop(&writer, &collect, fast_ticker()),
        )
        .await
        .unwrap();

        assert!(matches!(result, Err(PollerError::Output { .. })), "{result:?}");
        assert_eq!(writes(&server).await, 4);

        let levels: Vec<_> = collect
            .logs()
            .iter()
            .map(|l| l.split(' ').next().unwrap_or_default().to_owned())
            .collect();
        assert_eq!(levels, ["ERROR", "INFO", "ERROR", "ERROR"]);
        assert!(collect.logs()[1].starts_with("INFO UniFi Metrics Recorded."));
    }

    #[tokio::test]
    async fn tick_loop_without_limit_keeps_ticking_through_failures() {
        let server = MockServer::start().await;
        mount_writes(&server, 500, None).await;
        let (output, writer) = output(&server, 0);
        let collect = FakeCollect::new();

        let still_running = time::timeout(
            Duration::from_millis(300),
            output.tick_loop(&writer, &collect, fast_ticker()),
        )
        .await;

        assert!(still_running.is_err());
        assert!(writes(&server).await >= 2);
        assert!(collect.logs().iter().all(|l| l.starts_with("ERROR ")));
    }

    #[test]
    fn zero_budget_never_trips() {
        let mut budget = ErrorBudget::new(0);
        assert!((0..100).all(|_| !budget.failure()));
    }

    #[test]
    fn budget_counts_consecutive_failures() {
        let mut budget = ErrorBudget::new(3);
        assert!(!budget.failure());
        assert!(!budget.failure());
        budget.success();
        assert!(!budget.failure());
        assert!(!budget.failure());
        assert!(budget.failure());
    }
}
