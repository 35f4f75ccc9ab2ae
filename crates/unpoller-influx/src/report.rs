// Per-tick batch report
//
// Collects the points of one tick along with counters and point errors,
// and renders the one-line summary logged after each write.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use unpoller_core::Metrics;

use crate::error::InfluxError;
use crate::point::{Fields, Point, Tags, clean_fields};

/// Named counters shown in the summary line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counts {
    pub uap: usize,
    pub usg: usize,
    pub udm: usize,
    pub usw: usize,
    pub ids: usize,
    pub event: usize,
    pub alarm: usize,
    pub anomaly: usize,
    pub points: usize,
    pub fields: usize,
}

/// Everything produced for one tick.
#[derive(Debug)]
pub struct Report {
    /// Timestamp for records that do not carry their own.
    pub ts: DateTime<Utc>,
    pub sites: usize,
    pub clients: usize,
    pub sites_dpi: usize,
    pub clients_dpi: usize,
    pub counts: Counts,
    pub errors: Vec<InfluxError>,
    pub elapsed: Duration,
    points: Vec<Point>,
    start: Instant,
}

impl Report {
    pub fn new(metrics: &Metrics) -> Self {
        Self {
            ts: metrics.ts,
            sites: metrics.sites.len(),
            clients: metrics.clients.len(),
            sites_dpi: metrics.sites_dpi.len(),
            clients_dpi: metrics.clients_dpi.len(),
            counts: Counts::default(),
            errors: Vec::new(),
            elapsed: Duration::ZERO,
            points: Vec::new(),
            start: Instant::now(),
        }
    }

    /// Add a record stamped with the tick time.
    pub(crate) fn send(&mut self, measurement: &str, tags: Tags, fields: Fields) {
        self.send_at(measurement, tags, fields, self.ts);
    }

    /// Add a record with its own timestamp. Zero and empty fields are
    /// dropped first; a record left with nothing to say is skipped.
    pub(crate) fn send_at(
        &mut self,
        measurement: &str,
        tags: Tags,
        fields: Fields,
        ts: DateTime<Utc>,
    ) {
        let fields = clean_fields(fields);
        if fields.is_empty() {
            return;
        }

        match Point::new(measurement, tags, fields, ts) {
            Ok(point) => {
                self.counts.points += 1;
                self.counts.fields += point.field_count();
                self.points.push(point);
            }
            Err(err) => self.errors.push(err),
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// The batch body: one line per point.
    pub fn body(&self) -> String {
        self.points
            .iter()
            .map(Point::to_line)
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn finish(&mut self) {
        self.elapsed = self.start.elapsed();
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counts;
        write!(
            f,
            "Site: {}, Client: {}, UAP: {}, USG/UDM: {}, USW: {}, \
             IDS/Event/Alarm/Anomaly: {}/{}/{}/{}, DPI Site/Client: {}/{}, \
             Point: {}, Fields: {}, Errs: {}, Elapsed: {}ms",
            self.sites,
            self.clients,
            c.uap,
            c.usg + c.udm,
            c.usw,
            c.ids,
            c.event,
            c.alarm,
            c.anomaly,
            self.sites_dpi,
            self.clients_dpi,
            c.points,
            c.fields,
            self.errors.len(),
            self.elapsed.as_millis(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::point::{fields, tags};

    #[test]
    fn send_counts_points_and_fields() {
        let mut report = Report::new(&Metrics::default());
        report.send("x", tags! { "a" => "b" }, fields! { "one" => 1_i64, "two" => 2.0 });
        report.send("x", Tags::new(), fields! { "zero" => 0_i64 });
        report.send("x", Tags::new(), fields! { "bad" => f64::INFINITY });

        assert_eq!(report.counts.points, 1);
        assert_eq!(report.counts.fields, 2);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.points().len(), 1);
    }

    #[test]
    fn summary_line_shape() {
        let mut report = Report::new(&Metrics::default());
        report.counts.usg = 1;
        report.counts.udm = 1;
        report.counts.uap = 2;
        let line = report.to_string();
        assert!(line.starts_with("Site: 0, Client: 0, UAP: 2, USG/UDM: 2, USW: 0"));
        assert!(line.ends_with("Errs: 0, Elapsed: 0ms"));
    }
}
