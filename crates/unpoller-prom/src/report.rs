// Per-scrape report

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;

use unpoller_core::Metrics;

/// Record counts from one scrape's bundle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Counts {
    pub sites: usize,
    pub clients: usize,
    pub uap: usize,
    /// USGs and UDMs together.
    pub usg: usize,
    pub usw: usize,
}

impl Counts {
    pub fn new(m: &Metrics) -> Self {
        let mut counts = Self {
            sites: m.sites.len(),
            clients: m.clients.len(),
            ..Self::default()
        };
        if let Some(d) = &m.devices {
            counts.uap = d.uaps.len();
            counts.usg = d.usgs.len() + d.udms.len();
            counts.usw = d.usws.len();
        }
        counts
    }
}

/// What one scrape produced, logged after the body is encoded.
#[derive(Debug, Default)]
pub struct Report {
    pub counts: Counts,
    /// Samples written.
    pub total: usize,
    /// Samples whose value was zero.
    pub zeros: usize,
    /// Distinct descriptors that received a sample.
    pub descs: HashSet<usize>,
    pub errors: Vec<String>,
    /// Time spent fetching from the controllers.
    pub fetch: Duration,
    /// Time for the whole scrape.
    pub elapsed: Duration,
}

impl Report {
    pub fn new(m: &Metrics) -> Self {
        Self {
            counts: Counts::new(m),
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, desc: usize, value: f64) {
        self.total += 1;
        self.descs.insert(desc);
        if value.abs() < f64::EPSILON {
            self.zeros += 1;
        }
    }

    pub(crate) fn error(&mut self, err: String) {
        self.errors.push(err);
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.counts;
        write!(
            f,
            "Site: {}, Client: {}, UAP: {}, USG/UDM: {}, USW: {}, Descs: {}, \
             Metrics: {}, Errs: {}, 0s: {}, Reqs/Total: {}ms / {}ms",
            c.sites,
            c.clients,
            c.uap,
            c.usg,
            c.usw,
            self.descs.len(),
            self.total,
            self.errors.len(),
            self.zeros,
            self.fetch.as_millis(),
            self.elapsed.as_millis(),
        )
    }
}

#[cfg(test)]
mod tests {
    use unpoller_api::{Devices, Udm, Usg};

    use super::*;

    #[test]
    fn gateways_and_dream_machines_count_together() {
        let m = Metrics {
            devices: Some(Devices {
                usgs: vec![Usg::default()],
                udms: vec![Udm::default(), Udm::default()],
                ..Devices::default()
            }),
            ..Metrics::default()
        };
        assert_eq!(Counts::new(&m).usg, 3);
    }

    #[test]
    fn display_matches_log_format() {
        let mut r = Report::new(&Metrics::default());
        r.record(1, 0.0);
        r.record(1, 5.0);
        r.record(2, 1.0);
        r.error("bad".into());
        r.fetch = Duration::from_millis(12);
        r.elapsed = Duration::from_millis(20);

        assert_eq!(
            r.to_string(),
            "Site: 0, Client: 0, UAP: 0, USG/UDM: 0, USW: 0, Descs: 2, \
             Metrics: 3, Errs: 1, 0s: 1, Reqs/Total: 12ms / 20ms"
        );
    }
}
