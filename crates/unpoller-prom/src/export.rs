// ── Descriptors and samples ──
//
// Every scrape registers its descriptors into a fresh registry. Exporters
// turn controller records into `Sample` batches; the emitter writes each
// sample into its metric family.

use prometheus::{CounterVec, GaugeVec, Opts, Registry};

use unpoller_api::FlexInt;

#[derive(Clone)]
enum Family {
    Gauge(GaugeVec),
    Counter(CounterVec),
}

/// One registered metric family. `id` is unique within a scrape.
#[derive(Clone)]
pub(crate) struct Desc {
    id: usize,
    family: Family,
}

impl Desc {
    pub(crate) fn id(&self) -> usize {
        self.id
    }
}

/// Registers descriptors under `<namespace>_<subsystem>_`.
pub(crate) struct Builder<'a> {
    registry: &'a Registry,
    namespace: &'a str,
    subsystem: &'static str,
    next_id: usize,
}

impl<'a> Builder<'a> {
    pub(crate) fn new(registry: &'a Registry, namespace: &'a str) -> Self {
        Self {
            registry,
            namespace,
            subsystem: "",
            next_id: 0,
        }
    }

    pub(crate) fn subsystem(&mut self, subsystem: &'static str) {
        self.subsystem = subsystem;
    }

    pub(crate) fn gauge(&mut self, name: &str, help: &str, labels: &[&str]) -> prometheus::Result<Desc> {
        let vec = GaugeVec::new(self.opts(name, help), labels)?;
        self.registry.register(Box::new(vec.clone()))?;
        Ok(self.desc(Family::Gauge(vec)))
    }

    pub(crate) fn counter(&mut self, name: &str, help: &str, labels: &[&str]) -> prometheus::Result<Desc> {
        let vec = CounterVec::new(self.opts(name, help), labels)?;
        self.registry.register(Box::new(vec.clone()))?;
        Ok(self.desc(Family::Counter(vec)))
    }

    /// Descriptors registered so far.
    pub(crate) fn count(&self) -> usize {
        self.next_id
    }

    fn opts(&self, name: &str, help: &str) -> Opts {
        Opts::new(name, help)
            .namespace(self.namespace)
            .subsystem(self.subsystem)
    }

    fn desc(&mut self, family: Family) -> Desc {
        let id = self.next_id;
        self.next_id += 1;
        Desc { id, family }
    }
}

/// The numeric kinds a record field can carry.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Value {
    Int(i64),
    Float(f64),
    Flex(FlexInt),
}

impl Value {
    #[allow(clippy::cast_precision_loss, clippy::as_conversions)]
    pub(crate) fn as_f64(&self) -> f64 {
        match self {
            Self::Int(v) => *v as f64,
            Self::Float(v) => *v,
            Self::Flex(v) => v.val,
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<&FlexInt> for Value {
    fn from(v: &FlexInt) -> Self {
        Self::Flex(v.clone())
    }
}

/// One value for one label set of one family.
pub(crate) struct Sample {
    pub(crate) desc: Desc,
    pub(crate) value: Value,
    pub(crate) labels: Vec<String>,
}

impl Sample {
    /// Write the sample into its family and return the recorded value.
    pub(crate) fn record(&self) -> Result<f64, String> {
        let value = self.value.as_f64();
        let labels: Vec<&str> = self.labels.iter().map(String::as_str).collect();

        match &self.desc.family {
            Family::Gauge(vec) => vec
                .get_metric_with_label_values(labels.as_slice())
                .map(|gauge| gauge.set(value))
                .map_err(|e| e.to_string())?,
            Family::Counter(vec) => {
                if !value.is_finite() || value < 0.0 {
                    return Err(format!("invalid counter value: {value}"));
                }
                vec.get_metric_with_label_values(labels.as_slice())
                    .map(|counter| counter.inc_by(value))
                    .map_err(|e| e.to_string())?;
            }
        }

        Ok(value)
    }
}

/// Samples produced from one record, sent as a unit.
#[derive(Default)]
pub(crate) struct Batch(Vec<Sample>);

impl Batch {
    pub(crate) fn add(&mut self, desc: &Desc, value: impl Into<Value>, labels: &[String]) {
        self.0.push(Sample {
            desc: desc.clone(),
            value: value.into(),
            labels: labels.to_vec(),
        });
    }

    pub(crate) fn append(&mut self, other: Batch) {
        self.0.extend(other.0);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn into_samples(self) -> Vec<Sample> {
        self.0
    }
}

/// Owned label values from borrowed strings.
pub(crate) fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| (*v).to_owned()).collect()
}

/// `base` with extra values appended.
pub(crate) fn with(base: &[String], extra: &[&str]) -> Vec<String> {
    let mut out = base.to_vec();
    out.extend(extra.iter().map(|v| (*v).to_owned()));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use prometheus::{Encoder, TextEncoder};

    use super::*;

    #[test]
    fn builder_prefixes_names_and_counts() {
        let registry = Registry::new();
        let mut b = Builder::new(&registry, "unifipoller");
        b.subsystem("client");
        let desc = b.gauge("uptime_seconds", "Client Uptime", &["mac"]).unwrap();
        assert_eq!(b.count(), 1);

        let mut batch = Batch::default();
        batch.add(&desc, 42_i64, &labels(&["aa:bb"]));
        for sample in batch.into_samples() {
            assert_eq!(sample.record().unwrap(), 42.0);
        }

        let mut buffer = Vec::new();
        TextEncoder::new().encode(&registry.gather(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains(r#"unifipoller_client_uptime_seconds{mac="aa:bb"} 42"#), "{text}");
    }

    #[test]
    fn duplicate_names_fail_registration() {
        let registry = Registry::new();
        let mut b = Builder::new(&registry, "ns");
        b.gauge("dup", "one", &[]).unwrap();
        assert!(b.gauge("dup", "two", &[]).is_err());
    }

    #[test]
    fn label_count_mismatch_is_an_error() {
        let registry = Registry::new();
        let mut b = Builder::new(&registry, "ns");
        let desc = b.counter("hits_total", "Hits", &["a", "b"]).unwrap();

        let sample = Sample {
            desc,
            value: Value::Float(1.0),
            labels: labels(&["only-one"]),
        };
        assert!(sample.record().is_err());
    }

    #[test]
    fn negative_counter_is_rejected() {
        let registry = Registry::new();
        let mut b = Builder::new(&registry, "ns");
        let desc = b.counter("bytes_total", "Bytes", &[]).unwrap();

        let sample = Sample {
            desc,
            value: Value::Int(-5),
            labels: Vec::new(),
        };
        assert!(sample.record().is_err());
    }

    #[test]
    fn flex_values_read_their_number() {
        assert_eq!(Value::from(&FlexInt::new(2.5)).as_f64(), 2.5);
        assert_eq!(with(&labels(&["a"]), &["b"]), vec!["a", "b"]);
    }
}
