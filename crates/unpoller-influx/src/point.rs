// Line protocol points
//
// `measurement,tag=v field=1i,other="x" 1700000000000000000`
// Tags are sorted by key; measurement names escape commas and spaces,
// tag keys and values also escape `=`.

use std::collections::BTreeMap;
use std::fmt::Write;

use chrono::{DateTime, Utc};

use unpoller_api::{FlexBool, FlexInt};

use crate::error::InfluxError;

pub type Tags = BTreeMap<String, String>;
pub type Fields = BTreeMap<String, FieldValue>;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl FieldValue {
    /// Zero numbers and empty strings carry no information.
    fn is_empty(&self) -> bool {
        match self {
            Self::Int(v) => *v == 0,
            Self::Float(v) => *v == 0.0,
            Self::Str(v) => v.is_empty(),
            Self::Bool(_) => false,
        }
    }
}

impl From<i64> for FieldValue {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        Self::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        Self::Str(v.to_owned())
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        Self::Str(v.clone())
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<&FlexInt> for FieldValue {
    fn from(v: &FlexInt) -> Self {
        Self::Float(v.val)
    }
}

impl From<&FlexBool> for FieldValue {
    fn from(v: &FlexBool) -> Self {
        Self::Bool(v.val)
    }
}

/// Build a tag map from `key => value` pairs; values are `&str`-like.
macro_rules! tags {
    ($($key:literal => $value:expr),* $(,)?) => {{
        let mut tags = $crate::point::Tags::new();
        $( tags.insert($key.to_owned(), ::std::string::ToString::to_string(&$value)); )*
        tags
    }};
}

/// Build a field map from `key => value` pairs; values convert into [`FieldValue`].
macro_rules! fields {
    ($($key:literal => $value:expr),* $(,)?) => {{
        let mut fields = $crate::point::Fields::new();
        $( fields.insert($key.to_owned(), $crate::point::FieldValue::from($value)); )*
        fields
    }};
}

pub(crate) use {fields, tags};

/// Boolean tag text.
pub(crate) fn flag(b: &FlexBool) -> &'static str {
    if b.val { "true" } else { "false" }
}

/// Drop empty tag values.
pub fn clean_tags(mut tags: Tags) -> Tags {
    tags.retain(|_, v| !v.is_empty());
    tags
}

/// Drop zero numbers and empty strings.
pub fn clean_fields(mut fields: Fields) -> Fields {
    fields.retain(|_, v| !v.is_empty());
    fields
}

/// One validated line-protocol point.
#[derive(Debug, Clone)]
pub struct Point {
    measurement: String,
    tags: Tags,
    fields: Fields,
    ts: DateTime<Utc>,
}

impl Point {
    pub fn new(
        measurement: &str,
        tags: Tags,
        fields: Fields,
        ts: DateTime<Utc>,
    ) -> Result<Self, InfluxError> {
        let invalid = |reason| InfluxError::InvalidPoint {
            measurement: measurement.to_owned(),
            reason,
        };

        if measurement.is_empty() {
            return Err(invalid("empty measurement"));
        }
        if fields.is_empty() {
            return Err(invalid("no fields"));
        }
        if fields
            .values()
            .any(|v| matches!(v, FieldValue::Float(f) if !f.is_finite()))
        {
            return Err(invalid("non-finite float"));
        }

        Ok(Self {
            measurement: measurement.to_owned(),
            tags: clean_tags(tags),
            fields,
            ts,
        })
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Render as one line without a trailing newline.
    pub fn to_line(&self) -> String {
        let mut line = escape(&self.measurement, &[',', ' ']);

        for (key, value) in &self.tags {
            let _ = write!(
                line,
                ",{}={}",
                escape(key, &[',', ' ', '=']),
                escape(value, &[',', ' ', '='])
            );
        }

        let mut separator = ' ';
        for (key, value) in &self.fields {
            line.push(separator);
            separator = ',';
            line.push_str(&escape(key, &[',', ' ', '=']));
            line.push('=');
            match value {
                FieldValue::Int(v) => {
                    let _ = write!(line, "{v}i");
                }
                FieldValue::Float(v) => {
                    let _ = write!(line, "{v}");
                }
                FieldValue::Bool(v) => {
                    let _ = write!(line, "{v}");
                }
                FieldValue::Str(v) => {
                    let _ = write!(line, "\"{}\"", escape(v, &['"', '\\']));
                }
            }
        }

        let nanos = self
            .ts
            .timestamp_nanos_opt()
            .unwrap_or_else(|| self.ts.timestamp() * 1_000_000_000);
        let _ = write!(line, " {nanos}");
        line
    }
}

fn escape(raw: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn ts() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn renders_sorted_escaped_line() {
        let point = Point::new(
            "clients",
            tags! { "site_name" => "Home (default)", "mac" => "aa:bb", "empty" => "" },
            fields! { "rx_bytes" => 100_i64, "ratio" => 0.5, "note" => "say \"hi\"", "up" => true },
            ts(),
        )
        .unwrap();

        assert_eq!(
            point.to_line(),
            "clients,mac=aa:bb,site_name=Home\\ (default) \
             note=\"say \\\"hi\\\"\",ratio=0.5,rx_bytes=100i,up=true 1700000000000000000"
        );
    }

    #[test]
    fn rejects_empty_fields_and_nan() {
        assert!(Point::new("x", Tags::new(), Fields::new(), ts()).is_err());
        assert!(Point::new("x", Tags::new(), fields! { "f" => f64::NAN }, ts()).is_err());
    }

    #[test]
    fn clean_fields_drops_zero_and_empty() {
        let cleaned = clean_fields(fields! {
            "zero" => 0_i64, "fzero" => 0.0, "blank" => "", "keep" => 1_i64, "flag" => false,
        });
        let keys: Vec<_> = cleaned.keys().map(String::as_str).collect();
        assert_eq!(keys, ["flag", "keep"]);
    }

    #[test]
    fn flex_values_convert() {
        assert_eq!(FieldValue::from(&FlexInt::new(3.0)), FieldValue::Float(3.0));
        assert_eq!(FieldValue::from(&FlexBool::new(true)), FieldValue::Bool(true));
    }
}
