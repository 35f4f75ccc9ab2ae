// Loosely-typed controller values
//
// The controller reports many counters as a JSON number on one firmware
// and a JSON string (sometimes a word like "auto") on another. These
// wrappers accept either and keep both a numeric and a textual view.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};

/// Words the controller uses for a "true" boolean, matched case-insensitively.
const TRUTHY: [&str; 10] = [
    "1", "true", "yes", "t", "armed", "active", "enabled", "ready", "up", "ok",
];

// ── FlexInt ──────────────────────────────────────────────────────────

/// A number that may arrive as a JSON number, a JSON string, or null.
///
/// Numeric consumers read [`val`](Self::val); tag consumers read
/// [`txt`](Self::txt). A numeric input sets `txt` to its shortest decimal
/// form; a string input keeps the literal and parses what it can.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlexInt {
    pub val: f64,
    pub txt: String,
}

impl FlexInt {
    pub fn new(val: f64) -> Self {
        Self {
            val,
            txt: format_number(val),
        }
    }

    /// The value truncated toward zero.
    #[allow(clippy::cast_possible_truncation)]
    pub fn int64(&self) -> i64 {
        self.val as i64
    }

    /// Add another value in place; the text is re-rendered from the sum.
    pub fn add(&mut self, other: &FlexInt) {
        self.val += other.val;
        self.txt = format_number(self.val);
    }

    fn from_text(txt: &str) -> Self {
        Self {
            val: txt.trim().parse().unwrap_or(0.0),
            txt: txt.to_owned(),
        }
    }
}

impl fmt::Display for FlexInt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.txt)
    }
}

impl From<f64> for FlexInt {
    fn from(val: f64) -> Self {
        Self::new(val)
    }
}

impl From<i64> for FlexInt {
    #[allow(clippy::cast_precision_loss)]
    fn from(val: i64) -> Self {
        Self::new(val as f64)
    }
}

fn format_number(val: f64) -> String {
    format!("{val}")
}

/// Field deserializer that reads JSON `null` as the type's default.
///
/// `#[serde(default)]` only covers a missing key; firmware also sends
/// explicit nulls for unset strings, counters and tables.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl<'de> Deserialize<'de> for FlexInt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlexIntVisitor;

        impl Visitor<'_> for FlexIntVisitor {
            type Value = FlexInt;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a number, a numeric string, or null")
            }

            #[allow(clippy::cast_precision_loss)]
            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FlexInt, E> {
                Ok(FlexInt::new(v as f64))
            }

            #[allow(clippy::cast_precision_loss)]
            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FlexInt, E> {
                Ok(FlexInt::new(v as f64))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FlexInt, E> {
                Ok(FlexInt::new(v))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<FlexInt, E> {
                Ok(FlexInt::new(if v { 1.0 } else { 0.0 }))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FlexInt, E> {
                Ok(FlexInt::from_text(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<FlexInt, E> {
                Ok(FlexInt::new(0.0))
            }

            fn visit_none<E: de::Error>(self) -> Result<FlexInt, E> {
                Ok(FlexInt::new(0.0))
            }
        }

        deserializer.deserialize_any(FlexIntVisitor)
    }
}

impl Serialize for FlexInt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.txt == format_number(self.val) {
            serializer.serialize_f64(self.val)
        } else {
            serializer.serialize_str(&self.txt)
        }
    }
}

// ── FlexBool ─────────────────────────────────────────────────────────

/// A boolean that may arrive as a JSON bool, number, or string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlexBool {
    pub val: bool,
    pub txt: String,
}

impl FlexBool {
    pub fn new(val: bool) -> Self {
        Self {
            val,
            txt: val.to_string(),
        }
    }

    fn from_text(txt: &str) -> Self {
        let trimmed = txt.trim();
        Self {
            val: TRUTHY.iter().any(|t| t.eq_ignore_ascii_case(trimmed)),
            txt: txt.to_owned(),
        }
    }
}

impl fmt::Display for FlexBool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.txt)
    }
}

impl From<bool> for FlexBool {
    fn from(val: bool) -> Self {
        Self::new(val)
    }
}

impl<'de> Deserialize<'de> for FlexBool {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FlexBoolVisitor;

        impl Visitor<'_> for FlexBoolVisitor {
            type Value = FlexBool;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a boolean, a number, a string, or null")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<FlexBool, E> {
                Ok(FlexBool::new(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FlexBool, E> {
                Ok(FlexBool::from_text(&v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FlexBool, E> {
                Ok(FlexBool::from_text(&v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FlexBool, E> {
                Ok(FlexBool::from_text(&format_number(v)))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FlexBool, E> {
                Ok(FlexBool::from_text(v))
            }

            fn visit_unit<E: de::Error>(self) -> Result<FlexBool, E> {
                Ok(FlexBool::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<FlexBool, E> {
                Ok(FlexBool::default())
            }
        }

        deserializer.deserialize_any(FlexBoolVisitor)
    }
}

impl Serialize for FlexBool {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_bool(self.val)
    }
}
