//! Sampled row model and its JSON event encoding.

use base64::Engine;
use chrono::{NaiveDate, NaiveDateTime, Timelike};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// A single column value read from MySQL.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    /// DECIMAL/NUMERIC, kept as the server's textual form to preserve precision.
    Decimal(String),
    Text(String),
    Bytes(Vec<u8>),
    Json(serde_json::Value),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// TIME columns in MySQL's `[-]HH:MM:SS[.ffffff]` form. Hours may exceed 24.
    Time(String),
}

/// Format a datetime as ISO-8601, `YYYY-MM-DDTHH:MM:SS[.ffffff]`.
///
/// The fractional part is only emitted when the microseconds are non-zero.
pub fn iso8601(dt: &NaiveDateTime) -> String {
    if dt.nanosecond() / 1_000 == 0 {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

impl Serialize for ColumnValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ColumnValue::Null => serializer.serialize_none(),
            ColumnValue::Bool(b) => serializer.serialize_bool(*b),
            ColumnValue::Int(i) => serializer.serialize_i64(*i),
            ColumnValue::UInt(u) => serializer.serialize_u64(*u),
            ColumnValue::Float(f) => serializer.serialize_f64(*f),
            ColumnValue::Decimal(s) | ColumnValue::Text(s) | ColumnValue::Time(s) => {
                serializer.serialize_str(s)
            }
            ColumnValue::Bytes(b) => serializer
                .serialize_str(&base64::engine::general_purpose::STANDARD.encode(b)),
            ColumnValue::Json(v) => v.serialize(serializer),
            ColumnValue::Date(d) => serializer.serialize_str(&d.format("%Y-%m-%d").to_string()),
            ColumnValue::DateTime(dt) => serializer.serialize_str(&iso8601(dt)),
        }
    }
}

/// One row fetched from a table, in the column order the server returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledRow {
    columns: Vec<(String, ColumnValue)>,
}

impl SampledRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. A repeated name replaces the earlier value in place.
    pub fn push(&mut self, name: impl Into<String>, value: ColumnValue) {
        let name = name.into();
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value,
            None => self.columns.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnValue> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &ColumnValue)> {
        self.columns.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Encode the row as the JSON text sent as an event body.
    pub fn to_event_body(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl Serialize for SampledRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<N: Into<String>> FromIterator<(N, ColumnValue)> for SampledRow {
    fn from_iter<I: IntoIterator<Item = (N, ColumnValue)>>(iter: I) -> Self {
        let mut row = SampledRow::new();
        for (name, value) in iter {
            row.push(name, value);
        }
        row
    }
}
