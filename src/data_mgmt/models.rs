use std::collections::BTreeMap;

use chrono::{DateTime, offset::Utc};

/// Untyped payload for one entity as returned by the API.
pub type RawRecord = serde_json::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum RtValue {
    Float(f64),
    Int(i64),
    String(String),
}

impl RtValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RtValue::Float(f) => Some(*f),
            RtValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RtValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A flat record ready for a sink: indexed string tags plus typed fields.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    measurement: String,
    timestamp: Option<DateTime<Utc>>,
    tags: BTreeMap<String, String>,
    fields: BTreeMap<String, RtValue>,
}

impl Record {
    pub fn new(measurement: impl Into<String>) -> Self {
        Record {
            measurement: measurement.into(),
            timestamp: None,
            tags: BTreeMap::new(),
            fields: BTreeMap::new(),
        }
    }

    pub fn measurement(&self) -> &str {
        &self.measurement
    }

    pub fn get_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = Some(timestamp);
    }

    pub fn set_tag(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.tags.insert(key.into(), value.into());
    }

    pub fn get_tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    pub fn all_tags(&self) -> &BTreeMap<String, String> {
        &self.tags
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: RtValue) {
        self.fields.insert(key.into(), value);
    }

    pub fn get_field(&self, key: &str) -> Option<&RtValue> {
        self.fields.get(key)
    }

    pub fn all_fields(&self) -> &BTreeMap<String, RtValue> {
        &self.fields
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_tag(key, value);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: RtValue) -> Self {
        self.set_field(key, value);
        self
    }
}

/// Outcome of one batch write. Rows a sink refused are counted, not hidden.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriteReport {
    pub written: usize,
    pub rejected: usize,
}

impl WriteReport {
    pub fn is_partial(&self) -> bool {
        self.rejected > 0
    }
}
