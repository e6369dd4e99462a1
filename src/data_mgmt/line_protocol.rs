//! InfluxDB line protocol encoding of [`Record`]s (second precision).

use itertools::Itertools;

use super::models::{Record, RtValue};

fn escape(s: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if special.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_measurement(s: &str) -> String {
    escape(s, &[',', ' '])
}

/// Escapes a tag key or value. Line breaks are removed and a trailing
/// backslash is doubled so it cannot escape the following separator.
fn escape_key(s: &str) -> String {
    let flat: String = s.chars().filter(|c| !matches!(c, '\n' | '\r')).collect();
    let mut out = escape(&flat, &[',', '=', ' ']);
    if out.ends_with('\\') {
        out.push('\\');
    }
    out
}

fn encode_field_value(value: &RtValue) -> Option<String> {
    match value {
        RtValue::Float(f) if f.is_finite() => Some(f.to_string()),
        RtValue::Float(_) => None,
        RtValue::Int(i) => Some(format!("{i}i")),
        RtValue::String(s) => Some(format!("\"{}\"", escape(s, &['"', '\\']))),
    }
}

/// Encodes one record as a line, or `None` if it has no writable field.
///
/// Tags with empty values are dropped since line protocol cannot carry them.
pub fn encode(record: &Record) -> Option<String> {
    let fields = record
        .all_fields()
        .iter()
        .filter_map(|(k, v)| encode_field_value(v).map(|v| format!("{}={v}", escape_key(k))))
        .join(",");
    if fields.is_empty() {
        return None;
    }

    let mut line = escape_measurement(record.measurement());
    for (k, v) in record.all_tags().iter().filter(|(_, v)| !v.is_empty()) {
        line.push(',');
        line.push_str(&escape_key(k));
        line.push('=');
        line.push_str(&escape_key(v));
    }
    line.push(' ');
    line.push_str(&fields);
    if let Some(ts) = record.get_timestamp() {
        line.push(' ');
        line.push_str(&ts.timestamp().to_string());
    }
    Some(line)
}

/// Encodes a batch; returns the body and the number of records left out.
pub fn encode_batch(records: &[Record]) -> (String, usize) {
    let mut rejected = 0;
    let body = records
        .iter()
        .filter_map(|r| {
            let line = encode(r);
            if line.is_none() {
                log::warn!("Dropping {} record without fields: {:?}", r.measurement(), r.all_tags());
                rejected += 1;
            }
            line
        })
        .join("\n");
    (body, rejected)
}
