use chrono::{DateTime, Utc};

/// Parses an epoch-milliseconds value as the API sends it (number or string).
pub fn from_epoch_millis(value: &serde_json::Value) -> Option<DateTime<Utc>> {
    crate::data_mgmt::coerce::to_i64(value).and_then(DateTime::from_timestamp_millis)
}
