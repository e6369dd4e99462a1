//! Lenient conversions from JSON values as the API returns them.
//!
//! Numbers frequently arrive as strings (`"12.30"`) and optional fields are
//! routinely absent or `null`. Each function returns `None` when the value
//! cannot be represented, leaving the default to the caller.

use serde_json::Value;

pub fn to_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

pub fn to_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.trunc() as i64))
        }
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

pub fn to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_to_f64() {
        assert_eq!(to_f64(&json!(1.5)), Some(1.5));
        assert_eq!(to_f64(&json!(" 12.30 ")), Some(12.3));
        assert_eq!(to_f64(&json!(7)), Some(7.0));
        assert_eq!(to_f64(&json!("n/a")), None);
        assert_eq!(to_f64(&json!("NaN")), None);
        assert_eq!(to_f64(&Value::Null), None);
        assert_eq!(to_f64(&json!({"a": 1})), None);
    }

    #[test]
    fn test_to_i64() {
        assert_eq!(to_i64(&json!(3)), Some(3));
        assert_eq!(to_i64(&json!("2")), Some(2));
        assert_eq!(to_i64(&json!("2.9")), Some(2));
        assert_eq!(to_i64(&json!(4.7)), Some(4));
        assert_eq!(to_i64(&json!(true)), Some(1));
        assert_eq!(to_i64(&json!([])), None);
    }

    #[test]
    fn test_to_string() {
        assert_eq!(to_string(&json!("abc")), Some("abc".into()));
        assert_eq!(to_string(&json!(1300386381676_i64)), Some("1300386381676".into()));
        assert_eq!(to_string(&Value::Null), None);
    }
}
