use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use ureq::tls::{TlsConfig, TlsProvider};

mod error;
pub mod sign;

pub use error::SolisCloudError;

pub const DEFAULT_BASE_URL: &str = "https://soliscloud.com:13333";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const SUCCESS_CODE: &str = "0";

pub mod endpoints {
    pub const USER_STATION_LIST: &str = "/v1/api/userStationList";
    pub const STATION_DETAIL_LIST: &str = "/v1/api/stationDetailList";
    pub const INVERTER_LIST: &str = "/v1/api/inverterList";
    pub const INVERTER_DETAIL: &str = "/v1/api/inverterDetail";
    pub const INVERTER_DETAIL_LIST: &str = "/v1/api/inverterDetailList";
    pub const INVERTER_DAY: &str = "/v1/api/inverterDay";
    pub const INVERTER_MONTH: &str = "/v1/api/inverterMonth";
}

/// One entity as returned by the API, left untyped.
pub type Payload = Value;

#[derive(Debug, Deserialize)]
struct Envelope {
    code: Option<Value>,
    msg: Option<String>,
    data: Option<Value>,
}

/// Blocking SolisCloud client keyed by an API key and secret.
pub struct SolisCloud {
    agent: ureq::Agent,
    base_url: String,
    key: String,
    secret: Vec<u8>,
}

impl SolisCloud {
    pub fn new(base_url: &str, key: &str, secret: &str, timeout: Duration) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .http_status_as_error(false)
            .tls_config(
                TlsConfig::builder()
                    .provider(TlsProvider::NativeTls)
                    .build(),
            )
            .build();
        SolisCloud {
            agent: config.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            secret: secret.as_bytes().to_vec(),
        }
    }

    fn post(&self, path: &str, body: &Value) -> Result<Option<Value>, SolisCloudError> {
        let body = serde_json::to_string(body)?;
        let headers = sign::sign(&self.key, &self.secret, body.as_bytes(), path, Utc::now());
        log::debug!("POST {path} {body}");

        let mut response = self
            .agent
            .post(format!("{}{path}", self.base_url))
            .header("Content-MD5", headers.content_md5.as_str())
            .header("Content-Type", sign::CONTENT_TYPE)
            .header("Date", headers.date.as_str())
            .header("Authorization", headers.authorization.as_str())
            .send(body.as_bytes())?;

        let status = response.status().as_u16();
        let text = response.body_mut().read_to_string()?;
        if status != 200 {
            return Err(SolisCloudError::http_status(status, &text));
        }
        log::trace!("Response from {path}: {text}");
        unpack(serde_json::from_str::<Envelope>(&text)?)
    }

    pub fn user_station_list(
        &self,
        page_no: u32,
        page_size: u32,
    ) -> Result<Vec<Payload>, SolisCloudError> {
        let data = self.post(
            endpoints::USER_STATION_LIST,
            &json!({"pageNo": page_no, "pageSize": page_size}),
        )?;
        page_records(data)
    }

    pub fn station_detail_list(
        &self,
        page_no: u32,
        page_size: u32,
    ) -> Result<Vec<Payload>, SolisCloudError> {
        let data = self.post(
            endpoints::STATION_DETAIL_LIST,
            &json!({"pageNo": page_no, "pageSize": page_size}),
        )?;
        records(data)
    }

    /// Inverters visible to the key, optionally restricted to one station.
    pub fn inverter_list(
        &self,
        page_no: u32,
        page_size: u32,
        station_id: Option<&str>,
    ) -> Result<Vec<Payload>, SolisCloudError> {
        let mut body = json!({"pageNo": page_no, "pageSize": page_size});
        if let Some(station_id) = station_id {
            body["stationId"] = json!(station_id);
        }
        let data = self.post(endpoints::INVERTER_LIST, &body)?;
        page_records(data)
    }

    pub fn inverter_detail(&self, inverter_id: &str) -> Result<Option<Payload>, SolisCloudError> {
        let data = self.post(endpoints::INVERTER_DETAIL, &json!({"id": inverter_id}))?;
        match data {
            None | Some(Value::Null) => Ok(None),
            Some(detail @ Value::Object(_)) => Ok(Some(detail)),
            Some(other) => Err(SolisCloudError::UnexpectedResponse(format!(
                "inverter detail is not an object: {other}"
            ))),
        }
    }

    pub fn inverter_detail_list(
        &self,
        page_no: u32,
        page_size: u32,
    ) -> Result<Vec<Payload>, SolisCloudError> {
        let data = self.post(
            endpoints::INVERTER_DETAIL_LIST,
            &json!({"pageNo": page_no, "pageSize": page_size}),
        )?;
        records(data)
    }

    /// Intraday series for one inverter; `day` is `YYYY-MM-DD`.
    pub fn inverter_day(
        &self,
        inverter_id: &str,
        currency: &str,
        day: &str,
        time_zone: i32,
    ) -> Result<Vec<Payload>, SolisCloudError> {
        let data = self.post(
            endpoints::INVERTER_DAY,
            &json!({"id": inverter_id, "money": currency, "time": day, "timeZone": time_zone}),
        )?;
        list(data)
    }

    /// Daily totals within one month for one inverter; `month` is `YYYY-MM`.
    pub fn inverter_month(
        &self,
        inverter_id: &str,
        currency: &str,
        month: &str,
    ) -> Result<Vec<Payload>, SolisCloudError> {
        let data = self.post(
            endpoints::INVERTER_MONTH,
            &json!({"id": inverter_id, "money": currency, "month": month}),
        )?;
        list(data)
    }
}

fn unpack(envelope: Envelope) -> Result<Option<Value>, SolisCloudError> {
    let code = match envelope.code {
        Some(Value::String(code)) => code,
        Some(Value::Number(code)) => code.to_string(),
        Some(other) => {
            return Err(SolisCloudError::UnexpectedResponse(format!(
                "invalid response code {other}"
            )))
        }
        None => {
            return Err(SolisCloudError::UnexpectedResponse(
                "response has no code".into(),
            ))
        }
    };
    if code != SUCCESS_CODE {
        return Err(SolisCloudError::Api {
            code,
            msg: envelope.msg.unwrap_or_default(),
        });
    }
    Ok(envelope.data)
}

fn array_at(data: Option<Value>, pointer: &str) -> Result<Vec<Payload>, SolisCloudError> {
    let Some(data) = data else {
        return Ok(Vec::new());
    };
    match data.pointer(pointer) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items.clone()),
        Some(other) => Err(SolisCloudError::UnexpectedResponse(format!(
            "expected array at '{pointer}', found {other}"
        ))),
    }
}

fn page_records(data: Option<Value>) -> Result<Vec<Payload>, SolisCloudError> {
    array_at(data, "/page/records")
}

fn records(data: Option<Value>) -> Result<Vec<Payload>, SolisCloudError> {
    array_at(data, "/records")
}

fn list(data: Option<Value>) -> Result<Vec<Payload>, SolisCloudError> {
    array_at(data, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(raw: &str) -> Envelope {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_unpack_success() {
        let data = unpack(envelope(r#"{"success": true, "code": "0", "msg": "success", "data": [1]}"#))
            .unwrap();
        assert_eq!(data, Some(json!([1])));
    }

    #[test]
    fn test_unpack_numeric_code() {
        assert!(unpack(envelope(r#"{"code": 0, "data": null}"#)).is_ok());
    }

    #[test]
    fn test_unpack_api_error() {
        let err = unpack(envelope(r#"{"success": false, "code": "Z0001", "msg": "busy"}"#))
            .unwrap_err();
        assert!(matches!(err, SolisCloudError::Api { ref code, .. } if code == "Z0001"));
        assert!(err.is_transient());
    }

    #[test]
    fn test_unpack_missing_code() {
        let err = unpack(envelope(r#"{"data": []}"#)).unwrap_err();
        assert!(!err.is_transient());
    }

    #[test]
    fn test_record_extraction() {
        let paged = json!({"page": {"records": [{"id": "1"}, {"id": "2"}], "total": 2}});
        assert_eq!(page_records(Some(paged)).unwrap().len(), 2);

        let flat = json!({"records": [{"id": "1"}]});
        assert_eq!(records(Some(flat)).unwrap().len(), 1);

        assert_eq!(list(Some(json!([{"dateStr": "2024-01-01"}]))).unwrap().len(), 1);
        assert!(list(None).unwrap().is_empty());
        assert!(list(Some(Value::Null)).unwrap().is_empty());
        assert!(page_records(Some(json!({"page": {}}))).unwrap().is_empty());
    }

    #[test]
    fn test_record_extraction_wrong_shape() {
        assert!(records(Some(json!({"records": "nope"}))).is_err());
    }
}
