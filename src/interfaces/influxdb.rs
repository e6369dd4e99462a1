//! Time-series sink: InfluxDB v2 write API over line protocol.

use std::time::Duration;

use crate::config::InfluxConfig;
use crate::data_mgmt::line_protocol;
use crate::data_mgmt::models::{Record, WriteReport};
use crate::data_mgmt::sink::{Sink, SinkError};

use super::http;

const SINK_NAME: &str = "influxdb";

pub struct InfluxSink {
    agent: ureq::Agent,
    write_url: String,
    token: String,
    org: String,
    bucket: String,
}

impl InfluxSink {
    pub fn new(config: &InfluxConfig, timeout: Duration) -> Self {
        InfluxSink {
            agent: http::agent(timeout),
            write_url: format!("{}/api/v2/write", config.url.trim_end_matches('/')),
            token: config.token.clone(),
            org: config.org.clone(),
            bucket: config.bucket.clone(),
        }
    }
}

fn unavailable(reason: impl Into<String>) -> SinkError {
    SinkError::Unavailable {
        sink: SINK_NAME,
        reason: reason.into(),
    }
}

fn refused(reason: impl Into<String>) -> SinkError {
    SinkError::Refused {
        sink: SINK_NAME,
        reason: reason.into(),
    }
}

/// Number of points the server reports as dropped in a partial-write error body.
fn dropped_points(body: &str) -> Option<usize> {
    if !body.contains("partial write") {
        return None;
    }
    let count = body
        .split("dropped=")
        .nth(1)
        .map(|rest| rest.chars().take_while(char::is_ascii_digit).collect::<String>())
        .and_then(|digits| digits.parse().ok());
    // Unknown count: assume at least one line was dropped
    Some(count.unwrap_or(1))
}

impl Sink for InfluxSink {
    fn name(&self) -> &str {
        SINK_NAME
    }

    fn write(&mut self, records: &[Record]) -> Result<WriteReport, SinkError> {
        let (body, mut rejected) = line_protocol::encode_batch(records);
        let sent = records.len() - rejected;
        if sent == 0 {
            return Ok(WriteReport {
                written: 0,
                rejected,
            });
        }

        let mut resp = self
            .agent
            .post(&self.write_url)
            .query("org", &self.org)
            .query("bucket", &self.bucket)
            .query("precision", "s")
            .header("Authorization", &format!("Token {}", self.token))
            .header("Content-Type", "text/plain; charset=utf-8")
            .send(body.as_bytes())
            .map_err(|e| {
                if http::is_transient_error(&e) {
                    unavailable(e.to_string())
                } else {
                    refused(e.to_string())
                }
            })?;

        let status = resp.status().as_u16();
        if (200..300).contains(&status) {
            log::debug!("Wrote {sent} point(s) to bucket {}", self.bucket);
            return Ok(WriteReport {
                written: sent,
                rejected,
            });
        }

        let text = resp.body_mut().read_to_string().unwrap_or_default();
        if http::is_transient_status(status) {
            return Err(unavailable(format!("HTTP {status}: {text}")));
        }
        if let Some(dropped) = dropped_points(&text) {
            let dropped = dropped.min(sent);
            log::warn!("Partial write to bucket {}: {dropped} point(s) dropped", self.bucket);
            rejected += dropped;
            return Ok(WriteReport {
                written: sent - dropped,
                rejected,
            });
        }
        Err(refused(format!("HTTP {status}: {text}")))
    }
}
