//! Alert delivery through the Telegram bot API.

use std::time::Duration;

use serde_json::json;
use thiserror::Error;

use crate::config::TelegramConfig;
use crate::pipeline::notifier::{Alert, Notifier};

use super::http;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum TelegramError {
    #[error("request failed: {0}")]
    Request(#[from] ureq::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
}

pub struct TelegramNotifier {
    agent: ureq::Agent,
    send_url: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        TelegramNotifier {
            agent: http::agent(SEND_TIMEOUT),
            send_url: format!(
                "{}/bot{}/sendMessage",
                config.api_url.trim_end_matches('/'),
                config.token
            ),
            chat_id: config.chat_id.clone(),
        }
    }

    /// Sends as plain text so error messages need no markup escaping.
    pub fn send(&self, text: &str) -> Result<(), TelegramError> {
        let mut resp = self
            .agent
            .post(&self.send_url)
            .send_json(json!({ "chat_id": self.chat_id, "text": text }))?;
        let status = resp.status().as_u16();
        if (200..300).contains(&status) {
            return Ok(());
        }
        Err(TelegramError::Status {
            status,
            body: resp.body_mut().read_to_string().unwrap_or_default(),
        })
    }
}

impl Notifier for TelegramNotifier {
    fn notify(&self, alert: &Alert) {
        if let Err(e) = self.send(&alert.to_string()) {
            log::warn!("Could not deliver alert to Telegram: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mockito::Matcher;

    use crate::pipeline::notifier::AlertLevel;

    fn config(api_url: String) -> TelegramConfig {
        TelegramConfig {
            api_url,
            token: "123:abc".into(),
            chat_id: "-100".into(),
        }
    }

    #[test]
    fn test_send_message() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/bot123:abc/sendMessage")
            .match_body(Matcher::Json(json!({
                "chat_id": "-100",
                "text": "[WARNING] inverter-days: inverter_day timed out"
            })))
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .create();

        let notifier = TelegramNotifier::new(&config(server.url()));
        notifier.notify(&Alert::new(
            AlertLevel::Warning,
            "inverter-days",
            "inverter_day timed out",
        ));
        mock.assert();
    }

    #[test]
    fn test_send_failure_is_reported() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/bot123:abc/sendMessage")
            .with_status(400)
            .with_body(r#"{"ok":false,"description":"chat not found"}"#)
            .create();

        let notifier = TelegramNotifier::new(&config(server.url()));
        let err = notifier.send("hello").unwrap_err();
        assert!(matches!(err, TelegramError::Status { status: 400, .. }));
    }

    #[test]
    fn test_notify_swallows_failures() {
        // Nothing listens on port 9 on a test host
        let notifier = TelegramNotifier::new(&config("http://127.0.0.1:9".into()));
        notifier.notify(&Alert::new(AlertLevel::Fatal, "job", "boom"));
    }
}
