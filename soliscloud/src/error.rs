use thiserror::Error;

const BODY_PREVIEW_LEN: usize = 200;

#[derive(Error, Debug)]
pub enum SolisCloudError {
    #[error("request timed out")]
    Timeout,
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },
    #[error("API error {code}: {msg}")]
    Api { code: String, msg: String },
    #[error(transparent)]
    Transport(ureq::Error),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl SolisCloudError {
    pub(crate) fn http_status(status: u16, body: &str) -> Self {
        let body = match body.char_indices().nth(BODY_PREVIEW_LEN) {
            Some((idx, _)) => format!("{}...", &body[..idx]),
            None => body.to_string(),
        };
        Self::HttpStatus { status, body }
    }

    /// Whether the same call may succeed if repeated later.
    ///
    /// Timeouts, connection failures, rate limiting, server errors and
    /// errors reported by the API itself are transient. Client errors
    /// (bad credentials, unknown endpoint) and undecodable responses are not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout | Self::Api { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || (500..600).contains(status),
            Self::Transport(e) => matches!(
                e,
                ureq::Error::Io(_) | ureq::Error::ConnectionFailed | ureq::Error::HostNotFound
            ),
            Self::UnexpectedResponse(_) | Self::Json(_) => false,
        }
    }
}

impl From<ureq::Error> for SolisCloudError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Timeout(_) => Self::Timeout,
            other => Self::Transport(other),
        }
    }
}
