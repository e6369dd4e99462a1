//! Request signing for the SolisCloud API.
//!
//! Every call is a `POST` whose canonical string is
//! `POST\n<Content-MD5>\n<Content-Type>\n<Date>\n<path>`, signed with
//! HMAC-SHA1 using the API secret and sent as `Authorization: API <key>:<sig>`.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

pub const CONTENT_TYPE: &str = "application/json;charset=UTF-8";
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedHeaders {
    pub content_md5: String,
    pub date: String,
    pub authorization: String,
}

pub fn content_md5(body: &[u8]) -> String {
    STANDARD.encode(md5::compute(body).0)
}

pub fn http_date(at: DateTime<Utc>) -> String {
    at.format(HTTP_DATE_FORMAT).to_string()
}

pub fn signature(secret: &[u8], content_md5: &str, date: &str, path: &str) -> String {
    let canonical = format!("POST\n{content_md5}\n{CONTENT_TYPE}\n{date}\n{path}");
    let mut mac = HmacSha1::new_from_slice(secret).expect("HMAC can take a key of any size");
    mac.update(canonical.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

pub fn sign(key: &str, secret: &[u8], body: &[u8], path: &str, at: DateTime<Utc>) -> SignedHeaders {
    let content_md5 = content_md5(body);
    let date = http_date(at);
    let sig = signature(secret, &content_md5, &date, path);
    SignedHeaders {
        authorization: format!("API {key}:{sig}"),
        content_md5,
        date,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;

    const BODY: &[u8] = br#"{"pageNo":1,"pageSize":100}"#;
    const PATH: &str = "/v1/api/inverterList";

    fn sample_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 5, 8, 30, 0).unwrap()
    }

    #[test]
    fn test_content_md5() {
        assert_eq!(content_md5(BODY), "U0Xj//qmRi3zoyapfAAuXw==");
    }

    #[test]
    fn test_http_date() {
        assert_eq!(http_date(sample_time()), "Tue, 05 Mar 2024 08:30:00 GMT");
    }

    #[test]
    fn test_signed_headers() {
        let headers = sign("1300386381676", b"secret", BODY, PATH, sample_time());
        assert_eq!(headers.content_md5, "U0Xj//qmRi3zoyapfAAuXw==");
        assert_eq!(headers.date, "Tue, 05 Mar 2024 08:30:00 GMT");
        assert_eq!(
            headers.authorization,
            "API 1300386381676:EL5j+9OyG+wSgYCMJ8+B9jHGZ8E="
        );
    }
}
