//! Process configuration: environment (optionally from `.env`) plus the
//! API credentials file.

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Offset, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::constants::{defaults, envvars};
use crate::pipeline::retry::RetryPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    Missing(&'static str),
    #[error("invalid value '{value}' for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
    #[error("cannot read credentials file {path:?}: {source}")]
    CredentialsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot parse credentials file {path:?}: {source}")]
    CredentialsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// SolisCloud API key and secret, as stored in `config.json`.
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub key: String,
    pub secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::CredentialsRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::CredentialsParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InfluxConfig {
    pub url: String,
    pub token: String,
    pub org: String,
    pub bucket: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelegramConfig {
    pub api_url: String,
    pub token: String,
    pub chat_id: String,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub credentials_path: PathBuf,
    pub request_timeout: Duration,
    pub influx: Option<InfluxConfig>,
    pub sqlite_path: PathBuf,
    pub telegram: Option<TelegramConfig>,
    pub retry: RetryPolicy,
    pub request_delay: Duration,
    pub page_size: u32,
    pub max_skipped_pages: u32,
    pub start_date: NaiveDate,
    pub currency: String,
    pub site_timezone: Tz,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let start_date = parse_var(
            envvars::START_DATE,
            NaiveDate::from_str(defaults::START_DATE).map_err(|e| ConfigError::Invalid {
                var: envvars::START_DATE,
                value: defaults::START_DATE.into(),
                reason: e.to_string(),
            })?,
        )?;
        let site_timezone = var(envvars::SITE_TIMEZONE)
            .unwrap_or_else(|| defaults::SITE_TIMEZONE.into());
        let site_timezone = site_timezone.parse::<Tz>().map_err(|e| ConfigError::Invalid {
            var: envvars::SITE_TIMEZONE,
            value: site_timezone.clone(),
            reason: e.to_string(),
        })?;
        let page_size = parse_var(envvars::PAGE_SIZE, defaults::PAGE_SIZE)?;
        if page_size == 0 {
            return Err(ConfigError::Invalid {
                var: envvars::PAGE_SIZE,
                value: page_size.to_string(),
                reason: "must be positive".into(),
            });
        }

        Ok(Config {
            api_url: url_var(envvars::API_URL)?.unwrap_or_else(|| defaults::API_URL.into()),
            credentials_path: var(envvars::CREDENTIALS)
                .unwrap_or_else(|| defaults::CREDENTIALS.into())
                .into(),
            request_timeout: parse_var(envvars::REQUEST_TIMEOUT_SECS, defaults::REQUEST_TIMEOUT.as_secs())
                .map(Duration::from_secs)?,
            influx: influx_from_env()?,
            sqlite_path: var(envvars::SQLITE_PATH)
                .unwrap_or_else(|| defaults::SQLITE_PATH.into())
                .into(),
            telegram: telegram_from_env()?,
            retry: RetryPolicy {
                max_retries: parse_var(envvars::MAX_RETRIES, defaults::MAX_RETRIES)?,
                interval: parse_var(envvars::RETRY_INTERVAL_SECS, defaults::RETRY_INTERVAL.as_secs())
                    .map(Duration::from_secs)?,
            },
            request_delay: parse_var(envvars::REQUEST_DELAY_MS, defaults::REQUEST_DELAY.as_millis() as u64)
                .map(Duration::from_millis)?,
            page_size,
            max_skipped_pages: parse_var(envvars::MAX_SKIPPED_PAGES, defaults::MAX_SKIPPED_PAGES)?,
            start_date,
            currency: var(envvars::CURRENCY).unwrap_or_else(|| defaults::CURRENCY.into()),
            site_timezone,
        })
    }

    /// Calendar date at the site for the given instant.
    pub fn today_at(&self, now: DateTime<Utc>) -> NaiveDate {
        now.with_timezone(&self.site_timezone).date_naive()
    }

    /// Whole-hour UTC offset of the site, as the intraday API expects it.
    pub fn api_time_zone(&self, now: DateTime<Utc>) -> i32 {
        now.with_timezone(&self.site_timezone)
            .offset()
            .fix()
            .local_minus_utc()
            / 3600
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T>(name: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match var(name) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
            var: name,
            value: raw.clone(),
            reason: e.to_string(),
        }),
        None => Ok(default),
    }
}

fn url_var(name: &'static str) -> Result<Option<String>, ConfigError> {
    var(name)
        .map(|raw| {
            url::Url::parse(&raw)
                .map(|_| raw.trim_end_matches('/').to_string())
                .map_err(|e| ConfigError::Invalid {
                    var: name,
                    value: raw.clone(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}

fn influx_from_env() -> Result<Option<InfluxConfig>, ConfigError> {
    let Some(url) = url_var(envvars::INFLUX_URL)? else {
        return Ok(None);
    };
    Ok(Some(InfluxConfig {
        url,
        token: var(envvars::INFLUX_TOKEN).ok_or(ConfigError::Missing(envvars::INFLUX_TOKEN))?,
        org: var(envvars::INFLUX_ORG).ok_or(ConfigError::Missing(envvars::INFLUX_ORG))?,
        bucket: var(envvars::INFLUX_BUCKET).ok_or(ConfigError::Missing(envvars::INFLUX_BUCKET))?,
    }))
}

fn telegram_from_env() -> Result<Option<TelegramConfig>, ConfigError> {
    match (var(envvars::TELEGRAM_TOKEN), var(envvars::TELEGRAM_CHAT_ID)) {
        (None, None) => Ok(None),
        (Some(_), None) => Err(ConfigError::Missing(envvars::TELEGRAM_CHAT_ID)),
        (None, Some(_)) => Err(ConfigError::Missing(envvars::TELEGRAM_TOKEN)),
        (Some(token), Some(chat_id)) => Ok(Some(TelegramConfig {
            api_url: url_var(envvars::TELEGRAM_API_URL)?
                .unwrap_or_else(|| defaults::TELEGRAM_API_URL.into()),
            token,
            chat_id,
        })),
    }
}
