pub const HOME_DIR: &str = "SOLIS_INGEST_HOME";

pub const LOG_LEVEL: &str = "LOGGING_LEVEL";

pub const API_URL: &str = "SOLIS_API_URL";
pub const CREDENTIALS: &str = "SOLIS_CREDENTIALS";
pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";

pub const INFLUX_URL: &str = "INFLUX_URL";
pub const INFLUX_TOKEN: &str = "INFLUX_TOKEN";
pub const INFLUX_ORG: &str = "INFLUX_ORG";
pub const INFLUX_BUCKET: &str = "INFLUX_BUCKET";

pub const SQLITE_PATH: &str = "SQLITE_PATH";

pub const TELEGRAM_API_URL: &str = "TELEGRAM_API_URL";
pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";
pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

pub const MAX_RETRIES: &str = "MAX_RETRIES";
pub const RETRY_INTERVAL_SECS: &str = "RETRY_INTERVAL_SECS";
pub const REQUEST_DELAY_MS: &str = "REQUEST_DELAY_MS";
pub const PAGE_SIZE: &str = "PAGE_SIZE";
pub const MAX_SKIPPED_PAGES: &str = "MAX_SKIPPED_PAGES";

pub const START_DATE: &str = "START_DATE";
pub const CURRENCY: &str = "CURRENCY";
pub const SITE_TIMEZONE: &str = "SITE_TIMEZONE";
