use std::time::Duration;

pub const LOG_LEVEL: &str = "INFO";

pub const API_URL: &str = soliscloud::DEFAULT_BASE_URL;
pub const CREDENTIALS: &str = "config.json";
pub const REQUEST_TIMEOUT: Duration = soliscloud::DEFAULT_TIMEOUT;

pub const SQLITE_PATH: &str = "data/solis.db";

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

pub const MAX_RETRIES: u32 = 10;
pub const RETRY_INTERVAL: Duration = Duration::from_secs(5);
pub const REQUEST_DELAY: Duration = Duration::from_millis(500);
pub const PAGE_SIZE: u32 = 100;
pub const MAX_SKIPPED_PAGES: u32 = 3;

pub const START_DATE: &str = "2024-01-01";
pub const CURRENCY: &str = "MYR";
pub const SITE_TIMEZONE: &str = "Asia/Kuala_Lumpur";
