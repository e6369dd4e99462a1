pub mod http;
mod influxdb;
mod sqlite;
mod telegram;

pub use influxdb::InfluxSink;
pub use sqlite::SqliteSink;
pub use telegram::{TelegramError, TelegramNotifier};
