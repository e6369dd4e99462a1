mod backoff_retry;
mod load_dotenv;
mod time;

pub use backoff_retry::FixedBackoff;
pub use load_dotenv::load_dotenv;
pub use time::from_epoch_millis;
