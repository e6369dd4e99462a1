use std::time::Duration;

use backoff::backoff::Backoff;

/// Constant delay between attempts, giving up after `max_retries` retries.
#[derive(Clone, Debug)]
pub struct FixedBackoff {
    interval: Duration,
    max_retries: u32,
    remaining: u32,
}

impl FixedBackoff {
    pub fn new(interval: Duration, max_retries: u32) -> Self {
        FixedBackoff {
            interval,
            max_retries,
            remaining: max_retries,
        }
    }
}

impl Backoff for FixedBackoff {
    fn reset(&mut self) {
        self.remaining = self.max_retries;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        Some(self.interval)
    }
}
