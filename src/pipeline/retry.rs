use std::cell::Cell;
use std::time::Duration;

use backoff::{retry_notify, Error};

use crate::helpers::FixedBackoff;

/// Bounded fixed-interval retry policy shared by fetches and writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub interval: Duration,
}

/// Progress of one retryable operation. A fresh state is built for every
/// call to [`RetryPolicy::run`] and dropped when it returns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryState {
    pub label: String,
    pub attempts: u32,
    pub max_attempts: u32,
}

#[derive(Debug)]
pub enum RetryOutcome<T, E> {
    Success(T),
    /// Every attempt failed transiently; carries the last error.
    Exhausted(E),
    Fatal(E),
}

impl RetryPolicy {
    /// Runs `op` until it succeeds, fails permanently, or runs out of retries.
    ///
    /// `on_retry` is called before each backoff sleep with the state after
    /// the failed attempt.
    pub fn run<T, E, F, N>(&self, label: &str, mut op: F, mut on_retry: N) -> RetryOutcome<T, E>
    where
        F: FnMut() -> Result<T, Error<E>>,
        N: FnMut(&RetryState, &E, Duration),
    {
        let attempts = Cell::new(0);
        let max_attempts = self.max_retries.saturating_add(1);

        let result = retry_notify(
            FixedBackoff::new(self.interval, self.max_retries),
            || {
                attempts.set(attempts.get() + 1);
                op()
            },
            |err: E, wait: Duration| {
                let state = RetryState {
                    label: label.to_string(),
                    attempts: attempts.get(),
                    max_attempts,
                };
                on_retry(&state, &err, wait);
            },
        );

        match result {
            Ok(v) => RetryOutcome::Success(v),
            Err(Error::Permanent(e)) => RetryOutcome::Fatal(e),
            Err(Error::Transient { err, .. }) => RetryOutcome::Exhausted(err),
        }
    }
}
