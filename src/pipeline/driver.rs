//! The batch driver: enumerate, fetch, transform, write, advance.
//!
//! Every alert is raised here, from a retry or abort transition, and is
//! mirrored to the log before being handed to the notifier.

use std::fmt;
use std::thread::sleep;
use std::time::Duration;

use thiserror::Error;

use crate::data_mgmt::models::{RawRecord, Record};
use crate::data_mgmt::sink::{Sink, SinkError};

use super::enumerate::{Enumerator, Progress, WorkUnit};
use super::notifier::{Alert, AlertLevel, Notifier};
use super::retry::{RetryOutcome, RetryPolicy, RetryState};
use super::source::{Source, SourceError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineOptions {
    pub retry: RetryPolicy,
    /// Pause between consecutive fetches.
    pub pace: Duration,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunReport {
    pub units: usize,
    pub fetched: usize,
    pub written: usize,
    pub rejected: usize,
    /// Labels of the units given up on.
    pub skipped: Vec<String>,
}

impl RunReport {
    pub fn merge(&mut self, other: RunReport) {
        self.units += other.units;
        self.fetched += other.fetched;
        self.written += other.written;
        self.rejected += other.rejected;
        self.skipped.extend(other.skipped);
    }

    pub fn is_clean(&self) -> bool {
        self.rejected == 0 && self.skipped.is_empty()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} unit(s), {} fetched, {} written, {} rejected, {} skipped",
            self.units,
            self.fetched,
            self.written,
            self.rejected,
            self.skipped.len()
        )
    }
}

/// A run stopped on a non-transient error. Whatever was written before
/// stays written.
#[derive(Error, Debug)]
#[error("{job} aborted at {at}: {reason}")]
pub struct Abort {
    pub job: String,
    pub at: String,
    pub reason: String,
    pub report: RunReport,
}

enum State {
    Enumerating,
    Fetching(WorkUnit),
    Transforming(WorkUnit, Vec<RawRecord>),
    Writing {
        unit: WorkUnit,
        fetched: usize,
        records: Vec<Record>,
    },
    Advance(Progress),
    Abort {
        at: String,
        reason: String,
    },
    Done,
}

pub struct Pipeline<'a> {
    job: String,
    options: PipelineOptions,
    notifier: &'a dyn Notifier,
}

fn classify_source(e: SourceError) -> backoff::Error<SourceError> {
    if e.is_transient() {
        backoff::Error::transient(e)
    } else {
        backoff::Error::permanent(e)
    }
}

fn classify_sink(e: SinkError) -> backoff::Error<SinkError> {
    if e.is_transient() {
        backoff::Error::transient(e)
    } else {
        backoff::Error::permanent(e)
    }
}

impl<'a> Pipeline<'a> {
    pub fn new(job: impl Into<String>, options: PipelineOptions, notifier: &'a dyn Notifier) -> Self {
        Pipeline {
            job: job.into(),
            options,
            notifier,
        }
    }

    fn alert(&self, level: AlertLevel, message: String) {
        let alert = Alert::new(level, self.job.as_str(), message);
        match level {
            AlertLevel::Warning => log::warn!("{alert}"),
            AlertLevel::Error | AlertLevel::Fatal => log::error!("{alert}"),
        }
        self.notifier.notify(&alert);
    }

    fn retrying<T, E, F>(&self, label: &str, op: F) -> RetryOutcome<T, E>
    where
        E: fmt::Display,
        F: FnMut() -> Result<T, backoff::Error<E>>,
    {
        self.options
            .retry
            .run(label, op, |state: &RetryState, err: &E, wait: Duration| {
                self.alert(
                    AlertLevel::Warning,
                    format!(
                        "{} failed (attempt {}/{}): {err}; retrying in {:.1}s",
                        state.label,
                        state.attempts,
                        state.max_attempts,
                        wait.as_secs_f32()
                    ),
                )
            })
    }

    fn abort(&self, at: String, reason: String, report: RunReport) -> Abort {
        self.alert(AlertLevel::Fatal, format!("aborting at {at}: {reason}"));
        Abort {
            job: self.job.clone(),
            at,
            reason,
            report,
        }
    }

    /// Retries a one-off call outside the unit loop. `Ok(None)` means the
    /// retries ran out and the caller should skip whatever needed it.
    pub fn attempt<T, E, F>(&self, label: &str, op: F) -> Result<Option<T>, Abort>
    where
        E: fmt::Display,
        F: FnMut() -> Result<T, backoff::Error<E>>,
    {
        match self.retrying(label, op) {
            RetryOutcome::Success(v) => Ok(Some(v)),
            RetryOutcome::Exhausted(e) => {
                self.alert(
                    AlertLevel::Error,
                    format!(
                        "{label} still failing after {} retries, skipping: {e}",
                        self.options.retry.max_retries
                    ),
                );
                Ok(None)
            }
            RetryOutcome::Fatal(e) => Err(self.abort(label.to_string(), e.to_string(), RunReport::default())),
        }
    }

    /// Drives `source` over every unit of `units`, writing into `sink`.
    pub fn run(
        &self,
        source: &mut dyn Source,
        sink: &mut dyn Sink,
        units: &mut Enumerator,
    ) -> Result<RunReport, Abort> {
        let mut report = RunReport::default();
        let mut state = State::Enumerating;
        let mut first_fetch = true;

        loop {
            state = match state {
                State::Enumerating => match units.current() {
                    Some(unit) => State::Fetching(unit),
                    None => State::Done,
                },

                State::Fetching(unit) => {
                    if !first_fetch && !self.options.pace.is_zero() {
                        sleep(self.options.pace);
                    }
                    first_fetch = false;
                    report.units += 1;

                    let label = format!("{} {unit}", source.label());
                    log::info!("Fetching {label}");
                    match self.retrying(&label, || source.fetch(&unit).map_err(classify_source)) {
                        RetryOutcome::Success(raw) => {
                            log::trace!("{label}: {raw:?}");
                            report.fetched += raw.len();
                            State::Transforming(unit, raw)
                        }
                        RetryOutcome::Exhausted(e) => {
                            self.alert(
                                AlertLevel::Error,
                                format!(
                                    "fetching {label} still failing after {} retries, skipping: {e}",
                                    self.options.retry.max_retries
                                ),
                            );
                            report.skipped.push(label);
                            State::Advance(Progress::Skipped)
                        }
                        RetryOutcome::Fatal(e) => State::Abort {
                            at: label,
                            reason: e.to_string(),
                        },
                    }
                }

                State::Transforming(unit, raw) => {
                    let records = raw
                        .iter()
                        .filter(|r| source.keep(&unit, r))
                        .map(|r| source.transform(&unit, r))
                        .collect();
                    State::Writing {
                        unit,
                        fetched: raw.len(),
                        records,
                    }
                }

                State::Writing {
                    unit,
                    fetched,
                    records,
                } if records.is_empty() => {
                    log::debug!("Nothing to write for {} {unit}", source.label());
                    State::Advance(Progress::Fetched(fetched))
                }

                State::Writing {
                    unit,
                    fetched,
                    records,
                } => {
                    let label = format!("writing {} {unit} to {}", source.label(), sink.name());
                    match self.retrying(&label, || sink.write(&records).map_err(classify_sink)) {
                        RetryOutcome::Success(written) => {
                            report.written += written.written;
                            report.rejected += written.rejected;
                            if written.is_partial() {
                                self.alert(
                                    AlertLevel::Warning,
                                    format!(
                                        "{label}: {} of {} record(s) rejected",
                                        written.rejected,
                                        records.len()
                                    ),
                                );
                            }
                            State::Advance(Progress::Fetched(fetched))
                        }
                        RetryOutcome::Exhausted(e) => {
                            self.alert(
                                AlertLevel::Error,
                                format!(
                                    "{label} still failing after {} retries, skipping: {e}",
                                    self.options.retry.max_retries
                                ),
                            );
                            report.skipped.push(format!("{} {unit}", source.label()));
                            State::Advance(Progress::Fetched(fetched))
                        }
                        RetryOutcome::Fatal(e) => State::Abort {
                            at: label,
                            reason: e.to_string(),
                        },
                    }
                }

                State::Advance(progress) => {
                    units.advance(progress);
                    State::Enumerating
                }

                State::Abort { at, reason } => return Err(self.abort(at, reason, report)),

                State::Done => {
                    log::info!("{} {}: {report}", self.job, source.label());
                    return Ok(report);
                }
            };
        }
    }
}
