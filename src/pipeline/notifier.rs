use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertLevel {
    /// A transient failure that will be retried.
    Warning,
    /// Retries ran out; the work unit was skipped.
    Error,
    /// The run is aborting.
    Fatal,
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AlertLevel::Warning => "WARNING",
            AlertLevel::Error => "ERROR",
            AlertLevel::Fatal => "FATAL",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alert {
    pub level: AlertLevel,
    pub job: String,
    pub message: String,
}

impl Alert {
    pub fn new(level: AlertLevel, job: impl Into<String>, message: impl Into<String>) -> Self {
        Alert {
            level,
            job: job.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.level, self.job, self.message)
    }
}

/// Outbound alert channel. Delivery is best effort: implementations must
/// not fail or panic when the destination is unreachable.
pub trait Notifier {
    fn notify(&self, alert: &Alert);
}

/// Used when no alert destination is configured. The driver already logs
/// every alert, so there is nothing left to do.
#[derive(Debug, Default)]
pub struct LogOnly;

impl Notifier for LogOnly {
    fn notify(&self, alert: &Alert) {
        log::trace!("No alert destination configured, not forwarding: {alert}");
    }
}
