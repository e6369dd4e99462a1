//! The bounded-retry batch pipeline shared by every ingestion job.

pub mod driver;
pub mod enumerate;
pub mod notifier;
pub mod retry;
pub mod source;

pub use driver::{Abort, Pipeline, PipelineOptions, RunReport};
pub use enumerate::{Enumerator, Progress, WorkUnit, YearMonth};
pub use notifier::{Alert, AlertLevel, LogOnly, Notifier};
pub use retry::RetryPolicy;
pub use source::{Source, SourceError};
