use thiserror::Error;

use super::models::{Record, WriteReport};

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("{sink} unavailable: {reason}")]
    Unavailable { sink: &'static str, reason: String },
    #[error("{sink} refused the batch: {reason}")]
    Refused { sink: &'static str, reason: String },
    #[error("schema mismatch: {0}")]
    Schema(String),
}

impl SinkError {
    /// Only an unavailable store is worth retrying; refusals and schema
    /// mismatches will fail the same way on every attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, SinkError::Unavailable { .. })
    }
}

/// Destination for normalized records, written one batch per work unit.
pub trait Sink {
    fn name(&self) -> &str;

    fn write(&mut self, records: &[Record]) -> Result<WriteReport, SinkError>;
}

/// Keeps everything written to it; used where a job's output feeds another job.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<Record>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl Sink for MemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    fn write(&mut self, records: &[Record]) -> Result<WriteReport, SinkError> {
        self.records.extend_from_slice(records);
        Ok(WriteReport {
            written: records.len(),
            rejected: 0,
        })
    }
}
