use soliscloud::SolisCloudError;
use thiserror::Error;

use crate::data_mgmt::models::{RawRecord, Record};

use super::enumerate::WorkUnit;

#[derive(Error, Debug)]
pub enum SourceError {
    #[error(transparent)]
    Api(#[from] SolisCloudError),
    #[error("{0}")]
    Fatal(String),
}

impl SourceError {
    pub fn is_transient(&self) -> bool {
        match self {
            SourceError::Api(e) => e.is_transient(),
            SourceError::Fatal(_) => false,
        }
    }
}

/// One kind of remote data: how to fetch a work unit and how to turn each
/// returned entity into a record.
pub trait Source {
    /// Short name for logs and alerts, e.g. `inverterMonth 1308675217949001`.
    fn label(&self) -> String;

    fn fetch(&mut self, unit: &WorkUnit) -> Result<Vec<RawRecord>, SourceError>;

    /// Must not fail: missing or malformed values fall back to defaults.
    fn transform(&self, unit: &WorkUnit, raw: &RawRecord) -> Record;

    /// Whether a fetched entity should be written at all.
    fn keep(&self, _unit: &WorkUnit, _raw: &RawRecord) -> bool {
        true
    }
}
