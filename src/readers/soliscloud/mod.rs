//! Ingestion sources backed by the SolisCloud API.

pub mod driver;
mod inverters;
mod sources;

pub use inverters::{list_inverter_ids, resolve_inverter, InverterRef};
pub use sources::{InverterDaySource, InverterMonthSource, Listing, PagedSource};
