use itertools::Itertools;
use soliscloud::{SolisCloud, SolisCloudError};

use crate::data_mgmt::coerce;
use crate::data_mgmt::sink::MemorySink;
use crate::pipeline::{Abort, Enumerator, Pipeline, RunReport};

use super::sources::{Listing, PagedSource};

/// An inverter together with the name of the station it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InverterRef {
    pub id: String,
    pub station_name: String,
}

fn classify(e: SolisCloudError) -> backoff::Error<SolisCloudError> {
    if e.is_transient() {
        backoff::Error::transient(e)
    } else {
        backoff::Error::permanent(e)
    }
}

/// Inverter ids visible to the key, optionally limited to one station, in
/// listing order without duplicates.
pub fn list_inverter_ids(
    pipeline: &Pipeline,
    client: &SolisCloud,
    page_size: u32,
    max_skipped_pages: u32,
    station_id: Option<String>,
) -> Result<(Vec<String>, RunReport), Abort> {
    let mut source = PagedSource::new(client, page_size, Listing::Inverters { station_id });
    let mut sink = MemorySink::new();
    let report = pipeline.run(
        &mut source,
        &mut sink,
        &mut Enumerator::pages(page_size, max_skipped_pages),
    )?;

    let ids = sink
        .into_records()
        .iter()
        .filter_map(|r| r.get_tag("inverter_id"))
        .filter(|id| !id.is_empty())
        .map(String::from)
        .unique()
        .collect();
    Ok((ids, report))
}

/// Looks up the station name of inverter `id`.
///
/// `Ok(None)` when the lookup kept failing or the API has no detail for
/// the inverter; either way the inverter should be skipped.
pub fn resolve_inverter(
    pipeline: &Pipeline,
    client: &SolisCloud,
    id: &str,
) -> Result<Option<InverterRef>, Abort> {
    let label = format!("inverterDetail {id}");
    let detail = pipeline.attempt(&label, || client.inverter_detail(id).map_err(classify))?;
    match detail {
        None => Ok(None),
        Some(None) => {
            log::warn!("No detail returned for inverter {id}, skipping it");
            Ok(None)
        }
        Some(Some(detail)) => {
            let station_name = detail
                .get("stationName")
                .and_then(coerce::to_string)
                .unwrap_or_default();
            log::info!("Inverter {id} belongs to station '{station_name}'");
            Ok(Some(InverterRef {
                id: id.to_string(),
                station_name,
            }))
        }
    }
}
