use anyhow::Result;

use crate::argsets::JobArgs;
use crate::data_mgmt::sink::MemorySink;
use crate::pipeline::{Enumerator, RunReport};
use crate::readers::soliscloud::{list_inverter_ids, Listing, PagedSource};

use super::job::Job;

fn run_listing(name: &'static str, args: &JobArgs, listing: Listing) -> Result<()> {
    let job = Job::new(name, args)?;
    let mut sink = job.sink(args.sink)?;
    let mut source = PagedSource::new(&job.client, job.config.page_size, listing);
    let mut units = Enumerator::pages(job.config.page_size, job.config.max_skipped_pages);

    let outcome = job.pipeline().run(&mut source, sink.as_mut(), &mut units);
    match outcome {
        Ok(report) => job.finish(report, Ok(())),
        Err(abort) => job.finish(RunReport::default(), Err(abort)),
    }
}

pub fn station_details(args: JobArgs) -> Result<()> {
    run_listing("station-details", &args, Listing::StationDetails)
}

pub fn inverter_details(args: JobArgs) -> Result<()> {
    run_listing("inverter-details", &args, Listing::InverterDetails)
}

/// Prints the id of every inverter, one per line.
pub fn list_inverters(args: JobArgs) -> Result<()> {
    let job = Job::new("list-inverters", &args)?;
    let pipeline = job.pipeline();
    let (ids, report) = match list_inverter_ids(
        &pipeline,
        &job.client,
        job.config.page_size,
        job.config.max_skipped_pages,
        args.station_id.clone(),
    ) {
        Ok(listed) => listed,
        Err(abort) => return job.finish(RunReport::default(), Err(abort)),
    };
    for id in &ids {
        println!("{id}");
    }
    job.finish(report, Ok(()))
}

/// Prints `id<TAB>name` for every station.
pub fn list_stations(args: JobArgs) -> Result<()> {
    let job = Job::new("list-stations", &args)?;
    let mut source = PagedSource::new(&job.client, job.config.page_size, Listing::Stations);
    let mut sink = MemorySink::new();
    let mut units = Enumerator::pages(job.config.page_size, job.config.max_skipped_pages);

    let report = match job.pipeline().run(&mut source, &mut sink, &mut units) {
        Ok(report) => report,
        Err(abort) => return job.finish(RunReport::default(), Err(abort)),
    };
    for station in sink.records() {
        println!(
            "{}\t{}",
            station.get_tag("station_id").unwrap_or_default(),
            station.get_tag("stationName").unwrap_or_default()
        );
    }
    job.finish(report, Ok(()))
}
