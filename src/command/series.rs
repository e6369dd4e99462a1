//! Per-inverter time series: every inverter is resolved, then walked over
//! the same day or month range.

use anyhow::Result;

use crate::argsets::JobArgs;
use crate::data_mgmt::sink::Sink;
use crate::pipeline::{Abort, Enumerator, RunReport, Source, WorkUnit, YearMonth};
use crate::readers::soliscloud::{
    list_inverter_ids, resolve_inverter, InverterDaySource, InverterMonthSource, InverterRef,
};

use super::job::Job;

fn for_each_inverter<'a, F>(job: &'a Job, args: &JobArgs, units: &mut Enumerator, make_source: F) -> Result<()>
where
    F: FnMut(InverterRef) -> Box<dyn Source + 'a>,
{
    let mut sink = job.sink(args.sink)?;
    let mut total = RunReport::default();
    let outcome = walk_inverters(job, args, sink.as_mut(), units, make_source, &mut total);
    job.finish(total, outcome)
}

fn walk_inverters<'a, F>(
    job: &'a Job,
    args: &JobArgs,
    sink: &mut dyn Sink,
    units: &mut Enumerator,
    mut make_source: F,
    total: &mut RunReport,
) -> Result<(), Abort>
where
    F: FnMut(InverterRef) -> Box<dyn Source + 'a>,
{
    let pipeline = job.pipeline();
    let (ids, listed) = list_inverter_ids(
        &pipeline,
        &job.client,
        job.config.page_size,
        job.config.max_skipped_pages,
        args.station_id.clone(),
    )?;
    total.merge(listed);
    if ids.is_empty() {
        log::warn!("No inverters found");
        return Ok(());
    }
    log::info!("Found {} inverter(s)", ids.len());

    for id in &ids {
        let Some(inverter) = resolve_inverter(&pipeline, &job.client, id)? else {
            total.skipped.push(format!("inverter {id}"));
            continue;
        };
        units.restart();
        let mut source = make_source(inverter);
        log::info!("Starting {}", source.label());
        total.merge(pipeline.run(source.as_mut(), sink, units)?);
    }
    Ok(())
}

pub fn inverter_days(args: JobArgs) -> Result<()> {
    let job = Job::new("inverter-days", &args)?;
    let time_zone = job.config.api_time_zone(job.now);
    let mut units = Enumerator::days(job.start, job.today);
    log::info!("Fetching days {} to {}", job.start, job.today);

    for_each_inverter(&job, &args, &mut units, |inverter| {
        Box::new(InverterDaySource::new(
            &job.client,
            inverter,
            &job.config.currency,
            time_zone,
        ))
    })
}

pub fn inverter_months(args: JobArgs) -> Result<()> {
    let job = Job::new("inverter-months", &args)?;
    let site_timezone = job.config.site_timezone;

    if args.today_only {
        let today = job.today;
        let mut units = Enumerator::single(WorkUnit::Month(YearMonth::of(today)));
        log::info!("Fetching entries for {today} only");
        return for_each_inverter(&job, &args, &mut units, |inverter| {
            Box::new(
                InverterMonthSource::new(&job.client, inverter, &job.config.currency, site_timezone)
                    .only_date(today),
            )
        });
    }

    let mut units = Enumerator::months(job.start, job.today);
    log::info!(
        "Fetching months {} to {}",
        YearMonth::of(job.start),
        YearMonth::of(job.today)
    );
    for_each_inverter(&job, &args, &mut units, |inverter| {
        Box::new(InverterMonthSource::new(
            &job.client,
            inverter,
            &job.config.currency,
            site_timezone,
        ))
    })
}
