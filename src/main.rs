use anyhow::{anyhow, Result};
use env_logger::Env;

use solis_ingest::argsets::JobArgs;
use solis_ingest::command;
use solis_ingest::constants::{defaults, envvars};
use solis_ingest::helpers::load_dotenv;

const CMD_STATION_DETAILS: &str = "station-details";
const CMD_INVERTER_DETAILS: &str = "inverter-details";
const CMD_INVERTER_DAYS: &str = "inverter-days";
const CMD_INVERTER_MONTHS: &str = "inverter-months";
const CMD_LIST_INVERTERS: &str = "list-inverters";
const CMD_LIST_STATIONS: &str = "list-stations";

fn main() -> Result<()> {
    let dotenv_files = load_dotenv();
    env_logger::Builder::from_env(Env::default().filter_or(envvars::LOG_LEVEL, defaults::LOG_LEVEL))
        .init();
    for path in &dotenv_files {
        log::debug!("Loaded {}", path.display());
    }

    let mut args = pico_args::Arguments::from_env();
    let run: fn(JobArgs) -> Result<()> = match args.subcommand()?.as_deref() {
        Some(CMD_STATION_DETAILS) => command::station_details,
        Some(CMD_INVERTER_DETAILS) => command::inverter_details,
        Some(CMD_INVERTER_DAYS) => command::inverter_days,
        Some(CMD_INVERTER_MONTHS) => command::inverter_months,
        Some(CMD_LIST_INVERTERS) => command::list_inverters,
        Some(CMD_LIST_STATIONS) => command::list_stations,
        _ => {
            return Err(anyhow!(
                "Subcommand must be one of '{CMD_STATION_DETAILS}', '{CMD_INVERTER_DETAILS}', \
                 '{CMD_INVERTER_DAYS}', '{CMD_INVERTER_MONTHS}', '{CMD_LIST_INVERTERS}', \
                 '{CMD_LIST_STATIONS}'"
            ))
        }
    };

    let job_args = JobArgs::parse(&mut args)?;
    let rest = args.finish();
    if !rest.is_empty() {
        return Err(anyhow!("Unexpected arguments: {rest:?}"));
    }
    run(job_args)
}
