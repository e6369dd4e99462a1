use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SinkKind {
    #[default]
    Influx,
    Sqlite,
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "influx" | "influxdb" => Ok(SinkKind::Influx),
            "sqlite" => Ok(SinkKind::Sqlite),
            other => Err(format!("unknown sink '{other}', expected 'influx' or 'sqlite'")),
        }
    }
}

/// Options shared by all ingestion subcommands.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JobArgs {
    pub sink: SinkKind,
    pub start: Option<NaiveDate>,
    /// Overrides the site's current date.
    pub today: Option<NaiveDate>,
    pub credentials: Option<PathBuf>,
    pub station_id: Option<String>,
    pub today_only: bool,
}

impl JobArgs {
    pub fn parse(args: &mut pico_args::Arguments) -> Result<Self, pico_args::Error> {
        Ok(JobArgs {
            sink: args.opt_value_from_str("--sink")?.unwrap_or_default(),
            start: args.opt_value_from_str("--start")?,
            today: args.opt_value_from_str("--today")?,
            credentials: args.opt_value_from_str("--credentials")?,
            station_id: args.opt_value_from_str("--station-id")?,
            today_only: args.contains("--today-only"),
        })
    }
}
