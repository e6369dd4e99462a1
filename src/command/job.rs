use anyhow::{anyhow, Result};
use chrono::{DateTime, NaiveDate, Utc};
use soliscloud::SolisCloud;

use crate::argsets::{JobArgs, SinkKind};
use crate::config::{Config, Credentials};
use crate::data_mgmt::sink::Sink;
use crate::interfaces::{InfluxSink, SqliteSink, TelegramNotifier};
use crate::pipeline::{Abort, LogOnly, Notifier, Pipeline, PipelineOptions, RunReport};

/// Everything a job needs, resolved once before the first remote call.
pub struct Job {
    pub name: &'static str,
    pub config: Config,
    pub client: SolisCloud,
    notifier: Box<dyn Notifier>,
    pub now: DateTime<Utc>,
    pub start: NaiveDate,
    pub today: NaiveDate,
}

impl Job {
    pub fn new(name: &'static str, args: &JobArgs) -> Result<Self> {
        let mut config = Config::from_env()?;
        if let Some(path) = &args.credentials {
            config.credentials_path = path.clone();
        }
        let credentials = Credentials::load(&config.credentials_path)?;
        let client = SolisCloud::new(
            &config.api_url,
            &credentials.key,
            &credentials.secret,
            config.request_timeout,
        );
        let notifier: Box<dyn Notifier> = match &config.telegram {
            Some(telegram) => Box::new(TelegramNotifier::new(telegram)),
            None => {
                log::info!("Telegram not configured, alerts go to the log only");
                Box::new(LogOnly)
            }
        };
        let now = Utc::now();

        Ok(Job {
            name,
            start: args.start.unwrap_or(config.start_date),
            today: args.today.unwrap_or_else(|| config.today_at(now)),
            now,
            client,
            notifier,
            config,
        })
    }

    pub fn pipeline(&self) -> Pipeline<'_> {
        Pipeline::new(
            self.name,
            PipelineOptions {
                retry: self.config.retry,
                pace: self.config.request_delay,
            },
            self.notifier.as_ref(),
        )
    }

    pub fn sink(&self, kind: SinkKind) -> Result<Box<dyn Sink>> {
        Ok(match kind {
            SinkKind::Influx => {
                let influx = self.config.influx.as_ref().ok_or_else(|| {
                    anyhow!("the influx sink needs INFLUX_URL, INFLUX_TOKEN, INFLUX_ORG and INFLUX_BUCKET")
                })?;
                Box::new(InfluxSink::new(influx, self.config.request_timeout))
            }
            SinkKind::Sqlite => Box::new(SqliteSink::new(&self.config.sqlite_path)),
        })
    }

    /// Logs the final tally, or folds it into the abort that ended the run.
    pub fn finish(&self, total: RunReport, outcome: Result<(), Abort>) -> Result<()> {
        match outcome {
            Ok(()) => {
                if total.is_clean() {
                    log::info!("{} finished: {total}", self.name);
                } else {
                    log::warn!("{} finished with gaps: {total}", self.name);
                    for skipped in &total.skipped {
                        log::warn!("  skipped {skipped}");
                    }
                }
                Ok(())
            }
            Err(mut abort) => {
                let mut merged = total;
                merged.merge(std::mem::take(&mut abort.report));
                log::error!("{} stopped early: {merged}", self.name);
                abort.report = merged;
                Err(abort.into())
            }
        }
    }
}
