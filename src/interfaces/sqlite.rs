//! Relational sink: the fixed `inverter_daily` table in a local SQLite file.
//!
//! A connection is opened for every batch and closed afterwards. Rows are
//! inserted one by one inside a single transaction; a row the database
//! refuses is counted as rejected and the rest of the batch is committed.

use std::path::{Path, PathBuf};

use rusqlite::{params, Connection, ErrorCode};

use crate::constants::measurements;
use crate::data_mgmt::models::{Record, RtValue, WriteReport};
use crate::data_mgmt::sink::{Sink, SinkError};

const SINK_NAME: &str = "sqlite";
const TABLENAME: &str = "inverter_daily";

pub struct SqliteSink {
    path: PathBuf,
}

impl SqliteSink {
    pub fn new(path: impl AsRef<Path>) -> Self {
        SqliteSink {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn open(&self) -> Result<Connection, SinkError> {
        std::fs::create_dir_all(self.path.parent().unwrap_or(Path::new(""))).map_err(|e| {
            SinkError::Unavailable {
                sink: SINK_NAME,
                reason: format!("cannot create directory for {:?}: {e}", self.path),
            }
        })?;
        let conn = Connection::open(&self.path).map_err(classify)?;
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS '{TABLENAME}' (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                inverter_id TEXT NOT NULL,
                station_name TEXT NOT NULL DEFAULT '',
                dateStr TEXT NOT NULL DEFAULT '',
                energy REAL NOT NULL DEFAULT 0,
                money REAL NOT NULL DEFAULT 0,
                moneyStr TEXT NOT NULL DEFAULT '',
                energyStr TEXT NOT NULL DEFAULT ''
                )"
            ),
            [],
        )
        .map_err(classify)?;
        Ok(conn)
    }
}

fn classify(e: rusqlite::Error) -> SinkError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _)
            if matches!(
                err.code,
                ErrorCode::DatabaseBusy
                    | ErrorCode::DatabaseLocked
                    | ErrorCode::CannotOpen
                    | ErrorCode::SystemIoFailure
                    | ErrorCode::DiskFull
            ) =>
        {
            SinkError::Unavailable {
                sink: SINK_NAME,
                reason: e.to_string(),
            }
        }
        _ => SinkError::Refused {
            sink: SINK_NAME,
            reason: e.to_string(),
        },
    }
}

fn text(record: &Record, key: &str) -> String {
    record
        .get_tag(key)
        .or_else(|| record.get_field(key).and_then(RtValue::as_str))
        .unwrap_or_default()
        .to_string()
}

fn real(record: &Record, key: &str) -> f64 {
    record.get_field(key).and_then(RtValue::as_f64).unwrap_or(0.0)
}

impl Sink for SqliteSink {
    fn name(&self) -> &str {
        SINK_NAME
    }

    fn write(&mut self, records: &[Record]) -> Result<WriteReport, SinkError> {
        if let Some(other) = records
            .iter()
            .find(|r| r.measurement() != measurements::INVERTER_DAILY)
        {
            return Err(SinkError::Schema(format!(
                "table {TABLENAME} cannot hold {} records",
                other.measurement()
            )));
        }
        if records.is_empty() {
            return Ok(WriteReport::default());
        }

        let mut conn = self.open()?;
        let tx = conn.transaction().map_err(classify)?;
        let mut report = WriteReport::default();
        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT INTO '{TABLENAME}'
                    (inverter_id, station_name, dateStr, energy, money, moneyStr, energyStr)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
                ))
                .map_err(classify)?;
            for record in records {
                let res = stmt.execute(params![
                    text(record, "inverter_id"),
                    text(record, "station_name"),
                    text(record, "dateStr"),
                    real(record, "energy"),
                    real(record, "money"),
                    text(record, "moneyStr"),
                    text(record, "energyStr"),
                ]);
                match res {
                    Ok(_) => report.written += 1,
                    Err(e) => match classify(e) {
                        transient @ SinkError::Unavailable { .. } => return Err(transient),
                        rejected => {
                            log::warn!(
                                "Row for inverter {} on {} rejected: {rejected}",
                                text(record, "inverter_id"),
                                text(record, "dateStr")
                            );
                            report.rejected += 1;
                        }
                    },
                }
            }
        }
        tx.commit().map_err(classify)?;
        log::debug!("Inserted {} row(s) into {:?}", report.written, self.path);
        Ok(report)
    }
}
