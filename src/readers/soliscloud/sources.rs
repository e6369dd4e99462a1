use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use soliscloud::SolisCloud;

use crate::constants::measurements;
use crate::data_mgmt::models::{RawRecord, Record};
use crate::helpers::from_epoch_millis;
use crate::pipeline::{Source, SourceError, WorkUnit};

use super::driver::{self, Driver};
use super::InverterRef;

fn page_of(unit: &WorkUnit) -> Result<u32, SourceError> {
    match unit {
        WorkUnit::Page(n) => Ok(*n),
        other => Err(SourceError::Fatal(format!("expected a page, got {other}"))),
    }
}

fn tag_inverter(mut rec: Record, inverter: &InverterRef) -> Record {
    rec.set_tag("inverter_id", inverter.id.as_str());
    rec.set_tag("station_name", inverter.station_name.as_str());
    rec
}

/// Paginated listing endpoints that map one-to-one onto a measurement.
pub struct PagedSource<'a> {
    client: &'a SolisCloud,
    page_size: u32,
    listing: Listing,
    now: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Listing {
    Stations,
    StationDetails,
    /// Stamped with the time of the run.
    InverterDetails,
    Inverters { station_id: Option<String> },
}

impl<'a> PagedSource<'a> {
    pub fn new(client: &'a SolisCloud, page_size: u32, listing: Listing) -> Self {
        PagedSource {
            client,
            page_size,
            listing,
            now: Utc::now(),
        }
    }

    fn driver(&self) -> (&'static Driver, &'static str) {
        match self.listing {
            Listing::Stations => (&*driver::STATION_LIST, measurements::STATION_LIST),
            Listing::StationDetails => (&*driver::STATION_DETAIL, measurements::STATION_DETAIL_LIST),
            Listing::InverterDetails => (&*driver::INVERTER_DETAIL, measurements::INVERTER_DETAIL_LIST),
            Listing::Inverters { .. } => (&*driver::INVERTER_LIST, measurements::INVERTER_LIST),
        }
    }
}

impl Source for PagedSource<'_> {
    fn label(&self) -> String {
        match &self.listing {
            Listing::Stations => "userStationList".into(),
            Listing::StationDetails => "stationDetailList".into(),
            Listing::InverterDetails => "inverterDetailList".into(),
            Listing::Inverters { station_id: None } => "inverterList".into(),
            Listing::Inverters {
                station_id: Some(id),
            } => format!("inverterList station {id}"),
        }
    }

    fn fetch(&mut self, unit: &WorkUnit) -> Result<Vec<RawRecord>, SourceError> {
        let page = page_of(unit)?;
        let records = match &self.listing {
            Listing::Stations => self.client.user_station_list(page, self.page_size)?,
            Listing::StationDetails => self.client.station_detail_list(page, self.page_size)?,
            Listing::InverterDetails => self.client.inverter_detail_list(page, self.page_size)?,
            Listing::Inverters { station_id } => {
                self.client
                    .inverter_list(page, self.page_size, station_id.as_deref())?
            }
        };
        Ok(records)
    }

    fn transform(&self, _unit: &WorkUnit, raw: &RawRecord) -> Record {
        let (table, measurement) = self.driver();
        let mut rec = driver::apply(table, measurement, raw);
        if self.listing == Listing::InverterDetails {
            rec.set_timestamp(self.now);
        }
        rec
    }
}

/// Intraday power and energy of one inverter, one day per unit.
pub struct InverterDaySource<'a> {
    client: &'a SolisCloud,
    inverter: InverterRef,
    currency: String,
    time_zone: i32,
}

impl<'a> InverterDaySource<'a> {
    pub fn new(client: &'a SolisCloud, inverter: InverterRef, currency: &str, time_zone: i32) -> Self {
        InverterDaySource {
            client,
            inverter,
            currency: currency.to_string(),
            time_zone,
        }
    }
}

impl Source for InverterDaySource<'_> {
    fn label(&self) -> String {
        format!("inverterDay {}", self.inverter.id)
    }

    fn fetch(&mut self, unit: &WorkUnit) -> Result<Vec<RawRecord>, SourceError> {
        let WorkUnit::Day(day) = unit else {
            return Err(SourceError::Fatal(format!("expected a day, got {unit}")));
        };
        Ok(self.client.inverter_day(
            &self.inverter.id,
            &self.currency,
            &day.format("%Y-%m-%d").to_string(),
            self.time_zone,
        )?)
    }

    fn transform(&self, _unit: &WorkUnit, raw: &RawRecord) -> Record {
        let mut rec = tag_inverter(
            driver::apply(&driver::INVERTER_DAY, measurements::INVERTER_DAY, raw),
            &self.inverter,
        );
        if let Some(ts) = raw.get("time").and_then(from_epoch_millis) {
            rec.set_timestamp(ts);
        }
        rec
    }
}

/// Daily energy totals of one inverter, one month per unit.
pub struct InverterMonthSource<'a> {
    client: &'a SolisCloud,
    inverter: InverterRef,
    currency: String,
    site_timezone: Tz,
    only_date: Option<NaiveDate>,
}

impl<'a> InverterMonthSource<'a> {
    pub fn new(client: &'a SolisCloud, inverter: InverterRef, currency: &str, site_timezone: Tz) -> Self {
        InverterMonthSource {
            client,
            inverter,
            currency: currency.to_string(),
            site_timezone,
            only_date: None,
        }
    }

    /// Keep only the entry for `date` out of each month.
    pub fn only_date(mut self, date: NaiveDate) -> Self {
        self.only_date = Some(date);
        self
    }

    /// Midnight at the site on the entry's date.
    fn timestamp(&self, date_str: &str) -> Option<DateTime<Utc>> {
        let date = NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()?;
        self.site_timezone
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl Source for InverterMonthSource<'_> {
    fn label(&self) -> String {
        format!("inverterMonth {}", self.inverter.id)
    }

    fn fetch(&mut self, unit: &WorkUnit) -> Result<Vec<RawRecord>, SourceError> {
        let WorkUnit::Month(month) = unit else {
            return Err(SourceError::Fatal(format!("expected a month, got {unit}")));
        };
        Ok(self
            .client
            .inverter_month(&self.inverter.id, &self.currency, &month.to_string())?)
    }

    fn keep(&self, _unit: &WorkUnit, raw: &RawRecord) -> bool {
        match self.only_date {
            Some(date) => {
                raw.get("dateStr").and_then(|v| v.as_str())
                    == Some(date.format("%Y-%m-%d").to_string().as_str())
            }
            None => true,
        }
    }

    fn transform(&self, _unit: &WorkUnit, raw: &RawRecord) -> Record {
        let mut rec = tag_inverter(
            driver::apply(&driver::INVERTER_MONTH, measurements::INVERTER_DAILY, raw),
            &self.inverter,
        );
        if let Some(ts) = rec.get_tag("dateStr").and_then(|d| self.timestamp(d)) {
            rec.set_timestamp(ts);
        }
        rec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use serde_json::json;

    use crate::data_mgmt::models::RtValue;
    use crate::pipeline::YearMonth;

    fn client() -> SolisCloud {
        SolisCloud::new("http://127.0.0.1:9", "key", "secret", Duration::from_secs(1))
    }

    fn inverter() -> InverterRef {
        InverterRef {
            id: "1308675217949001".into(),
            station_name: "Shah Alam".into(),
        }
    }

    #[test]
    fn test_month_transform() {
        let client = client();
        let source = InverterMonthSource::new(&client, inverter(), "MYR", chrono_tz::Asia::Kuala_Lumpur);
        let unit = WorkUnit::Month(YearMonth::new(2024, 2).unwrap());

        let rec = source.transform(
            &unit,
            &json!({"dateStr": "2024-02-01", "energy": 12.5, "money": "6.25", "moneyStr": "RM", "energyStr": "kWh"}),
        );
        assert_eq!(rec.measurement(), "inverter_daily");
        assert_eq!(rec.get_tag("inverter_id"), Some("1308675217949001"));
        assert_eq!(rec.get_tag("station_name"), Some("Shah Alam"));
        assert_eq!(rec.get_field("money"), Some(&RtValue::Float(6.25)));
        // Midnight in Kuala Lumpur is 16:00 UTC the previous day
        assert_eq!(
            rec.get_timestamp(),
            Some(Utc.with_ymd_and_hms(2024, 1, 31, 16, 0, 0).unwrap())
        );

        let empty = source.transform(&unit, &json!({}));
        assert_eq!(empty.get_field("energy"), Some(&RtValue::Float(0.0)));
        assert!(empty.get_timestamp().is_none());
    }

    #[test]
    fn test_month_today_filter() {
        let client = client();
        let source = InverterMonthSource::new(&client, inverter(), "MYR", chrono_tz::UTC)
            .only_date(NaiveDate::from_ymd_opt(2024, 2, 15).unwrap());
        let unit = WorkUnit::Month(YearMonth::new(2024, 2).unwrap());

        assert!(source.keep(&unit, &json!({"dateStr": "2024-02-15"})));
        assert!(!source.keep(&unit, &json!({"dateStr": "2024-02-14"})));
        assert!(!source.keep(&unit, &json!({})));
    }

    #[test]
    fn test_day_transform() {
        let client = client();
        let source = InverterDaySource::new(&client, inverter(), "MYR", 8);
        let unit = WorkUnit::Day(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());

        let rec = source.transform(
            &unit,
            &json!({"time": "1706745600000", "timeStr": "2024-02-01 08:00:00", "pac": 1520, "eToday": "3.2", "eTotal": null}),
        );
        assert_eq!(rec.measurement(), "Inverter_Daily");
        assert_eq!(rec.get_tag("recorded_time"), Some("1706745600000"));
        assert_eq!(rec.get_field("pac"), Some(&RtValue::Float(1520.0)));
        assert_eq!(rec.get_field("eTotal"), Some(&RtValue::Float(0.0)));
        assert_eq!(rec.get_timestamp(), DateTime::from_timestamp(1_706_745_600, 0));
    }

    #[test]
    fn test_wrong_unit_kind_is_fatal() {
        let client = client();
        let mut source = InverterDaySource::new(&client, inverter(), "MYR", 8);
        let err = source.fetch(&WorkUnit::Page(1)).unwrap_err();
        assert!(!err.is_transient());

        let mut paged = PagedSource::new(&client, 100, Listing::StationDetails);
        assert!(!paged.fetch(&WorkUnit::Month(YearMonth::new(2024, 1).unwrap())).unwrap_err().is_transient());
    }

    #[test]
    fn test_inverter_details_are_stamped_with_run_time() {
        let client = client();
        let source = PagedSource::new(&client, 100, Listing::InverterDetails);
        let rec = source.transform(&WorkUnit::Page(1), &json!({"id": "1", "pac": "0.5"}));
        assert_eq!(rec.measurement(), "inverter_detail_list");
        assert_eq!(rec.get_timestamp(), Some(source.now));
        assert_eq!(rec.get_tag("inverter_id"), Some("1"));

        let station = PagedSource::new(&client, 100, Listing::StationDetails)
            .transform(&WorkUnit::Page(1), &json!({"id": 7, "stationName": "Kajang"}));
        assert!(station.get_timestamp().is_none());
        assert_eq!(station.get_tag("station_id"), Some("7"));
    }

    #[test]
    fn test_labels() {
        let client = client();
        let scoped = PagedSource::new(
            &client,
            100,
            Listing::Inverters {
                station_id: Some("42".into()),
            },
        );
        assert_eq!(scoped.label(), "inverterList station 42");
        assert_eq!(
            InverterMonthSource::new(&client, inverter(), "MYR", chrono_tz::UTC).label(),
            "inverterMonth 1308675217949001"
        );
    }
}
