//! Field mappings from SolisCloud JSON entities to records.
//!
//! Each table maps an output name to the API key it is read from and how
//! the value is cast. Casting never fails: an absent or unreadable value
//! becomes `0`, `0.0` or an empty string.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::Deserialize;

use crate::data_mgmt::coerce;
use crate::data_mgmt::models::{RawRecord, Record, RtValue};

#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub enum Typecast {
    #[serde(rename = "tag")]
    Tag,
    #[serde(rename = "str")]
    Str,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "int")]
    Int,
}

#[derive(Clone, Debug, Deserialize)]
pub struct DriverField {
    pub column: String,
    pub typecast: Typecast,
}

pub type Driver = BTreeMap<String, DriverField>;

fn load(json: &str) -> Driver {
    serde_json::from_str::<Driver>(json).expect("built-in driver table is valid JSON")
}

/// Builds a record from `raw` using `driver`.
pub fn apply(driver: &Driver, measurement: &str, raw: &RawRecord) -> Record {
    let mut rec = Record::new(measurement);
    for (name, field) in driver {
        let value = raw.get(&field.column).unwrap_or(&serde_json::Value::Null);
        match field.typecast {
            Typecast::Tag => rec.set_tag(name, coerce::to_string(value).unwrap_or_default()),
            Typecast::Str => rec.set_field(
                name,
                RtValue::String(coerce::to_string(value).unwrap_or_default()),
            ),
            Typecast::Float => {
                let v = coerce::to_f64(value).unwrap_or(0.0);
                rec.set_field(name, RtValue::Float(v));
            }
            Typecast::Int => rec.set_field(name, RtValue::Int(coerce::to_i64(value).unwrap_or(0))),
        }
    }
    rec
}

pub static STATION_DETAIL: Lazy<Driver> = Lazy::new(|| {
    load(
        r#"
    {
        "station_id": {"column": "id", "typecast": "tag"},
        "stationName": {"column": "stationName", "typecast": "tag"},
        "orgCode": {"column": "orgCode", "typecast": "tag"},
        "createDateStr": {"column": "createDateStr", "typecast": "tag"},
        "fisPowerTimeStr": {"column": "fisPowerTimeStr", "typecast": "tag"},
        "dataTimestamp": {"column": "dataTimestamp", "typecast": "tag"},
        "picUrl": {"column": "picUrl", "typecast": "tag"},
        "DailyPowerGen": {"column": "dayEnergy", "typecast": "float"},
        "monthCarbonDioxide": {"column": "mountCarbonDioxide", "typecast": "float"},
        "MonthlyPowerGen": {"column": "monthEnergy", "typecast": "float"},
        "YearlyPowerGen": {"column": "yearEnergy", "typecast": "float"},
        "TotalPowerGen": {"column": "allEnergy", "typecast": "float"},
        "FullPowerHours": {"column": "fullHour", "typecast": "float"},
        "installerEmail": {"column": "installerEmail", "typecast": "str"},
        "installerMobile": {"column": "installerMobile", "typecast": "str"},
        "region": {"column": "regionStr", "typecast": "str"},
        "city": {"column": "cityStr", "typecast": "str"},
        "country": {"column": "countryStr", "typecast": "str"},
        "county": {"column": "countyStr", "typecast": "str"},
        "capacity": {"column": "capacity", "typecast": "float"},
        "state": {"column": "state", "typecast": "int"},
        "power": {"column": "power", "typecast": "float"},
        "dayIncome": {"column": "dayIncome", "typecast": "float"},
        "monthInCome": {"column": "monthInCome", "typecast": "float"},
        "yearInCome": {"column": "yearInCome", "typecast": "float"},
        "allInCome": {"column": "allInCome", "typecast": "float"},
        "homeLoadEnergy": {"column": "homeLoadEnergy", "typecast": "float"},
        "homeLoadMonthEnergy": {"column": "homeLoadMonthEnergy", "typecast": "float"},
        "weather": {"column": "weather", "typecast": "str"},
        "weatherType": {"column": "weatherType", "typecast": "str"},
        "weatherUpdateDateStr": {"column": "weatherUpdateDateStr", "typecast": "str"},
        "sr": {"column": "sr", "typecast": "str"},
        "ss": {"column": "ss", "typecast": "str"},
        "condTxtD": {"column": "condTxtD", "typecast": "str"},
        "condTxtN": {"column": "condTxtN", "typecast": "str"}
    }
    "#,
    )
});

pub static INVERTER_DETAIL: Lazy<Driver> = Lazy::new(|| {
    load(
        r#"
    {
        "inverter_id": {"column": "id", "typecast": "tag"},
        "model": {"column": "model", "typecast": "tag"},
        "stationName": {"column": "stationName", "typecast": "tag"},
        "stationId": {"column": "stationId", "typecast": "tag"},
        "sn": {"column": "sn", "typecast": "tag"},
        "sno": {"column": "sno", "typecast": "tag"},
        "collectorsn": {"column": "collectorsn", "typecast": "tag"},
        "collectorId": {"column": "collectorId", "typecast": "tag"},
        "dataTimestampStr": {"column": "dataTimestampStr", "typecast": "tag"},
        "inverterMeterModel": {"column": "inverterMeterModel", "typecast": "tag"},
        "timeStr": {"column": "timeStr", "typecast": "tag"},
        "pac": {"column": "pac", "typecast": "float"},
        "pacPec": {"column": "pacPec", "typecast": "float"},
        "eToday": {"column": "eToday", "typecast": "float"},
        "eMonth": {"column": "eMonth", "typecast": "float"},
        "eYear": {"column": "eYear", "typecast": "float"},
        "eTotal": {"column": "eTotal", "typecast": "float"},
        "fullHour": {"column": "fullHour", "typecast": "float"},
        "timeZone": {"column": "timeZone", "typecast": "float"},
        "power": {"column": "power", "typecast": "float"},
        "dcBus": {"column": "dcBus", "typecast": "float"},
        "porwerPercent": {"column": "porwerPercent", "typecast": "float"},
        "apparentPower": {"column": "apparentPower", "typecast": "float"},
        "dcPac": {"column": "dcPac", "typecast": "float"},
        "tempName": {"column": "tempName", "typecast": "str"},
        "state": {"column": "state", "typecast": "int"},
        "acOutputType": {"column": "acOutputType", "typecast": "int"},
        "dcInputType": {"column": "dcInputType", "typecast": "int"},
        "currentState": {"column": "currentState", "typecast": "str"},
        "allInCome": {"column": "allInCome", "typecast": "float"},
        "updateShelfEndTimeStr": {"column": "updateShelfEndTimeStr", "typecast": "str"},
        "shelfState": {"column": "shelfState", "typecast": "str"},
        "alarmState": {"column": "alarmState", "typecast": "int"},
        "stateExceptionFlag": {"column": "stateExceptionFlag", "typecast": "int"},
        "gridPurchasedTodayEnergy": {"column": "gridPurchasedTodayEnergy", "typecast": "float"},
        "gridSellTodayEnergy": {"column": "gridSellTodayEnergy", "typecast": "float"},
        "uAc1": {"column": "uAc1", "typecast": "float"},
        "uAc2": {"column": "uAc2", "typecast": "float"},
        "uAc3": {"column": "uAc3", "typecast": "float"},
        "iAc1": {"column": "iAc1", "typecast": "float"},
        "iAc2": {"column": "iAc2", "typecast": "float"},
        "iAc3": {"column": "iAc3", "typecast": "float"},
        "uPv1": {"column": "uPv1", "typecast": "float"},
        "iPv1": {"column": "iPv1", "typecast": "float"},
        "insulationResistance": {"column": "insulationResistance", "typecast": "float"},
        "iLeakLimt": {"column": "iLeakLimt", "typecast": "float"},
        "inverterTemperature": {"column": "inverterTemperature", "typecast": "float"},
        "powerFactor": {"column": "powerFactor", "typecast": "float"},
        "fac": {"column": "fac", "typecast": "float"}
    }
    "#,
    )
});

pub static INVERTER_LIST: Lazy<Driver> = Lazy::new(|| {
    load(
        r#"
    {
        "inverter_id": {"column": "id", "typecast": "tag"},
        "sn": {"column": "sn", "typecast": "tag"},
        "stationId": {"column": "stationId", "typecast": "tag"},
        "stationName": {"column": "stationName", "typecast": "tag"},
        "state": {"column": "state", "typecast": "int"},
        "pac": {"column": "pac", "typecast": "float"},
        "eToday": {"column": "etoday", "typecast": "float"}
    }
    "#,
    )
});

pub static STATION_LIST: Lazy<Driver> = Lazy::new(|| {
    load(
        r#"
    {
        "station_id": {"column": "id", "typecast": "tag"},
        "stationName": {"column": "stationName", "typecast": "tag"},
        "capacity": {"column": "capacity", "typecast": "float"},
        "state": {"column": "state", "typecast": "int"}
    }
    "#,
    )
});

/// Intraday points of one inverter.
pub static INVERTER_DAY: Lazy<Driver> = Lazy::new(|| {
    load(
        r#"
    {
        "timeStr": {"column": "timeStr", "typecast": "tag"},
        "recorded_time": {"column": "time", "typecast": "tag"},
        "pac": {"column": "pac", "typecast": "float"},
        "eToday": {"column": "eToday", "typecast": "float"},
        "eTotal": {"column": "eTotal", "typecast": "float"}
    }
    "#,
    )
});

/// Per-day totals of one inverter over a month.
pub static INVERTER_MONTH: Lazy<Driver> = Lazy::new(|| {
    load(
        r#"
    {
        "dateStr": {"column": "dateStr", "typecast": "tag"},
        "energy": {"column": "energy", "typecast": "float"},
        "money": {"column": "money", "typecast": "float"},
        "moneyStr": {"column": "moneyStr", "typecast": "str"},
        "energyStr": {"column": "energyStr", "typecast": "str"}
    }
    "#,
    )
});

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_driver_tables() {
        assert_eq!(INVERTER_MONTH.len(), 5);
        assert_eq!(INVERTER_MONTH["energy"].typecast, Typecast::Float);
        assert_eq!(INVERTER_DAY["recorded_time"].column, "time");
        assert_eq!(STATION_DETAIL["DailyPowerGen"].column, "dayEnergy");
        assert_eq!(INVERTER_DETAIL["inverter_id"].typecast, Typecast::Tag);
        assert_eq!(INVERTER_LIST["inverter_id"].column, "id");
    }

    #[test]
    fn test_apply_coerces() {
        let raw = json!({
            "dateStr": "2024-02-01",
            "energy": "12.30",
            "money": 6.15,
            "moneyStr": "RM",
            "energyStr": "kWh"
        });
        let rec = apply(&INVERTER_MONTH, "inverter_daily", &raw);

        assert_eq!(rec.measurement(), "inverter_daily");
        assert_eq!(rec.get_tag("dateStr"), Some("2024-02-01"));
        assert_eq!(rec.get_field("energy"), Some(&RtValue::Float(12.3)));
        assert_eq!(rec.get_field("money"), Some(&RtValue::Float(6.15)));
        assert_eq!(rec.get_field("energyStr"), Some(&RtValue::String("kWh".into())));
    }

    #[test]
    fn test_apply_is_total() {
        let drivers: [&Driver; 6] = [
            &STATION_DETAIL,
            &STATION_LIST,
            &INVERTER_DETAIL,
            &INVERTER_LIST,
            &INVERTER_DAY,
            &INVERTER_MONTH,
        ];
        for raw in [json!({}), json!(null), json!({"pac": null, "state": "n/a", "energy": [1]})] {
            for driver in drivers {
                let rec = apply(driver, "m", &raw);
                assert_eq!(rec.all_tags().len() + rec.all_fields().len(), driver.len());
            }
        }

        let rec = apply(&INVERTER_MONTH, "m", &json!({}));
        assert_eq!(rec.get_field("energy"), Some(&RtValue::Float(0.0)));
        assert_eq!(rec.get_field("moneyStr"), Some(&RtValue::String(String::new())));
        assert_eq!(rec.get_tag("dateStr"), Some(""));
    }
}
