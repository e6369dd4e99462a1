use std::path::Path;

use assert_cmd::{assert::Assert, Command};
use mockito::{Matcher, Server};
use predicates::prelude::*;
use serde_json::{json, Value};

/// Every variable the binary reads, so the caller's environment cannot leak
/// into a run.
const CONFIG_VARS: &[&str] = &[
    "SOLIS_INGEST_HOME",
    "LOGGING_LEVEL",
    "SOLIS_API_URL",
    "SOLIS_CREDENTIALS",
    "REQUEST_TIMEOUT_SECS",
    "INFLUX_URL",
    "INFLUX_TOKEN",
    "INFLUX_ORG",
    "INFLUX_BUCKET",
    "SQLITE_PATH",
    "TELEGRAM_API_URL",
    "TELEGRAM_TOKEN",
    "TELEGRAM_CHAT_ID",
    "MAX_RETRIES",
    "RETRY_INTERVAL_SECS",
    "REQUEST_DELAY_MS",
    "PAGE_SIZE",
    "MAX_SKIPPED_PAGES",
    "START_DATE",
    "CURRENCY",
    "SITE_TIMEZONE",
];

fn ok(data: Value) -> String {
    json!({"success": true, "code": "0", "msg": "success", "data": data}).to_string()
}

fn ingest_with(server: &Server, dir: &Path, envs: &[(&str, String)], args: &[&str]) -> Assert {
    let credentials = dir.join("config.json");
    std::fs::write(&credentials, r#"{"key": "1300386381676", "secret": "secret"}"#).unwrap();

    let mut cmd = Command::cargo_bin("solis-ingest").unwrap();
    for var in CONFIG_VARS {
        cmd.env_remove(var);
    }
    // No stray .env in the working directory either
    cmd.current_dir(dir)
        .env("SOLIS_API_URL", server.url())
        .env("SOLIS_CREDENTIALS", &credentials)
        .env("SQLITE_PATH", dir.join("solis.db"))
        .env("MAX_RETRIES", "1")
        .env("RETRY_INTERVAL_SECS", "0")
        .env("REQUEST_DELAY_MS", "0");
    for (var, value) in envs {
        cmd.env(var, value);
    }
    cmd.args(args).assert()
}

fn ingest(server: &Server, dir: &Path, args: &[&str]) -> Assert {
    ingest_with(server, dir, &[], args)
}

fn mock_inverters(server: &mut Server, ids: &[&str]) -> Vec<mockito::Mock> {
    let records: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
    let mut mocks = vec![server
        .mock("POST", "/v1/api/inverterList")
        .with_body(ok(json!({"page": {"records": records}})))
        .expect(1)
        .create()];
    for id in ids {
        mocks.push(
            server
                .mock("POST", "/v1/api/inverterDetail")
                .match_body(Matcher::Json(json!({"id": id})))
                .with_body(ok(json!({"id": id, "stationName": "Shah Alam"})))
                .expect(1)
                .create(),
        );
    }
    mocks
}

fn sqlite_rows(dir: &Path) -> Vec<(String, String, String, f64)> {
    let conn = rusqlite::Connection::open(dir.join("solis.db")).unwrap();
    let mut stmt = conn
        .prepare("SELECT inverter_id, station_name, dateStr, energy FROM inverter_daily ORDER BY id")
        .unwrap();
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    rows
}

#[test]
fn inverter_months_into_sqlite() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut server = Server::new();

    let inverters = mock_inverters(&mut server, &["1001"]);
    let january = server
        .mock("POST", "/v1/api/inverterMonth")
        .match_body(Matcher::PartialJson(json!({"id": "1001", "month": "2024-01"})))
        .with_body(ok(json!([
            {"dateStr": "2024-01-01", "energy": 10.5, "money": 5.25, "moneyStr": "RM", "energyStr": "kWh"},
            {"dateStr": "2024-01-02", "energy": "11.0", "money": 5.5, "moneyStr": "RM", "energyStr": "kWh"}
        ])))
        .expect(1)
        .create();
    let february = server
        .mock("POST", "/v1/api/inverterMonth")
        .match_body(Matcher::PartialJson(json!({"id": "1001", "month": "2024-02"})))
        .with_body(ok(json!([
            {"dateStr": "2024-02-01", "energy": 9.0, "money": 4.5, "moneyStr": "RM", "energyStr": "kWh"},
            {"dateStr": "2024-02-02", "energy": 8.0, "money": 4.0, "moneyStr": "RM", "energyStr": "kWh"}
        ])))
        .expect(1)
        .create();

    ingest(
        &server,
        tempdir.path(),
        &[
            "inverter-months",
            "--sink",
            "sqlite",
            "--start",
            "2024-01-01",
            "--today",
            "2024-02-15",
        ],
    )
    .success();

    for m in &inverters {
        m.assert();
    }
    january.assert();
    february.assert();

    let rows = sqlite_rows(tempdir.path());
    assert_eq!(rows.len(), 4);
    assert_eq!(
        rows[0],
        ("1001".into(), "Shah Alam".into(), "2024-01-01".into(), 10.5)
    );
    assert_eq!(rows[1].3, 11.0);
    assert_eq!(rows[3].2, "2024-02-02");
}

#[test]
fn inverter_months_today_only_keeps_todays_entry() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut server = Server::new();

    let _inverters = mock_inverters(&mut server, &["1001"]);
    let february = server
        .mock("POST", "/v1/api/inverterMonth")
        .match_body(Matcher::PartialJson(json!({"id": "1001", "month": "2024-02"})))
        .with_body(ok(json!([
            {"dateStr": "2024-02-14", "energy": 9.0, "money": 4.5, "moneyStr": "RM", "energyStr": "kWh"},
            {"dateStr": "2024-02-15", "energy": 3.5, "money": 1.75, "moneyStr": "RM", "energyStr": "kWh"}
        ])))
        .expect(1)
        .create();

    ingest(
        &server,
        tempdir.path(),
        &[
            "inverter-months",
            "--sink",
            "sqlite",
            "--start",
            "2024-01-01",
            "--today",
            "2024-02-15",
            "--today-only",
        ],
    )
    .success();

    february.assert();
    assert_eq!(
        sqlite_rows(tempdir.path()),
        vec![("1001".into(), "Shah Alam".into(), "2024-02-15".into(), 3.5)]
    );
}

#[test]
fn inverter_days_fan_out_into_influx() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut server = Server::new();

    let _inverters = mock_inverters(&mut server, &["1001", "1002"]);
    let mut days = vec![];
    for id in ["1001", "1002"] {
        for day in ["2024-02-14", "2024-02-15"] {
            days.push(
                server
                    .mock("POST", "/v1/api/inverterDay")
                    .match_body(Matcher::Json(
                        json!({"id": id, "money": "MYR", "time": day, "timeZone": 8}),
                    ))
                    .with_body(ok(json!([
                        {"time": "1707955200000", "timeStr": "08:00:00", "pac": 1520, "eToday": "3.2", "eTotal": 812}
                    ])))
                    .expect(1)
                    .create(),
            );
        }
    }
    let writes = server
        .mock("POST", "/api/v2/write")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("org".into(), "solar".into()),
            Matcher::UrlEncoded("bucket".into(), "solis".into()),
            Matcher::UrlEncoded("precision".into(), "s".into()),
        ]))
        .match_header("authorization", "Token tok")
        .match_body(Matcher::Regex(r"^Inverter_Daily,inverter_id=100[12],".to_string()))
        .with_status(204)
        .expect(4)
        .create();

    ingest_with(
        &server,
        tempdir.path(),
        &[
            ("INFLUX_URL", server.url()),
            ("INFLUX_TOKEN", "tok".into()),
            ("INFLUX_ORG", "solar".into()),
            ("INFLUX_BUCKET", "solis".into()),
        ],
        &[
            "inverter-days",
            "--start",
            "2024-02-14",
            "--today",
            "2024-02-15",
        ],
    )
    .success();

    for m in &days {
        m.assert();
    }
    writes.assert();
}

#[test]
fn rejected_credentials_fail_the_run() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut server = Server::new();
    let list = server
        .mock("POST", "/v1/api/inverterList")
        .with_status(401)
        .with_body("unauthorized")
        .expect(1)
        .create();

    ingest(
        &server,
        tempdir.path(),
        &["list-inverters", "--sink", "sqlite"],
    )
    .failure()
    .stderr(predicate::str::contains("aborted"));

    list.assert();
}

#[test]
fn list_stations_prints_ids_and_names() {
    let tempdir = tempfile::tempdir().unwrap();
    let mut server = Server::new();
    server
        .mock("POST", "/v1/api/userStationList")
        .with_body(ok(json!({"page": {"records": [
            {"id": "42", "stationName": "Shah Alam"},
            {"id": "43", "stationName": "Klang"}
        ]}})))
        .expect(1)
        .create();

    ingest(&server, tempdir.path(), &["list-stations"])
        .success()
        .stdout("42\tShah Alam\n43\tKlang\n");
}

#[test]
fn unknown_subcommand_fails() {
    let tempdir = tempfile::tempdir().unwrap();
    let server = Server::new();
    ingest(&server, tempdir.path(), &["inverter-years"])
        .failure()
        .stderr(predicate::str::contains("Subcommand must be one of"));
}

#[test]
fn unexpected_argument_fails() {
    let tempdir = tempfile::tempdir().unwrap();
    let server = Server::new();
    ingest(&server, tempdir.path(), &["list-inverters", "--bogus"])
        .failure()
        .stderr(predicate::str::contains("Unexpected arguments"));
}
