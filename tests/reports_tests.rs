// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use centrebook::{cli, commands::reports, db};
use rusqlite::{params, Connection};
use tempfile::NamedTempFile;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO categories(name) VALUES('Kitchen')", [])
        .unwrap();
    conn.execute("INSERT INTO categories(name) VALUES('Admin')", [])
        .unwrap();
    let rows = [
        ("2025-08-01 09:00:00", "Milk", 1, "40", "Lucknow"),
        ("2025-08-05 09:00:00", "Rent", 2, "12000", "Lucknow"),
        ("2025-08-20 09:00:00", "Tea", 1, "60", "Gorakhpur"),
        ("2025-06-01 09:00:00", "Gas", 1, "900", "Lucknow"),
    ];
    for (ts, item, cat, amount, centre) in rows {
        conn.execute(
            "INSERT INTO expenses(date, timestamp, item, category_id, centre, amount, payment_method, created_by)
             VALUES (substr(?1,1,10), ?1, ?2, ?3, ?4, ?5, 'cash', 'a@x.in')",
            params![ts, item, cat, centre, amount],
        )
        .unwrap();
    }
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut full = vec!["centrebook", "report", "balance-sheet"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    let Some(("report", rep_m)) = matches.subcommand() else {
        panic!("no report subcommand");
    };
    reports::handle(conn, rep_m)
}

#[test]
fn json_export_carries_totals_and_breakdowns() {
    let conn = setup();
    let out = NamedTempFile::new().unwrap();
    let path = out.path().to_str().unwrap().to_string();
    run(
        &conn,
        &["--from", "2025-08-01", "--to", "2025-08-31", "--format", "json", "--out", &path],
    )
    .unwrap();

    let sheet: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(sheet["summary"]["total_items"], 3);
    assert_eq!(sheet["summary"]["total_amount"], "12100");
    assert_eq!(sheet["centre_breakdown"]["Lucknow"]["items"], 2);
    assert_eq!(sheet["category_breakdown"]["Kitchen"], "100");
}

#[test]
fn range_is_inclusive_of_the_end_day() {
    let conn = setup();
    let out = NamedTempFile::new().unwrap();
    let path = out.path().to_str().unwrap().to_string();
    run(
        &conn,
        &["--from", "2025-08-20", "--to", "2025-08-20", "--format", "json", "--out", &path],
    )
    .unwrap();
    let sheet: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(sheet["summary"]["total_items"], 1);
    assert_eq!(sheet["expenses"][0]["item"], "Tea");
}

#[test]
fn item_selection_restricts_the_sheet() {
    let conn = setup();
    let out = NamedTempFile::new().unwrap();
    let path = out.path().to_str().unwrap().to_string();
    run(
        &conn,
        &["--item", "Milk", "--item", "Tea", "--format", "json", "--out", &path],
    )
    .unwrap();
    let sheet: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(sheet["summary"]["total_items"], 2);
    assert_eq!(sheet["summary"]["total_amount"], "100");
}

#[test]
fn csv_export_writes_header_and_rows() {
    let conn = setup();
    let out = NamedTempFile::new().unwrap();
    let path = out.path().to_str().unwrap().to_string();
    run(
        &conn,
        &["--centre", "Lucknow", "--format", "csv", "--out", &path],
    )
    .unwrap();

    let body = std::fs::read_to_string(&path).unwrap();
    let mut lines = body.lines();
    assert!(lines.next().unwrap().starts_with("date,timestamp,item"));
    assert_eq!(lines.count(), 3);
}
