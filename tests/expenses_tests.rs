// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use centrebook::{cli, commands::expenses, db};
use rusqlite::{params, Connection};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO categories(name) VALUES('Kitchen')", [])
        .unwrap();
    let cat_id: i64 = conn
        .query_row("SELECT id FROM categories WHERE name='Kitchen'", [], |r| {
            r.get(0)
        })
        .unwrap();
    let rows = [
        ("2025-08-01", "2025-08-01 09:00:00", "Milk", "40", "Lucknow", "a@x.in"),
        ("2025-08-02", "2025-08-02 09:00:00", "Tea", "60", "Lucknow", "b@x.in"),
        ("2025-07-15", "2025-07-15 09:00:00", "Gas", "900", "Gorakhpur", "a@x.in"),
    ];
    for (date, ts, item, amount, centre, by) in rows {
        conn.execute(
            "INSERT INTO expenses(date, timestamp, item, category_id, centre, amount, payment_method, created_by, note)
             VALUES (?1,?2,?3,?4,?5,?6,'cash',?7,NULL)",
            params![date, ts, item, cat_id, centre, amount, by],
        )
        .unwrap();
    }
    conn
}

fn list_matches(args: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["centrebook", "expense", "list"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    let Some(("expense", exp_m)) = matches.subcommand() else {
        panic!("no expense subcommand");
    };
    let Some(("list", list_m)) = exp_m.subcommand() else {
        panic!("no list subcommand");
    };
    list_m.clone()
}

#[test]
fn list_is_newest_first_and_limit_respected() {
    let conn = setup();
    let rows = expenses::query_rows(&conn, &list_matches(&["--limit", "2"])).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].item, "Tea");
    assert_eq!(rows[1].item, "Milk");
}

#[test]
fn list_filters_compose_as_conjunction() {
    let conn = setup();
    let rows = expenses::query_rows(
        &conn,
        &list_matches(&["--centre", "Lucknow", "--user", "a@x.in"]),
    )
    .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].item, "Milk");
}

#[test]
fn list_month_filter_uses_timestamp() {
    let conn = setup();
    let rows = expenses::query_rows(&conn, &list_matches(&["--month", "2025-07"])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].item, "Gas");
}

#[test]
fn add_creates_unknown_categories_on_first_use() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "centrebook", "expense", "add", "--item", "Whiteboard", "--amount", "2500",
        "--category", "Furniture", "--centre", "Lucknow", "--by", "admin@x.in",
    ]);
    let Some(("expense", exp_m)) = matches.subcommand() else {
        panic!("no expense subcommand");
    };
    expenses::handle(&conn, exp_m).unwrap();

    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM categories WHERE name='Furniture'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(n, 1);
    let rows = expenses::query_rows(&conn, &list_matches(&["--category", "Furniture"])).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, "2500");
}

#[test]
fn add_rejects_negative_amounts() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "centrebook", "expense", "add", "--item", "Milk", "--amount", "-5",
        "--centre", "Lucknow", "--by", "a@x.in",
    ]);
    let Some(("expense", exp_m)) = matches.subcommand() else {
        panic!("no expense subcommand");
    };
    let err = expenses::handle(&conn, exp_m).unwrap_err();
    assert!(err.to_string().contains("non-negative"));
}

#[test]
fn update_refreshes_timestamp_but_not_date() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "centrebook", "expense", "update", "--id", "1", "--amount", "45",
    ]);
    let Some(("expense", exp_m)) = matches.subcommand() else {
        panic!("no expense subcommand");
    };
    expenses::handle(&conn, exp_m).unwrap();

    let (date, ts, amount): (String, String, String) = conn
        .query_row(
            "SELECT date, timestamp, amount FROM expenses WHERE id=1",
            [],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .unwrap();
    assert_eq!(date, "2025-08-01");
    assert_ne!(ts, "2025-08-01 09:00:00");
    assert_eq!(amount, "45");
}

#[test]
fn attachments_round_trip_through_snapshot_loader() {
    let conn = setup();
    let matches = cli::build_cli().get_matches_from([
        "centrebook", "expense", "attach", "--id", "1", "--name", "bill.pdf",
        "--url", "https://blobs.example/bill.pdf", "--size", "2048", "--mime",
        "application/pdf",
    ]);
    let Some(("expense", exp_m)) = matches.subcommand() else {
        panic!("no expense subcommand");
    };
    expenses::handle(&conn, exp_m).unwrap();

    let snapshot = db::load_expenses(&conn).unwrap();
    let with_blob = snapshot.iter().find(|e| e.id == 1).unwrap();
    assert_eq!(with_blob.attachments.len(), 1);
    assert_eq!(with_blob.attachments[0].name, "bill.pdf");
    assert_eq!(with_blob.attachments[0].size, 2048);
    let without = snapshot.iter().find(|e| e.id == 2).unwrap();
    assert!(without.attachments.is_empty());
}

#[test]
fn rm_deletes_and_cascades_attachments() {
    let conn = setup();
    conn.execute(
        "INSERT INTO expense_attachments(expense_id, name, url) VALUES(1, 'a', 'u')",
        [],
    )
    .unwrap();
    let matches =
        cli::build_cli().get_matches_from(["centrebook", "expense", "rm", "--id", "1"]);
    let Some(("expense", exp_m)) = matches.subcommand() else {
        panic!("no expense subcommand");
    };
    expenses::handle(&conn, exp_m).unwrap();

    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM expenses WHERE id=1", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
    let a: i64 = conn
        .query_row("SELECT COUNT(*) FROM expense_attachments", [], |r| r.get(0))
        .unwrap();
    assert_eq!(a, 0);
}
