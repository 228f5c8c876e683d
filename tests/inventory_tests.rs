// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use centrebook::{cli, commands::inventory, db};
use rusqlite::{params, Connection};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute(
        "INSERT INTO inventory(item_name, centre, quantity, damaged, item_type, status, last_updated)
         VALUES ('Puzzles', 'Lucknow', 10, 3, 'Stock', 'Available', '2025-08-01 09:00:00')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO inventory(item_name, centre, quantity, item_type, status, last_updated)
         VALUES ('Projector', 'Lucknow', 1, 'Asset', 'Available', '2025-08-01 09:00:00')",
        [],
    )
    .unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut full = vec!["centrebook", "inventory"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    let Some(("inventory", inv_m)) = matches.subcommand() else {
        panic!("no inventory subcommand");
    };
    inventory::handle(conn, inv_m)
}

fn counts(conn: &Connection, id: i64) -> (i64, i64, i64) {
    conn.query_row(
        "SELECT quantity, damaged, repaired FROM inventory WHERE id=?1",
        params![id],
        |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
    )
    .unwrap()
}

#[test]
fn use_decrements_and_floors_at_zero() {
    let conn = setup();
    run(&conn, &["use", "--id", "1", "--count", "4"]).unwrap();
    assert_eq!(counts(&conn, 1).0, 6);
    run(&conn, &["use", "--id", "1", "--count", "100"]).unwrap();
    assert_eq!(counts(&conn, 1).0, 0);

    let last_used: Option<String> = conn
        .query_row("SELECT last_used FROM inventory WHERE id=1", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert!(last_used.is_some());
}

#[test]
fn damage_moves_units_out_of_quantity() {
    let conn = setup();
    run(&conn, &["damage", "--id", "1", "--count", "2"]).unwrap();
    let (quantity, damaged, _) = counts(&conn, 1);
    assert_eq!(quantity, 8);
    assert_eq!(damaged, 5);
}

#[test]
fn repair_floors_damaged_at_zero_and_keeps_tally() {
    let conn = setup();
    run(&conn, &["repair", "--id", "1", "--count", "5"]).unwrap();
    let (_, damaged, repaired) = counts(&conn, 1);
    assert_eq!(damaged, 0);
    assert_eq!(repaired, 5);
}

#[test]
fn assign_is_asset_only_and_sets_status() {
    let conn = setup();
    let err = run(&conn, &["assign", "--id", "1", "--to", "Priya"]).unwrap_err();
    assert!(err.to_string().contains("only assets"));

    run(&conn, &["assign", "--id", "2", "--to", "Priya"]).unwrap();
    let (status, assigned): (String, String) = conn
        .query_row(
            "SELECT status, assigned_to FROM inventory WHERE id=2",
            [],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .unwrap();
    assert_eq!(status, "Assigned");
    assert_eq!(assigned, "Priya");
}

#[test]
fn set_quantity_overwrites_directly() {
    let conn = setup();
    run(&conn, &["set-quantity", "--id", "1", "--quantity", "42"]).unwrap();
    assert_eq!(counts(&conn, 1).0, 42);
}

#[test]
fn low_flag_lists_only_items_under_threshold() {
    let conn = setup();
    let matches = cli::build_cli()
        .get_matches_from(["centrebook", "inventory", "list", "--low"]);
    let Some(("inventory", inv_m)) = matches.subcommand() else {
        panic!("no inventory subcommand");
    };
    let Some(("list", list_m)) = inv_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = inventory::query_rows(&conn, list_m).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].item_name, "Projector");
}

#[test]
fn low_threshold_comes_from_settings() {
    let conn = setup();
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('low_stock_absolute', '20')",
        [],
    )
    .unwrap();
    let matches = cli::build_cli()
        .get_matches_from(["centrebook", "inventory", "list", "--low"]);
    let Some(("inventory", inv_m)) = matches.subcommand() else {
        panic!("no inventory subcommand");
    };
    let Some(("list", list_m)) = inv_m.subcommand() else {
        panic!("no list subcommand");
    };
    let rows = inventory::query_rows(&conn, list_m).unwrap();
    assert_eq!(rows.len(), 2);
}

#[test]
fn add_blanks_assignee_for_stock() {
    let conn = setup();
    run(
        &conn,
        &[
            "add", "--item", "Brooms", "--quantity", "6", "--centre", "Lucknow",
            "--assigned-to", "Nobody",
        ],
    )
    .unwrap();
    let assigned: Option<String> = conn
        .query_row(
            "SELECT assigned_to FROM inventory WHERE item_name='Brooms'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert!(assigned.is_none());
}
