// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use centrebook::{cli, commands::rules, db, utils};
use rusqlite::Connection;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn.execute("INSERT INTO categories(name) VALUES('Kitchen')", [])
        .unwrap();
    conn
}

fn run(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let mut full = vec!["centrebook", "rules"];
    full.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(full);
    let Some(("rules", rules_m)) = matches.subcommand() else {
        panic!("no rules subcommand");
    };
    rules::handle(conn, rules_m)
}

#[test]
fn newest_rule_wins() {
    let conn = setup();
    conn.execute("INSERT INTO categories(name) VALUES('Cleaning')", [])
        .unwrap();
    run(&conn, &["add", "--pattern", "(?i)soap", "--category", "Kitchen"]).unwrap();
    run(&conn, &["add", "--pattern", "(?i)soap", "--category", "Cleaning"]).unwrap();

    let cat = utils::apply_item_rules(&conn, "Soap Bars").unwrap();
    let cleaning_id: i64 = conn
        .query_row("SELECT id FROM categories WHERE name='Cleaning'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(cat, Some(cleaning_id));
}

#[test]
fn no_match_returns_none() {
    let conn = setup();
    run(&conn, &["add", "--pattern", "(?i)milk", "--category", "Kitchen"]).unwrap();
    assert_eq!(utils::apply_item_rules(&conn, "Projector").unwrap(), None);
}

#[test]
fn add_rejects_invalid_regex() {
    let conn = setup();
    let err = run(&conn, &["add", "--pattern", " (?P< ", "--category", "Kitchen"]).unwrap_err();
    assert!(err.to_string().contains("Invalid regex pattern"));
}

#[test]
fn rm_trims_id_argument() {
    let conn = setup();
    run(&conn, &["add", "--pattern", "milk", "--category", "Kitchen"]).unwrap();
    run(&conn, &["rm", "--id", " 1 "]).unwrap();
    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM rules", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}
