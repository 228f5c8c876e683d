// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use centrebook::{cli, commands::importer, db};
use rusqlite::Connection;
use std::io::Write;
use tempfile::NamedTempFile;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn import(conn: &mut Connection, csv: &str) -> anyhow::Result<()> {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(csv.as_bytes()).unwrap();
    let path = tmp.path().to_str().unwrap().to_string();
    let matches = cli::build_cli().get_matches_from([
        "centrebook", "import", "expenses", "--path", &path,
    ]);
    let Some(("import", imp_m)) = matches.subcommand() else {
        panic!("no import subcommand");
    };
    importer::handle(conn, imp_m)
}

#[test]
fn import_inserts_rows_and_creates_categories() {
    let mut conn = setup();
    import(
        &mut conn,
        "date,item,amount,category,centre,payment_method,created_by,note\n\
         2025-08-01,Milk,40,Kitchen,Lucknow,cash,a@x.in,\n\
         2025-08-02,Rent,12000,Admin,Lucknow,upi,admin@x.in,August\n",
    )
    .unwrap();

    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM expenses", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 2);
    let cats: i64 = conn
        .query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))
        .unwrap();
    assert_eq!(cats, 2);
    let note: Option<String> = conn
        .query_row(
            "SELECT note FROM expenses WHERE item='Rent'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(note.as_deref(), Some("August"));
}

#[test]
fn import_applies_rules_when_category_blank() {
    let mut conn = setup();
    conn.execute("INSERT INTO categories(name) VALUES('Kitchen')", [])
        .unwrap();
    conn.execute(
        "INSERT INTO rules(pattern, category_id) VALUES('(?i)milk|tea', 1)",
        [],
    )
    .unwrap();
    import(
        &mut conn,
        "date,item,amount,category,centre,payment_method,created_by,note\n\
         2025-08-01,Milk,40,,Lucknow,cash,a@x.in,\n",
    )
    .unwrap();

    let cat: Option<i64> = conn
        .query_row("SELECT category_id FROM expenses WHERE item='Milk'", [], |r| {
            r.get(0)
        })
        .unwrap();
    assert_eq!(cat, Some(1));
}

#[test]
fn import_rolls_back_entirely_on_bad_row() {
    let mut conn = setup();
    let err = import(
        &mut conn,
        "date,item,amount,category,centre,payment_method,created_by,note\n\
         2025-08-01,Milk,40,Kitchen,Lucknow,cash,a@x.in,\n\
         2025-08-02,Gas,not-a-number,Kitchen,Lucknow,cash,a@x.in,\n",
    )
    .unwrap_err();
    assert!(err.to_string().contains("Invalid amount"));

    let n: i64 = conn
        .query_row("SELECT COUNT(*) FROM expenses", [], |r| r.get(0))
        .unwrap();
    assert_eq!(n, 0);
}
