// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use centrebook::{commands::doctor, db};
use rusqlite::Connection;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

#[test]
fn clean_database_reports_nothing() {
    let conn = setup();
    assert!(doctor::scan(&conn).unwrap().is_empty());
}

#[test]
fn flags_uncategorized_expenses() {
    let conn = setup();
    conn.execute(
        "INSERT INTO expenses(date, timestamp, item, centre, amount, payment_method, created_by)
         VALUES ('2025-08-01', '2025-08-01 09:00:00', 'Mystery', 'Lucknow', '10', 'cash', 'a@x.in')",
        [],
    )
    .unwrap();
    let rows = doctor::scan(&conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "uncategorized_expense");
}

#[test]
fn flags_stock_with_asset_fields_and_assignment_mismatches() {
    let conn = setup();
    conn.execute(
        "INSERT INTO inventory(item_name, centre, quantity, item_type, status, assigned_to, last_updated)
         VALUES ('Brooms', 'Lucknow', 5, 'Stock', 'Assigned', 'Priya', '2025-08-01 09:00:00')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO inventory(item_name, centre, quantity, item_type, status, last_updated)
         VALUES ('Projector', 'Lucknow', 1, 'Asset', 'Assigned', '2025-08-01 09:00:00')",
        [],
    )
    .unwrap();
    let rows = doctor::scan(&conn).unwrap();
    let issues: Vec<&str> = rows.iter().map(|r| r[0].as_str()).collect();
    assert!(issues.contains(&"stock_with_asset_fields"));
    assert!(issues.contains(&"assignment_mismatch"));
}

#[test]
fn flags_damaged_counters_above_baseline() {
    let conn = setup();
    conn.execute(
        "INSERT INTO inventory(item_name, centre, quantity, original_quantity, damaged, item_type, status, last_updated)
         VALUES ('Chairs', 'Lucknow', 2, 10, 12, 'Stock', 'Available', '2025-08-01 09:00:00')",
        [],
    )
    .unwrap();
    let rows = doctor::scan(&conn).unwrap();
    assert!(rows.iter().any(|r| r[0] == "damaged_exceeds_baseline"));
}

#[test]
fn flags_depleted_assets_still_available() {
    let conn = setup();
    conn.execute(
        "INSERT INTO inventory(item_name, centre, quantity, item_type, status, last_updated)
         VALUES ('Laptop', 'Lucknow', 0, 'Asset', 'Available', '2025-08-01 09:00:00')",
        [],
    )
    .unwrap();
    let rows = doctor::scan(&conn).unwrap();
    assert!(rows.iter().any(|r| r[0] == "depleted_available_asset"));
}
