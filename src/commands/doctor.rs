// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = scan(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Read-only consistency scan. None of these conditions is enforced by the
/// schema; they accumulate through partial edits and are surfaced here.
pub fn scan(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Uncategorized expenses
    let mut stmt = conn.prepare(
        "SELECT id, item FROM expenses WHERE category_id IS NULL ORDER BY id",
    )?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let item: String = r.get(1)?;
        rows.push(vec!["uncategorized_expense".into(), format!("#{} {}", id, item)]);
    }

    // 2) Stock items carrying asset-only fields
    let mut stmt2 = conn.prepare(
        "SELECT id, item_name, status FROM inventory
         WHERE item_type='Stock' AND (status != 'Available' OR (assigned_to IS NOT NULL AND assigned_to != ''))
         ORDER BY id",
    )?;
    let mut cur2 = stmt2.query([])?;
    while let Some(r) = cur2.next()? {
        let id: i64 = r.get(0)?;
        let name: String = r.get(1)?;
        let status: String = r.get(2)?;
        rows.push(vec![
            "stock_with_asset_fields".into(),
            format!("#{} {} ({})", id, name, status),
        ]);
    }

    // 3) Assigned assets without an assignee, and assignees without Assigned status
    let mut stmt3 = conn.prepare(
        "SELECT id, item_name, status, IFNULL(assigned_to,'') FROM inventory
         WHERE item_type='Asset'
           AND ((status='Assigned' AND IFNULL(assigned_to,'')='')
             OR (status != 'Assigned' AND IFNULL(assigned_to,'') != ''))
         ORDER BY id",
    )?;
    let mut cur3 = stmt3.query([])?;
    while let Some(r) = cur3.next()? {
        let id: i64 = r.get(0)?;
        let name: String = r.get(1)?;
        let status: String = r.get(2)?;
        let assignee: String = r.get(3)?;
        rows.push(vec![
            "assignment_mismatch".into(),
            format!("#{} {} status={} assigned_to='{}'", id, name, status, assignee),
        ]);
    }

    // 4) Damaged counter exceeding everything ever stocked
    let mut stmt4 = conn.prepare(
        "SELECT id, item_name, quantity, damaged FROM inventory
         WHERE original_quantity IS NOT NULL AND damaged > original_quantity
         ORDER BY id",
    )?;
    let mut cur4 = stmt4.query([])?;
    while let Some(r) = cur4.next()? {
        let id: i64 = r.get(0)?;
        let name: String = r.get(1)?;
        let quantity: i64 = r.get(2)?;
        let damaged: i64 = r.get(3)?;
        rows.push(vec![
            "damaged_exceeds_baseline".into(),
            format!("#{} {} quantity={} damaged={}", id, name, quantity, damaged),
        ]);
    }

    // 5) Out-of-stock assets still marked Available
    let mut stmt5 = conn.prepare(
        "SELECT id, item_name FROM inventory
         WHERE item_type='Asset' AND quantity=0 AND status='Available'
         ORDER BY id",
    )?;
    let mut cur5 = stmt5.query([])?;
    while let Some(r) = cur5.next()? {
        let id: i64 = r.get(0)?;
        let name: String = r.get(1)?;
        rows.push(vec!["depleted_available_asset".into(), format!("#{} {}", id, name)]);
    }

    Ok(rows)
}
