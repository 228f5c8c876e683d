// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("expenses", sub)) => export_expenses(conn, sub),
        _ => Ok(()),
    }
}

fn export_expenses(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let mut stmt = conn.prepare(
        "SELECT e.date, e.timestamp, e.item, c.name as category, e.centre, e.amount,
                e.payment_method, e.created_by, e.note
         FROM expenses e
         LEFT JOIN categories c ON e.category_id=c.id
         ORDER BY e.timestamp, e.id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, String>(4)?,
            r.get::<_, String>(5)?,
            r.get::<_, String>(6)?,
            r.get::<_, String>(7)?,
            r.get::<_, Option<String>>(8)?,
        ))
    })?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date", "timestamp", "item", "category", "centre", "amount",
                "payment_method", "created_by", "note",
            ])?;
            for row in rows {
                let (d, ts, item, cat, centre, amt, method, by, note) = row?;
                wtr.write_record([
                    d,
                    ts,
                    item,
                    cat.unwrap_or_default(),
                    centre,
                    amt,
                    method,
                    by,
                    note.unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let mut items = Vec::new();
            for row in rows {
                let (d, ts, item, cat, centre, amt, method, by, note) = row?;
                items.push(json!({
                    "date": d, "timestamp": ts, "item": item, "category": cat,
                    "centre": centre, "amount": amt, "payment_method": method,
                    "created_by": by, "note": note
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => {
            eprintln!("Unknown format: {} (use csv|json)", fmt);
        }
    }
    println!("Exported expenses to {}", out);
    Ok(())
}
