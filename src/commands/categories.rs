// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{get_or_create_category, id_for_category, pretty_table};
use anyhow::Result;
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            get_or_create_category(conn, name)?;
            println!("Added category '{}'", name);
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare(
                "SELECT c.name, COUNT(ci.id) FROM categories c
                 LEFT JOIN category_items ci ON ci.category_id=c.id
                 GROUP BY c.id ORDER BY c.name",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (name, items) = row?;
                data.push(vec![name, items.to_string()]);
            }
            println!("{}", pretty_table(&["Category", "Items"], data));
        }
        Some(("rm", sub)) => {
            let name = sub.get_one::<String>("name").unwrap().trim();
            conn.execute("DELETE FROM categories WHERE name=?1", params![name])?;
            println!("Removed category '{}'", name);
        }
        Some(("add-item", sub)) => {
            let category = sub.get_one::<String>("category").unwrap().trim();
            let name = sub.get_one::<String>("name").unwrap().trim();
            let cat_id = get_or_create_category(conn, category)?;
            conn.execute(
                "INSERT OR IGNORE INTO category_items(category_id, name) VALUES (?1, ?2)",
                params![cat_id, name],
            )?;
            println!("Added '{}' to {}", name, category);
        }
        Some(("items", sub)) => {
            let category = sub.get_one::<String>("category").unwrap().trim();
            let cat_id = id_for_category(conn, category)?;
            let mut stmt = conn
                .prepare("SELECT name FROM category_items WHERE category_id=?1 ORDER BY name")?;
            let rows = stmt.query_map(params![cat_id], |r| r.get::<_, String>(0))?;
            let mut data = Vec::new();
            for row in rows {
                data.push(vec![row?]);
            }
            println!("{}", pretty_table(&["Item"], data));
        }
        _ => {}
    }
    Ok(())
}

/// Default categories and suggested items, created by `init` when the
/// categories table is empty. Users extend both sets at runtime.
pub const DEFAULT_CATEGORIES: &[(&str, &[&str])] = &[
    (
        "Therapy Materials",
        &["Flashcards", "Sensory Toys", "Puzzles", "Art Supplies", "Books", "Therapy Tools"],
    ),
    (
        "Admin",
        &["Rent", "Electricity", "Internet", "Stationary", "Printing", "Phone Bill", "Maintenance"],
    ),
    (
        "Kitchen",
        &["Milk", "Tea", "Biscuits", "Gas", "Water", "Groceries", "Vegetables", "Fruits", "Rice", "Dal"],
    ),
    (
        "Cleaning",
        &["Detergent", "Mops", "Sanitizer", "Brooms", "Soap", "Floor Cleaner", "Toilet Cleaner"],
    ),
    (
        "Staff Welfare",
        &["Snacks", "Gifts", "First Aid", "Refreshments", "Lunch", "Transport Allowance"],
    ),
    (
        "Furniture/Equipment",
        &["Chair", "Table", "AC", "Fan", "Computer", "Printer", "Projector", "Whiteboard"],
    ),
    (
        "Transport/Misc",
        &["Auto Fare", "Cake", "Balloons", "Decoration", "Birthday Party", "Event Supplies"],
    ),
];

pub fn seed_defaults(conn: &Connection) -> Result<()> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    if existing > 0 {
        return Ok(());
    }
    for (category, items) in DEFAULT_CATEGORIES {
        let cat_id = get_or_create_category(conn, category)?;
        for item in *items {
            conn.execute(
                "INSERT OR IGNORE INTO category_items(category_id, name) VALUES (?1, ?2)",
                params![cat_id, item],
            )?;
        }
    }
    Ok(())
}
