// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{
    Attachment, ExpenseRecord, InventoryRecord,
};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::Connection;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("in.centrebook", "Centrebook", "centrebook"));

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("centrebook.sqlite"))
}

pub fn open_or_init() -> Result<Connection> {
    let path = db_path()?;
    let mut conn =
        Connection::open(&path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&mut conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &mut Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    );

    -- Suggested items per category; users extend this set at runtime.
    CREATE TABLE IF NOT EXISTS category_items(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        category_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        UNIQUE(category_id, name),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS expenses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        date TEXT NOT NULL,
        timestamp TEXT NOT NULL,
        item TEXT NOT NULL,
        category_id INTEGER,
        centre TEXT NOT NULL,
        amount TEXT NOT NULL,
        payment_method TEXT NOT NULL CHECK(payment_method IN ('cash','upi','card')),
        created_by TEXT NOT NULL,
        note TEXT,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_expenses_timestamp ON expenses(timestamp);
    CREATE INDEX IF NOT EXISTS idx_expenses_centre ON expenses(centre);

    CREATE TABLE IF NOT EXISTS expense_attachments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        expense_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        url TEXT NOT NULL,
        size INTEGER NOT NULL DEFAULT 0,
        mime TEXT NOT NULL DEFAULT '',
        FOREIGN KEY(expense_id) REFERENCES expenses(id) ON DELETE CASCADE
    );

    CREATE TABLE IF NOT EXISTS inventory(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_name TEXT NOT NULL,
        category_id INTEGER,
        centre TEXT NOT NULL,
        quantity INTEGER NOT NULL DEFAULT 0,
        original_quantity INTEGER,
        damaged INTEGER NOT NULL DEFAULT 0,
        repaired INTEGER NOT NULL DEFAULT 0,
        item_type TEXT NOT NULL CHECK(item_type IN ('Stock','Asset')),
        status TEXT NOT NULL DEFAULT 'Available',
        assigned_to TEXT,
        last_updated TEXT NOT NULL,
        last_used TEXT,
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    CREATE INDEX IF NOT EXISTS idx_inventory_centre ON inventory(centre);

    CREATE TABLE IF NOT EXISTS inventory_attachments(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        inventory_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        url TEXT NOT NULL,
        size INTEGER NOT NULL DEFAULT 0,
        mime TEXT NOT NULL DEFAULT '',
        FOREIGN KEY(inventory_id) REFERENCES inventory(id) ON DELETE CASCADE
    );

    -- Item-name patterns that auto-assign a category on add/import.
    CREATE TABLE IF NOT EXISTS rules(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        pattern TEXT NOT NULL,
        category_id INTEGER,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        FOREIGN KEY(category_id) REFERENCES categories(id) ON DELETE SET NULL
    );
    "#,
    )?;
    Ok(())
}

const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S";

pub fn parse_timestamp(s: &str) -> Result<chrono::NaiveDateTime> {
    chrono::NaiveDateTime::parse_from_str(s, TIMESTAMP_FMT)
        .with_context(|| format!("Invalid timestamp '{}'", s))
}

pub fn format_timestamp(t: chrono::NaiveDateTime) -> String {
    t.format(TIMESTAMP_FMT).to_string()
}

/// Materialize the full expense snapshot, category names resolved and
/// attachment references joined in. The rollup engine consumes this as-is.
pub fn load_expenses(conn: &Connection) -> Result<Vec<ExpenseRecord>> {
    let mut attachments: HashMap<i64, Vec<Attachment>> = HashMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT expense_id, name, url, size, mime FROM expense_attachments ORDER BY id",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(r) = rows.next()? {
            let expense_id: i64 = r.get(0)?;
            attachments.entry(expense_id).or_default().push(Attachment {
                name: r.get(1)?,
                url: r.get(2)?,
                size: r.get::<_, i64>(3)? as u64,
                mime: r.get(4)?,
            });
        }
    }

    let mut stmt = conn.prepare(
        "SELECT e.id, e.date, e.timestamp, e.item, c.name, e.centre, e.amount,
                e.payment_method, e.created_by, e.note
         FROM expenses e LEFT JOIN categories c ON e.category_id=c.id",
    )?;
    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let date_s: String = r.get(1)?;
        let ts_s: String = r.get(2)?;
        let amount_s: String = r.get(6)?;
        let method_s: String = r.get(7)?;
        let category: Option<String> = r.get(4)?;
        data.push(ExpenseRecord {
            id,
            date: chrono::NaiveDate::parse_from_str(&date_s, "%Y-%m-%d")
                .with_context(|| format!("Invalid date '{}' for expense {}", date_s, id))?,
            timestamp: parse_timestamp(&ts_s)
                .with_context(|| format!("Expense {}", id))?,
            item: r.get(3)?,
            category: category.unwrap_or_default(),
            centre: r.get(5)?,
            amount: amount_s
                .parse()
                .with_context(|| format!("Invalid amount '{}' for expense {}", amount_s, id))?,
            payment_method: method_s
                .parse()
                .with_context(|| format!("Expense {}", id))?,
            created_by: r.get(8)?,
            note: r.get(9)?,
            attachments: attachments.remove(&id).unwrap_or_default(),
        });
    }
    Ok(data)
}

/// Materialize the full inventory snapshot.
pub fn load_inventory(conn: &Connection) -> Result<Vec<InventoryRecord>> {
    let mut stmt = conn.prepare(
        "SELECT i.id, i.item_name, c.name, i.centre, i.quantity, i.original_quantity,
                i.damaged, i.repaired, i.item_type, i.status, i.assigned_to,
                i.last_updated, i.last_used
         FROM inventory i LEFT JOIN categories c ON i.category_id=c.id",
    )?;
    let mut rows = stmt.query([])?;
    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let id: i64 = r.get(0)?;
        let category: Option<String> = r.get(2)?;
        let type_s: String = r.get(8)?;
        let status_s: String = r.get(9)?;
        let updated_s: String = r.get(11)?;
        let used_s: Option<String> = r.get(12)?;
        data.push(InventoryRecord {
            id,
            item_name: r.get(1)?,
            category: category.unwrap_or_default(),
            centre: r.get(3)?,
            quantity: r.get::<_, i64>(4)?.max(0) as u32,
            original_quantity: r.get::<_, Option<i64>>(5)?.map(|q| q.max(0) as u32),
            damaged: r.get::<_, i64>(6)?.max(0) as u32,
            repaired: r.get::<_, i64>(7)?.max(0) as u32,
            item_type: type_s
                .parse()
                .with_context(|| format!("Inventory item {}", id))?,
            status: status_s
                .parse()
                .with_context(|| format!("Inventory item {}", id))?,
            assigned_to: r.get::<_, Option<String>>(10)?.filter(|s| !s.is_empty()),
            last_updated: parse_timestamp(&updated_s)
                .with_context(|| format!("Inventory item {}", id))?,
            last_used: used_s.map(|s| parse_timestamp(&s)).transpose()?,
        });
    }
    Ok(data)
}
