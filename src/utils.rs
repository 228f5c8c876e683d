// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use regex::Regex;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use crate::rollup::RollupOptions;

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<String> {
    chrono::NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok(s.to_string())
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Reference instant for analytics: midnight of `--as-of` when given,
/// otherwise the current UTC time. The engine itself never reads a clock.
pub fn parse_reference(as_of: Option<&str>) -> Result<chrono::NaiveDateTime> {
    match as_of {
        Some(s) => Ok(parse_date(s)?.and_time(chrono::NaiveTime::MIN)),
        None => Ok(chrono::Utc::now().naive_utc()),
    }
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("\u{20b9}{}", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn id_for_category(conn: &Connection, name: &str) -> Result<i64> {
    let mut stmt = conn.prepare("SELECT id FROM categories WHERE name=?1")?;
    let id: i64 = stmt
        .query_row(params![name], |r| r.get(0))
        .with_context(|| format!("Category '{}' not found", name))?;
    Ok(id)
}

/// Categories are an open, user-extensible set; unknown names are created on
/// first use rather than rejected.
pub fn get_or_create_category(conn: &Connection, name: &str) -> Result<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM categories WHERE name=?1",
            params![name],
            |r| r.get(0),
        )
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    conn.execute("INSERT INTO categories(name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

// Settings

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![key],
            |r| r.get(0),
        )
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

pub fn get_default_centre(conn: &Connection) -> Result<Option<String>> {
    get_setting(conn, "default_centre")
}

fn get_setting_u32(conn: &Connection, key: &str, default: u32) -> Result<u32> {
    match get_setting(conn, key)? {
        Some(s) => s
            .trim()
            .parse::<u32>()
            .with_context(|| format!("Invalid value '{}' for setting {}", s, key)),
        None => Ok(default),
    }
}

fn get_setting_decimal(conn: &Connection, key: &str, default: Decimal) -> Result<Decimal> {
    match get_setting(conn, key)? {
        Some(s) => parse_decimal(s.trim()).with_context(|| format!("Setting {}", key)),
        None => Ok(default),
    }
}

/// Thresholds live in settings; unset keys fall back to the built-in
/// defaults (low < 3, critical < 2, relative 20%).
pub fn rollup_options(conn: &Connection) -> Result<RollupOptions> {
    let defaults = RollupOptions::default();
    Ok(RollupOptions {
        low_stock_absolute: get_setting_u32(conn, "low_stock_absolute", defaults.low_stock_absolute)?,
        critical_absolute: get_setting_u32(conn, "critical_absolute", defaults.critical_absolute)?,
        low_stock_relative: get_setting_decimal(
            conn,
            "low_stock_relative",
            defaults.low_stock_relative,
        )?,
        ..defaults
    })
}

/// Match an item name against the stored rules, newest first; the first
/// matching pattern decides the category.
pub fn apply_item_rules(conn: &Connection, item: &str) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT pattern, category_id FROM rules ORDER BY id DESC")?;
    let mut cur = stmt.query([])?;
    while let Some(r) = cur.next()? {
        let pat: String = r.get(0)?;
        let cat: Option<i64> = r.get(1)?;
        if let Ok(re) = Regex::new(&pat) {
            if re.is_match(item) {
                return Ok(cat);
            }
        }
    }
    Ok(None)
}
