// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::format_timestamp;
use crate::models::PaymentMethod;
use crate::utils::{apply_item_rules, get_or_create_category, parse_date, parse_decimal};
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use rusqlite::{params, Connection};
use std::collections::{hash_map::Entry, HashMap};

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("expenses", sub)) => import_expenses(conn, sub),
        _ => Ok(()),
    }
}

/// Columns: date, item, amount, category, centre, payment_method,
/// created_by, note. Category may be blank; rules decide then.
fn import_expenses(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let path = sub.get_one::<String>("path").unwrap().trim();
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path))?;

    let tx = conn.transaction()?;
    let mut category_cache: HashMap<String, i64> = HashMap::new();
    let now = format_timestamp(chrono::Utc::now().naive_utc());
    let mut imported = 0usize;

    for result in rdr.records() {
        let rec = result?;
        let date_raw = rec.get(0).context("date missing")?.trim().to_string();
        let item = rec.get(1).context("item missing")?.trim().to_string();
        let amount_raw = rec.get(2).context("amount missing")?.trim().to_string();
        let category = rec.get(3).unwrap_or("").trim().to_string();
        let centre = rec.get(4).context("centre missing")?.trim().to_string();
        let method_raw = rec.get(5).unwrap_or("cash").trim();
        let created_by = rec.get(6).context("created_by missing")?.trim().to_string();
        let note = rec
            .get(7)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string());

        let date = parse_date(&date_raw)
            .with_context(|| format!("Invalid expense date '{}'", date_raw))?;
        let amount = parse_decimal(&amount_raw)
            .with_context(|| format!("Invalid amount '{}' for {}", amount_raw, item))?;
        anyhow::ensure!(
            amount >= rust_decimal::Decimal::ZERO,
            "Negative amount '{}' for {}",
            amount_raw,
            item
        );
        let method: PaymentMethod = if method_raw.is_empty() {
            PaymentMethod::Cash
        } else {
            method_raw.parse()?
        };

        let cat_id = if category.is_empty() {
            apply_item_rules(&tx, &item)?
        } else {
            let id = match category_cache.entry(category.clone()) {
                Entry::Occupied(entry) => *entry.get(),
                Entry::Vacant(entry) => {
                    let fetched = get_or_create_category(&tx, &category)?;
                    *entry.insert(fetched)
                }
            };
            Some(id)
        };

        tx.execute(
            "INSERT INTO expenses(date, timestamp, item, category_id, centre, amount, payment_method, created_by, note) \
             VALUES (?1,?2,?3,?4,?5,?6,?7,?8,?9)",
            params![
                date.to_string(),
                now,
                item,
                cat_id,
                centre,
                amount.to_string(),
                method.to_string(),
                created_by,
                note.as_deref()
            ],
        )?;
        imported += 1;
    }
    tx.commit()?;
    println!("Imported {} expenses from {}", imported, path);
    Ok(())
}
