// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::format_timestamp;
use crate::models::{AssetStatus, ItemType};
use crate::utils::{
    get_default_centre, get_or_create_category, maybe_print_json, pretty_table, rollup_options,
};
use anyhow::{anyhow, ensure, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("use", sub)) => use_stock(conn, sub)?,
        Some(("damage", sub)) => damage(conn, sub)?,
        Some(("repair", sub)) => repair(conn, sub)?,
        Some(("set-quantity", sub)) => set_quantity(conn, sub)?,
        Some(("assign", sub)) => assign(conn, sub)?,
        Some(("set-status", sub)) => set_status(conn, sub)?,
        Some(("attach", sub)) => attach(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn now_s() -> String {
    format_timestamp(chrono::Utc::now().naive_utc())
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let item = sub.get_one::<String>("item").unwrap().trim().to_string();
    let quantity: u32 = *sub.get_one::<u32>("quantity").unwrap();
    let item_type: ItemType = sub
        .get_one::<String>("type")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(ItemType::Stock);
    let status: AssetStatus = sub
        .get_one::<String>("status")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(AssetStatus::Available);
    let centre = match sub.get_one::<String>("centre") {
        Some(c) => c.trim().to_string(),
        None => get_default_centre(conn)?
            .ok_or_else(|| anyhow!("No --centre given and no default_centre configured"))?,
    };
    let category_id = sub
        .get_one::<String>("category")
        .map(|c| get_or_create_category(conn, c.trim()))
        .transpose()?;
    let original_quantity = sub.get_one::<u32>("original-quantity").copied();
    // Assignee carries no meaning for stock; keep it empty there.
    let assigned_to = match item_type {
        ItemType::Asset => sub.get_one::<String>("assigned-to").map(|s| s.trim().to_string()),
        ItemType::Stock => None,
    };

    conn.execute(
        "INSERT INTO inventory(item_name, category_id, centre, quantity, original_quantity,
                               item_type, status, assigned_to, last_updated)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            item,
            category_id,
            centre,
            quantity,
            original_quantity,
            item_type.to_string(),
            status.to_string(),
            assigned_to,
            now_s()
        ],
    )?;
    println!("Added {} '{}' x{} at {}", item_type, item, quantity, centre);
    Ok(())
}

#[derive(Serialize)]
pub struct InventoryRow {
    pub id: i64,
    pub item_name: String,
    pub category: String,
    pub centre: String,
    pub quantity: i64,
    pub damaged: i64,
    pub item_type: String,
    pub status: String,
    pub assigned_to: String,
    pub last_updated: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<InventoryRow>> {
    let mut sql = String::from(
        "SELECT i.id, i.item_name, c.name, i.centre, i.quantity, i.damaged,
                i.item_type, i.status, i.assigned_to, i.last_updated
         FROM inventory i LEFT JOIN categories c ON i.category_id=c.id WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(centre) = sub.get_one::<String>("centre") {
        sql.push_str(" AND i.centre=?");
        params_vec.push(centre.into());
    }
    if let Some(search) = sub.get_one::<String>("search") {
        sql.push_str(" AND i.item_name LIKE '%' || ? || '%'");
        params_vec.push(search.into());
    }
    if sub.get_flag("low") {
        let threshold = rollup_options(conn)?.low_stock_absolute;
        sql.push_str(" AND i.quantity < ?");
        params_vec.push(threshold.to_string());
    }
    sql.push_str(" ORDER BY i.item_name");

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let category: Option<String> = r.get(2)?;
        let assigned: Option<String> = r.get(8)?;
        data.push(InventoryRow {
            id: r.get(0)?,
            item_name: r.get(1)?,
            category: category.unwrap_or_default(),
            centre: r.get(3)?,
            quantity: r.get(4)?,
            damaged: r.get(5)?,
            item_type: r.get(6)?,
            status: r.get(7)?,
            assigned_to: assigned.unwrap_or_default(),
            last_updated: r.get(9)?,
        });
    }
    Ok(data)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.item_name.clone(),
                    r.quantity.to_string(),
                    r.damaged.to_string(),
                    r.item_type.clone(),
                    r.status.clone(),
                    r.assigned_to.clone(),
                    r.centre.clone(),
                    r.category.clone(),
                    r.last_updated.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Name", "Qty", "Damaged", "Type", "Status", "Assigned To", "Centre", "Category", "Last Updated"],
                rows,
            )
        );
    }
    Ok(())
}

fn fetch_counts(conn: &Connection, id: i64) -> Result<(u32, u32, u32, ItemType)> {
    let row: Option<(i64, i64, i64, String)> = conn
        .query_row(
            "SELECT quantity, damaged, repaired, item_type FROM inventory WHERE id=?1",
            params![id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?)),
        )
        .optional()?;
    let (q, d, rep, t) = row.ok_or_else(|| anyhow!("Inventory item {} not found", id))?;
    Ok((q.max(0) as u32, d.max(0) as u32, rep.max(0) as u32, t.parse()?))
}

fn count_arg(sub: &clap::ArgMatches) -> u32 {
    sub.get_one::<u32>("count").copied().unwrap_or(1)
}

fn use_stock(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let count = count_arg(sub);
    let (quantity, _, _, _) = fetch_counts(conn, id)?;
    let remaining = quantity.saturating_sub(count);
    let now = now_s();
    conn.execute(
        "UPDATE inventory SET quantity=?1, last_used=?2, last_updated=?2 WHERE id=?3",
        params![remaining, now, id],
    )?;
    println!("Used {} of item {}; {} remaining", count, id, remaining);
    Ok(())
}

fn damage(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let count = count_arg(sub);
    let (quantity, damaged, _, _) = fetch_counts(conn, id)?;
    let remaining = quantity.saturating_sub(count);
    conn.execute(
        "UPDATE inventory SET quantity=?1, damaged=?2, last_updated=?3 WHERE id=?4",
        params![remaining, damaged + count, now_s(), id],
    )?;
    println!(
        "Marked {} of item {} damaged; {} remaining, {} damaged",
        count,
        id,
        remaining,
        damaged + count
    );
    Ok(())
}

/// Repairs decrement the damaged counter by the same amount, floored at
/// zero; the repaired counter keeps the full tally.
fn repair(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let count = count_arg(sub);
    let (_, damaged, repaired, _) = fetch_counts(conn, id)?;
    let damaged_left = damaged.saturating_sub(count);
    conn.execute(
        "UPDATE inventory SET damaged=?1, repaired=?2, last_updated=?3 WHERE id=?4",
        params![damaged_left, repaired + count, now_s(), id],
    )?;
    println!(
        "Repaired {} of item {}; {} still damaged",
        count, id, damaged_left
    );
    Ok(())
}

fn set_quantity(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let quantity: u32 = *sub.get_one::<u32>("quantity").unwrap();
    fetch_counts(conn, id)?;
    conn.execute(
        "UPDATE inventory SET quantity=?1, last_updated=?2 WHERE id=?3",
        params![quantity, now_s(), id],
    )?;
    println!("Item {} quantity set to {}", id, quantity);
    Ok(())
}

fn assign(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let to = sub.get_one::<String>("to").unwrap().trim().to_string();
    ensure!(!to.is_empty(), "Assignee name must not be empty");
    let (_, _, _, item_type) = fetch_counts(conn, id)?;
    ensure!(
        item_type == ItemType::Asset,
        "Item {} is stock; only assets can be assigned",
        id
    );
    conn.execute(
        "UPDATE inventory SET assigned_to=?1, status=?2, last_updated=?3 WHERE id=?4",
        params![to, AssetStatus::Assigned.to_string(), now_s(), id],
    )?;
    println!("Assigned item {} to {}", id, to);
    Ok(())
}

fn set_status(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let status: AssetStatus = sub.get_one::<String>("status").unwrap().parse()?;
    fetch_counts(conn, id)?;
    conn.execute(
        "UPDATE inventory SET status=?1, last_updated=?2 WHERE id=?3",
        params![status.to_string(), now_s(), id],
    )?;
    println!("Item {} status set to {}", id, status);
    Ok(())
}

fn attach(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let name = sub.get_one::<String>("name").unwrap();
    let url = sub.get_one::<String>("url").unwrap();
    let size: i64 = sub.get_one::<u64>("size").copied().unwrap_or(0) as i64;
    let mime = sub.get_one::<String>("mime").map(|s| s.as_str()).unwrap_or("");
    fetch_counts(conn, id)?;
    conn.execute(
        "INSERT INTO inventory_attachments(inventory_id, name, url, size, mime)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, name, url, size, mime],
    )?;
    println!("Attached '{}' to item {}", name, id);
    Ok(())
}
