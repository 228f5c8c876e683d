// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::format_timestamp;
use crate::models::PaymentMethod;
use crate::utils::{
    apply_item_rules, fmt_money, get_default_centre, get_or_create_category, get_setting,
    maybe_print_json, parse_date, parse_decimal, parse_month, pretty_table,
};
use anyhow::{anyhow, ensure, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("update", sub)) => update(conn, sub)?,
        Some(("rm", sub)) => rm(conn, sub)?,
        Some(("attach", sub)) => attach(conn, sub)?,
        Some(("last", sub)) => last(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn resolve_centre(conn: &Connection, sub: &clap::ArgMatches) -> Result<String> {
    if let Some(c) = sub.get_one::<String>("centre") {
        return Ok(c.trim().to_string());
    }
    get_default_centre(conn)?
        .ok_or_else(|| anyhow!("No --centre given and no default_centre configured"))
}

fn resolve_author(conn: &Connection, sub: &clap::ArgMatches) -> Result<String> {
    if let Some(by) = sub.get_one::<String>("by") {
        return Ok(by.trim().to_string());
    }
    get_setting(conn, "created_by")?
        .ok_or_else(|| anyhow!("No --by given and no created_by configured"))
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let item = sub.get_one::<String>("item").unwrap().trim().to_string();
    let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
    ensure!(amount >= rust_decimal::Decimal::ZERO, "Amount must be non-negative");

    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => chrono::Utc::now().date_naive(),
    };
    let centre = resolve_centre(conn, sub)?;
    let created_by = resolve_author(conn, sub)?;
    let method: PaymentMethod = sub
        .get_one::<String>("payment")
        .map(|s| s.parse())
        .transpose()?
        .unwrap_or(PaymentMethod::Cash);
    let note = sub.get_one::<String>("note").map(|s| s.to_string());

    let category_id = match sub.get_one::<String>("category") {
        Some(cat) => Some(get_or_create_category(conn, cat.trim())?),
        None => apply_item_rules(conn, &item)?,
    };

    let now = chrono::Utc::now().naive_utc();
    conn.execute(
        "INSERT INTO expenses(date, timestamp, item, category_id, centre, amount, payment_method, created_by, note)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            date.to_string(),
            format_timestamp(now),
            item,
            category_id,
            centre,
            amount.to_string(),
            method.to_string(),
            created_by,
            note
        ],
    )?;
    println!(
        "Recorded {} for '{}' at {} ({})",
        fmt_money(&amount),
        item,
        centre,
        method
    );
    Ok(())
}

#[derive(Serialize)]
pub struct ExpenseRow {
    pub id: i64,
    pub date: String,
    pub timestamp: String,
    pub item: String,
    pub category: String,
    pub centre: String,
    pub amount: String,
    pub payment_method: String,
    pub created_by: String,
    pub note: String,
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<ExpenseRow>> {
    let mut sql = String::from(
        "SELECT e.id, e.date, e.timestamp, e.item, c.name, e.centre, e.amount,
                e.payment_method, e.created_by, e.note
         FROM expenses e LEFT JOIN categories c ON e.category_id=c.id WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(month) = sub.get_one::<String>("month") {
        let month = parse_month(month.trim())?;
        sql.push_str(" AND substr(e.timestamp,1,7)=?");
        params_vec.push(month);
    }
    if let Some(centre) = sub.get_one::<String>("centre") {
        sql.push_str(" AND e.centre=?");
        params_vec.push(centre.into());
    }
    if let Some(cat) = sub.get_one::<String>("category") {
        sql.push_str(" AND c.name=?");
        params_vec.push(cat.into());
    }
    if let Some(user) = sub.get_one::<String>("user") {
        sql.push_str(" AND e.created_by=?");
        params_vec.push(user.into());
    }
    sql.push_str(" ORDER BY e.timestamp DESC, e.id DESC");
    if let Some(limit) = sub.get_one::<usize>("limit") {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let mut rows = stmt.query(rusqlite::params_from_iter(params))?;

    let mut data = Vec::new();
    while let Some(r) = rows.next()? {
        let category: Option<String> = r.get(4)?;
        let note: Option<String> = r.get(9)?;
        data.push(ExpenseRow {
            id: r.get(0)?,
            date: r.get(1)?,
            timestamp: r.get(2)?,
            item: r.get(3)?,
            category: category.unwrap_or_default(),
            centre: r.get(5)?,
            amount: r.get(6)?,
            payment_method: r.get(7)?,
            created_by: r.get(8)?,
            note: note.unwrap_or_default(),
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
                    r.date.clone(),
                    r.item.clone(),
                    r.category.clone(),
                    r.centre.clone(),
                    r.amount.clone(),
                    r.payment_method.clone(),
                    r.created_by.clone(),
                    r.note.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Id", "Date", "Item", "Category", "Centre", "Amount", "Payment", "By", "Note"],
                rows,
            )
        );
    }
    Ok(())
}

/// Partial-field edit. The timestamp refreshes on every update, same as the
/// add path; `date` only changes when explicitly given.
fn update(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let exists: Option<i64> = conn
        .query_row("SELECT id FROM expenses WHERE id=?1", params![id], |r| {
            r.get(0)
        })
        .optional()?;
    ensure!(exists.is_some(), "Expense {} not found", id);

    let mut sets: Vec<String> = Vec::new();
    let mut vals: Vec<String> = Vec::new();

    if let Some(s) = sub.get_one::<String>("date") {
        sets.push("date=?".into());
        vals.push(parse_date(s)?.to_string());
    }
    if let Some(s) = sub.get_one::<String>("item") {
        sets.push("item=?".into());
        vals.push(s.trim().to_string());
    }
    if let Some(s) = sub.get_one::<String>("amount") {
        let amount = parse_decimal(s)?;
        ensure!(amount >= rust_decimal::Decimal::ZERO, "Amount must be non-negative");
        sets.push("amount=?".into());
        vals.push(amount.to_string());
    }
    if let Some(s) = sub.get_one::<String>("category") {
        let cat_id = get_or_create_category(conn, s.trim())?;
        sets.push("category_id=?".into());
        vals.push(cat_id.to_string());
    }
    if let Some(s) = sub.get_one::<String>("centre") {
        sets.push("centre=?".into());
        vals.push(s.trim().to_string());
    }
    if let Some(s) = sub.get_one::<String>("payment") {
        let method: PaymentMethod = s.parse()?;
        sets.push("payment_method=?".into());
        vals.push(method.to_string());
    }
    if let Some(s) = sub.get_one::<String>("note") {
        sets.push("note=?".into());
        vals.push(s.to_string());
    }
    ensure!(!sets.is_empty(), "Nothing to update for expense {}", id);

    sets.push("timestamp=?".into());
    vals.push(format_timestamp(chrono::Utc::now().naive_utc()));

    let sql = format!("UPDATE expenses SET {} WHERE id=?", sets.join(", "));
    vals.push(id.to_string());
    let params: Vec<&dyn rusqlite::ToSql> =
        vals.iter().map(|s| s as &dyn rusqlite::ToSql).collect();
    conn.execute(&sql, rusqlite::params_from_iter(params))?;
    println!("Updated expense {}", id);
    Ok(())
}

fn rm(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let n = conn.execute("DELETE FROM expenses WHERE id=?1", params![id])?;
    ensure!(n > 0, "Expense {} not found", id);
    println!("Removed expense {}", id);
    Ok(())
}

fn attach(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id: i64 = *sub.get_one::<i64>("id").unwrap();
    let name = sub.get_one::<String>("name").unwrap();
    let url = sub.get_one::<String>("url").unwrap();
    let size: i64 = sub.get_one::<u64>("size").copied().unwrap_or(0) as i64;
    let mime = sub.get_one::<String>("mime").map(|s| s.as_str()).unwrap_or("");

    let exists: Option<i64> = conn
        .query_row("SELECT id FROM expenses WHERE id=?1", params![id], |r| {
            r.get(0)
        })
        .optional()?;
    ensure!(exists.is_some(), "Expense {} not found", id);

    conn.execute(
        "INSERT INTO expense_attachments(expense_id, name, url, size, mime)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, name, url, size, mime],
    )?;
    println!("Attached '{}' to expense {}", name, id);
    Ok(())
}

fn last(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let mut sql = String::from(
        "SELECT e.id, e.date, e.item, c.name, e.centre, e.amount, e.payment_method, e.note
         FROM expenses e LEFT JOIN categories c ON e.category_id=c.id",
    );
    let centre = sub.get_one::<String>("centre");
    if centre.is_some() {
        sql.push_str(" WHERE e.centre=?1");
    }
    sql.push_str(" ORDER BY e.timestamp DESC, e.id DESC LIMIT 1");

    let mut stmt = conn.prepare(&sql)?;
    let map = |r: &rusqlite::Row<'_>| -> rusqlite::Result<(i64, String, String, Option<String>, String, String, String, Option<String>)> {
        Ok((
            r.get(0)?,
            r.get(1)?,
            r.get(2)?,
            r.get(3)?,
            r.get(4)?,
            r.get(5)?,
            r.get(6)?,
            r.get(7)?,
        ))
    };
    let row = if let Some(c) = centre {
        stmt.query_row(params![c], map).optional()?
    } else {
        stmt.query_row([], map).optional()?
    };

    match row {
        Some((id, date, item, category, centre, amount, method, note)) => {
            let amount = amount
                .parse::<rust_decimal::Decimal>()
                .with_context(|| format!("Invalid amount for expense {}", id))?;
            println!(
                "Last entry #{}: {} '{}' [{}] at {} on {} via {}{}",
                id,
                fmt_money(&amount),
                item,
                category.unwrap_or_default(),
                centre,
                date,
                method,
                note.map(|n| format!(" ({})", n)).unwrap_or_default()
            );
        }
        None => println!("No expenses recorded yet"),
    }
    Ok(())
}
