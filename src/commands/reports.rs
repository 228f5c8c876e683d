// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::load_expenses;
use crate::models::ExpenseRecord;
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::{bail, Result};
use chrono::NaiveTime;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balance-sheet", sub)) => balance_sheet(conn, sub),
        _ => Ok(()),
    }
}

#[derive(Serialize)]
struct RangeSummary {
    total_amount: Decimal,
    total_items: usize,
    from: String,
    to: String,
}

#[derive(Serialize)]
struct CentreTotal {
    total: Decimal,
    items: usize,
}

#[derive(Serialize)]
struct BalanceSheet {
    summary: RangeSummary,
    centre_breakdown: BTreeMap<String, CentreTotal>,
    category_breakdown: BTreeMap<String, Decimal>,
    expenses: Vec<ExpenseRecord>,
}

fn build(expenses: Vec<ExpenseRecord>, from: &str, to: &str) -> BalanceSheet {
    let total_amount: Decimal = expenses.iter().map(|e| e.amount).sum();

    let mut centre_breakdown: BTreeMap<String, CentreTotal> = BTreeMap::new();
    let mut category_breakdown: BTreeMap<String, Decimal> = BTreeMap::new();
    for e in &expenses {
        let entry = centre_breakdown
            .entry(e.centre.clone())
            .or_insert(CentreTotal {
                total: Decimal::ZERO,
                items: 0,
            });
        entry.total += e.amount;
        entry.items += 1;
        *category_breakdown
            .entry(e.category.clone())
            .or_insert(Decimal::ZERO) += e.amount;
    }

    BalanceSheet {
        summary: RangeSummary {
            total_amount,
            total_items: expenses.len(),
            from: from.to_string(),
            to: to.to_string(),
        },
        centre_breakdown,
        category_breakdown,
        expenses,
    }
}

fn balance_sheet(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    let from = sub.get_one::<String>("from");
    let to = sub.get_one::<String>("to");
    let centre = sub.get_one::<String>("centre");
    let category = sub.get_one::<String>("category");
    let items: Vec<String> = sub
        .get_many::<String>("item")
        .map(|vals| vals.map(|s| s.to_string()).collect())
        .unwrap_or_default();

    // Range bounds are inclusive; `to` extends to the end of its day.
    let from_ts = from
        .map(|s| parse_date(s).map(|d| d.and_time(NaiveTime::MIN)))
        .transpose()?;
    let to_ts = to
        .map(|s| {
            parse_date(s).map(|d| {
                d.and_time(NaiveTime::from_hms_opt(23, 59, 59).unwrap_or(NaiveTime::MIN))
            })
        })
        .transpose()?;

    let mut expenses = load_expenses(conn)?;
    expenses.retain(|e| {
        from_ts.is_none_or(|t| e.timestamp >= t)
            && to_ts.is_none_or(|t| e.timestamp <= t)
            && centre.is_none_or(|c| &e.centre == c)
            && category.is_none_or(|c| &e.category == c)
            && (items.is_empty() || items.contains(&e.item))
    });
    expenses.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

    let sheet = build(
        expenses,
        from.map(|s| s.as_str()).unwrap_or("all time"),
        to.map(|s| s.as_str()).unwrap_or("all time"),
    );

    match (sub.get_one::<String>("format"), sub.get_one::<String>("out")) {
        (Some(fmt), Some(out)) => return export(&sheet, &fmt.to_lowercase(), out),
        (Some(_), None) => bail!("--format requires --out"),
        _ => {}
    }

    if maybe_print_json(json_flag, jsonl_flag, &sheet)? {
        return Ok(());
    }

    println!(
        "Balance sheet {} to {}: {} across {} entries",
        sheet.summary.from,
        sheet.summary.to,
        fmt_money(&sheet.summary.total_amount),
        sheet.summary.total_items
    );
    println!();

    if !sheet.category_breakdown.is_empty() {
        let rows = sheet
            .category_breakdown
            .iter()
            .map(|(c, total)| vec![c.clone(), fmt_money(total)])
            .collect();
        println!("{}", pretty_table(&["Category", "Amount"], rows));
    }

    if !sheet.centre_breakdown.is_empty() {
        let rows = sheet
            .centre_breakdown
            .iter()
            .map(|(c, t)| vec![c.clone(), fmt_money(&t.total), t.items.to_string()])
            .collect();
        println!(
            "{}",
            pretty_table(&["Centre", "Total Amount", "Items"], rows)
        );
    }

    if !sheet.expenses.is_empty() {
        let rows: Vec<Vec<String>> = sheet
            .expenses
            .iter()
            .take(10)
            .map(|e| {
                vec![
                    e.item.clone(),
                    e.centre.clone(),
                    e.category.clone(),
                    fmt_money(&e.amount),
                    e.date.to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Item", "Centre", "Category", "Amount", "Date"], rows)
        );
        if sheet.expenses.len() > 10 {
            println!(
                "Showing 10 of {} entries. Export for the full list.",
                sheet.expenses.len()
            );
        }
    }
    Ok(())
}

fn export(sheet: &BalanceSheet, fmt: &str, out: &str) -> Result<()> {
    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date", "timestamp", "item", "category", "centre", "amount",
                "payment_method", "created_by", "note",
            ])?;
            for e in &sheet.expenses {
                wtr.write_record([
                    e.date.to_string(),
                    e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                    e.item.clone(),
                    e.category.clone(),
                    e.centre.clone(),
                    e.amount.to_string(),
                    e.payment_method.to_string(),
                    e.created_by.clone(),
                    e.note.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(sheet)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported balance sheet to {}", out);
    Ok(())
}
