// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{load_expenses, load_inventory};
use crate::rollup::{rollup, RollupFilter};
use crate::utils::{fmt_money, maybe_print_json, parse_reference, pretty_table, rollup_options};
use anyhow::Result;
use rusqlite::Connection;

/// Cross-centre dashboard: summary cards, rankings, recent entries, and the
/// category breakdown, under an optional conjunction of filters.
pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let reference = parse_reference(m.get_one::<String>("as-of").map(|s| s.as_str()))?;

    let expenses = load_expenses(conn)?;
    let inventory = load_inventory(conn)?;
    let mut opts = rollup_options(conn)?;
    opts.filter = RollupFilter {
        centre: m.get_one::<String>("centre").map(|s| s.trim().to_string()),
        category: m.get_one::<String>("category").map(|s| s.trim().to_string()),
        user: m.get_one::<String>("user").map(|s| s.trim().to_string()),
        month: m.get_one::<u32>("month").copied(),
    };

    let report = rollup(&expenses, &inventory, reference, &opts);
    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }

    println!(
        "Total expenses: {}  |  Inventory items: {}  |  Low stock: {}  |  Centres: {}",
        fmt_money(&report.total_amount),
        report.inventory_count,
        report.low_stock.len(),
        report.centres.len()
    );
    println!();

    if !report.top_items.is_empty() {
        let rows = report
            .top_items
            .iter()
            .map(|i| vec![i.item.clone(), format!("{} times", i.count)])
            .collect();
        println!("{}", pretty_table(&["Most Used Item", "Count"], rows));
    }

    if !report.top_spenders.is_empty() {
        let rows = report
            .top_spenders
            .iter()
            .map(|s| vec![s.user.clone(), fmt_money(&s.amount)])
            .collect();
        println!("{}", pretty_table(&["Top Spender", "Amount"], rows));
    }

    if !report.recent.is_empty() {
        let rows = report
            .recent
            .iter()
            .map(|e| {
                vec![
                    e.item.clone(),
                    e.centre.clone(),
                    e.category.clone(),
                    fmt_money(&e.amount),
                    e.timestamp.format("%Y-%m-%d").to_string(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Recent Expense", "Centre", "Category", "Amount", "Date"], rows)
        );
    }

    if !report.totals_by_category.is_empty() {
        let mut breakdown: Vec<_> = report.totals_by_category.iter().collect();
        breakdown.sort_by(|a, b| b.1.cmp(a.1));
        let rows = breakdown
            .into_iter()
            .map(|(category, total)| vec![category.clone(), fmt_money(total)])
            .collect();
        println!("{}", pretty_table(&["Category", "Total"], rows));
    }
    Ok(())
}
