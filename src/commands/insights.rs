// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db::{load_expenses, load_inventory};
use crate::rollup::{rollup, RollupFilter, Severity};
use crate::utils::{
    fmt_money, get_default_centre, maybe_print_json, parse_reference, pretty_table,
    rollup_options,
};
use anyhow::{anyhow, Result};
use rusqlite::Connection;

/// Per-centre monthly view: spend summary, most-used items, stock alerts,
/// and the performance score.
pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let json_flag = m.get_flag("json");
    let jsonl_flag = m.get_flag("jsonl");
    let centre = match m.get_one::<String>("centre") {
        Some(c) => c.trim().to_string(),
        None => get_default_centre(conn)?
            .ok_or_else(|| anyhow!("No --centre given and no default_centre configured"))?,
    };
    let reference = parse_reference(m.get_one::<String>("as-of").map(|s| s.as_str()))?;

    let expenses = load_expenses(conn)?;
    let inventory = load_inventory(conn)?;
    let mut opts = rollup_options(conn)?;
    opts.filter = RollupFilter {
        centre: Some(centre.clone()),
        ..RollupFilter::default()
    };

    let report = rollup(&expenses, &inventory, reference, &opts);
    if maybe_print_json(json_flag, jsonl_flag, &report)? {
        return Ok(());
    }

    let mom = &report.month_over_month;
    println!("Insights for {} centre", centre);
    println!(
        "  This month: {} across {} entries ({}{}% vs last month)",
        fmt_money(&mom.current_total),
        mom.current_count,
        if mom.percentage_change > rust_decimal::Decimal::ZERO {
            "+"
        } else {
            ""
        },
        mom.percentage_change.round_dp(1)
    );
    println!(
        "  Last month: {} across {} entries",
        fmt_money(&mom.previous_total),
        mom.previous_count
    );
    println!("  Performance score: {}/100", report.performance_score);
    println!();

    if !report.top_items.is_empty() {
        let rows = report
            .top_items
            .iter()
            .map(|i| vec![i.item.clone(), format!("{} times", i.count)])
            .collect();
        println!("{}", pretty_table(&["Most Used Item", "Count"], rows));
    }

    let alerts: Vec<_> = report
        .recommendations
        .iter()
        .filter(|r| matches!(r.severity, Severity::Warning | Severity::Error))
        .collect();
    if alerts.is_empty() {
        println!("All inventory items are sufficiently stocked.");
    } else {
        for rec in alerts {
            let tag = match rec.severity {
                Severity::Error => "!!",
                _ => "!",
            };
            println!("{:>3} {}", tag, rec.text);
        }
    }

    if !report.relative_low_stock.is_empty() {
        println!();
        let rows = report
            .relative_low_stock
            .iter()
            .map(|i| {
                vec![
                    i.item_name.clone(),
                    i.quantity.to_string(),
                    i.original_quantity
                        .map(|q| q.to_string())
                        .unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Below Baseline Threshold", "Qty", "Baseline"], rows)
        );
    }
    Ok(())
}
