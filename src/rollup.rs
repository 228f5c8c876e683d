// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Analytics rollup over an in-memory snapshot of expense and inventory
//! records. Pure and synchronous: callers load the snapshot, inject the
//! reference instant, and treat the report as immutable.

use crate::models::{ExpenseRecord, InventoryRecord};
use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Conjunction of exact-match restrictions applied before aggregation.
/// `month` is a calendar month (1-12) of the reference year, matched against
/// `timestamp`.
#[derive(Debug, Clone, Default)]
pub struct RollupFilter {
    pub centre: Option<String>,
    pub category: Option<String>,
    pub user: Option<String>,
    pub month: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct RollupOptions {
    pub filter: RollupFilter,
    /// Quantity strictly below this is low stock.
    pub low_stock_absolute: u32,
    /// Quantity strictly below this is critical.
    pub critical_absolute: u32,
    /// Quantity below this fraction of `original_quantity` raises the
    /// relative alert; items without a baseline are skipped.
    pub low_stock_relative: Decimal,
    pub recent_limit: usize,
}

impl Default for RollupOptions {
    fn default() -> Self {
        RollupOptions {
            filter: RollupFilter::default(),
            low_stock_absolute: 3,
            critical_absolute: 2,
            low_stock_relative: Decimal::new(20, 2),
            recent_limit: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ItemCount {
    pub item: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SpenderTotal {
    pub user: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthOverMonth {
    pub current_total: Decimal,
    pub previous_total: Decimal,
    pub current_count: usize,
    pub previous_count: usize,
    /// (current - previous) / previous * 100, or 0 when previous is 0.
    pub percentage_change: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub severity: Severity,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RollupReport {
    pub total_amount: Decimal,
    pub expense_count: usize,
    pub inventory_count: usize,
    pub counts_by_category: BTreeMap<String, usize>,
    pub counts_by_centre: BTreeMap<String, usize>,
    pub totals_by_category: BTreeMap<String, Decimal>,
    pub totals_by_centre: BTreeMap<String, Decimal>,
    /// Distinct values in first-encounter order; drive the filter pills.
    pub centres: Vec<String>,
    pub users: Vec<String>,
    pub categories: Vec<String>,
    pub top_items: Vec<ItemCount>,
    pub top_spenders: Vec<SpenderTotal>,
    pub recent: Vec<ExpenseRecord>,
    pub month_over_month: MonthOverMonth,
    pub low_stock: Vec<InventoryRecord>,
    pub critical: Vec<InventoryRecord>,
    pub out_of_stock: Vec<InventoryRecord>,
    pub relative_low_stock: Vec<InventoryRecord>,
    pub performance_score: u8,
    pub recommendations: Vec<Recommendation>,
}

const TOP_N: usize = 5;

/// Compute the full analytics report for one snapshot. Deterministic for
/// identical inputs and `reference`.
pub fn rollup(
    expenses: &[ExpenseRecord],
    inventory: &[InventoryRecord],
    reference: NaiveDateTime,
    opts: &RollupOptions,
) -> RollupReport {
    let f = &opts.filter;
    let month_window = f
        .month
        .and_then(|m| calendar_month_window(reference.date().year(), m));

    let working: Vec<&ExpenseRecord> = expenses
        .iter()
        .filter(|e| f.centre.as_deref().is_none_or(|c| e.centre == c))
        .filter(|e| f.category.as_deref().is_none_or(|c| e.category == c))
        .filter(|e| f.user.as_deref().is_none_or(|u| e.created_by == u))
        .filter(|e| {
            month_window
                .is_none_or(|(start, end)| e.timestamp >= start && e.timestamp < end)
        })
        .collect();

    let stock: Vec<&InventoryRecord> = inventory
        .iter()
        .filter(|i| f.centre.as_deref().is_none_or(|c| i.centre == c))
        .collect();

    let total_amount: Decimal = working.iter().map(|e| e.amount).sum();

    let mut counts_by_category = BTreeMap::new();
    let mut counts_by_centre = BTreeMap::new();
    let mut totals_by_category = BTreeMap::new();
    let mut totals_by_centre = BTreeMap::new();
    for e in &working {
        *counts_by_category.entry(e.category.clone()).or_insert(0) += 1;
        *counts_by_centre.entry(e.centre.clone()).or_insert(0) += 1;
        *totals_by_category
            .entry(e.category.clone())
            .or_insert(Decimal::ZERO) += e.amount;
        *totals_by_centre
            .entry(e.centre.clone())
            .or_insert(Decimal::ZERO) += e.amount;
    }

    let centres = distinct(working.iter().map(|e| e.centre.as_str()));
    let users = distinct(working.iter().map(|e| e.created_by.as_str()));
    let categories = distinct(working.iter().map(|e| e.category.as_str()));

    let top_items = top_item_counts(&working);
    let top_spenders = top_spender_totals(&working);

    let mut recent: Vec<ExpenseRecord> = working.iter().map(|e| (*e).clone()).collect();
    recent.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));
    recent.truncate(opts.recent_limit);

    let month_over_month = month_over_month(&working, reference);

    let low_stock: Vec<InventoryRecord> = stock
        .iter()
        .filter(|i| i.quantity < opts.low_stock_absolute)
        .map(|i| (*i).clone())
        .collect();
    let critical: Vec<InventoryRecord> = stock
        .iter()
        .filter(|i| i.quantity < opts.critical_absolute)
        .map(|i| (*i).clone())
        .collect();
    let out_of_stock: Vec<InventoryRecord> = stock
        .iter()
        .filter(|i| i.is_out_of_stock())
        .map(|i| (*i).clone())
        .collect();
    let relative_low_stock: Vec<InventoryRecord> = stock
        .iter()
        .filter(|i| match i.original_quantity {
            Some(orig) if orig > 0 => {
                Decimal::from(i.quantity) < opts.low_stock_relative * Decimal::from(orig)
            }
            _ => false,
        })
        .map(|i| (*i).clone())
        .collect();

    let performance_score =
        performance_score(&month_over_month, low_stock.len(), out_of_stock.len());
    let recommendations =
        recommendations(&month_over_month, low_stock.len(), out_of_stock.len());

    RollupReport {
        total_amount,
        expense_count: working.len(),
        inventory_count: stock.len(),
        counts_by_category,
        counts_by_centre,
        totals_by_category,
        totals_by_centre,
        centres,
        users,
        categories,
        top_items,
        top_spenders,
        recent,
        month_over_month,
        low_stock,
        critical,
        out_of_stock,
        relative_low_stock,
        performance_score,
        recommendations,
    }
}

/// Half-open [first of month, first of next month) as datetimes. Returns
/// None for an out-of-range month number.
fn calendar_month_window(year: i32, month: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((
        start.and_hms_opt(0, 0, 0)?,
        end.and_hms_opt(0, 0, 0)?,
    ))
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = Vec::new();
    for v in values {
        if !seen.iter().any(|s: &String| s == v) {
            seen.push(v.to_string());
        }
    }
    seen
}

fn top_item_counts(working: &[&ExpenseRecord]) -> Vec<ItemCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ItemCount> = Vec::new();
    for e in working {
        match index.get(e.item.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(e.item.as_str(), counts.len());
                counts.push(ItemCount {
                    item: e.item.clone(),
                    count: 1,
                });
            }
        }
    }
    // Stable sort keeps first-encounter order for ties.
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(TOP_N);
    counts
}

fn top_spender_totals(working: &[&ExpenseRecord]) -> Vec<SpenderTotal> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut totals: Vec<SpenderTotal> = Vec::new();
    for e in working {
        match index.get(e.created_by.as_str()) {
            Some(&i) => totals[i].amount += e.amount,
            None => {
                index.insert(e.created_by.as_str(), totals.len());
                totals.push(SpenderTotal {
                    user: e.created_by.clone(),
                    amount: e.amount,
                });
            }
        }
    }
    totals.sort_by(|a, b| b.amount.cmp(&a.amount));
    totals.truncate(TOP_N);
    totals
}

fn month_over_month(working: &[&ExpenseRecord], reference: NaiveDateTime) -> MonthOverMonth {
    let ref_date = reference.date();
    let current = calendar_month_window(ref_date.year(), ref_date.month());
    let previous = if ref_date.month() == 1 {
        calendar_month_window(ref_date.year() - 1, 12)
    } else {
        calendar_month_window(ref_date.year(), ref_date.month() - 1)
    };

    let in_window = |e: &ExpenseRecord, w: Option<(NaiveDateTime, NaiveDateTime)>| {
        w.is_some_and(|(start, end)| e.timestamp >= start && e.timestamp < end)
    };

    let mut current_total = Decimal::ZERO;
    let mut previous_total = Decimal::ZERO;
    let mut current_count = 0;
    let mut previous_count = 0;
    for &e in working {
        if in_window(e, current) {
            current_total += e.amount;
            current_count += 1;
        } else if in_window(e, previous) {
            previous_total += e.amount;
            previous_count += 1;
        }
    }

    let percentage_change = if previous_total > Decimal::ZERO {
        (current_total - previous_total) / previous_total * Decimal::from(100)
    } else {
        Decimal::ZERO
    };

    MonthOverMonth {
        current_total,
        previous_total,
        current_count,
        previous_count,
        percentage_change,
    }
}

/// Heuristic 0-100 score. Clamping happens once, after every additive term.
fn performance_score(mom: &MonthOverMonth, low_stock: usize, out_of_stock: usize) -> u8 {
    use rust_decimal::prelude::ToPrimitive;

    let per_thousand =
        |delta: Decimal| delta / Decimal::from(1000) * Decimal::from(10);

    let mut score = Decimal::from(100);
    if mom.current_total > mom.previous_total {
        score -= Decimal::from(20).min(per_thousand(mom.current_total - mom.previous_total));
    } else {
        score += Decimal::from(15).min(per_thousand(mom.previous_total - mom.current_total));
    }
    score -= Decimal::from(2 * low_stock as u64 + 5 * out_of_stock as u64);

    score = score.clamp(Decimal::ZERO, Decimal::from(100));
    score.round().to_u8().unwrap_or(0)
}

/// Fixed conditional sequence: spend comparison, forward-looking tip,
/// inventory warnings, generic tip. Callers may rely on that order.
fn recommendations(
    mom: &MonthOverMonth,
    low_stock: usize,
    out_of_stock: usize,
) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if mom.current_total > mom.previous_total {
        let increase = mom.current_total - mom.previous_total;
        recs.push(Recommendation {
            severity: Severity::Warning,
            text: format!(
                "Spending increased by \u{20b9}{} this month. Review the recent entries.",
                increase.round()
            ),
        });
    } else if mom.current_total < mom.previous_total {
        let savings = mom.previous_total - mom.current_total;
        recs.push(Recommendation {
            severity: Severity::Success,
            text: format!(
                "Saved \u{20b9}{} compared to last month.",
                savings.round()
            ),
        });
    }

    if mom.current_total > mom.previous_total {
        recs.push(Recommendation {
            severity: Severity::Info,
            text: "Next month: focus on reducing the highest spending categories.".into(),
        });
    } else {
        recs.push(Recommendation {
            severity: Severity::Success,
            text: "Next month: keep up the current cost-saving practices.".into(),
        });
    }

    if low_stock > 0 {
        recs.push(Recommendation {
            severity: Severity::Warning,
            text: format!(
                "{} items are running low on stock. Plan purchases to avoid stockouts.",
                low_stock
            ),
        });
    }
    if out_of_stock > 0 {
        recs.push(Recommendation {
            severity: Severity::Error,
            text: format!(
                "{} items are out of stock. Restock them soon to keep operations running.",
                out_of_stock
            ),
        });
    }

    if mom.current_total > Decimal::ZERO {
        recs.push(Recommendation {
            severity: Severity::Info,
            text: "Consider bulk purchases for frequently used items to reduce costs.".into(),
        });
    }

    recs
}
