// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::rollup::RollupOptions;
use crate::utils::{get_setting, parse_decimal, pretty_table, set_setting};
use anyhow::{bail, Result};
use rusqlite::Connection;

const KEYS: &[&str] = &[
    "default_centre",
    "created_by",
    "low_stock_absolute",
    "critical_absolute",
    "low_stock_relative",
];

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            let value = sub.get_one::<String>("value").unwrap().trim();
            if !KEYS.contains(&key) {
                bail!("Unknown setting '{}' (known: {})", key, KEYS.join(", "));
            }
            // Fail fast on values the typed getters would later reject.
            match key {
                "low_stock_absolute" | "critical_absolute" => {
                    value.parse::<u32>().map_err(|_| {
                        anyhow::anyhow!("'{}' must be a non-negative integer", key)
                    })?;
                }
                "low_stock_relative" => {
                    parse_decimal(value)?;
                }
                _ => {}
            }
            set_setting(conn, key, value)?;
            println!("Set {} = {}", key, value);
        }
        Some(("get", sub)) => {
            let key = sub.get_one::<String>("key").unwrap().trim();
            match get_setting(conn, key)? {
                Some(v) => println!("{}", v),
                None => println!("(unset)"),
            }
        }
        Some(("show", _)) => {
            let defaults = RollupOptions::default();
            let mut data = Vec::new();
            for key in KEYS {
                let value = get_setting(conn, key)?;
                let shown = match (value, *key) {
                    (Some(v), _) => v,
                    (None, "low_stock_absolute") => {
                        format!("{} (default)", defaults.low_stock_absolute)
                    }
                    (None, "critical_absolute") => {
                        format!("{} (default)", defaults.critical_absolute)
                    }
                    (None, "low_stock_relative") => {
                        format!("{} (default)", defaults.low_stock_relative)
                    }
                    (None, _) => "(unset)".to_string(),
                };
                data.push(vec![key.to_string(), shown]);
            }
            println!("{}", pretty_table(&["Key", "Value"], data));
        }
        _ => {}
    }
    Ok(())
}
