// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::{id_for_category, pretty_table};
use anyhow::{Context, Result};
use regex::Regex;
use rusqlite::{params, Connection};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let pattern = sub.get_one::<String>("pattern").unwrap().trim().to_string();
            let category = sub.get_one::<String>("category").unwrap().trim();
            Regex::new(&pattern)
                .with_context(|| format!("Invalid regex pattern '{}'", pattern))?;
            let cat_id = id_for_category(conn, category)?;
            conn.execute(
                "INSERT INTO rules(pattern, category_id) VALUES (?1, ?2)",
                params![pattern, cat_id],
            )?;
            println!("Rule added: /{}/ -> {}", pattern, category);
        }
        Some(("list", _)) => {
            let mut stmt = conn.prepare(
                "SELECT r.id, r.pattern, c.name, r.created_at
                 FROM rules r LEFT JOIN categories c ON r.category_id=c.id
                 ORDER BY r.id DESC",
            )?;
            let rows = stmt.query_map([], |r| {
                Ok((
                    r.get::<_, i64>(0)?,
                    r.get::<_, String>(1)?,
                    r.get::<_, Option<String>>(2)?,
                    r.get::<_, String>(3)?,
                ))
            })?;
            let mut data = Vec::new();
            for row in rows {
                let (id, pattern, category, created) = row?;
                data.push(vec![
                    id.to_string(),
                    pattern,
                    category.unwrap_or_default(),
                    created,
                ]);
            }
            println!(
                "{}",
                pretty_table(&["Id", "Pattern", "Category", "Created"], data)
            );
        }
        Some(("rm", sub)) => {
            let id: i64 = sub
                .get_one::<String>("id")
                .unwrap()
                .trim()
                .parse()
                .context("Invalid rule id")?;
            conn.execute("DELETE FROM rules WHERE id=?1", params![id])?;
            println!("Removed rule {}", id);
        }
        _ => {}
    }
    Ok(())
}
