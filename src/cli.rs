// Copyright (c) 2025 Centrebook.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{crate_version, value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn attach_cmd(id_help: &'static str) -> Command {
    Command::new("attach")
        .about("Record an attachment reference held in external storage")
        .arg(
            Arg::new("id")
                .long("id")
                .required(true)
                .value_parser(value_parser!(i64))
                .help(id_help),
        )
        .arg(Arg::new("name").long("name").required(true))
        .arg(
            Arg::new("url")
                .long("url")
                .required(true)
                .help("Opaque blob URL; never fetched"),
        )
        .arg(
            Arg::new("size")
                .long("size")
                .value_parser(value_parser!(u64))
                .help("Size in bytes"),
        )
        .arg(Arg::new("mime").long("mime").help("MIME type"))
}

pub fn build_cli() -> Command {
    Command::new("centrebook")
        .version(crate_version!())
        .about("Multi-centre expense and inventory tracking with insights and reports")
        .subcommand(
            Command::new("init")
                .about("Initialize the database and seed the default categories"),
        )
        .subcommand(
            Command::new("category")
                .about("Manage expense categories and their suggested items")
                .subcommand(
                    Command::new("add")
                        .about("Add a category")
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(Command::new("list").about("List categories"))
                .subcommand(
                    Command::new("rm")
                        .about("Remove a category")
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(
                    Command::new("add-item")
                        .about("Add a suggested item to a category")
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("name").long("name").required(true)),
                )
                .subcommand(
                    Command::new("items")
                        .about("List a category's suggested items")
                        .arg(Arg::new("category").long("category").required(true)),
                ),
        )
        .subcommand(
            Command::new("expense")
                .about("Record and query expenses")
                .subcommand(
                    Command::new("add")
                        .about("Record an expense")
                        .arg(Arg::new("item").long("item").required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .allow_hyphen_values(true)
                                .help("Non-negative amount"),
                        )
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("Occurred-on date (YYYY-MM-DD); defaults to today"),
                        )
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .help("Created on first use; rules apply when omitted"),
                        )
                        .arg(Arg::new("centre").long("centre"))
                        .arg(
                            Arg::new("payment")
                                .long("payment")
                                .help("cash, upi or card (default cash)"),
                        )
                        .arg(
                            Arg::new("by")
                                .long("by")
                                .help("Author email; falls back to the created_by setting"),
                        )
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List expenses, newest first")
                        .arg(
                            Arg::new("month")
                                .long("month")
                                .help("Restrict to a month (YYYY-MM)"),
                        )
                        .arg(Arg::new("centre").long("centre"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("user").long("user"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("update")
                        .about("Edit fields of an expense; refreshes its timestamp")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("date").long("date"))
                        .arg(Arg::new("item").long("item"))
                        .arg(Arg::new("amount").long("amount"))
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("centre").long("centre"))
                        .arg(Arg::new("payment").long("payment"))
                        .arg(Arg::new("note").long("note")),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an expense")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        ),
                )
                .subcommand(attach_cmd("Expense id"))
                .subcommand(
                    Command::new("last")
                        .about("Show the most recent entry (duplicate-last source)")
                        .arg(Arg::new("centre").long("centre")),
                ),
        )
        .subcommand(
            Command::new("inventory")
                .about("Track stock and assets")
                .subcommand(
                    Command::new("add")
                        .about("Add an inventory item")
                        .arg(Arg::new("item").long("item").required(true))
                        .arg(
                            Arg::new("quantity")
                                .long("quantity")
                                .required(true)
                                .value_parser(value_parser!(u32)),
                        )
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .help("stock or asset (default stock)"),
                        )
                        .arg(Arg::new("centre").long("centre"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("original-quantity")
                                .long("original-quantity")
                                .value_parser(value_parser!(u32))
                                .help("Baseline for the relative low-stock alert"),
                        )
                        .arg(Arg::new("status").long("status"))
                        .arg(Arg::new("assigned-to").long("assigned-to")),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List inventory")
                        .arg(Arg::new("centre").long("centre"))
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .help("Substring match on item name"),
                        )
                        .arg(
                            Arg::new("low")
                                .long("low")
                                .action(ArgAction::SetTrue)
                                .help("Only items under the low-stock threshold"),
                        ),
                ))
                .subcommand(
                    Command::new("use")
                        .about("Consume stock; quantity floors at zero")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("count")
                                .long("count")
                                .value_parser(value_parser!(u32)),
                        ),
                )
                .subcommand(
                    Command::new("damage")
                        .about("Mark units damaged; moves them out of quantity")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("count")
                                .long("count")
                                .value_parser(value_parser!(u32)),
                        ),
                )
                .subcommand(
                    Command::new("repair")
                        .about("Mark damaged units repaired; damaged floors at zero")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("count")
                                .long("count")
                                .value_parser(value_parser!(u32)),
                        ),
                )
                .subcommand(
                    Command::new("set-quantity")
                        .about("Set the current count directly")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("quantity")
                                .long("quantity")
                                .required(true)
                                .value_parser(value_parser!(u32)),
                        ),
                )
                .subcommand(
                    Command::new("assign")
                        .about("Assign an asset; sets status to Assigned")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("to").long("to").required(true)),
                )
                .subcommand(
                    Command::new("set-status")
                        .about("Set an asset's status")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("status").long("status").required(true)),
                )
                .subcommand(attach_cmd("Inventory item id")),
        )
        .subcommand(json_flags(
            Command::new("insights")
                .about("Per-centre monthly insights, score, and recommendations")
                .arg(
                    Arg::new("centre")
                        .long("centre")
                        .help("Defaults to the default_centre setting"),
                )
                .arg(
                    Arg::new("as-of")
                        .long("as-of")
                        .help("Reference date (YYYY-MM-DD); defaults to today"),
                ),
        ))
        .subcommand(json_flags(
            Command::new("overview")
                .about("Cross-centre dashboard with filter pills")
                .arg(Arg::new("centre").long("centre"))
                .arg(
                    Arg::new("month")
                        .long("month")
                        .value_parser(value_parser!(u32).range(1..=12))
                        .help("Calendar month (1-12) of the reference year"),
                )
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("user").long("user"))
                .arg(Arg::new("as-of").long("as-of")),
        ))
        .subcommand(
            Command::new("report").about("Balance sheets").subcommand(
                json_flags(
                    Command::new("balance-sheet")
                        .about("Summaries and breakdowns over a filtered range")
                        .arg(
                            Arg::new("from")
                                .long("from")
                                .help("Start date (YYYY-MM-DD), inclusive"),
                        )
                        .arg(
                            Arg::new("to")
                                .long("to")
                                .help("End date (YYYY-MM-DD), inclusive"),
                        )
                        .arg(Arg::new("centre").long("centre"))
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("item")
                                .long("item")
                                .action(ArgAction::Append)
                                .help("Restrict to specific items; repeatable"),
                        )
                        .arg(
                            Arg::new("format")
                                .long("format")
                                .help("csv or json (requires --out)"),
                        )
                        .arg(Arg::new("out").long("out")),
                ),
            ),
        )
        .subcommand(
            Command::new("import").about("Bulk import").subcommand(
                Command::new("expenses")
                    .about("Import expenses from a headered CSV")
                    .arg(Arg::new("path").long("path").required(true)),
            ),
        )
        .subcommand(
            Command::new("export").about("Bulk export").subcommand(
                Command::new("expenses")
                    .about("Export all expenses")
                    .arg(Arg::new("format").long("format").required(true))
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("rules")
                .about("Item-name patterns that auto-assign categories")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("pattern").long("pattern").required(true))
                        .arg(Arg::new("category").long("category").required(true)),
                )
                .subcommand(Command::new("list"))
                .subcommand(
                    Command::new("rm").arg(Arg::new("id").long("id").required(true)),
                ),
        )
        .subcommand(Command::new("doctor").about("Scan for data inconsistencies"))
        .subcommand(
            Command::new("config")
                .about("Settings: default_centre, created_by, thresholds")
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                )
                .subcommand(
                    Command::new("get").arg(Arg::new("key").long("key").required(true)),
                )
                .subcommand(Command::new("show")),
        )
}
