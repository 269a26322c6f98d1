// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

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
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn kind_arg() -> Arg {
    Arg::new("kind")
        .long("kind")
        .value_parser(["income", "expense", "ingreso", "gasto"])
        .help("Transaction kind")
}

pub fn build_cli() -> Command {
    Command::new("cajaclara")
        .version(crate_version!())
        .about("Small-business income and expense ledger")
        .arg(
            Arg::new("user")
                .long("user")
                .global(true)
                .env("CAJACLARA_USER")
                .value_name("EMAIL")
                .help("Email of the account running the command"),
        )
        .subcommand(Command::new("init").about("Create the database if missing"))
        .subcommand(
            Command::new("user")
                .about("User accounts")
                .subcommand(
                    Command::new("register")
                        .about("Register a new account")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("email").long("email").required(true)),
                )
                .subcommand(json_flags(
                    Command::new("list").about("List accounts (admin only)"),
                ))
                .subcommand(
                    Command::new("status")
                        .about("Activate or suspend an account (admin only)")
                        .arg(Arg::new("email").required(true))
                        .arg(
                            Arg::new("status")
                                .required(true)
                                .value_parser(["active", "suspended"]),
                        ),
                )
                .subcommand(
                    Command::new("rm")
                        .about("Delete an account and its transactions (admin only)")
                        .arg(Arg::new("email").required(true)),
                ),
        )
        .subcommand(
            Command::new("category")
                .about("Fixed transaction categories")
                .subcommand(Command::new("list").arg(kind_arg())),
        )
        .subcommand(
            Command::new("tx")
                .about("Ledger transactions")
                .subcommand(
                    Command::new("add")
                        .about("Record one income or expense")
                        .arg(kind_arg().required(true))
                        .arg(
                            Arg::new("amount")
                                .long("amount")
                                .required(true)
                                .help("Whole amount, e.g. 100.000"),
                        )
                        .arg(Arg::new("category").long("category").required(true))
                        .arg(Arg::new("description").long("description"))
                        .arg(
                            Arg::new("date")
                                .long("date")
                                .help("YYYY-MM-DD, defaults to today"),
                        ),
                )
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions, newest first")
                        .arg(Arg::new("month").long("month").help("YYYY-MM"))
                        .arg(kind_arg())
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(
                    Command::new("rm").about("Delete a transaction").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("dashboard")
                .about("Monthly summary, six-month series and expenses by category")
                .arg(
                    Arg::new("at")
                        .long("at")
                        .help("Reference date YYYY-MM-DD, defaults to now"),
                )
                .arg(Arg::new("json").long("json").action(ArgAction::SetTrue))
                .arg(
                    Arg::new("chart")
                        .long("chart")
                        .value_name("PATH")
                        .help("Also write the charts to an HTML file"),
                )
                .arg(
                    Arg::new("watch")
                        .long("watch")
                        .action(ArgAction::SetTrue)
                        .help("Refresh whenever the ledger changes"),
                )
                .arg(
                    Arg::new("interval-ms")
                        .long("interval-ms")
                        .value_parser(value_parser!(u64))
                        .default_value("1000"),
                ),
        )
        .subcommand(
            Command::new("export").about("Export reports").subcommand(
                Command::new("month")
                    .about("Export one month of transactions")
                    .arg(
                        Arg::new("month")
                            .long("month")
                            .help("YYYY-MM, defaults to the current month"),
                    )
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .required(true)
                            .help("csv | json | report"),
                    )
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Settings")
                .subcommand(Command::new("show"))
                .subcommand(
                    Command::new("set-offset")
                        .about("UTC offset used to place entries in calendar months")
                        .arg(
                            Arg::new("offset")
                                .required(true)
                                .allow_hyphen_values(true)
                                .help("±HH:MM, e.g. -04:00"),
                        ),
                ),
        )
}
