// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn id_arg(help: &'static str) -> Arg {
    Arg::new("id")
        .long("id")
        .required(true)
        .value_parser(value_parser!(i64))
        .help(help)
}

fn key_arg() -> Arg {
    Arg::new("key")
        .long("key")
        .help("Idempotency key; makes the write safe to retry")
}

pub fn build_cli() -> Command {
    Command::new("cariledger")
        .about("Current-account ledger: obligations, installments and period reports")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .env("CARILEDGER_DB")
                .help("Database file (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .env("CARILEDGER_LOG")
                .default_value("warn"),
        )
        .arg(
            Arg::new("retries")
                .long("retries")
                .global(true)
                .env("CARILEDGER_RETRIES")
                .value_parser(value_parser!(u32))
                .default_value("3"),
        )
        .arg(
            Arg::new("retry-delay-ms")
                .long("retry-delay-ms")
                .global(true)
                .env("CARILEDGER_RETRY_DELAY_MS")
                .value_parser(value_parser!(u64))
                .default_value("1000"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("account")
                .about("Manage current accounts")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("other")
                                .help("customer|supplier|other"),
                        )
                        .arg(Arg::new("phone").long("phone"))
                        .arg(Arg::new("email").long("email"))
                        .arg(Arg::new("address").long("address")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(json_flags(Command::new("show").arg(id_arg("Account id"))))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg("Account id"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("type").long("type"))
                        .arg(Arg::new("phone").long("phone"))
                        .arg(Arg::new("email").long("email"))
                        .arg(Arg::new("address").long("address")),
                )
                .subcommand(Command::new("rm").arg(id_arg("Account id")))
                .subcommand(
                    Command::new("recompute")
                        .about("Rebuild cached totals from the ledger")
                        .arg(
                            Arg::new("id")
                                .long("id")
                                .value_parser(value_parser!(i64))
                                .help("Account id; every account when omitted"),
                        ),
                ),
        )
        .subcommand(
            Command::new("project")
                .about("Manage projects")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("client").long("client").required(true))
                        .arg(Arg::new("type").long("type").default_value("general"))
                        .arg(Arg::new("status").long("status"))
                        .arg(Arg::new("total").long("total"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("phone").long("phone"))
                        .arg(Arg::new("email").long("email")),
                )
                .subcommand(json_flags(Command::new("list")))
                .subcommand(json_flags(Command::new("show").arg(id_arg("Project id"))))
                .subcommand(
                    Command::new("edit")
                        .arg(id_arg("Project id"))
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("client").long("client"))
                        .arg(Arg::new("type").long("type"))
                        .arg(
                            Arg::new("status")
                                .long("status")
                                .help("planned|in_progress|completed|cancelled"),
                        )
                        .arg(Arg::new("total").long("total"))
                        .arg(Arg::new("description").long("description"))
                        .arg(Arg::new("phone").long("phone"))
                        .arg(Arg::new("email").long("email")),
                )
                .subcommand(Command::new("rm").arg(id_arg("Project id"))),
        )
        .subcommand(
            Command::new("tx")
                .about("Record and settle ledger entries")
                .subcommand(
                    Command::new("add")
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .required(true)
                                .help("debt|credit|payment_made|payment_received"),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("desc").long("desc").required(true))
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD[ HH:MM[:SS]]"))
                        .arg(
                            Arg::new("account")
                                .long("account")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(
                            Arg::new("project")
                                .long("project")
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(key_arg()),
                )
                .subcommand(json_flags(
                    Command::new("list").arg(
                        Arg::new("account")
                            .long("account")
                            .value_parser(value_parser!(i64)),
                    ),
                ))
                .subcommand(Command::new("rm").arg(id_arg("Transaction id")))
                .subcommand(
                    Command::new("pay")
                        .about("Pay part of an obligation")
                        .arg(
                            Arg::new("parent")
                                .long("parent")
                                .required(true)
                                .value_parser(value_parser!(i64)),
                        )
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(Arg::new("desc").long("desc").default_value(""))
                        .arg(Arg::new("date").long("date"))
                        .arg(key_arg()),
                )
                .subcommand(
                    Command::new("settle")
                        .about("Pay whatever is left on an obligation")
                        .arg(id_arg("Obligation id"))
                        .arg(Arg::new("date").long("date"))
                        .arg(key_arg()),
                )
                .subcommand(json_flags(Command::new("pending")))
                .subcommand(json_flags(
                    Command::new("recent")
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize))
                                .default_value("10"),
                        )
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .default_value("all")
                                .help("all|week|month|year|YYYY-MM"),
                        ),
                )),
        )
        .subcommand(
            Command::new("report")
                .about("Period reports")
                .subcommand(json_flags(
                    Command::new("monthly").arg(
                        Arg::new("year")
                            .long("year")
                            .required(true)
                            .value_parser(value_parser!(i32)),
                    ),
                ))
                .subcommand(json_flags(Command::new("stats"))),
        )
        .subcommand(
            Command::new("export").subcommand(
                Command::new("transactions")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .default_value("csv")
                            .help("csv|json"),
                    )
                    .arg(Arg::new("out").long("out").required(true))
                    .arg(
                        Arg::new("account")
                            .long("account")
                            .value_parser(value_parser!(i64)),
                    ),
            ),
        )
        .subcommand(Command::new("doctor").about("Check ledger invariants"))
}
