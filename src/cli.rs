// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, command};

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print as JSON lines"),
    )
}

fn loan_id_arg() -> Arg {
    Arg::new("id").long("id").required(true).help("Loan id")
}

pub fn build_cli() -> Command {
    command!()
        .name("loanbook")
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Path to the SQLite file (defaults to LOANBOOK_DB or the data dir)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::Count)
                .help("More log output (-v info, -vv debug)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("user")
                .about("Register and select the active user")
                .subcommand(
                    Command::new("register")
                        .arg(Arg::new("name").long("name").required(true))
                        .arg(Arg::new("email").long("email").required(true)),
                )
                .subcommand(
                    Command::new("login").arg(Arg::new("email").long("email").required(true)),
                )
                .subcommand(Command::new("logout"))
                .subcommand(json_args(Command::new("whoami"))),
        )
        .subcommand(
            Command::new("settings")
                .about("Global interest rates used by fixed-rate loans")
                .subcommand(json_args(Command::new("show")))
                .subcommand(
                    Command::new("set")
                        .arg(
                            Arg::new("initial_rate")
                                .long("initial-rate")
                                .required(true)
                                .help("Origination markup in percent"),
                        )
                        .arg(
                            Arg::new("monthly_rate")
                                .long("monthly-rate")
                                .required(true)
                                .help("Interest per 30-day cycle in percent"),
                        )
                        .arg(
                            Arg::new("compound_monthly")
                                .long("compound-monthly")
                                .help("true|false"),
                        ),
                )
                .subcommand(
                    Command::new("currency")
                        .about("Currency code used when printing amounts")
                        .arg(Arg::new("currency").required(true)),
                ),
        )
        .subcommand(
            Command::new("loan")
                .about("Record and inspect loans")
                .subcommand(
                    Command::new("add")
                        .arg(Arg::new("customer").long("customer").required(true))
                        .arg(Arg::new("principal").long("principal").required(true))
                        .arg(
                            Arg::new("initial_rate")
                                .long("initial-rate")
                                .help("Origination markup in percent; implies --custom-rate"),
                        )
                        .arg(
                            Arg::new("monthly_rate")
                                .long("monthly-rate")
                                .help("Interest per 30-day cycle in percent; implies --custom-rate"),
                        )
                        .arg(Arg::new("date").long("date").help("YYYY-MM-DD, defaults to today"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .default_value("compound")
                                .help("simple|compound"),
                        )
                        .arg(
                            Arg::new("custom_rate")
                                .long("custom-rate")
                                .action(ArgAction::SetTrue)
                                .help("Use this loan's own rates instead of the global settings"),
                        )
                        .arg(Arg::new("notes").long("notes")),
                )
                .subcommand(json_args(
                    Command::new("list")
                        .arg(
                            Arg::new("all")
                                .long("all")
                                .action(ArgAction::SetTrue)
                                .help("Include paid and defaulted loans"),
                        )
                        .arg(
                            Arg::new("search")
                                .long("search")
                                .help("Match customer name or start date"),
                        ),
                ))
                .subcommand(
                    Command::new("status")
                        .arg(loan_id_arg())
                        .arg(Arg::new("status").required(true).help("active|paid|defaulted")),
                )
                .subcommand(Command::new("rm").arg(loan_id_arg())),
        )
        .subcommand(
            Command::new("customer")
                .about("Customers of the current user")
                .subcommand(json_args(Command::new("list"))),
        )
        .subcommand(json_args(
            Command::new("dashboard").about("Totals across active loans"),
        ))
        .subcommand(
            Command::new("export").subcommand(
                Command::new("loans")
                    .arg(Arg::new("format").long("format").required(true).help("csv|json"))
                    .arg(Arg::new("out").long("out").required(true)),
            ),
        )
        .subcommand(
            Command::new("reset")
                .about("Delete all loans and customers and restore default rates")
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Confirm the reset"),
                ),
        )
        .subcommand(Command::new("doctor").about("Check the data for suspicious records"))
}
