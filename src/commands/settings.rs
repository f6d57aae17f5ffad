// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::RateConfig;
use crate::store::{load_rate_config, require_user, save_rate_config};
use crate::utils::{fmt_rate, maybe_print_json, parse_bool, pretty_table, set_currency};
use crate::validate;
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => show(conn, sub)?,
        Some(("set", sub)) => set(conn, sub)?,
        Some(("currency", sub)) => {
            let ccy = sub
                .get_one::<String>("currency")
                .unwrap()
                .trim()
                .to_uppercase();
            set_currency(conn, &ccy)?;
            println!("Display currency set to {}", ccy);
        }
        _ => {}
    }
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let cfg = load_rate_config(conn, user.id)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cfg)? {
        println!(
            "{}",
            pretty_table(
                &["Initial rate", "Monthly rate", "Compound monthly"],
                vec![vec![
                    fmt_rate(&cfg.global_initial_interest_rate),
                    fmt_rate(&cfg.global_interest_rate),
                    cfg.global_compound_monthly.to_string(),
                ]],
            )
        );
    }
    Ok(())
}

fn set(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let initial = validate::rate(
        "Initial interest rate",
        sub.get_one::<String>("initial_rate").unwrap(),
    )?;
    let monthly = validate::rate(
        "Monthly interest rate",
        sub.get_one::<String>("monthly_rate").unwrap(),
    )?;
    let compound = match sub.get_one::<String>("compound_monthly") {
        Some(raw) => parse_bool(raw)?,
        None => load_rate_config(conn, user.id)?.global_compound_monthly,
    };
    let cfg = RateConfig {
        global_initial_interest_rate: initial,
        global_interest_rate: monthly,
        global_compound_monthly: compound,
    };
    save_rate_config(conn, user.id, &cfg)?;
    println!(
        "Global rates set: initial {}, monthly {}",
        fmt_rate(&initial),
        fmt_rate(&monthly)
    );
    Ok(())
}
