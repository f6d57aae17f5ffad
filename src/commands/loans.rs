// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accrual::compute_accrual_as_of;
use crate::models::{InterestType, LoanStatus, RateSource, Rates};
use crate::store::{
    LoanRecord, NewLoan, delete_loan, insert_loan, load_loans, load_rate_config, require_user,
    set_loan_status,
};
use crate::utils::{fmt_money, fmt_rate, get_currency, maybe_print_json, parse_id, pretty_table};
use crate::validate;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("status", sub)) => {
            let user = require_user(conn)?;
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            let status: LoanStatus = sub.get_one::<String>("status").unwrap().parse()?;
            set_loan_status(conn, user.id, id, status)?;
            println!("Loan {} marked {}", id, status);
        }
        Some(("rm", sub)) => {
            let user = require_user(conn)?;
            let id = parse_id(sub.get_one::<String>("id").unwrap())?;
            delete_loan(conn, user.id, id)?;
            println!("Removed loan {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let user = require_user(conn)?;
    let globals = load_rate_config(conn, user.id)?;

    let customer_name = validate::customer_name(sub.get_one::<String>("customer").unwrap())?;
    let principal = validate::principal(sub.get_one::<String>("principal").unwrap())?;
    let initial = match sub.get_one::<String>("initial_rate") {
        Some(raw) => validate::rate("Initial interest rate", raw)?,
        None => globals.global_initial_interest_rate,
    };
    let monthly = match sub.get_one::<String>("monthly_rate") {
        Some(raw) => validate::rate("Monthly interest rate", raw)?,
        None => globals.global_interest_rate,
    };
    let start_date = match sub.get_one::<String>("date") {
        Some(raw) => validate::start_date(raw)?,
        None => Utc::now().date_naive(),
    };
    let interest_type: InterestType = sub.get_one::<String>("type").unwrap().parse()?;
    let notes = validate::notes(
        sub.get_one::<String>("notes")
            .map(|s| s.as_str())
            .unwrap_or_default(),
    )?;
    // Explicit rates only make sense on a loan that keeps its own rates.
    let explicit_rates = sub.contains_id("initial_rate") || sub.contains_id("monthly_rate");
    let entered_rates = Rates::new(initial, monthly);
    let rate_source = if sub.get_flag("custom_rate") || explicit_rates {
        RateSource::Custom(entered_rates)
    } else {
        RateSource::Global
    };

    let new = NewLoan {
        customer_name,
        principal,
        rate_source,
        entered_rates,
        start_date,
        interest_type,
        notes,
    };
    let (customer, loan) = insert_loan(conn, user.id, &new)?;
    let ccy = get_currency(conn)?;
    println!(
        "Recorded loan {} of {} to '{}' on {} ({}, {} rates)",
        loan.id,
        fmt_money(&loan.principal, &ccy),
        customer.name,
        loan.start_date,
        loan.interest_type,
        loan.rate_source.label()
    );
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct LoanView {
    pub id: i64,
    pub customer: String,
    pub start_date: NaiveDate,
    pub status: LoanStatus,
    pub interest_type: InterestType,
    pub rate_source: &'static str,
    pub principal: Decimal,
    pub effective_initial_rate: Decimal,
    pub effective_monthly_rate: Decimal,
    pub months_elapsed: i64,
    pub interest_accrued: Decimal,
    pub total_amount: Decimal,
    pub notes: String,
}

/// Case-insensitive match on customer name or the start date text.
pub fn matches_search(record: &LoanRecord, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    let date_iso = record.loan.start_date.format("%Y-%m-%d").to_string();
    let date_long = record
        .loan
        .start_date
        .format("%-d %b %Y")
        .to_string()
        .to_lowercase();
    record.customer.to_lowercase().contains(&term)
        || date_iso.contains(&term)
        || date_long.contains(&term)
}

/// Loans of the current user valued as of `as_of`, filtered like `loan list`.
pub fn loan_views(
    conn: &Connection,
    sub: &clap::ArgMatches,
    as_of: NaiveDate,
) -> Result<Vec<LoanView>> {
    let user = require_user(conn)?;
    let globals = load_rate_config(conn, user.id)?.rates();
    let include_all = sub.get_flag("all");
    let search = sub.get_one::<String>("search");

    let views = load_loans(conn, user.id)?
        .into_iter()
        .filter(|r| include_all || r.loan.status == LoanStatus::Active)
        .filter(|r| search.is_none_or(|term| matches_search(r, term)))
        .map(|r| {
            let calc = compute_accrual_as_of(&r.loan, globals, as_of);
            LoanView {
                id: r.loan.id,
                customer: r.customer,
                start_date: r.loan.start_date,
                status: r.loan.status,
                interest_type: r.loan.interest_type,
                rate_source: r.loan.rate_source.label(),
                principal: r.loan.principal,
                effective_initial_rate: calc.effective_initial_rate,
                effective_monthly_rate: calc.effective_monthly_rate,
                months_elapsed: calc.months_elapsed,
                interest_accrued: calc.interest_accrued,
                total_amount: calc.total_amount,
                notes: r.loan.notes,
            }
        })
        .collect();
    Ok(views)
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = loan_views(conn, sub, Utc::now().date_naive())?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows: Vec<Vec<String>> = data
        .iter()
        .map(|v| {
            vec![
                v.id.to_string(),
                v.customer.clone(),
                v.start_date.to_string(),
                v.status.to_string(),
                v.interest_type.to_string(),
                format!(
                    "{} + {}/mo ({})",
                    fmt_rate(&v.effective_initial_rate),
                    fmt_rate(&v.effective_monthly_rate),
                    v.rate_source
                ),
                v.months_elapsed.to_string(),
                fmt_money(&v.principal, &ccy),
                fmt_money(&v.interest_accrued, &ccy),
                fmt_money(&v.total_amount, &ccy),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &[
                "Id", "Customer", "Start", "Status", "Type", "Rates", "Cycles", "Principal",
                "Interest", "Owed",
            ],
            rows,
        )
    );
    Ok(())
}
