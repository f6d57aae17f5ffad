// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accrual::compute_accrual_as_of;
use crate::store::{load_loans, load_rate_config, require_user};
use anyhow::{Result, anyhow};
use chrono::{NaiveDate, Utc};
use log::info;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("loans", sub)) => export_loans(conn, sub, Utc::now().date_naive()),
        _ => Ok(()),
    }
}

/// Write every loan of the current user with its accrual as of `as_of`.
pub fn export_loans(conn: &Connection, sub: &clap::ArgMatches, as_of: NaiveDate) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        return Err(anyhow!("Unknown format: {} (use csv|json)", fmt));
    }

    let user = require_user(conn)?;
    let globals = load_rate_config(conn, user.id)?.rates();
    let records = load_loans(conn, user.id)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "customer",
                "start_date",
                "status",
                "interest_type",
                "rate_source",
                "principal",
                "effective_initial_rate",
                "effective_monthly_rate",
                "months_elapsed",
                "interest_accrued",
                "total_amount",
                "notes",
            ])?;
            for r in &records {
                let calc = compute_accrual_as_of(&r.loan, globals, as_of);
                wtr.write_record([
                    r.loan.id.to_string(),
                    r.customer.clone(),
                    r.loan.start_date.to_string(),
                    r.loan.status.to_string(),
                    r.loan.interest_type.to_string(),
                    r.loan.rate_source.label().to_string(),
                    r.loan.principal.to_string(),
                    calc.effective_initial_rate.to_string(),
                    calc.effective_monthly_rate.to_string(),
                    calc.months_elapsed.to_string(),
                    format!("{:.2}", calc.interest_accrued.round_dp(2)),
                    format!("{:.2}", calc.total_amount.round_dp(2)),
                    r.loan.notes.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let mut items = Vec::new();
            for r in &records {
                let calc = compute_accrual_as_of(&r.loan, globals, as_of);
                items.push(json!({
                    "id": r.loan.id,
                    "customer": r.customer,
                    "startDate": r.loan.start_date.to_string(),
                    "status": r.loan.status,
                    "interestType": r.loan.interest_type,
                    "isFixedRate": r.loan.rate_source.is_fixed(),
                    "principal": r.loan.principal.to_string(),
                    "effectiveInitialRate": calc.effective_initial_rate.to_string(),
                    "effectiveMonthlyRate": calc.effective_monthly_rate.to_string(),
                    "monthsElapsed": calc.months_elapsed,
                    "interestAccrued": format!("{:.2}", calc.interest_accrued.round_dp(2)),
                    "totalAmount": format!("{:.2}", calc.total_amount.round_dp(2)),
                    "notes": r.loan.notes,
                }));
            }
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    info!("exported {} loans as {}", records.len(), fmt);
    println!("Exported loans to {}", out);
    Ok(())
}
