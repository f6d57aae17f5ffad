// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accrual::{PortfolioTotals, summarize};
use crate::store::{load_loans, load_rate_config, require_user};
use crate::utils::{fmt_money, get_currency, maybe_print_json, pretty_table};
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let totals = dashboard_totals(conn, Utc::now().date_naive())?;
    if maybe_print_json(m.get_flag("json"), m.get_flag("jsonl"), &totals)? {
        return Ok(());
    }
    let ccy = get_currency(conn)?;
    let rows = vec![
        vec!["Active loans".to_string(), totals.active_loans.to_string()],
        vec![
            "Principal out".to_string(),
            fmt_money(&totals.total_principal, &ccy),
        ],
        vec![
            "Interest accrued".to_string(),
            fmt_money(&totals.total_interest, &ccy),
        ],
        vec!["Total owed".to_string(), fmt_money(&totals.total_value, &ccy)],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

/// Totals over the current user's active loans, valued with the rates saved right now.
pub fn dashboard_totals(conn: &Connection, as_of: NaiveDate) -> Result<PortfolioTotals> {
    let user = require_user(conn)?;
    let globals = load_rate_config(conn, user.id)?.rates();
    let records = load_loans(conn, user.id)?;
    Ok(summarize(records.iter().map(|r| &r.loan), globals, as_of))
}
