// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! User-scoped record access: users, rate settings, customers and loans.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use log::{debug, info};
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Customer, InterestType, Loan, LoanStatus, RateConfig, RateSource, Rates, User};

const CURRENT_USER_KEY: &str = "current_user";

pub fn current_user_id(conn: &Connection) -> Result<Option<i64>> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![CURRENT_USER_KEY],
            |r| r.get(0),
        )
        .optional()?;
    match v {
        Some(s) => Ok(Some(
            s.parse::<i64>()
                .with_context(|| format!("Invalid current user id '{}'", s))?,
        )),
        None => Ok(None),
    }
}

/// The logged-in user, or an error telling the caller to log in.
pub fn require_user(conn: &Connection) -> Result<User> {
    let id = current_user_id(conn)?.ok_or_else(|| anyhow!("Not logged in"))?;
    user_by_id(conn, id)?.ok_or_else(|| anyhow!("Not logged in"))
}

pub fn set_current_user(conn: &Connection, user_id: Option<i64>) -> Result<()> {
    match user_id {
        Some(id) => {
            conn.execute(
                "INSERT INTO settings(key, value) VALUES(?1, ?2)
                 ON CONFLICT(key) DO UPDATE SET value=excluded.value",
                params![CURRENT_USER_KEY, id.to_string()],
            )?;
        }
        None => {
            conn.execute(
                "DELETE FROM settings WHERE key=?1",
                params![CURRENT_USER_KEY],
            )?;
        }
    }
    Ok(())
}

fn user_from_row(r: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: r.get(0)?,
        name: r.get(1)?,
        email: r.get(2)?,
    })
}

pub fn user_by_id(conn: &Connection, id: i64) -> Result<Option<User>> {
    Ok(conn
        .query_row(
            "SELECT id, name, email FROM users WHERE id=?1",
            params![id],
            user_from_row,
        )
        .optional()?)
}

pub fn user_by_email(conn: &Connection, email: &str) -> Result<Option<User>> {
    Ok(conn
        .query_row(
            "SELECT id, name, email FROM users WHERE email=?1",
            params![email],
            user_from_row,
        )
        .optional()?)
}

/// Create a user together with default rate settings. `name` and `email`
/// must already be validated; the email is expected lowercased.
pub fn create_user(conn: &mut Connection, name: &str, email: &str) -> Result<User> {
    if user_by_email(conn, email)?.is_some() {
        return Err(anyhow!("Email is already registered"));
    }
    let tx = conn.transaction()?;
    tx.execute(
        "INSERT INTO users(name, email) VALUES (?1, ?2)",
        params![name, email],
    )?;
    let id = tx.last_insert_rowid();
    write_rate_config(&tx, id, &RateConfig::default())?;
    tx.commit()?;
    info!("registered user {} <{}>", id, email);
    Ok(User {
        id,
        name: name.to_string(),
        email: email.to_string(),
    })
}

fn parse_stored_decimal(s: &str, what: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid stored {} '{}'", what, s))
}

/// Rate settings for `user_id`, falling back to the defaults when none are saved.
pub fn load_rate_config(conn: &Connection, user_id: i64) -> Result<RateConfig> {
    let row: Option<(String, String, bool)> = conn
        .query_row(
            "SELECT global_initial_interest_rate, global_interest_rate, global_compound_monthly
             FROM rate_settings WHERE user_id=?1",
            params![user_id],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    match row {
        Some((initial, monthly, compound)) => Ok(RateConfig {
            global_initial_interest_rate: parse_stored_decimal(&initial, "initial rate")?,
            global_interest_rate: parse_stored_decimal(&monthly, "monthly rate")?,
            global_compound_monthly: compound,
        }),
        None => Ok(RateConfig::default()),
    }
}

fn write_rate_config(conn: &Connection, user_id: i64, cfg: &RateConfig) -> Result<()> {
    conn.execute(
        "INSERT INTO rate_settings(user_id, global_initial_interest_rate, global_interest_rate, global_compound_monthly)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(user_id) DO UPDATE SET
            global_initial_interest_rate=excluded.global_initial_interest_rate,
            global_interest_rate=excluded.global_interest_rate,
            global_compound_monthly=excluded.global_compound_monthly",
        params![
            user_id,
            cfg.global_initial_interest_rate.to_string(),
            cfg.global_interest_rate.to_string(),
            cfg.global_compound_monthly
        ],
    )?;
    Ok(())
}

pub fn save_rate_config(conn: &Connection, user_id: i64, cfg: &RateConfig) -> Result<()> {
    write_rate_config(conn, user_id, cfg)?;
    debug!(
        "saved rate settings for user {}: initial={} monthly={} compound={}",
        user_id,
        cfg.global_initial_interest_rate,
        cfg.global_interest_rate,
        cfg.global_compound_monthly
    );
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct CustomerSummary {
    pub id: i64,
    pub name: String,
    pub notes: String,
    pub active_loans: i64,
}

pub fn list_customers(conn: &Connection, user_id: i64) -> Result<Vec<CustomerSummary>> {
    let mut stmt = conn.prepare(
        "SELECT c.id, c.name, c.notes,
                (SELECT COUNT(*) FROM loans l WHERE l.customer_id=c.id AND l.status='ACTIVE')
         FROM customers c WHERE c.user_id=?1
         ORDER BY c.created_at DESC, c.id DESC",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok(CustomerSummary {
            id: r.get(0)?,
            name: r.get(1)?,
            notes: r.get(2)?,
            active_loans: r.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Case-insensitive match on the user's customers, creating one if needed.
fn find_or_create_customer(conn: &Connection, user_id: i64, name: &str) -> Result<Customer> {
    let mut stmt = conn.prepare("SELECT id, name, notes FROM customers WHERE user_id=?1")?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok(Customer {
            id: r.get(0)?,
            name: r.get(1)?,
            notes: r.get(2)?,
        })
    })?;
    let wanted = name.to_lowercase();
    for row in rows {
        let c = row?;
        if c.name.to_lowercase() == wanted {
            return Ok(c);
        }
    }
    conn.execute(
        "INSERT INTO customers(user_id, name) VALUES (?1, ?2)",
        params![user_id, name],
    )?;
    let id = conn.last_insert_rowid();
    debug!("created customer {} '{}'", id, name);
    Ok(Customer {
        id,
        name: name.to_string(),
        notes: String::new(),
    })
}

/// A validated loan about to be recorded.
#[derive(Debug, Clone)]
pub struct NewLoan {
    pub customer_name: String,
    pub principal: Decimal,
    pub rate_source: RateSource,
    /// Rates entered with the loan. Written to the row as-is; a global-rate
    /// loan keeps them for reference only.
    pub entered_rates: Rates,
    pub start_date: NaiveDate,
    pub interest_type: InterestType,
    pub notes: String,
}

/// Record a loan in one transaction, reusing or creating its customer.
pub fn insert_loan(conn: &mut Connection, user_id: i64, new: &NewLoan) -> Result<(Customer, Loan)> {
    let tx = conn.transaction()?;
    let customer = find_or_create_customer(&tx, user_id, &new.customer_name)?;
    let stored = match new.rate_source {
        RateSource::Global => new.entered_rates,
        RateSource::Custom(rates) => rates,
    };
    tx.execute(
        "INSERT INTO loans(user_id, customer_id, principal, initial_interest_rate, interest_rate,
                           start_date, interest_type, is_fixed_rate, status, notes)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            user_id,
            customer.id,
            new.principal.to_string(),
            stored.initial.to_string(),
            stored.monthly.to_string(),
            new.start_date.to_string(),
            new.interest_type.as_str(),
            new.rate_source.is_fixed(),
            LoanStatus::Active.as_str(),
            new.notes
        ],
    )?;
    let id = tx.last_insert_rowid();
    tx.commit()?;
    info!(
        "recorded loan {} for customer '{}' ({} {})",
        id, customer.name, new.principal, new.interest_type
    );
    let loan = Loan {
        id,
        customer_id: customer.id,
        principal: new.principal,
        rate_source: new.rate_source,
        start_date: new.start_date,
        interest_type: new.interest_type,
        status: LoanStatus::Active,
        notes: new.notes.clone(),
    };
    Ok((customer, loan))
}

#[derive(Debug, Clone)]
pub struct LoanRecord {
    pub loan: Loan,
    pub customer: String,
}

const LOAN_SELECT: &str = "SELECT l.id, l.customer_id, l.principal, l.initial_interest_rate, l.interest_rate,
        l.start_date, l.interest_type, l.is_fixed_rate, l.status, l.notes, c.name
     FROM loans l JOIN customers c ON l.customer_id=c.id";

type RawLoan = (
    i64,
    i64,
    String,
    String,
    String,
    String,
    String,
    bool,
    String,
    String,
    String,
);

fn raw_loan(r: &Row<'_>) -> rusqlite::Result<RawLoan> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
        r.get(7)?,
        r.get(8)?,
        r.get(9)?,
        r.get(10)?,
    ))
}

fn loan_from_raw(raw: RawLoan) -> Result<LoanRecord> {
    let (id, customer_id, principal, initial, monthly, date, kind, fixed, status, notes, customer) =
        raw;
    // The stored rates of a fixed-rate loan are never read back.
    let rate_source = if fixed {
        RateSource::Global
    } else {
        RateSource::Custom(Rates::new(
            parse_stored_decimal(&initial, "initial rate")?,
            parse_stored_decimal(&monthly, "monthly rate")?,
        ))
    };
    let start_date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .with_context(|| format!("Invalid start date '{}' on loan {}", date, id))?;
    Ok(LoanRecord {
        loan: Loan {
            id,
            customer_id,
            principal: parse_stored_decimal(&principal, "principal")?,
            rate_source,
            start_date,
            interest_type: kind.parse()?,
            status: status.parse()?,
            notes,
        },
        customer,
    })
}

/// All loans of `user_id`, newest first.
pub fn load_loans(conn: &Connection, user_id: i64) -> Result<Vec<LoanRecord>> {
    let sql = format!("{LOAN_SELECT} WHERE l.user_id=?1 ORDER BY l.created_at DESC, l.id DESC");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id], raw_loan)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(loan_from_raw(row?)?);
    }
    Ok(out)
}

pub fn load_loan(conn: &Connection, user_id: i64, loan_id: i64) -> Result<Option<LoanRecord>> {
    let sql = format!("{LOAN_SELECT} WHERE l.user_id=?1 AND l.id=?2");
    let raw = conn
        .query_row(&sql, params![user_id, loan_id], raw_loan)
        .optional()?;
    raw.map(loan_from_raw).transpose()
}

pub fn set_loan_status(
    conn: &Connection,
    user_id: i64,
    loan_id: i64,
    status: LoanStatus,
) -> Result<()> {
    let n = conn.execute(
        "UPDATE loans SET status=?1 WHERE id=?2 AND user_id=?3",
        params![status.as_str(), loan_id, user_id],
    )?;
    if n == 0 {
        return Err(anyhow!("Loan not found"));
    }
    info!("loan {} marked {}", loan_id, status);
    Ok(())
}

pub fn delete_loan(conn: &Connection, user_id: i64, loan_id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM loans WHERE id=?1 AND user_id=?2",
        params![loan_id, user_id],
    )?;
    if n == 0 {
        return Err(anyhow!("Loan not found"));
    }
    info!("deleted loan {}", loan_id);
    Ok(())
}

/// Drop every loan and customer of `user_id` and restore default rate settings.
pub fn reset_user(conn: &mut Connection, user_id: i64) -> Result<()> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM loans WHERE user_id=?1", params![user_id])?;
    tx.execute("DELETE FROM customers WHERE user_id=?1", params![user_id])?;
    write_rate_config(&tx, user_id, &RateConfig::default())?;
    tx.commit()?;
    info!("reset data for user {}", user_id);
    Ok(())
}
