// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{require_user, user_by_id};
use crate::utils::pretty_table;
use anyhow::{Result, anyhow};
use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension, params};

pub fn handle(conn: &Connection) -> Result<()> {
    let user = require_user(conn)?;
    let rows = diagnose(conn, user.id, Utc::now().date_naive())?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Findings for one user's data. Each finding is `[issue, detail]`.
pub fn diagnose(conn: &Connection, user_id: i64, today: NaiveDate) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Active loans dated in the future accrue nothing yet
    let mut stmt = conn.prepare(
        "SELECT id, start_date FROM loans
         WHERE user_id=?1 AND status='ACTIVE' AND start_date > ?2
         ORDER BY id",
    )?;
    let mut cur = stmt.query(params![user_id, today.to_string()])?;
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let d: String = r.get(1)?;
        rows.push(vec!["future_start_date".into(), format!("loan {} starts {}", id, d)]);
    }

    // 2) Customers left behind after their loans were deleted
    let mut stmt2 = conn.prepare(
        "SELECT c.name FROM customers c
         WHERE c.user_id=?1
           AND NOT EXISTS (SELECT 1 FROM loans l WHERE l.customer_id=c.id)
         ORDER BY c.name",
    )?;
    let mut cur2 = stmt2.query([user_id])?;
    while let Some(r) = cur2.next()? {
        let name: String = r.get(0)?;
        rows.push(vec!["customer_without_loans".into(), name]);
    }

    // 3) Running on implicit default rates
    let saved: Option<i64> = conn
        .query_row(
            "SELECT 1 FROM rate_settings WHERE user_id=?1",
            [user_id],
            |r| r.get(0),
        )
        .optional()?;
    if saved.is_none() {
        let user = user_by_id(conn, user_id)?.ok_or_else(|| anyhow!("Unknown user {}", user_id))?;
        rows.push(vec!["missing_rate_settings".into(), user.email]);
    }

    Ok(rows)
}
