// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{list_customers, require_user};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    if let Some(("list", sub)) = m.subcommand() {
        let user = require_user(conn)?;
        let data = list_customers(conn, user.id)?;
        if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
            let rows = data
                .into_iter()
                .map(|c| vec![c.id.to_string(), c.name, c.active_loans.to_string(), c.notes])
                .collect();
            println!(
                "{}",
                pretty_table(&["Id", "Customer", "Active loans", "Notes"], rows)
            );
        }
    }
    Ok(())
}
