// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{require_user, reset_user};
use anyhow::{Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    if !m.get_flag("yes") {
        return Err(anyhow!(
            "Refusing to reset without --yes: this deletes every loan and customer"
        ));
    }
    let user = require_user(conn)?;
    reset_user(conn, user.id)?;
    println!("All loans and customers removed; rates restored to defaults");
    Ok(())
}
