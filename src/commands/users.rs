// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{create_user, require_user, set_current_user, user_by_email};
use crate::utils::{maybe_print_json, pretty_table};
use crate::validate;
use anyhow::{Result, anyhow};
use log::info;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("register", sub)) => {
            let name = validate::user_name(sub.get_one::<String>("name").unwrap())?;
            let email = validate::email(sub.get_one::<String>("email").unwrap())?;
            let user = create_user(conn, &name, &email)?;
            set_current_user(conn, Some(user.id))?;
            println!("Registered {} <{}> and logged in", user.name, user.email);
        }
        Some(("login", sub)) => {
            let email = validate::email(sub.get_one::<String>("email").unwrap())?;
            let user = user_by_email(conn, &email)?.ok_or_else(|| anyhow!("Invalid email"))?;
            set_current_user(conn, Some(user.id))?;
            info!("user {} logged in", user.id);
            println!("Logged in as {} <{}>", user.name, user.email);
        }
        Some(("logout", _)) => {
            set_current_user(conn, None)?;
            println!("Logged out");
        }
        Some(("whoami", sub)) => {
            let user = require_user(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &user)? {
                println!(
                    "{}",
                    pretty_table(
                        &["Id", "Name", "Email"],
                        vec![vec![user.id.to_string(), user.name, user.email]],
                    )
                );
            }
        }
        _ => {}
    }
    Ok(())
}
