// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::AccountStatus;
use crate::session;
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user: Option<&str>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("register", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let email = sub.get_one::<String>("email").unwrap();
            let account = session::register(conn, name, email)?;
            println!(
                "Registered '{}' <{}> as {}",
                account.name,
                account.email,
                account.role.as_str()
            );
        }
        Some(("list", sub)) => {
            let session = session::resolve(conn, user)?;
            let data = session::list_users(conn, &session)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
                let rows = data
                    .into_iter()
                    .map(|u| {
                        vec![
                            u.name,
                            u.email,
                            u.role.as_str().to_string(),
                            u.status.as_str().to_string(),
                            u.created_at,
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Name", "Email", "Role", "Status", "Created"], rows)
                );
            }
        }
        Some(("status", sub)) => {
            let session = session::resolve(conn, user)?;
            let email = sub.get_one::<String>("email").unwrap();
            let status: AccountStatus = sub.get_one::<String>("status").unwrap().parse()?;
            let account = session::set_status(conn, &session, email, status)?;
            println!("Account '{}' is now {}", account.email, account.status.as_str());
        }
        Some(("rm", sub)) => {
            let session = session::resolve(conn, user)?;
            let email = sub.get_one::<String>("email").unwrap();
            let account = session::remove_user(conn, &session, email)?;
            println!("Deleted account '{}'", account.email);
        }
        _ => {}
    }
    Ok(())
}
