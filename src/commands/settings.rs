// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::db;
use crate::session;
use crate::utils::{get_utc_offset, parse_offset, pretty_table, set_utc_offset};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, user: Option<&str>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", _)) => {
            let offset = get_utc_offset(conn)?;
            let rows = vec![
                vec!["database".to_string(), db::db_path()?.display().to_string()],
                vec!["utc_offset".to_string(), offset.to_string()],
            ];
            println!("{}", pretty_table(&["Setting", "Value"], rows));
        }
        Some(("set-offset", sub)) => {
            let session = session::resolve(conn, user)?;
            session.require_admin()?;
            let offset = parse_offset(sub.get_one::<String>("offset").unwrap())?;
            set_utc_offset(conn, &offset)?;
            tracing::info!(offset = %offset, "utc offset updated");
            println!("UTC offset set to {}", offset);
        }
        _ => {}
    }
    Ok(())
}
