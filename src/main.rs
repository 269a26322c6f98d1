// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use cajaclara::{cli, commands, db, logging, session};

fn main() -> Result<()> {
    logging::init();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init()?;
    let user = matches.get_one::<String>("user").map(String::as_str);

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", db::db_path()?.display());
        }
        Some(("user", sub)) => commands::users::handle(&conn, user, sub)?,
        Some(("category", sub)) => commands::categories::handle(sub)?,
        Some(("config", sub)) => commands::settings::handle(&conn, user, sub)?,
        Some(("tx", sub)) => {
            let session = session::resolve(&conn, user)?;
            commands::transactions::handle(&conn, &session, sub)?
        }
        Some(("dashboard", sub)) => {
            let session = session::resolve(&conn, user)?;
            commands::dashboard::handle(&conn, &session, sub)?
        }
        Some(("export", sub)) => {
            let session = session::resolve(&conn, user)?;
            commands::exporter::handle(&conn, &session, sub)?
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
