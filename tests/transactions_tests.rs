// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cajaclara::models::TxKind;
use cajaclara::session::{self, SessionContext};
use cajaclara::{cli, commands::transactions, db, store, utils};
use chrono::FixedOffset;
use rusqlite::Connection;

fn setup() -> (Connection, SessionContext) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    utils::set_utc_offset(&conn, &FixedOffset::east_opt(0).unwrap()).unwrap();
    session::register(&conn, "Ana", "ana@example.com").unwrap();
    let s = session::resolve(&conn, Some("ana@example.com")).unwrap();
    (conn, s)
}

fn run(conn: &Connection, s: &SessionContext, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["cajaclara", "tx"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        transactions::handle(conn, s, tx_m)
    } else {
        panic!("no tx subcommand");
    }
}

fn list_rows(conn: &Connection, s: &SessionContext, args: &[&str]) -> Vec<transactions::TransactionRow> {
    let mut argv = vec!["cajaclara", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            return transactions::query_rows(conn, s, list_m).unwrap();
        }
    }
    panic!("no tx list subcommand");
}

#[test]
fn add_parses_grouped_amounts() {
    let (conn, s) = setup();
    run(
        &conn,
        &s,
        &[
            "add", "--kind", "gasto", "--amount", "$ 30.000", "--category", "Proveedor",
            "--description", "  Harina  ", "--date", "2024-05-10",
        ],
    )
    .unwrap();

    let rows = list_rows(&conn, &s, &[]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, 30_000);
    assert_eq!(rows[0].kind, TxKind::Expense);
    assert_eq!(rows[0].description, "Harina");
    assert_eq!(rows[0].date, "10/05/2024");
}

#[test]
fn add_rejects_invalid_entries() {
    let (conn, s) = setup();
    let bad_category = run(
        &conn,
        &s,
        &["add", "--kind", "income", "--amount", "100", "--category", "Marketing"],
    );
    assert!(bad_category.is_err());
    let no_digits = run(
        &conn,
        &s,
        &["add", "--kind", "income", "--amount", "abc", "--category", "Transferencia"],
    );
    assert!(no_digits.is_err());
    let zero = run(
        &conn,
        &s,
        &["add", "--kind", "income", "--amount", "0", "--category", "Transferencia"],
    );
    assert!(zero.is_err());
    assert!(store::snapshot(&conn, s.user_id).unwrap().is_empty());
}

#[test]
fn list_limit_and_month_respected() {
    let (conn, s) = setup();
    for date in ["2024-05-01", "2024-05-02", "2024-05-03", "2024-04-30"] {
        run(
            &conn,
            &s,
            &[
                "add", "--kind", "expense", "--amount", "10", "--category", "Transporte",
                "--date", date,
            ],
        )
        .unwrap();
    }

    let rows = list_rows(&conn, &s, &["--limit", "2"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "03/05/2024");

    let april = list_rows(&conn, &s, &["--month", "2024-04"]);
    assert_eq!(april.len(), 1);
    assert_eq!(april[0].date, "30/04/2024");
}

#[test]
fn rm_deletes_only_own_rows() {
    let (conn, s) = setup();
    run(
        &conn,
        &s,
        &[
            "add", "--kind", "income", "--amount", "500", "--category", "Transferencia",
            "--date", "2024-05-01",
        ],
    )
    .unwrap();
    let id = list_rows(&conn, &s, &[])[0].id.to_string();

    session::register(&conn, "Bea", "bea@example.com").unwrap();
    let bea = session::resolve(&conn, Some("bea@example.com")).unwrap();
    assert!(run(&conn, &bea, &["rm", id.as_str()]).is_err());

    run(&conn, &s, &["rm", id.as_str()]).unwrap();
    assert!(list_rows(&conn, &s, &[]).is_empty());
    assert!(run(&conn, &s, &["rm", id.as_str()]).is_err());
}
