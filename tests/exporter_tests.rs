// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cajaclara::aggregate::{MonthKey, month_report};
use cajaclara::commands::exporter::{self, ROWS_PER_PAGE, render_report};
use cajaclara::models::{NewTransaction, TxKind};
use cajaclara::session::{self, SessionContext};
use cajaclara::{cli, db, store, utils};
use chrono::{FixedOffset, NaiveDate};
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn base_conn() -> (Connection, SessionContext) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    utils::set_utc_offset(&conn, &utc()).unwrap();
    session::register(&conn, "Ana", "ana@example.com").unwrap();
    let s = session::resolve(&conn, Some("ana@example.com")).unwrap();
    (conn, s)
}

fn add(conn: &Connection, s: &SessionContext, kind: TxKind, amount: i64, cat: &str, day: u32) {
    let entry = NewTransaction {
        kind,
        amount,
        category: cat.to_string(),
        description: if kind == TxKind::Income {
            Some("Venta mesón".to_string())
        } else {
            None
        },
        occurred_on: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
    };
    store::append(conn, s.user_id, &entry, &utc()).unwrap();
}

fn seeded() -> (Connection, SessionContext) {
    let (conn, s) = base_conn();
    add(&conn, &s, TxKind::Income, 100_000, "Venta al contado", 1);
    add(&conn, &s, TxKind::Expense, 30_000, "Proveedor", 10);
    add(&conn, &s, TxKind::Expense, 20_000, "Marketing", 15);
    (conn, s)
}

fn export(conn: &Connection, s: &SessionContext, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "cajaclara", "export", "month", "--month", "2024-05", "--format", format, "--out", out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, s, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_month_writes_csv_newest_first() {
    let (conn, s) = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("mayo.csv");
    export(&conn, &s, "csv", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(
        lines,
        vec![
            "Fecha,Tipo,Categoría,Descripción,Monto",
            "15/05/2024,Gasto,Marketing,,20000",
            "10/05/2024,Gasto,Proveedor,,30000",
            "01/05/2024,Ingreso,Venta al contado,Venta mesón,100000",
        ]
    );
}

#[test]
fn export_month_writes_json_with_summary() {
    let (conn, s) = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("mayo.json");
    export(&conn, &s, "JSON", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(parsed["month"], json!("2024-05"));
    assert_eq!(
        parsed["summary"],
        json!({"income": 100000, "expense": 50000, "balance": 50000})
    );
    assert_eq!(
        parsed["rows"][2],
        json!({
            "date": "01/05/2024",
            "kind": "income",
            "category": "Venta al contado",
            "description": "Venta mesón",
            "amount": 100000
        })
    );
}

#[test]
fn export_month_writes_report_document() {
    let (conn, s) = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("mayo.txt");
    export(&conn, &s, "report", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    assert!(contents.starts_with("Reporte Financiero CajaClara\nMes: 2024-05\n"));
    assert!(contents.contains("Ingresos Totales: $100.000"));
    assert!(contents.contains("Gastos Totales: $50.000"));
    assert!(contents.contains("Balance Final: $50.000"));
    assert!(contents.contains("Página 1/1"));
}

#[test]
fn report_paginates_long_months() {
    let (conn, s) = base_conn();
    for i in 0..(ROWS_PER_PAGE as i64 + 1) {
        add(&conn, &s, TxKind::Expense, 1_000 + i, "Transporte", 1 + (i as u32 % 28));
    }
    let snapshot = store::snapshot(&conn, s.user_id).unwrap();
    let report = month_report(&snapshot, MonthKey::new(2024, 5).unwrap(), &utc());
    let text = render_report(&report, &utc());

    assert_eq!(text.matches('\u{0C}').count(), 1);
    assert!(text.contains("Página 1/2"));
    assert!(text.contains("Página 2/2"));
}

#[test]
fn export_rejects_unknown_format() {
    let (conn, s) = seeded();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.xml");
    assert!(export(&conn, &s, "xml", &out_path.to_string_lossy()).is_err());
    assert!(!out_path.exists());
}

#[test]
fn export_rejects_empty_month() {
    let (conn, s) = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("vacío.csv");
    let err = export(&conn, &s, "csv", &out_path.to_string_lossy()).unwrap_err();
    assert!(err.to_string().contains("No transactions in 2024-05"));
    assert!(!out_path.exists());
}
