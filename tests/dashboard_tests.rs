// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cajaclara::aggregate::aggregate;
use cajaclara::commands::dashboard::{self, Watch, render_text, share};
use cajaclara::models::{NewTransaction, TxKind};
use cajaclara::session::{self, SessionContext};
use cajaclara::{charts, cli, db, store, utils};
use chrono::{FixedOffset, NaiveDate, TimeZone};
use rusqlite::Connection;
use tempfile::tempdir;

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn setup() -> (Connection, SessionContext) {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    utils::set_utc_offset(&conn, &utc()).unwrap();
    session::register(&conn, "Ana", "ana@example.com").unwrap();
    let s = session::resolve(&conn, Some("ana@example.com")).unwrap();
    for (kind, amount, cat, day) in [
        (TxKind::Income, 100_000, "Venta al contado", 1),
        (TxKind::Expense, 30_000, "Proveedor", 10),
        (TxKind::Expense, 20_000, "Marketing", 15),
    ] {
        let entry = NewTransaction {
            kind,
            amount,
            category: cat.to_string(),
            description: None,
            occurred_on: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
        };
        store::append(&conn, s.user_id, &entry, &utc()).unwrap();
    }
    (conn, s)
}

#[test]
fn dashboard_writes_chart_page() {
    let (conn, s) = setup();
    let dir = tempdir().unwrap();
    let chart_path = dir.path().join("dashboard.html");
    let chart_str = chart_path.to_string_lossy().to_string();

    let matches = cli::build_cli().get_matches_from([
        "cajaclara",
        "dashboard",
        "--at",
        "2024-05-20",
        "--chart",
        &chart_str,
    ]);
    if let Some(("dashboard", sub)) = matches.subcommand() {
        dashboard::handle(&conn, &s, sub).unwrap();
    } else {
        panic!("no dashboard subcommand");
    }

    let html = std::fs::read_to_string(&chart_path).unwrap();
    assert!(html.contains("<title>CajaClara 2024-05</title>"));
    assert!(html.contains("series-chart"));
    assert!(html.contains("category-chart"));
    assert!(html.contains("Proveedor"));
}

#[test]
fn text_view_shows_totals_and_shares() {
    let (conn, s) = setup();
    let snapshot = store::snapshot(&conn, s.user_id).unwrap();
    let now = utc().with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
    let text = render_text(&aggregate(&snapshot, &now));

    assert!(text.contains("Resumen financiero 2024-05"));
    assert!(text.contains("$50.000"));
    assert!(text.contains("$100k"));
    assert!(text.contains("60%"));
    assert!(text.contains("40%"));
}

#[test]
fn text_view_without_expenses() {
    let now = utc().with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
    let d = aggregate(&[], &now);
    assert!(render_text(&d).contains("No hay gastos registrados este mes."));
    // Only the series chart is drawn when there is nothing to break down.
    assert_eq!(charts::dashboard_charts(&d).len(), 1);
}

#[test]
fn share_rounds_to_one_decimal() {
    assert_eq!(share(30_000, 50_000), "60%");
    assert_eq!(share(1, 3), "33.3%");
    assert_eq!(share(5, 0), "-");
}

fn dashboard_matches(argv: &[&str]) -> clap::ArgMatches {
    let mut full = vec!["cajaclara", "dashboard"];
    full.extend_from_slice(argv);
    let matches = cli::build_cli().get_matches_from(full);
    match matches.subcommand() {
        Some(("dashboard", sub)) => sub.clone(),
        _ => panic!("no dashboard subcommand"),
    }
}

#[test]
fn json_view_serializes_the_whole_dashboard() {
    let (conn, s) = setup();
    let sub = dashboard_matches(&["--at", "2024-05-20", "--json"]);
    dashboard::handle(&conn, &s, &sub).unwrap();

    let value = serde_json::to_value(dashboard::build(&conn, &s, &sub).unwrap()).unwrap();
    assert_eq!(value["period"]["year"], 2024);
    assert_eq!(value["period"]["month"], 5);
    assert_eq!(value["summary"]["balance"], 50_000);
    let series = value["series"].as_array().unwrap();
    assert_eq!(series.len(), 6);
    assert_eq!(series[5]["label"], "may");
    assert_eq!(value["categories"][0]["category"], "Proveedor");
    assert_eq!(value["skipped"], 0);
}

#[test]
fn watch_redraws_on_changes_and_month_rollover() {
    let (conn, s) = setup();
    let snapshot = store::snapshot(&conn, s.user_id).unwrap();
    let may_20 = utc().with_ymd_and_hms(2024, 5, 20, 12, 0, 0).unwrap();
    let mut watch = Watch::default();

    assert!(watch.update(&snapshot, &may_20).is_some());
    assert!(watch.update(&snapshot, &may_20).is_none());

    let later = utc().with_ymd_and_hms(2024, 5, 31, 23, 59, 0).unwrap();
    assert!(watch.update(&snapshot, &later).is_none());

    let june = utc().with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let d = watch.update(&snapshot, &june).unwrap();
    assert_eq!(d.period.to_string(), "2024-06");
    assert_eq!(d.summary.expense, 0);

    let mut grown = snapshot.clone();
    grown.pop();
    assert!(watch.update(&grown, &june).is_some());
}
