// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{MonthKey, MonthReport, month_report};
use crate::session::SessionContext;
use crate::store;
use crate::utils::{fmt_date, fmt_money, get_utc_offset, now_in, parse_month, pretty_table};
use anyhow::{Context, Result, bail};
use chrono::FixedOffset;
use rusqlite::Connection;
use serde_json::json;

/// Table rows per page of the text report.
pub const ROWS_PER_PAGE: usize = 40;

const CSV_HEADERS: [&str; 5] = ["Fecha", "Tipo", "Categoría", "Descripción", "Monto"];

pub fn handle(conn: &Connection, session: &SessionContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("month", sub)) => export_month(conn, session, sub),
        _ => Ok(()),
    }
}

fn export_month(conn: &Connection, session: &SessionContext, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    if !matches!(fmt.as_str(), "csv" | "json" | "report") {
        bail!("Unknown format: {} (use csv|json|report)", fmt);
    }

    let offset = get_utc_offset(conn)?;
    let month = match sub.get_one::<String>("month") {
        Some(m) => parse_month(m)?,
        None => MonthKey::of(&now_in(&offset)),
    };
    let snapshot = store::snapshot(conn, session.user_id)?;
    let report = month_report(&snapshot, month, &offset);
    if report.skipped > 0 {
        tracing::warn!(skipped = report.skipped, "malformed rows left out of the export");
    }
    if report.rows.is_empty() {
        bail!("No transactions in {}", month);
    }

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out).with_context(|| format!("Create {}", out))?;
            wtr.write_record(CSV_HEADERS)?;
            for tx in &report.rows {
                wtr.write_record([
                    fmt_date(tx.occurred_at, &offset),
                    tx.kind.label().to_string(),
                    tx.category.clone(),
                    tx.description.clone().unwrap_or_default(),
                    tx.amount.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let rows: Vec<_> = report
                .rows
                .iter()
                .map(|tx| {
                    json!({
                        "date": fmt_date(tx.occurred_at, &offset),
                        "kind": tx.kind,
                        "category": tx.category,
                        "description": tx.description,
                        "amount": tx.amount,
                    })
                })
                .collect();
            let doc = json!({
                "month": report.month.to_string(),
                "summary": report.summary,
                "rows": rows,
            });
            std::fs::write(out, serde_json::to_string_pretty(&doc)?)?;
        }
        _ => {
            std::fs::write(out, render_report(&report, &offset))?;
        }
    }
    tracing::info!(month = %month, rows = report.rows.len(), format = %fmt, "month exported");
    println!("Exported {} transactions of {} to {}", report.rows.len(), month, out);
    Ok(())
}

/// Plain-text financial report: title, totals, then the rows paginated at
/// [`ROWS_PER_PAGE`] with a form feed between pages.
pub fn render_report(report: &MonthReport, offset: &FixedOffset) -> String {
    let mut out = String::new();
    out.push_str("Reporte Financiero CajaClara\n");
    out.push_str(&format!("Mes: {}\n\n", report.month));
    out.push_str(&format!(
        "Ingresos Totales: {}\n",
        fmt_money(report.summary.income)
    ));
    out.push_str(&format!(
        "Gastos Totales: {}\n",
        fmt_money(report.summary.expense)
    ));
    out.push_str(&format!(
        "Balance Final: {}\n\n",
        fmt_money(report.summary.balance)
    ));

    let pages: Vec<_> = report.rows.chunks(ROWS_PER_PAGE).collect();
    let total = pages.len();
    for (i, page) in pages.into_iter().enumerate() {
        if i > 0 {
            out.push('\u{0C}');
        }
        let rows = page
            .iter()
            .map(|tx| {
                vec![
                    fmt_date(tx.occurred_at, offset),
                    tx.kind.label().to_string(),
                    tx.category.clone(),
                    tx.description
                        .clone()
                        .filter(|d| !d.is_empty())
                        .unwrap_or_else(|| "-".to_string()),
                    fmt_money(tx.amount),
                ]
            })
            .collect();
        out.push_str(&format!("{}\n", pretty_table(&CSV_HEADERS, rows)));
        out.push_str(&format!("Página {}/{}\n", i + 1, total));
    }
    out
}
