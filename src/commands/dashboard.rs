// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::{Dashboard, aggregate};
use crate::charts::{dashboard_charts, render_html};
use crate::models::StoredTransaction;
use crate::session::SessionContext;
use crate::store::{self, SnapshotFeed};
use crate::utils::{
    fmt_money, fmt_thousands, get_utc_offset, now_in, parse_date, pretty_table,
};
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset, TimeZone};
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::time::Duration;

/// How long `--watch` waits without a ledger change before rebuilding, so a
/// new month shows up even when nobody writes.
pub const PERIOD_CHECK: Duration = Duration::from_secs(60);

pub fn handle(conn: &Connection, session: &SessionContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let chart_path = sub.get_one::<String>("chart").map(String::as_str);

    if sub.get_flag("watch") {
        let offset = get_utc_offset(conn)?;
        let interval = Duration::from_millis(*sub.get_one::<u64>("interval-ms").unwrap_or(&1000));
        let feed = SnapshotFeed::new(conn, session.user_id, interval).heartbeat(PERIOD_CHECK);
        let mut watch = Watch::default();
        for snapshot in feed {
            let snapshot = snapshot?;
            let now = reference_instant(sub, &offset)?;
            if let Some(dashboard) = watch.update(&snapshot, &now) {
                tracing::debug!(rows = snapshot.len(), period = %dashboard.period, "dashboard refreshed");
                render(dashboard, json_flag, chart_path)?;
            }
        }
        return Ok(());
    }

    let dashboard = build(conn, session, sub)?;
    render(&dashboard, json_flag, chart_path)
}

/// The dashboard of the session's ledger at the instant selected by `sub`.
pub fn build(conn: &Connection, session: &SessionContext, sub: &clap::ArgMatches) -> Result<Dashboard> {
    let offset = get_utc_offset(conn)?;
    let now = reference_instant(sub, &offset)?;
    let snapshot = store::snapshot(conn, session.user_id)?;
    Ok(aggregate(&snapshot, &now))
}

/// Last dashboard shown by `--watch`. `None` until the first snapshot.
#[derive(Debug, Default)]
pub struct Watch {
    shown: Option<Dashboard>,
}

impl Watch {
    /// Rebuilds the dashboard and returns it only when it differs from the
    /// one on screen, including when `now` has moved into another month.
    pub fn update<Tz: TimeZone>(
        &mut self,
        snapshot: &[StoredTransaction],
        now: &DateTime<Tz>,
    ) -> Option<&Dashboard> {
        let dashboard = aggregate(snapshot, now);
        if self.shown.as_ref() == Some(&dashboard) {
            return None;
        }
        self.shown = Some(dashboard);
        self.shown.as_ref()
    }
}

/// `--at` is read as local noon of that day; without it, the current time.
fn reference_instant(sub: &clap::ArgMatches, offset: &FixedOffset) -> Result<DateTime<FixedOffset>> {
    match sub.get_one::<String>("at") {
        Some(s) => {
            let date = parse_date(s)?;
            let noon = date
                .and_hms_opt(12, 0, 0)
                .ok_or_else(|| anyhow!("Invalid date {}", date))?;
            offset
                .from_local_datetime(&noon)
                .single()
                .ok_or_else(|| anyhow!("Date {} cannot be placed at offset {}", date, offset))
        }
        None => Ok(now_in(offset)),
    }
}

fn render(dashboard: &Dashboard, json_flag: bool, chart_path: Option<&str>) -> Result<()> {
    if dashboard.skipped > 0 {
        tracing::warn!(skipped = dashboard.skipped, "malformed rows left out of the dashboard");
    }
    if let Some(path) = chart_path {
        let title = format!("CajaClara {}", dashboard.period);
        let html = render_html(&title, &dashboard_charts(dashboard));
        std::fs::write(path, html).with_context(|| format!("Write chart to {}", path))?;
    }
    if json_flag {
        println!("{}", serde_json::to_string_pretty(dashboard)?);
        return Ok(());
    }
    println!("{}", render_text(dashboard));
    Ok(())
}

/// Share of `amount` in `total` as a percentage with one decimal.
pub fn share(amount: i64, total: i64) -> String {
    if total == 0 {
        return "-".to_string();
    }
    let pct = Decimal::from(amount) * Decimal::ONE_HUNDRED / Decimal::from(total);
    format!("{}%", pct.round_dp(1).normalize())
}

pub fn render_text(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    out.push_str(&format!("Resumen financiero {}\n", dashboard.period));

    let s = &dashboard.summary;
    out.push_str(&format!(
        "{}\n",
        pretty_table(
            &["Balance del mes", "Ingresos", "Gastos"],
            vec![vec![
                fmt_money(s.balance),
                fmt_money(s.income),
                fmt_money(s.expense),
            ]],
        )
    ));

    out.push_str("Ingresos vs Gastos (6 meses)\n");
    let series_rows = dashboard
        .series
        .iter()
        .map(|b| {
            vec![
                format!("{} {}", b.label, b.month.year()),
                fmt_thousands(b.income),
                fmt_thousands(b.expense),
            ]
        })
        .collect();
    out.push_str(&format!(
        "{}\n",
        pretty_table(&["Mes", "Ingresos", "Gastos"], series_rows)
    ));

    out.push_str("Gastos por categoría (este mes)\n");
    if dashboard.categories.is_empty() {
        out.push_str("No hay gastos registrados este mes.");
    } else {
        let category_rows = dashboard
            .categories
            .iter()
            .map(|c| {
                vec![
                    c.category.clone(),
                    fmt_money(c.amount),
                    share(c.amount, s.expense),
                ]
            })
            .collect();
        out.push_str(&format!(
            "{}",
            pretty_table(&["Categoría", "Monto", "Participación"], category_rows)
        ));
    }
    out
}
