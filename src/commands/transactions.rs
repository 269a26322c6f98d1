// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{NewTransaction, TxKind};
use crate::session::SessionContext;
use crate::store::{self, ListFilter};
use crate::utils::{
    fmt_date, fmt_money, get_utc_offset, maybe_print_json, now_in, parse_amount, parse_date,
    parse_month, pretty_table,
};
use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;

pub fn handle(conn: &Connection, session: &SessionContext, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, session, sub)?,
        Some(("list", sub)) => list(conn, session, sub)?,
        Some(("rm", sub)) => rm(conn, session, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, session: &SessionContext, sub: &clap::ArgMatches) -> Result<()> {
    let offset = get_utc_offset(conn)?;
    let kind = sub.get_one::<String>("kind").unwrap().parse::<TxKind>()?;
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let category = sub.get_one::<String>("category").unwrap().trim().to_string();
    let description = sub
        .get_one::<String>("description")
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());
    let occurred_on = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => now_in(&offset).date_naive(),
    };

    let entry = NewTransaction {
        kind,
        amount,
        category,
        description,
        occurred_on,
    };
    let id = store::append(conn, session.user_id, &entry, &offset)?;
    println!(
        "Recorded {} {} on {} in '{}' (#{})",
        entry.kind.label(),
        fmt_money(entry.amount),
        entry.occurred_on,
        entry.category,
        id
    );
    Ok(())
}

fn list(conn: &Connection, session: &SessionContext, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, session, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        if data.is_empty() {
            println!("No hay transacciones.");
            return Ok(());
        }
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                let sign = if r.kind == TxKind::Income { "+" } else { "-" };
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.kind.label().to_string(),
                    r.category.clone(),
                    r.description.clone(),
                    format!("{}{}", sign, fmt_money(r.amount)),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Fecha", "Tipo", "Categoría", "Descripción", "Monto"],
                rows,
            )
        );
    }
    Ok(())
}

fn rm(conn: &Connection, session: &SessionContext, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    if !store::delete(conn, session.user_id, id)? {
        bail!("Transaction #{} not found", id);
    }
    println!("Deleted transaction #{}", id);
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub kind: TxKind,
    pub category: String,
    pub description: String,
    pub amount: i64,
}

pub fn query_rows(
    conn: &Connection,
    session: &SessionContext,
    sub: &clap::ArgMatches,
) -> Result<Vec<TransactionRow>> {
    let offset = get_utc_offset(conn)?;
    let filter = ListFilter {
        month: sub
            .get_one::<String>("month")
            .map(|m| parse_month(m))
            .transpose()?,
        kind: sub
            .get_one::<String>("kind")
            .map(|k| k.parse::<TxKind>())
            .transpose()?,
        category: sub.get_one::<String>("category").cloned(),
        limit: sub.get_one::<usize>("limit").copied(),
    };

    let data = store::list(conn, session.user_id, &filter, &offset)?
        .into_iter()
        .map(|tx| TransactionRow {
            id: tx.id,
            date: fmt_date(tx.occurred_at, &offset),
            kind: tx.kind,
            category: tx.category,
            description: tx.description.unwrap_or_default(),
            amount: tx.amount,
        })
        .collect();
    Ok(data)
}
