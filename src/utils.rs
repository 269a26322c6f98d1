// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::aggregate::MonthKey;
use crate::error::LedgerError;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, FixedOffset, Local, NaiveDate, TimeZone, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::Decimal;

static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D").unwrap());

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<MonthKey> {
    Ok(s.parse::<MonthKey>()?)
}

/// Reads an amount the way the entry form does: every non-digit is dropped,
/// so "100.000" and "$ 100.000" both mean 100000.
pub fn parse_amount(s: &str) -> Result<i64, LedgerError> {
    let digits = NON_DIGITS.replace_all(s, "");
    if digits.is_empty() {
        return Err(LedgerError::InvalidAmount(s.to_string()));
    }
    let amount = digits
        .parse::<i64>()
        .map_err(|_| LedgerError::InvalidAmount(s.to_string()))?;
    if amount == 0 {
        return Err(LedgerError::NonPositiveAmount(0));
    }
    Ok(amount)
}

/// "$100.000", "-$50.000". Dots group thousands regardless of locale.
pub fn fmt_money(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if amount < 0 {
        format!("-${}", grouped)
    } else {
        format!("${}", grouped)
    }
}

/// Axis label in thousands: 100000 -> "$100k", 12500 -> "$12.5k".
pub fn fmt_thousands(amount: i64) -> String {
    format!("${}k", Decimal::new(amount, 3).normalize())
}

/// "dd/mm/yyyy" for an epoch-millisecond timestamp read in `offset`.
pub fn fmt_date(millis: i64, offset: &FixedOffset) -> String {
    offset
        .timestamp_millis_opt(millis)
        .single()
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Epoch millis of local midnight of `date` in `offset`.
pub fn midnight_millis(date: NaiveDate, offset: &FixedOffset) -> Result<i64> {
    let naive = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow!("Invalid date {}", date))?;
    offset
        .from_local_datetime(&naive)
        .single()
        .map(|d| d.timestamp_millis())
        .ok_or_else(|| anyhow!("Date {} cannot be placed at offset {}", date, offset))
}

pub fn now_in(offset: &FixedOffset) -> DateTime<FixedOffset> {
    Utc::now().with_timezone(offset)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn parse_offset(s: &str) -> Result<FixedOffset> {
    s.trim()
        .parse::<FixedOffset>()
        .map_err(|e| anyhow!("Invalid UTC offset '{}', expected ±HH:MM ({})", s, e))
}

// Calendar settings
pub fn get_utc_offset(conn: &Connection) -> Result<FixedOffset> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='utc_offset'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    match v {
        Some(s) => parse_offset(&s),
        None => Ok(*Local::now().offset()),
    }
}

pub fn set_utc_offset(conn: &Connection, offset: &FixedOffset) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('utc_offset', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![offset.to_string()],
    )?;
    Ok(())
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
