// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Monthly aggregation of a ledger snapshot.
//!
//! Everything here is a pure function of a snapshot and a reference instant:
//! - [`aggregate`] builds the dashboard: current-month totals, the six-month
//!   trailing series and the expense breakdown by category.
//! - [`month_report`] builds the rows and totals of one explicit month for
//!   exporting.
//!
//! Calendar-month membership is decided in the time zone carried by the
//! reference instant. Rows that fail validation are skipped and counted, never
//! fatal.

use crate::error::LedgerError;
use crate::models::{StoredTransaction, Transaction, TxKind};
use chrono::{DateTime, Datelike, NaiveDate, TimeZone};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Number of buckets in the trailing series, current month included.
pub const TRAILING_MONTHS: usize = 6;

const MONTH_LABELS: [&str; 12] = [
    "ene", "feb", "mar", "abr", "may", "jun", "jul", "ago", "sept", "oct", "nov", "dic",
];

/// A calendar month. Orders chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Result<Self, LedgerError> {
        if !(1..=12).contains(&month) {
            return Err(LedgerError::InvalidMonth(format!("{:04}-{:02}", year, month)));
        }
        Ok(MonthKey { year, month })
    }

    pub fn of<D: Datelike>(date: &D) -> Self {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    /// 1 for January through 12 for December.
    pub fn month(self) -> u32 {
        self.month
    }

    /// The month before this one.
    pub fn pred(self) -> Self {
        if self.month == 1 {
            MonthKey {
                year: self.year - 1,
                month: 12,
            }
        } else {
            MonthKey {
                year: self.year,
                month: self.month - 1,
            }
        }
    }

    /// Short Spanish month name, as shown on chart axes.
    pub fn label(self) -> &'static str {
        MONTH_LABELS[(self.month - 1) as usize]
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map(|d| MonthKey::of(&d))
            .map_err(|_| LedgerError::InvalidMonth(s.to_string()))
    }
}

/// Calendar month an epoch-millisecond timestamp falls in, read in `tz`.
pub fn month_of<Tz: TimeZone>(millis: i64, tz: &Tz) -> Result<MonthKey, LedgerError> {
    tz.timestamp_millis_opt(millis)
        .single()
        .map(|dt| MonthKey::of(&dt))
        .ok_or(LedgerError::TimestampOutOfRange(millis))
}

/// Validates a stored row and places it in its calendar month.
fn classify<Tz: TimeZone>(
    row: &StoredTransaction,
    tz: &Tz,
) -> Result<(MonthKey, Transaction), LedgerError> {
    let tx = Transaction::try_from(row)?;
    let month = month_of(tx.occurred_at, tz)?;
    Ok((month, tx))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodSummary {
    pub income: i64,
    pub expense: i64,
    /// `income - expense`; negative when the month lost money.
    pub balance: i64,
}

impl PeriodSummary {
    /// The summary with `tx` added, or an error if a total would overflow.
    fn with(&self, tx: &Transaction) -> Result<Self, LedgerError> {
        let (income, expense) = add_by_kind((self.income, self.expense), tx)?;
        // Both totals are non-negative, so the difference always fits.
        Ok(PeriodSummary {
            income,
            expense,
            balance: income - expense,
        })
    }
}

fn checked_total(total: i64, tx: &Transaction) -> Result<i64, LedgerError> {
    total
        .checked_add(tx.amount)
        .ok_or(LedgerError::TotalOverflow(tx.id))
}

fn add_by_kind((income, expense): (i64, i64), tx: &Transaction) -> Result<(i64, i64), LedgerError> {
    match tx.kind {
        TxKind::Income => Ok((checked_total(income, tx)?, expense)),
        TxKind::Expense => Ok((income, checked_total(expense, tx)?)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub month: MonthKey,
    pub label: String,
    pub income: i64,
    pub expense: i64,
}

impl MonthBucket {
    fn empty(month: MonthKey) -> Self {
        MonthBucket {
            month,
            label: month.label().to_string(),
            income: 0,
            expense: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: i64,
}

/// Everything the dashboard shows for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    /// The month containing the reference instant.
    pub period: MonthKey,
    pub summary: PeriodSummary,
    /// Exactly [`TRAILING_MONTHS`] buckets, oldest first, ending at `period`.
    pub series: Vec<MonthBucket>,
    /// Expenses of `period` by category, largest first.
    pub categories: Vec<CategoryTotal>,
    /// Rows left out because they failed validation or would overflow a
    /// total.
    pub skipped: usize,
}

/// Rows and totals of one explicit month, newest row first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthReport {
    pub month: MonthKey,
    pub summary: PeriodSummary,
    pub rows: Vec<Transaction>,
    pub skipped: usize,
}

fn trailing_buckets(current: MonthKey) -> Vec<MonthBucket> {
    let mut months = Vec::with_capacity(TRAILING_MONTHS);
    let mut month = current;
    for _ in 0..TRAILING_MONTHS {
        months.push(month);
        month = month.pred();
    }
    months.into_iter().rev().map(MonthBucket::empty).collect()
}

/// Builds the dashboard for `records` as seen at `now`.
///
/// Only calendar-month membership matters: a future-dated row inside the
/// current month counts toward the current period, and rows outside the six
/// trailing months are ignored by the series.
pub fn aggregate<Tz: TimeZone>(records: &[StoredTransaction], now: &DateTime<Tz>) -> Dashboard {
    let tz = now.timezone();
    let period = MonthKey::of(now);
    let mut series = trailing_buckets(period);
    let mut summary = PeriodSummary::default();
    let mut by_category: BTreeMap<String, i64> = BTreeMap::new();
    let mut skipped = 0;

    for row in records {
        // Every total the row touches is checked before any is updated, so a
        // row that would overflow leaves no partial trace.
        let staged = classify(row, &tz).and_then(|(month, tx)| {
            let bucket = match series.iter().position(|b| b.month == month) {
                Some(i) => Some((i, add_by_kind((series[i].income, series[i].expense), &tx)?)),
                None => None,
            };
            let mut period_totals = None;
            if month == period {
                let category = match tx.kind {
                    TxKind::Expense => {
                        let so_far = by_category.get(&tx.category).copied().unwrap_or(0);
                        Some(checked_total(so_far, &tx)?)
                    }
                    TxKind::Income => None,
                };
                period_totals = Some((summary.with(&tx)?, category));
            }
            Ok((tx, bucket, period_totals))
        });

        let (tx, bucket, period_totals) = match staged {
            Ok(staged) => staged,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        if let Some((i, (income, expense))) = bucket {
            series[i].income = income;
            series[i].expense = expense;
        }
        if let Some((next, category)) = period_totals {
            summary = next;
            if let Some(amount) = category {
                by_category.insert(tx.category, amount);
            }
        }
    }

    let mut categories: Vec<CategoryTotal> = by_category
        .into_iter()
        .map(|(category, amount)| CategoryTotal { category, amount })
        .collect();
    // Stable sort keeps equal totals in category-name order.
    categories.sort_by(|a, b| b.amount.cmp(&a.amount));

    Dashboard {
        period,
        summary,
        series,
        categories,
        skipped,
    }
}

/// Collects the rows of `month` and their totals.
pub fn month_report<Tz: TimeZone>(
    records: &[StoredTransaction],
    month: MonthKey,
    tz: &Tz,
) -> MonthReport {
    let mut rows = Vec::new();
    let mut summary = PeriodSummary::default();
    let mut skipped = 0;

    for row in records {
        match classify(row, tz) {
            Ok((m, tx)) if m == month => match summary.with(&tx) {
                Ok(next) => {
                    summary = next;
                    rows.push(tx);
                }
                Err(_) => skipped += 1,
            },
            Ok(_) => {}
            Err(_) => skipped += 1,
        }
    }
    rows.sort_by(|a, b| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then_with(|| b.id.cmp(&a.id))
    });

    MonthReport {
        month,
        summary,
        rows,
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pred_wraps_into_previous_year() {
        let jan = MonthKey::new(2024, 1).unwrap();
        assert_eq!(jan.pred(), MonthKey::new(2023, 12).unwrap());
        assert_eq!(jan.pred().label(), "dic");
    }

    #[test]
    fn parses_and_displays_year_month() {
        let m: MonthKey = "2024-05".parse().unwrap();
        assert_eq!(m, MonthKey { year: 2024, month: 5 });
        assert_eq!(m.to_string(), "2024-05");
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!(MonthKey::new(2024, 0).is_err());
    }
}
