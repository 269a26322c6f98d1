// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Per-user ledger rows in SQLite.

use crate::aggregate::{MonthKey, month_of};
use crate::models::{NewTransaction, StoredTransaction, Transaction, TxKind};
use crate::utils::midnight_millis;
use anyhow::Result;
use chrono::FixedOffset;
use rusqlite::types::Value;
use rusqlite::{Connection, params};
use std::time::{Duration, Instant};

fn int_column(v: Value) -> Option<i64> {
    match v {
        Value::Integer(i) => Some(i),
        _ => None,
    }
}

fn text_column(v: Value) -> Option<String> {
    match v {
        Value::Text(s) => Some(s),
        _ => None,
    }
}

/// Point-in-time copy of every row owned by `user_id`, malformed ones included.
pub fn snapshot(conn: &Connection, user_id: i64) -> Result<Vec<StoredTransaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, amount, category, description, occurred_at, recorded_at
         FROM transactions WHERE user_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![user_id], |r| {
        Ok(StoredTransaction {
            id: r.get(0)?,
            kind: text_column(r.get(1)?),
            amount: int_column(r.get(2)?),
            category: text_column(r.get(3)?).unwrap_or_default(),
            description: text_column(r.get(4)?),
            occurred_at: int_column(r.get(5)?),
            recorded_at: text_column(r.get(6)?),
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    tracing::debug!(user_id, rows = data.len(), "snapshot fetched");
    Ok(data)
}

/// Validates and stores one entry dated at local midnight in `offset`.
pub fn append(
    conn: &Connection,
    user_id: i64,
    entry: &NewTransaction,
    offset: &FixedOffset,
) -> Result<i64> {
    entry.validate()?;
    let occurred_at = midnight_millis(entry.occurred_on, offset)?;
    conn.execute(
        "INSERT INTO transactions(user_id, kind, amount, category, description, occurred_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id,
            entry.kind.as_str(),
            entry.amount,
            entry.category,
            entry.description,
            occurred_at
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::info!(user_id, id, kind = %entry.kind, amount = entry.amount, "transaction recorded");
    Ok(id)
}

/// Returns false when `user_id` owns no row with that id.
pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<bool> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n > 0 {
        tracing::info!(user_id, id, "transaction deleted");
    }
    Ok(n > 0)
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub month: Option<MonthKey>,
    pub kind: Option<TxKind>,
    pub category: Option<String>,
    pub limit: Option<usize>,
}

/// Valid rows of `user_id` matching `filter`, newest first.
pub fn list(
    conn: &Connection,
    user_id: i64,
    filter: &ListFilter,
    offset: &FixedOffset,
) -> Result<Vec<Transaction>> {
    let mut data: Vec<Transaction> = snapshot(conn, user_id)?
        .iter()
        .filter_map(|row| Transaction::try_from(row).ok())
        .filter(|tx| filter.kind.is_none_or(|k| tx.kind == k))
        .filter(|tx| {
            filter
                .category
                .as_deref()
                .is_none_or(|c| tx.category == c)
        })
        .filter(|tx| {
            filter
                .month
                .is_none_or(|m| month_of(tx.occurred_at, offset).is_ok_and(|tm| tm == m))
        })
        .collect();
    data.sort_by(|a, b| {
        b.occurred_at
            .cmp(&a.occurred_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    if let Some(limit) = filter.limit {
        data.truncate(limit);
    }
    Ok(data)
}

fn data_version(conn: &Connection) -> rusqlite::Result<i64> {
    conn.query_row("PRAGMA data_version", [], |r| r.get(0))
}

/// Yields a full snapshot right away, then again whenever another connection
/// commits a change to the database.
///
/// Polls `PRAGMA data_version`, which does not move for writes made through
/// `conn` itself. With a [`heartbeat`](SnapshotFeed::heartbeat) the feed also
/// yields once that much time has passed without a change.
pub struct SnapshotFeed<'c> {
    conn: &'c Connection,
    user_id: i64,
    interval: Duration,
    heartbeat: Option<Duration>,
    seen: Option<i64>,
    last_yield: Option<Instant>,
}

impl<'c> SnapshotFeed<'c> {
    pub fn new(conn: &'c Connection, user_id: i64, interval: Duration) -> Self {
        SnapshotFeed {
            conn,
            user_id,
            interval,
            heartbeat: None,
            seen: None,
            last_yield: None,
        }
    }

    pub fn heartbeat(mut self, every: Duration) -> Self {
        self.heartbeat = Some(every);
        self
    }

    fn heartbeat_due(&self) -> bool {
        match (self.heartbeat, self.last_yield) {
            (Some(every), Some(at)) => at.elapsed() >= every,
            _ => false,
        }
    }
}

impl Iterator for SnapshotFeed<'_> {
    type Item = Result<Vec<StoredTransaction>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let version = match data_version(self.conn) {
                Ok(v) => v,
                Err(e) => return Some(Err(e.into())),
            };
            if self.seen != Some(version) || self.heartbeat_due() {
                self.seen = Some(version);
                self.last_yield = Some(Instant::now());
                return Some(snapshot(self.conn, self.user_id));
            }
            std::thread::sleep(self.interval);
        }
    }
}
