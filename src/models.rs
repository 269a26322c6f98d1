// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const INCOME_CATEGORIES: [&str; 3] = ["Venta al contado", "Transferencia", "Otro ingreso"];

pub const EXPENSE_CATEGORIES: [&str; 7] = [
    "Proveedor",
    "Arriendo",
    "Servicios básicos",
    "Remuneraciones",
    "Marketing",
    "Transporte",
    "Otro gasto",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Income,
    Expense,
}

impl TxKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxKind::Income => "income",
            TxKind::Expense => "expense",
        }
    }

    /// Label used in exported documents.
    pub fn label(&self) -> &'static str {
        match self {
            TxKind::Income => "Ingreso",
            TxKind::Expense => "Gasto",
        }
    }

    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            TxKind::Income => &INCOME_CATEGORIES,
            TxKind::Expense => &EXPENSE_CATEGORIES,
        }
    }
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxKind {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "ingreso" => Ok(TxKind::Income),
            "expense" | "gasto" => Ok(TxKind::Expense),
            _ => Err(LedgerError::UnknownKind(s.to_string())),
        }
    }
}

/// A ledger row exactly as the store holds it.
///
/// Other writers share the store, so any of `kind`, `amount` or `occurred_at`
/// may be missing or hold a value of the wrong type. Rows are validated into
/// [`Transaction`] only when they are aggregated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub id: i64,
    pub kind: Option<String>,
    pub amount: Option<i64>,
    pub category: String,
    pub description: Option<String>,
    pub occurred_at: Option<i64>, // epoch millis
    pub recorded_at: Option<String>,
}

/// A validated ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transaction {
    pub id: i64,
    pub kind: TxKind,
    pub amount: i64,
    pub category: String,
    pub description: Option<String>,
    pub occurred_at: i64, // epoch millis
}

impl TryFrom<&StoredTransaction> for Transaction {
    type Error = LedgerError;

    fn try_from(row: &StoredTransaction) -> Result<Self, Self::Error> {
        let kind = row
            .kind
            .as_deref()
            .ok_or(LedgerError::MissingKind)?
            .parse::<TxKind>()?;
        let amount = row.amount.ok_or(LedgerError::MissingAmount)?;
        if amount <= 0 {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        let occurred_at = row.occurred_at.ok_or(LedgerError::MissingDate)?;
        Ok(Transaction {
            id: row.id,
            kind,
            amount,
            category: row.category.clone(),
            description: row.description.clone(),
            occurred_at,
        })
    }
}

/// One submission of the entry form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub kind: TxKind,
    pub amount: i64,
    pub category: String,
    pub description: Option<String>,
    pub occurred_on: NaiveDate,
}

impl NewTransaction {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.amount <= 0 {
            return Err(LedgerError::NonPositiveAmount(self.amount));
        }
        if !self.kind.categories().contains(&self.category.as_str()) {
            return Err(LedgerError::UnknownCategory {
                kind: self.kind.to_string(),
                category: self.category.clone(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "user" => Ok(Role::User),
            other => Err(anyhow::anyhow!("Unknown role '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Suspended,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Suspended => "suspended",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "suspended" => Ok(AccountStatus::Suspended),
            other => Err(anyhow::anyhow!("Unknown account status '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: AccountStatus,
    pub created_at: String,
}
