// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Domain errors for ledger entries and sessions.

use thiserror::Error;

/// Problems with a ledger entry or with the values used to query the ledger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("amount is missing")]
    MissingAmount,

    /// The amount text contained no digits at all.
    #[error("invalid amount '{0}', expected a whole number")]
    InvalidAmount(String),

    #[error("amount must be greater than zero, got {0}")]
    NonPositiveAmount(i64),

    #[error("kind is missing")]
    MissingKind,

    #[error("unknown kind '{0}', expected income or expense")]
    UnknownKind(String),

    /// The category is not part of the fixed set for the entry's kind.
    #[error("'{category}' is not a valid {kind} category")]
    UnknownCategory { kind: String, category: String },

    #[error("occurrence date is missing")]
    MissingDate,

    /// The timestamp cannot be represented as a calendar date.
    #[error("timestamp {0} is out of range")]
    TimestampOutOfRange(i64),

    #[error("invalid month '{0}', expected YYYY-MM")]
    InvalidMonth(String),

    /// Adding the row with this id would overflow a running total.
    #[error("transaction #{0} overflows the running total")]
    TotalOverflow(i64),
}

/// Problems resolving who is running a command and what they may do.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no active user, pass --user <EMAIL> or set CAJACLARA_USER")]
    NoUser,

    #[error("user '{0}' is not registered")]
    UnknownUser(String),

    #[error("account '{0}' is suspended")]
    Suspended(String),

    #[error("this command requires an administrator")]
    AdminRequired,

    #[error("administrators cannot suspend their own account")]
    SelfSuspension,

    #[error("administrators cannot delete their own account")]
    SelfDeletion,
}
