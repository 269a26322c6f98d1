// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Who is running a command, and the user registry behind it.
//!
//! A [`SessionContext`] is resolved once in `main` and handed to every
//! command; nothing reads the active user from global state.

use crate::error::SessionError;
use crate::models::{AccountStatus, Role, UserAccount};
use anyhow::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: i64,
    pub role: Role,
}

impl SessionContext {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> Result<(), SessionError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(SessionError::AdminRequired)
        }
    }
}

fn account_from_row(r: &Row<'_>) -> rusqlite::Result<UserAccount> {
    let role: String = r.get(3)?;
    let status: String = r.get(4)?;
    let invalid = |idx: usize, e: anyhow::Error| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into())
    };
    Ok(UserAccount {
        id: r.get(0)?,
        name: r.get(1)?,
        email: r.get(2)?,
        role: role.parse().map_err(|e| invalid(3, e))?,
        status: status.parse().map_err(|e| invalid(4, e))?,
        created_at: r.get(5)?,
    })
}

pub fn find_by_email(conn: &Connection, email: &str) -> Result<Option<UserAccount>> {
    let account = conn
        .query_row(
            "SELECT id, name, email, role, status, created_at FROM users WHERE email=?1",
            params![email.trim().to_lowercase()],
            account_from_row,
        )
        .optional()?;
    Ok(account)
}

/// Resolves the session for `email`. Suspended accounts get no session.
pub fn resolve(conn: &Connection, email: Option<&str>) -> Result<SessionContext> {
    let email = email
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .ok_or(SessionError::NoUser)?;
    let account =
        find_by_email(conn, email)?.ok_or_else(|| SessionError::UnknownUser(email.to_string()))?;
    if account.status == AccountStatus::Suspended {
        return Err(SessionError::Suspended(account.email).into());
    }
    tracing::debug!(user_id = account.id, role = account.role.as_str(), "session resolved");
    Ok(SessionContext {
        user_id: account.id,
        role: account.role,
    })
}

/// Creates an active account. The first account of an installation becomes
/// its administrator; every later one is a plain user.
pub fn register(conn: &Connection, name: &str, email: &str) -> Result<UserAccount> {
    let email = email.trim().to_lowercase();
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))?;
    let role = if existing == 0 { Role::Admin } else { Role::User };
    conn.execute(
        "INSERT INTO users(name, email, role, status) VALUES (?1, ?2, ?3, 'active')",
        params![name.trim(), email, role.as_str()],
    )
    .with_context(|| format!("Register user '{}'", email))?;
    tracing::info!(email = %email, role = role.as_str(), "user registered");
    find_by_email(conn, &email)?.context("Registered user vanished")
}

pub fn list_users(conn: &Connection, session: &SessionContext) -> Result<Vec<UserAccount>> {
    session.require_admin()?;
    let mut stmt = conn
        .prepare("SELECT id, name, email, role, status, created_at FROM users ORDER BY name")?;
    let rows = stmt.query_map([], account_from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn set_status(
    conn: &Connection,
    session: &SessionContext,
    email: &str,
    status: AccountStatus,
) -> Result<UserAccount> {
    session.require_admin()?;
    let account =
        find_by_email(conn, email)?.ok_or_else(|| SessionError::UnknownUser(email.to_string()))?;
    if account.id == session.user_id && status == AccountStatus::Suspended {
        return Err(SessionError::SelfSuspension.into());
    }
    conn.execute(
        "UPDATE users SET status=?1 WHERE id=?2",
        params![status.as_str(), account.id],
    )?;
    tracing::info!(email = %account.email, status = status.as_str(), "account status changed");
    Ok(UserAccount { status, ..account })
}

/// Deletes an account. Its transactions go with it through the
/// `ON DELETE CASCADE` on `transactions.user_id`.
pub fn remove_user(conn: &Connection, session: &SessionContext, email: &str) -> Result<UserAccount> {
    session.require_admin()?;
    let account =
        find_by_email(conn, email)?.ok_or_else(|| SessionError::UnknownUser(email.to_string()))?;
    if account.id == session.user_id {
        return Err(SessionError::SelfDeletion.into());
    }
    conn.execute("DELETE FROM users WHERE id=?1", params![account.id])?;
    tracing::info!(email = %account.email, "user deleted");
    Ok(account)
}
