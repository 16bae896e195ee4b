// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Savings goals: manual deposit/withdraw adjustments on the accumulated
//! amount. Deliberately decoupled from the transaction ledger; neither
//! bound (zero, target) is enforced, both are advisory for display.

use crate::error::{LedgerError, Result};
use crate::models::SavingsGoal;
use crate::utils::{parse_date, parse_datetime, parse_decimal};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct NewGoal {
    pub name: String,
    pub target_amount: Decimal,
    pub target_date: Option<NaiveDate>,
    pub account_id: Option<i64>,
}

pub fn create(conn: &Connection, new: &NewGoal) -> Result<SavingsGoal> {
    conn.execute(
        "INSERT INTO goals(name, target_amount, target_date, account_id) VALUES (?1, ?2, ?3, ?4)",
        params![
            new.name,
            new.target_amount.to_string(),
            new.target_date.map(|d| d.to_string()),
            new.account_id
        ],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<SavingsGoal> {
    let row = conn
        .query_row(
            "SELECT id, name, target_amount, current_amount, target_date, account_id, created_at, updated_at
             FROM goals WHERE id=?1",
            params![id],
            row_tuple,
        )
        .optional()?;
    match row {
        Some(raw) => decode(raw),
        None => Err(LedgerError::Reference(format!("goal {id} does not exist"))),
    }
}

pub fn list(conn: &Connection) -> Result<Vec<SavingsGoal>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, target_amount, current_amount, target_date, account_id, created_at, updated_at
         FROM goals ORDER BY name, id",
    )?;
    let rows = stmt.query_map([], row_tuple)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM goals WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::Reference(format!("goal {id} does not exist")));
    }
    Ok(())
}

/// Adds to the accumulated amount and touches `updated_at`.
pub fn deposit(conn: &Connection, goal: &mut SavingsGoal, amount: Decimal) -> Result<()> {
    ensure_positive(amount, "deposit")?;
    adjust(conn, goal, amount)
}

/// Subtracts from the accumulated amount. Not clamped at zero: a withdrawal
/// past the accumulated total leaves a negative amount.
pub fn withdraw(conn: &Connection, goal: &mut SavingsGoal, amount: Decimal) -> Result<()> {
    ensure_positive(amount, "withdrawal")?;
    adjust(conn, goal, -amount)
}

fn ensure_positive(amount: Decimal, what: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "{what} amount must be positive, got {amount}"
        )));
    }
    Ok(())
}

fn adjust(conn: &Connection, goal: &mut SavingsGoal, delta: Decimal) -> Result<()> {
    let new_amount = goal.current_amount + delta;
    let n = conn.execute(
        "UPDATE goals SET current_amount=?1, updated_at=datetime('now') WHERE id=?2",
        params![new_amount.to_string(), goal.id],
    )?;
    if n == 0 {
        return Err(LedgerError::Reference(format!(
            "goal {} does not exist",
            goal.id
        )));
    }
    let updated_at: String = conn.query_row(
        "SELECT updated_at FROM goals WHERE id=?1",
        params![goal.id],
        |r| r.get(0),
    )?;
    goal.current_amount = new_amount;
    goal.updated_at = parse_datetime(&updated_at)?;
    Ok(())
}

/// `current / target` as a ratio, 0 when there is no positive target.
/// Not clamped to [0, 1]; display layers clamp for progress bars.
pub fn progress(goal: &SavingsGoal) -> Decimal {
    if goal.target_amount > Decimal::ZERO {
        goal.current_amount / goal.target_amount
    } else {
        Decimal::ZERO
    }
}

/// Amount still to accumulate, floored at zero.
pub fn remaining(goal: &SavingsGoal) -> Decimal {
    (goal.target_amount - goal.current_amount).max(Decimal::ZERO)
}

type RawRow = (
    i64,
    String,
    String,
    String,
    Option<String>,
    Option<i64>,
    String,
    String,
);

fn row_tuple(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
        r.get(7)?,
    ))
}

fn decode(raw: RawRow) -> Result<SavingsGoal> {
    let (id, name, target, current, target_date, account_id, created_at, updated_at) = raw;
    Ok(SavingsGoal {
        id,
        name,
        target_amount: parse_decimal(&target)?,
        current_amount: parse_decimal(&current)?,
        target_date: target_date.as_deref().map(parse_date).transpose()?,
        account_id,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}
