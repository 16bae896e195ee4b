// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget CRUD plus the progress aggregator. `calculate_progress` is pure:
//! the caller supplies the transaction set, nothing is persisted, and
//! degenerate inputs (zero or negative cap) produce well-defined output
//! instead of an error.

use crate::error::{LedgerError, Result};
use crate::ledger;
use crate::models::{Budget, Transaction};
use crate::utils::{parse_date, parse_datetime, parse_decimal};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Normal,
    Warning,
    Exceeded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetProgress {
    pub spent: Decimal,
    /// `spent / cap` as an exact ratio, not clamped; values above 1 are
    /// meaningful (overspend).
    pub percent: Decimal,
    /// May be negative once the cap is exceeded.
    pub remaining: Decimal,
    pub status: BudgetStatus,
}

/// Exact thresholds, evaluated in this order: >= 1.0 exceeded,
/// >= 0.8 warning, else normal.
pub fn classify(percent: Decimal) -> BudgetStatus {
    if percent >= Decimal::ONE {
        BudgetStatus::Exceeded
    } else if percent >= Decimal::new(8, 1) {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Normal
    }
}

/// Spend-to-date for a budget over the supplied transaction set.
///
/// A transaction counts iff it is an expense, its date falls within the
/// budget period inclusive, and the budget either has no category or the
/// categories match. A cap of zero (or less) uses divisor 1, so percent
/// equals spent.
pub fn calculate_progress(budget: &Budget, transactions: &[Transaction]) -> BudgetProgress {
    let spent: Decimal = transactions
        .iter()
        .filter(|t| {
            t.posting.is_expense()
                && t.date.date() >= budget.start
                && t.date.date() <= budget.end
                && budget.category_id.is_none_or(|c| t.category_id == Some(c))
        })
        .map(|t| t.amount)
        .sum();

    let divisor = if budget.amount > Decimal::ZERO {
        budget.amount
    } else {
        Decimal::ONE
    };
    let percent = spent / divisor;

    BudgetProgress {
        spent,
        percent,
        remaining: budget.amount - spent,
        status: classify(percent),
    }
}

/// Convenience for callers that hold only a store handle: loads the full
/// transaction set and delegates to the pure aggregator.
pub fn progress(conn: &Connection, budget: &Budget) -> Result<BudgetProgress> {
    let transactions = ledger::all(conn)?;
    Ok(calculate_progress(budget, &transactions))
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub category_id: Option<i64>,
    pub amount: Decimal,
    pub start: NaiveDate,
    pub end: NaiveDate,
}

pub fn create(conn: &Connection, new: &NewBudget) -> Result<Budget> {
    if new.end < new.start {
        return Err(LedgerError::Validation(format!(
            "budget period ends ({}) before it starts ({})",
            new.end, new.start
        )));
    }
    conn.execute(
        "INSERT INTO budgets(category_id, amount, start_date, end_date) VALUES (?1, ?2, ?3, ?4)",
        params![
            new.category_id,
            new.amount.to_string(),
            new.start.to_string(),
            new.end.to_string()
        ],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Budget> {
    let row = conn
        .query_row(
            "SELECT id, category_id, amount, start_date, end_date, created_at, updated_at
             FROM budgets WHERE id=?1",
            params![id],
            row_tuple,
        )
        .optional()?;
    match row {
        Some(raw) => decode(raw),
        None => Err(LedgerError::Reference(format!("budget {id} does not exist"))),
    }
}

pub fn list(conn: &Connection) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, category_id, amount, start_date, end_date, created_at, updated_at
         FROM budgets ORDER BY start_date DESC, id",
    )?;
    let rows = stmt.query_map([], row_tuple)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

pub fn update_amount(conn: &Connection, id: i64, amount: Decimal) -> Result<Budget> {
    let n = conn.execute(
        "UPDATE budgets SET amount=?1, updated_at=datetime('now') WHERE id=?2",
        params![amount.to_string(), id],
    )?;
    if n == 0 {
        return Err(LedgerError::Reference(format!("budget {id} does not exist")));
    }
    get(conn, id)
}

/// Removes the record only; transactions are never touched.
pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM budgets WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::Reference(format!("budget {id} does not exist")));
    }
    Ok(())
}

type RawRow = (i64, Option<i64>, String, String, String, String, String);

fn row_tuple(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((
        r.get(0)?,
        r.get(1)?,
        r.get(2)?,
        r.get(3)?,
        r.get(4)?,
        r.get(5)?,
        r.get(6)?,
    ))
}

fn decode(raw: RawRow) -> Result<Budget> {
    let (id, category_id, amount, start, end, created_at, updated_at) = raw;
    Ok(Budget {
        id,
        category_id,
        amount: parse_decimal(&amount)?,
        start: parse_date(&start)?,
        end: parse_date(&end)?,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
    })
}
