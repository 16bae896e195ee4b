// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Posts and reverses transactions against account balances. This module is
//! the only writer of `accounts.balance`; every mutation and the matching
//! transaction row are committed as one atomic unit, so a failed call leaves
//! no observable balance change.
//!
//! Mutating entry points take `&mut Connection`: a single writer at a time
//! is a borrow-check property, per the single-writer design.

use crate::error::{LedgerError, Result};
use crate::models::{NewTransaction, Posting, Transaction};
use crate::utils::{fmt_datetime, parse_datetime, parse_decimal};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;
use tracing::debug;

/// Validates and posts a transaction, applying its balance deltas:
/// expense debits the source, income credits the destination, transfer
/// moves the amount between two distinct accounts.
///
/// Fails closed: an unresolved account or category reference rejects the
/// whole post with `Reference` rather than skipping the balance update.
pub fn post(conn: &mut Connection, draft: NewTransaction) -> Result<Transaction> {
    if draft.amount <= Decimal::ZERO {
        return Err(LedgerError::Validation(format!(
            "amount must be positive, got {}",
            draft.amount
        )));
    }
    if let Posting::Transfer { source, target } = draft.posting {
        if source == target {
            return Err(LedgerError::Validation(
                "transfer source and target accounts must differ".into(),
            ));
        }
    }

    let tx = conn.transaction()?;

    if let Some(cid) = draft.category_id {
        let found: Option<i64> = tx
            .query_row("SELECT id FROM categories WHERE id=?1", params![cid], |r| {
                r.get(0)
            })
            .optional()?;
        if found.is_none() {
            return Err(LedgerError::Reference(format!(
                "category {cid} does not exist"
            )));
        }
    }

    let (source_id, target_id) = match draft.posting {
        Posting::Expense { source } => {
            apply_delta(&tx, source, -draft.amount)?;
            (Some(source), None)
        }
        Posting::Income { destination } => {
            apply_delta(&tx, destination, draft.amount)?;
            (None, Some(destination))
        }
        Posting::Transfer { source, target } => {
            apply_delta(&tx, source, -draft.amount)?;
            apply_delta(&tx, target, draft.amount)?;
            (Some(source), Some(target))
        }
    };

    tx.execute(
        "INSERT INTO transactions(date, kind, amount, source_account_id, target_account_id, category_id, note, mood)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            fmt_datetime(draft.date),
            draft.posting.kind(),
            draft.amount.to_string(),
            source_id,
            target_id,
            draft.category_id,
            draft.note,
            draft.mood
        ],
    )?;
    let id = tx.last_insert_rowid();
    let created_at: String = tx.query_row(
        "SELECT created_at FROM transactions WHERE id=?1",
        params![id],
        |r| r.get(0),
    )?;
    tx.commit()?;

    debug!(id, kind = draft.posting.kind(), "posted transaction");
    Ok(Transaction {
        id,
        date: draft.date,
        amount: draft.amount,
        posting: draft.posting,
        category_id: draft.category_id,
        note: draft.note,
        mood: draft.mood,
        created_at: parse_datetime(&created_at)?,
    })
}

/// Undoes a posted transaction's balance effect exactly, then deletes the
/// row. `reverse(post(t))` restores every touched balance bit-for-bit.
pub fn reverse(conn: &mut Connection, transaction: &Transaction) -> Result<()> {
    let tx = conn.transaction()?;

    let found: Option<i64> = tx
        .query_row(
            "SELECT id FROM transactions WHERE id=?1",
            params![transaction.id],
            |r| r.get(0),
        )
        .optional()?;
    if found.is_none() {
        return Err(LedgerError::Reference(format!(
            "transaction {} is not posted",
            transaction.id
        )));
    }

    match transaction.posting {
        Posting::Expense { source } => apply_delta(&tx, source, transaction.amount)?,
        Posting::Income { destination } => apply_delta(&tx, destination, -transaction.amount)?,
        Posting::Transfer { source, target } => {
            apply_delta(&tx, source, transaction.amount)?;
            apply_delta(&tx, target, -transaction.amount)?;
        }
    }

    tx.execute(
        "DELETE FROM transactions WHERE id=?1",
        params![transaction.id],
    )?;
    tx.commit()?;

    debug!(id = transaction.id, "reversed transaction");
    Ok(())
}

fn apply_delta(tx: &rusqlite::Transaction<'_>, account_id: i64, delta: Decimal) -> Result<()> {
    let balance: Option<String> = tx
        .query_row(
            "SELECT balance FROM accounts WHERE id=?1",
            params![account_id],
            |r| r.get(0),
        )
        .optional()?;
    let balance = balance.ok_or_else(|| {
        LedgerError::Reference(format!("account {account_id} does not exist"))
    })?;
    let new_balance = parse_decimal(&balance)? + delta;
    tx.execute(
        "UPDATE accounts SET balance=?1, updated_at=datetime('now') WHERE id=?2",
        params![new_balance.to_string(), account_id],
    )?;
    Ok(())
}

pub fn get(conn: &Connection, id: i64) -> Result<Transaction> {
    let row = conn
        .query_row(
            "SELECT id, date, kind, amount, source_account_id, target_account_id, category_id, note, mood, created_at
             FROM transactions WHERE id=?1",
            params![id],
            row_tuple,
        )
        .optional()?;
    match row {
        Some(raw) => decode(raw),
        None => Err(LedgerError::Reference(format!(
            "transaction {id} does not exist"
        ))),
    }
}

#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub account_id: Option<i64>,
    pub category_id: Option<i64>,
    pub limit: Option<usize>,
}

/// Lists transactions newest first, optionally filtered by inclusive date
/// range, touched account, or category.
pub fn list(conn: &Connection, filter: &TransactionFilter) -> Result<Vec<Transaction>> {
    let mut sql = String::from(
        "SELECT id, date, kind, amount, source_account_id, target_account_id, category_id, note, mood, created_at
         FROM transactions WHERE 1=1",
    );
    let mut params_vec: Vec<String> = Vec::new();

    if let Some(from) = filter.from {
        sql.push_str(" AND date >= ?");
        params_vec.push(format!("{from} 00:00:00"));
    }
    if let Some(to) = filter.to {
        sql.push_str(" AND date <= ?");
        params_vec.push(format!("{to} 23:59:59"));
    }
    if let Some(acct) = filter.account_id {
        sql.push_str(" AND (source_account_id = ? OR target_account_id = ?)");
        params_vec.push(acct.to_string());
        params_vec.push(acct.to_string());
    }
    if let Some(cat) = filter.category_id {
        sql.push_str(" AND category_id = ?");
        params_vec.push(cat.to_string());
    }
    sql.push_str(" ORDER BY date DESC, id DESC");
    if let Some(limit) = filter.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::ToSql> = params_vec
        .iter()
        .map(|s| s as &dyn rusqlite::ToSql)
        .collect();
    let rows = stmt.query_map(rusqlite::params_from_iter(params), row_tuple)?;

    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

/// Every recorded transaction, oldest first. This is the input set for
/// `budget::calculate_progress`.
pub fn all(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, kind, amount, source_account_id, target_account_id, category_id, note, mood, created_at
         FROM transactions ORDER BY date, id",
    )?;
    let rows = stmt.query_map([], row_tuple)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

pub fn count_for_account(conn: &Connection, account_id: i64) -> Result<i64> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE source_account_id=?1 OR target_account_id=?1",
        params![account_id],
        |r| r.get(0),
    )?;
    Ok(n)
}

type RawRow = (
    i64,
    String,
    String,
    String,
    Option<i64>,
    Option<i64>,
    Option<i64>,
    Option<String>,
    Option<String>,
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
        r.get(8)?,
        r.get(9)?,
    ))
}

fn decode(raw: RawRow) -> Result<Transaction> {
    let (id, date, kind, amount, source, target, category_id, note, mood, created_at) = raw;
    let posting = match kind.as_str() {
        "expense" => Posting::Expense {
            source: source.ok_or_else(|| corrupt(id, "expense without source account"))?,
        },
        "income" => Posting::Income {
            destination: target.ok_or_else(|| corrupt(id, "income without destination account"))?,
        },
        "transfer" => Posting::Transfer {
            source: source.ok_or_else(|| corrupt(id, "transfer without source account"))?,
            target: target.ok_or_else(|| corrupt(id, "transfer without target account"))?,
        },
        other => return Err(corrupt(id, &format!("unknown kind '{other}'"))),
    };
    Ok(Transaction {
        id,
        date: parse_datetime(&date)?,
        amount: parse_decimal(&amount)?,
        posting,
        category_id,
        note,
        mood,
        created_at: parse_datetime(&created_at)?,
    })
}

fn corrupt(id: i64, what: &str) -> LedgerError {
    LedgerError::Validation(format!("transaction {id}: {what}"))
}
