// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Account CRUD. Balances are owned by the ledger: nothing here writes
//! `balance` after creation; user corrections are posted as transactions
//! so the posting invariant holds.

use crate::error::{LedgerError, Result};
use crate::ledger;
use crate::models::{Account, AccountKind, NewTransaction, Posting, Transaction};
use crate::utils::{get_default_currency, parse_datetime, parse_decimal};
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub kind: AccountKind,
    /// Opening balance, recorded at creation before any postings.
    pub balance: Decimal,
    /// Falls back to the store's default currency.
    pub currency: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub credit_limit: Option<Decimal>,
    pub sort_order: i64,
}

pub fn create(conn: &Connection, new: &NewAccount) -> Result<Account> {
    let currency = match &new.currency {
        Some(c) => c.to_uppercase(),
        None => get_default_currency(conn)?,
    };
    conn.execute(
        "INSERT INTO accounts(name, kind, balance, currency, icon, color, credit_limit, sort_order)
         VALUES (?1, ?2, ?3, ?4,
                 COALESCE(?5, 'creditcard'), COALESCE(?6, '#007AFF'),
                 ?7, ?8)",
        params![
            new.name,
            new.kind.as_str(),
            new.balance.to_string(),
            currency,
            new.icon,
            new.color,
            new.credit_limit.map(|l| l.to_string()),
            new.sort_order
        ],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Account> {
    let row = conn
        .query_row(
            "SELECT id, name, kind, balance, currency, icon, color, credit_limit, sort_order, created_at, updated_at
             FROM accounts WHERE id=?1",
            params![id],
            row_tuple,
        )
        .optional()?;
    match row {
        Some(raw) => decode(raw),
        None => Err(LedgerError::Reference(format!(
            "account {id} does not exist"
        ))),
    }
}

pub fn list(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, kind, balance, currency, icon, color, credit_limit, sort_order, created_at, updated_at
         FROM accounts ORDER BY sort_order, name",
    )?;
    let rows = stmt.query_map([], row_tuple)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

/// Updates display metadata and limits. Balance is intentionally not
/// settable here; use `correct_balance`.
pub fn update_metadata(conn: &Connection, account: &Account) -> Result<Account> {
    let n = conn.execute(
        "UPDATE accounts SET name=?1, icon=?2, color=?3, credit_limit=?4, sort_order=?5,
                             currency=?6, updated_at=datetime('now')
         WHERE id=?7",
        params![
            account.name,
            account.icon,
            account.color,
            account.credit_limit.map(|l| l.to_string()),
            account.sort_order,
            account.currency,
            account.id
        ],
    )?;
    if n == 0 {
        return Err(LedgerError::Reference(format!(
            "account {} does not exist",
            account.id
        )));
    }
    get(conn, account.id)
}

/// Deletion is rejected while any transaction still references the
/// account; callers must reverse or reassign that history first.
pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let referenced = ledger::count_for_account(conn, id)?;
    if referenced > 0 {
        return Err(LedgerError::Validation(format!(
            "account {id} still has {referenced} transactions"
        )));
    }
    let n = conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::Reference(format!(
            "account {id} does not exist"
        )));
    }
    Ok(())
}

/// Brings the balance to `new_balance` by posting the difference as an
/// income or expense, so the correction shows up in the transaction log
/// like any other movement. Returns the posted correction, or `None` when
/// the balance already matches.
pub fn correct_balance(
    conn: &mut Connection,
    account_id: i64,
    new_balance: Decimal,
) -> Result<Option<Transaction>> {
    let account = get(conn, account_id)?;
    let diff = new_balance - account.balance;
    if diff == Decimal::ZERO {
        return Ok(None);
    }
    let posting = if diff > Decimal::ZERO {
        Posting::Income {
            destination: account_id,
        }
    } else {
        Posting::Expense {
            source: account_id,
        }
    };
    let posted = ledger::post(
        conn,
        NewTransaction {
            date: Local::now().naive_local(),
            amount: diff.abs(),
            posting,
            category_id: None,
            note: Some("Balance correction".to_string()),
            mood: None,
        },
    )?;
    Ok(Some(posted))
}

type RawRow = (
    i64,
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    i64,
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
        r.get(8)?,
        r.get(9)?,
        r.get(10)?,
    ))
}

fn decode(raw: RawRow) -> Result<Account> {
    let (id, name, kind, balance, currency, icon, color, credit_limit, sort_order, created, updated) =
        raw;
    let kind = AccountKind::parse(&kind)
        .ok_or_else(|| LedgerError::Validation(format!("account {id}: unknown kind '{kind}'")))?;
    Ok(Account {
        id,
        name,
        kind,
        balance: parse_decimal(&balance)?,
        currency,
        icon,
        color,
        credit_limit: credit_limit.as_deref().map(parse_decimal).transpose()?,
        sort_order,
        created_at: parse_datetime(&created)?,
        updated_at: parse_datetime(&updated)?,
    })
}
