// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Daily net-worth snapshots. One row per calendar day: running `take`
//! again on the same day updates the existing row in place.

use crate::error::{LedgerError, Result};
use crate::models::{AccountKind, DailyBalanceSnapshot};
use crate::utils::{parse_date, parse_decimal};
use chrono::{Local, NaiveDate};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use tracing::{debug, warn};

/// Computes total assets and liabilities across all accounts and upserts
/// the snapshot row for `today`. `credit` and `loan` balances count as
/// liabilities (stored as positive amount-owed); everything else is an
/// asset.
pub fn take(conn: &Connection, today: NaiveDate) -> Result<DailyBalanceSnapshot> {
    let mut assets = Decimal::ZERO;
    let mut liabilities = Decimal::ZERO;

    let mut stmt = conn.prepare("SELECT id, kind, balance FROM accounts")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
        ))
    })?;
    for row in rows {
        let (id, kind, balance) = row?;
        let kind = AccountKind::parse(&kind).ok_or_else(|| {
            LedgerError::Validation(format!("account {id}: unknown kind '{kind}'"))
        })?;
        let balance = parse_decimal(&balance)?;
        if kind.is_liability() {
            liabilities += balance;
        } else {
            assets += balance;
        }
    }

    conn.execute(
        "INSERT INTO snapshots(date, total_assets, total_liabilities) VALUES (?1, ?2, ?3)
         ON CONFLICT(date) DO UPDATE SET
             total_assets=excluded.total_assets,
             total_liabilities=excluded.total_liabilities",
        params![
            today.to_string(),
            assets.to_string(),
            liabilities.to_string()
        ],
    )?;
    let id: i64 = conn.query_row(
        "SELECT id FROM snapshots WHERE date=?1",
        params![today.to_string()],
        |r| r.get(0),
    )?;

    Ok(DailyBalanceSnapshot {
        id,
        date: today,
        total_assets: assets,
        total_liabilities: liabilities,
    })
}

/// Session-start entry point: takes today's snapshot and swallows failure,
/// since a missed snapshot must never block the caller's startup.
pub fn run_at_session_start(conn: &Connection) {
    let today = Local::now().date_naive();
    match take(conn, today) {
        Ok(s) => debug!(date = %s.date, net_worth = %s.net_worth(), "daily snapshot taken"),
        Err(e) => warn!("skipping daily snapshot: {e}"),
    }
}

/// Snapshot history, oldest first. Retention is a consumer concern; the
/// core never deletes rows.
pub fn history(conn: &Connection) -> Result<Vec<DailyBalanceSnapshot>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, total_assets, total_liabilities FROM snapshots ORDER BY date",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (id, date, assets, liabilities) = row?;
        out.push(DailyBalanceSnapshot {
            id,
            date: parse_date(&date)?,
            total_assets: parse_decimal(&assets)?,
            total_liabilities: parse_decimal(&liabilities)?,
        });
    }
    Ok(out)
}
