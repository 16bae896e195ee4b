// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Transaction export for downstream consumers. The CSV schema is fixed:
//! header `Date,Type,Amount,Category,Account,Note,Mood`, dates as
//! `yyyy-MM-dd HH:mm`, standard CSV quoting, UTF-8.

use crate::error::Result;
use crate::utils::parse_datetime;
use rusqlite::Connection;
use serde::Serialize;
use std::io::Write;
use std::path::Path;

const CSV_DATE_FMT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Serialize)]
pub struct ExportRow {
    pub date: String,
    pub kind: String,
    pub amount: String,
    pub category: String,
    pub account: String,
    pub note: String,
    pub mood: String,
}

/// Resolves account and category names for every transaction, oldest
/// first. Transfers render the account column as `Source -> Target`.
pub fn transaction_rows(conn: &Connection) -> Result<Vec<ExportRow>> {
    let mut stmt = conn.prepare(
        "SELECT t.date, t.kind, t.amount, c.name, sa.name, ta.name, t.note, t.mood
         FROM transactions t
         LEFT JOIN categories c ON t.category_id=c.id
         LEFT JOIN accounts sa ON t.source_account_id=sa.id
         LEFT JOIN accounts ta ON t.target_account_id=ta.id
         ORDER BY t.date, t.id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, Option<String>>(3)?,
            r.get::<_, Option<String>>(4)?,
            r.get::<_, Option<String>>(5)?,
            r.get::<_, Option<String>>(6)?,
            r.get::<_, Option<String>>(7)?,
        ))
    })?;

    let mut out = Vec::new();
    for row in rows {
        let (date, kind, amount, category, source, target, note, mood) = row?;
        let account = match (source, target) {
            (Some(s), Some(t)) => format!("{s} -> {t}"),
            (Some(s), None) => s,
            (None, Some(t)) => t,
            (None, None) => String::new(),
        };
        out.push(ExportRow {
            date: parse_datetime(&date)?.format(CSV_DATE_FMT).to_string(),
            kind,
            amount,
            category: category.unwrap_or_else(|| "Uncategorized".to_string()),
            account,
            note: note.unwrap_or_default(),
            mood: mood.unwrap_or_default(),
        });
    }
    Ok(out)
}

pub fn write_csv<W: Write>(out: W, rows: &[ExportRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["Date", "Type", "Amount", "Category", "Account", "Note", "Mood"])?;
    for row in rows {
        wtr.write_record([
            row.date.as_str(),
            row.kind.as_str(),
            row.amount.as_str(),
            row.category.as_str(),
            row.account.as_str(),
            row.note.as_str(),
            row.mood.as_str(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn export_csv<P: AsRef<Path>>(conn: &Connection, path: P) -> Result<()> {
    let rows = transaction_rows(conn)?;
    let file = std::fs::File::create(path)?;
    write_csv(file, &rows)
}

pub fn export_json<P: AsRef<Path>>(conn: &Connection, path: P) -> Result<()> {
    let rows = transaction_rows(conn)?;
    std::fs::write(path, serde_json::to_string_pretty(&rows)?)?;
    Ok(())
}
