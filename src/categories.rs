// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Category CRUD and first-run seeding of the system category set.
//! Deleting a category never cascades: transactions and budgets keep
//! their rows with the reference cleared (schema `ON DELETE SET NULL`).

use crate::error::{LedgerError, Result};
use crate::models::{Category, CategoryKind};
use crate::utils::parse_datetime;
use rusqlite::{params, Connection, OptionalExtension};

#[derive(Debug, Clone)]
pub struct NewCategory {
    pub name: String,
    pub kind: CategoryKind,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub sort_order: i64,
}

pub fn create(conn: &Connection, new: &NewCategory) -> Result<Category> {
    conn.execute(
        "INSERT INTO categories(name, kind, icon, color, sort_order) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new.name,
            new.kind.as_str(),
            new.icon,
            new.color,
            new.sort_order
        ],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Category> {
    let row = conn
        .query_row(
            "SELECT id, name, kind, icon, color, is_system, is_default, sort_order, created_at
             FROM categories WHERE id=?1",
            params![id],
            row_tuple,
        )
        .optional()?;
    match row {
        Some(raw) => decode(raw),
        None => Err(LedgerError::Reference(format!(
            "category {id} does not exist"
        ))),
    }
}

pub fn list(conn: &Connection) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, kind, icon, color, is_system, is_default, sort_order, created_at
         FROM categories ORDER BY kind, sort_order, name",
    )?;
    let rows = stmt.query_map([], row_tuple)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(decode(row?)?);
    }
    Ok(out)
}

/// Existing transactions and budgets keep their rows; only the reference
/// is nulled out by the schema.
pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let n = conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    if n == 0 {
        return Err(LedgerError::Reference(format!(
            "category {id} does not exist"
        )));
    }
    Ok(())
}

/// Seeds the system default categories on first run. A no-op whenever any
/// category already exists, so it is safe to call at every session start.
/// Returns the number of categories inserted.
pub fn seed_defaults(conn: &Connection) -> Result<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    if count > 0 {
        return Ok(0);
    }

    let defaults: &[(&str, CategoryKind, &str, &str, i64)] = &[
        ("Dining", CategoryKind::Expense, "fork.knife", "#FF5722", 1),
        ("Transport", CategoryKind::Expense, "bus", "#2196F3", 2),
        ("Shopping", CategoryKind::Expense, "cart", "#E91E63", 3),
        (
            "Entertainment",
            CategoryKind::Expense,
            "gamecontroller",
            "#9C27B0",
            4,
        ),
        ("Housing", CategoryKind::Expense, "house", "#795548", 5),
        ("Medical", CategoryKind::Expense, "cross.case", "#F44336", 6),
        ("Education", CategoryKind::Expense, "book", "#FFC107", 7),
        (
            "Other",
            CategoryKind::Expense,
            "ellipsis.circle",
            "#9E9E9E",
            99,
        ),
        (
            "Salary",
            CategoryKind::Income,
            "dollarsign.circle",
            "#4CAF50",
            1,
        ),
        ("Bonus", CategoryKind::Income, "gift", "#FF9800", 2),
        ("Investment", CategoryKind::Income, "chart.bar", "#673AB7", 3),
        ("Part-time", CategoryKind::Income, "briefcase", "#3F51B5", 4),
    ];

    for (name, kind, icon, color, sort_order) in defaults {
        conn.execute(
            "INSERT INTO categories(name, kind, icon, color, is_system, sort_order)
             VALUES (?1, ?2, ?3, ?4, 1, ?5)",
            params![name, kind.as_str(), icon, color, sort_order],
        )?;
    }
    Ok(defaults.len())
}

type RawRow = (
    i64,
    String,
    String,
    Option<String>,
    Option<String>,
    bool,
    bool,
    i64,
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
    ))
}

fn decode(raw: RawRow) -> Result<Category> {
    let (id, name, kind, icon, color, is_system, is_default, sort_order, created_at) = raw;
    let kind = CategoryKind::parse(&kind)
        .ok_or_else(|| LedgerError::Validation(format!("category {id}: unknown kind '{kind}'")))?;
    Ok(Category {
        id,
        name,
        kind,
        icon,
        color,
        is_system,
        is_default,
        sort_order,
        created_at: parse_datetime(&created_at)?,
    })
}
