// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// What kind of pool of money an account is. `Credit` and `Loan` balances
/// are stored as positive "amount owed" and count as liabilities in
/// net-worth snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AccountKind {
    Cash,
    Bank,
    EWallet,
    Credit,
    Loan,
}

impl AccountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountKind::Cash => "cash",
            AccountKind::Bank => "bank",
            AccountKind::EWallet => "e-wallet",
            AccountKind::Credit => "credit",
            AccountKind::Loan => "loan",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(AccountKind::Cash),
            "bank" => Some(AccountKind::Bank),
            "e-wallet" => Some(AccountKind::EWallet),
            "credit" => Some(AccountKind::Credit),
            "loan" => Some(AccountKind::Loan),
            _ => None,
        }
    }

    pub fn is_liability(&self) -> bool {
        matches!(self, AccountKind::Credit | AccountKind::Loan)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub kind: AccountKind,
    /// Sum of signed postings applied by the ledger since creation, plus
    /// the opening balance. Only `ledger` mutates this; corrections go
    /// through `accounts::correct_balance`.
    pub balance: Decimal,
    pub currency: String,
    pub icon: String,
    pub color: String,
    pub credit_limit: Option<Decimal>,
    pub sort_order: i64,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
    Transfer,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryKind::Income => "income",
            CategoryKind::Expense => "expense",
            CategoryKind::Transfer => "transfer",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(CategoryKind::Income),
            "expense" => Some(CategoryKind::Expense),
            "transfer" => Some(CategoryKind::Transfer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub kind: CategoryKind,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub is_system: bool,
    pub is_default: bool,
    pub sort_order: i64,
    pub created_at: NaiveDateTime,
}

/// The balance effect of a transaction. Each kind carries exactly the
/// account references it needs, so a transfer without a target or an
/// expense with two accounts cannot be represented at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Posting {
    Expense { source: i64 },
    Income { destination: i64 },
    Transfer { source: i64, target: i64 },
}

impl Posting {
    pub fn kind(&self) -> &'static str {
        match self {
            Posting::Expense { .. } => "expense",
            Posting::Income { .. } => "income",
            Posting::Transfer { .. } => "transfer",
        }
    }

    pub fn is_expense(&self) -> bool {
        matches!(self, Posting::Expense { .. })
    }
}

/// One immutable monetary event. Created only via `ledger::post`, removed
/// only via `ledger::reverse`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub date: NaiveDateTime,
    /// Positive magnitude; the sign of the balance effect comes from the
    /// posting kind.
    pub amount: Decimal,
    pub posting: Posting,
    pub category_id: Option<i64>,
    pub note: Option<String>,
    /// Free-form label consumed only by analytics.
    pub mood: Option<String>,
    pub created_at: NaiveDateTime,
}

/// An unsaved transaction handed to `ledger::post`.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub date: NaiveDateTime,
    pub amount: Decimal,
    pub posting: Posting,
    pub category_id: Option<i64>,
    pub note: Option<String>,
    pub mood: Option<String>,
}

/// A spending cap over an inclusive date range. No category means the
/// budget covers the whole wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub category_id: Option<i64>,
    pub amount: Decimal,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// A target amount to accumulate. `current_amount` is adjusted directly by
/// deposits/withdrawals and is deliberately not tied to ledger postings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavingsGoal {
    pub id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub target_date: Option<NaiveDate>,
    pub account_id: Option<i64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// One row per calendar day with total assets and liabilities across all
/// accounts at the time of computation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBalanceSnapshot {
    pub id: i64,
    pub date: NaiveDate,
    pub total_assets: Decimal,
    pub total_liabilities: Decimal,
}

impl DailyBalanceSnapshot {
    pub fn net_worth(&self) -> Decimal {
        self.total_assets - self.total_liabilities
    }
}
