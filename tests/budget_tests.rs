// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use finledger::budget::{self, BudgetStatus, NewBudget};
use finledger::models::{AccountKind, Budget, NewTransaction, Posting, Transaction};
use finledger::{accounts, db, ledger};
use rust_decimal::Decimal;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn noon(y: i32, m: u32, d: u32) -> NaiveDateTime {
    day(y, m, d).and_hms_opt(12, 0, 0).unwrap()
}

fn cap(amount: i64, category_id: Option<i64>) -> Budget {
    Budget {
        id: 1,
        category_id,
        amount: Decimal::from(amount),
        start: day(2024, 1, 1),
        end: day(2024, 1, 31),
        created_at: noon(2024, 1, 1),
        updated_at: noon(2024, 1, 1),
    }
}

fn expense(amount: i64, date: NaiveDateTime, category_id: Option<i64>) -> Transaction {
    Transaction {
        id: 0,
        date,
        amount: Decimal::from(amount),
        posting: Posting::Expense { source: 1 },
        category_id,
        note: None,
        mood: None,
        created_at: date,
    }
}

fn income(amount: i64, date: NaiveDateTime) -> Transaction {
    Transaction {
        posting: Posting::Income { destination: 1 },
        ..expense(amount, date, None)
    }
}

#[test]
fn spend_in_period_yields_warning_at_85_percent() {
    let food = Some(7i64);
    let txs = vec![
        expense(500, noon(2024, 1, 5), food),
        expense(350, noon(2024, 1, 20), food),
        // Different category and income are both excluded.
        expense(100, noon(2024, 1, 10), Some(8)),
        income(400, noon(2024, 1, 12)),
    ];
    let p = budget::calculate_progress(&cap(1000, food), &txs);
    assert_eq!(p.spent, Decimal::from(850));
    assert_eq!(p.percent, "0.85".parse::<Decimal>().unwrap());
    assert_eq!(p.remaining, Decimal::from(150));
    assert_eq!(p.status, BudgetStatus::Warning);
}

#[test]
fn whole_wallet_budget_counts_every_expense() {
    let txs = vec![
        expense(30, noon(2024, 1, 2), Some(1)),
        expense(20, noon(2024, 1, 3), None),
    ];
    let p = budget::calculate_progress(&cap(100, None), &txs);
    assert_eq!(p.spent, Decimal::from(50));
}

#[test]
fn period_bounds_are_inclusive() {
    let txs = vec![
        expense(10, day(2024, 1, 1).and_hms_opt(0, 0, 0).unwrap(), None),
        expense(10, day(2024, 1, 31).and_hms_opt(23, 59, 59).unwrap(), None),
        expense(10, noon(2023, 12, 31), None),
        expense(10, noon(2024, 2, 1), None),
    ];
    let p = budget::calculate_progress(&cap(100, None), &txs);
    assert_eq!(p.spent, Decimal::from(20));
}

#[test]
fn status_boundaries_are_exact() {
    // spent/amount == 0.8 exactly is already a warning.
    let p = budget::calculate_progress(&cap(100, None), &[expense(80, noon(2024, 1, 5), None)]);
    assert_eq!(p.percent, "0.8".parse::<Decimal>().unwrap());
    assert_eq!(p.status, BudgetStatus::Warning);

    // == 1.0 exactly is exceeded, not warning.
    let p = budget::calculate_progress(&cap(100, None), &[expense(100, noon(2024, 1, 5), None)]);
    assert_eq!(p.percent, Decimal::ONE);
    assert_eq!(p.status, BudgetStatus::Exceeded);

    let p = budget::calculate_progress(&cap(100, None), &[expense(79, noon(2024, 1, 5), None)]);
    assert_eq!(p.status, BudgetStatus::Normal);
}

#[test]
fn zero_cap_uses_divisor_guard() {
    // With a zero cap the divisor is 1, so percent equals spent and any
    // spend of at least one currency unit reads as exceeded.
    let p = budget::calculate_progress(&cap(0, None), &[expense(3, noon(2024, 1, 5), None)]);
    assert_eq!(p.percent, Decimal::from(3));
    assert_eq!(p.remaining, Decimal::from(-3));
    assert_eq!(p.status, BudgetStatus::Exceeded);

    let p = budget::calculate_progress(&cap(0, None), &[]);
    assert_eq!(p.percent, Decimal::ZERO);
    assert_eq!(p.status, BudgetStatus::Normal);
}

#[test]
fn overspend_is_not_clamped() {
    let p = budget::calculate_progress(&cap(100, None), &[expense(250, noon(2024, 1, 5), None)]);
    assert_eq!(p.percent, "2.5".parse::<Decimal>().unwrap());
    assert_eq!(p.remaining, Decimal::from(-150));
    assert_eq!(p.status, BudgetStatus::Exceeded);
}

#[test]
fn aggregation_is_pure() {
    let budget = cap(1000, None);
    let txs = vec![
        expense(120, noon(2024, 1, 4), None),
        expense(80, noon(2024, 1, 9), Some(2)),
    ];
    let first = budget::calculate_progress(&budget, &txs);
    let second = budget::calculate_progress(&budget, &txs);
    assert_eq!(first, second);
}

#[test]
fn store_backed_progress_matches_pure_aggregation() {
    let mut conn = db::open_in_memory().unwrap();
    let a = accounts::create(
        &conn,
        &accounts::NewAccount {
            name: "Checking".to_string(),
            kind: AccountKind::Bank,
            balance: Decimal::from(1000),
            currency: None,
            icon: None,
            color: None,
            credit_limit: None,
            sort_order: 0,
        },
    )
    .unwrap()
    .id;

    for amount in [300, 250] {
        ledger::post(
            &mut conn,
            NewTransaction {
                date: noon(2024, 1, 10),
                amount: Decimal::from(amount),
                posting: Posting::Expense { source: a },
                category_id: None,
                note: None,
                mood: None,
            },
        )
        .unwrap();
    }

    let budget = budget::create(
        &conn,
        &NewBudget {
            category_id: None,
            amount: Decimal::from(1000),
            start: day(2024, 1, 1),
            end: day(2024, 1, 31),
        },
    )
    .unwrap();

    let p = budget::progress(&conn, &budget).unwrap();
    assert_eq!(p.spent, Decimal::from(550));
    assert_eq!(p.status, BudgetStatus::Normal);

    // Deleting the budget leaves the transactions alone.
    budget::delete(&conn, budget.id).unwrap();
    assert_eq!(ledger::all(&conn).unwrap().len(), 2);
}
