// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use finledger::models::{AccountKind, NewTransaction, Posting};
use finledger::{accounts, db, ledger, LedgerError};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

fn add_account(conn: &Connection, name: &str, balance: i64) -> i64 {
    accounts::create(
        conn,
        &accounts::NewAccount {
            name: name.to_string(),
            kind: AccountKind::Bank,
            balance: Decimal::from(balance),
            currency: None,
            icon: None,
            color: None,
            credit_limit: None,
            sort_order: 0,
        },
    )
    .unwrap()
    .id
}

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

fn draft(amount: i64, posting: Posting) -> NewTransaction {
    NewTransaction {
        date: at(2024, 1, 15),
        amount: Decimal::from(amount),
        posting,
        category_id: None,
        note: None,
        mood: None,
    }
}

fn balance_of(conn: &Connection, id: i64) -> Decimal {
    accounts::get(conn, id).unwrap().balance
}

#[test]
fn expense_debits_source_and_reverse_restores() {
    let mut conn = setup();
    let a = add_account(&conn, "A", 1000);

    let tx = ledger::post(&mut conn, draft(150, Posting::Expense { source: a })).unwrap();
    assert_eq!(balance_of(&conn, a), Decimal::from(850));

    ledger::reverse(&mut conn, &tx).unwrap();
    assert_eq!(balance_of(&conn, a), Decimal::from(1000));
    assert!(ledger::all(&conn).unwrap().is_empty());
}

#[test]
fn income_credits_destination() {
    let mut conn = setup();
    let a = add_account(&conn, "A", 100);

    let tx = ledger::post(&mut conn, draft(40, Posting::Income { destination: a })).unwrap();
    assert_eq!(balance_of(&conn, a), Decimal::from(140));

    ledger::reverse(&mut conn, &tx).unwrap();
    assert_eq!(balance_of(&conn, a), Decimal::from(100));
}

#[test]
fn transfer_moves_amount_between_accounts() {
    let mut conn = setup();
    let a = add_account(&conn, "A", 500);
    let b = add_account(&conn, "B", 100);

    let tx = ledger::post(&mut conn, draft(200, Posting::Transfer { source: a, target: b }))
        .unwrap();
    assert_eq!(balance_of(&conn, a), Decimal::from(300));
    assert_eq!(balance_of(&conn, b), Decimal::from(300));

    // Sum of deltas across the pair is exactly zero.
    let total = balance_of(&conn, a) + balance_of(&conn, b);
    assert_eq!(total, Decimal::from(600));

    ledger::reverse(&mut conn, &tx).unwrap();
    assert_eq!(balance_of(&conn, a), Decimal::from(500));
    assert_eq!(balance_of(&conn, b), Decimal::from(100));
}

#[test]
fn fractional_amounts_reverse_exactly() {
    let mut conn = setup();
    let a = add_account(&conn, "A", 10);

    let amount: Decimal = "0.13".parse().unwrap();
    let tx = ledger::post(
        &mut conn,
        NewTransaction {
            amount,
            ..draft(0, Posting::Expense { source: a })
        },
    )
    .unwrap();
    assert_eq!(balance_of(&conn, a), "9.87".parse::<Decimal>().unwrap());

    ledger::reverse(&mut conn, &tx).unwrap();
    assert_eq!(balance_of(&conn, a), Decimal::from(10));
}

#[test]
fn rejects_non_positive_amount() {
    let mut conn = setup();
    let a = add_account(&conn, "A", 100);

    for amount in [0, -5] {
        let err = ledger::post(&mut conn, draft(amount, Posting::Expense { source: a }))
            .unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)), "{err}");
    }
    assert_eq!(balance_of(&conn, a), Decimal::from(100));
}

#[test]
fn rejects_transfer_to_same_account() {
    let mut conn = setup();
    let a = add_account(&conn, "A", 100);

    let err = ledger::post(&mut conn, draft(10, Posting::Transfer { source: a, target: a }))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)), "{err}");
    assert_eq!(balance_of(&conn, a), Decimal::from(100));
}

#[test]
fn unresolved_account_fails_closed_without_mutation() {
    let mut conn = setup();
    let a = add_account(&conn, "A", 500);

    // The source resolves, the target does not: the whole post must be
    // rejected and the source balance left untouched.
    let err = ledger::post(
        &mut conn,
        draft(50, Posting::Transfer { source: a, target: 999 }),
    )
    .unwrap_err();
    assert!(matches!(err, LedgerError::Reference(_)), "{err}");
    assert_eq!(balance_of(&conn, a), Decimal::from(500));
    assert!(ledger::all(&conn).unwrap().is_empty());
}

#[test]
fn unresolved_category_fails_closed() {
    let mut conn = setup();
    let a = add_account(&conn, "A", 500);

    let mut d = draft(50, Posting::Expense { source: a });
    d.category_id = Some(42);
    let err = ledger::post(&mut conn, d).unwrap_err();
    assert!(matches!(err, LedgerError::Reference(_)), "{err}");
    assert_eq!(balance_of(&conn, a), Decimal::from(500));
}

#[test]
fn reverse_of_unposted_transaction_is_rejected() {
    let mut conn = setup();
    let a = add_account(&conn, "A", 100);

    let tx = ledger::post(&mut conn, draft(10, Posting::Expense { source: a })).unwrap();
    ledger::reverse(&mut conn, &tx).unwrap();

    let err = ledger::reverse(&mut conn, &tx).unwrap_err();
    assert!(matches!(err, LedgerError::Reference(_)), "{err}");
    assert_eq!(balance_of(&conn, a), Decimal::from(100));
}

#[test]
fn list_filters_by_account_and_respects_limit() {
    let mut conn = setup();
    let a = add_account(&conn, "A", 1000);
    let b = add_account(&conn, "B", 1000);

    for day in 1..=3 {
        let mut d = draft(10, Posting::Expense { source: a });
        d.date = at(2024, 2, day);
        ledger::post(&mut conn, d).unwrap();
    }
    ledger::post(&mut conn, draft(5, Posting::Expense { source: b })).unwrap();

    let rows = ledger::list(
        &conn,
        &ledger::TransactionFilter {
            account_id: Some(a),
            limit: Some(2),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(rows.len(), 2);
    // Newest first.
    assert_eq!(rows[0].date, at(2024, 2, 3));

    let feb = ledger::list(
        &conn,
        &ledger::TransactionFilter {
            from: Some(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            to: Some(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(feb.len(), 3);
}

#[test]
fn posted_transaction_round_trips_through_store() {
    let mut conn = setup();
    let a = add_account(&conn, "A", 100);

    let mut d = draft(25, Posting::Expense { source: a });
    d.note = Some("coffee".to_string());
    d.mood = Some("happy".to_string());
    let posted = ledger::post(&mut conn, d).unwrap();

    let loaded = ledger::get(&conn, posted.id).unwrap();
    assert_eq!(loaded.amount, Decimal::from(25));
    assert_eq!(loaded.posting, Posting::Expense { source: a });
    assert_eq!(loaded.note.as_deref(), Some("coffee"));
    assert_eq!(loaded.mood.as_deref(), Some("happy"));
    assert_eq!(loaded.date, posted.date);
}
