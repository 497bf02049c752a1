// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cariledger::db::Database;
use cariledger::models::{NewTransaction, TxType};
use cariledger::utils::{fmt_ts, parse_datetime};
use cariledger::{reports, settlement, store, LedgerError};
use proptest::prelude::*;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn add(conn: &Connection, t: TxType, amount: i64, date: &str) -> i64 {
    store::append(
        conn,
        &NewTransaction::new(t, Decimal::from(amount), "r", parse_datetime(date).unwrap()),
    )
    .unwrap()
    .id
}

#[test]
fn explicit_month_window_is_inclusive_and_newest_first() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.conn();
    add(conn, TxType::Debt, 1, "2025-01-31 23:59:59");
    add(conn, TxType::Credit, 2, "2025-02-01 00:00:00");
    add(conn, TxType::Debt, 3, "2025-02-14 12:00:00");
    add(conn, TxType::PaymentReceived, 4, "2025-02-28 23:59:59");
    add(conn, TxType::Credit, 5, "2025-03-01 00:00:00");
    let now = parse_datetime("2025-06-01").unwrap();

    let rows = reports::recent_list(conn, 10, "2025-02", now).unwrap();
    let dates: Vec<String> = rows.iter().map(|t| fmt_ts(&t.transaction_date)).collect();
    assert_eq!(
        dates,
        vec![
            "2025-02-28 23:59:59",
            "2025-02-14 12:00:00",
            "2025-02-01 00:00:00"
        ]
    );

    let rows = reports::recent_list(conn, 2, "2025-02", now).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].amount, Decimal::from(4));
}

#[test]
fn recent_list_honours_limit_and_rolling_windows() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.conn();
    for day in 1..=20 {
        add(conn, TxType::Debt, day, &format!("2025-05-{:02} 09:00", day));
    }
    let now = parse_datetime("2025-05-20 10:00").unwrap();
    assert_eq!(reports::recent_list(conn, 100, "all", now).unwrap().len(), 20);
    assert_eq!(reports::recent_list(conn, 5, "all", now).unwrap().len(), 5);
    // 2025-05-13 10:00 .. now
    assert_eq!(reports::recent_list(conn, 100, "week", now).unwrap().len(), 7);
    assert_eq!(reports::recent_list(conn, 100, "month", now).unwrap().len(), 20);
    assert_eq!(reports::recent_list(conn, 100, "year", now).unwrap().len(), 20);
    assert!(matches!(
        reports::recent_list(conn, 10, "2025-5", now),
        Err(LedgerError::Validation(_))
    ));
}

#[test]
fn pending_list_skips_closed_obligations() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.conn();
    let date = parse_datetime("2025-01-05").unwrap();
    let open = add(conn, TxType::Credit, 300, "2025-01-01");
    let closed = add(conn, TxType::Debt, 200, "2025-01-02");
    add(conn, TxType::PaymentReceived, 50, "2025-01-03");
    settlement::partial_settle(conn, open, Decimal::from(120), "k", date, None).unwrap();
    settlement::partial_settle(conn, closed, Decimal::from(200), "t", date, None).unwrap();

    let pending = reports::pending_list(conn).unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, open);
    assert_eq!(pending[0].remaining_amount, Decimal::from(180));
    for p in &pending {
        let independent = p.amount - store::linked_total(conn, p.id).unwrap();
        assert!(independent > Decimal::ZERO);
    }
}

#[test]
fn monthly_summary_groups_by_calendar_month() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.conn();
    add(conn, TxType::Credit, 500, "2025-02-01");
    add(conn, TxType::PaymentReceived, 200, "2025-02-10");
    add(conn, TxType::Debt, 300, "2025-02-11");
    add(conn, TxType::PaymentMade, 100, "2025-07-04");
    add(conn, TxType::Credit, 999, "2024-12-31 23:59:59");

    let months = reports::monthly_summary(conn, 2025).unwrap();
    assert_eq!(months.len(), 12);
    let feb = &months[1];
    assert_eq!(feb.month, 2);
    assert_eq!(feb.income, Decimal::from(700));
    assert_eq!(feb.expense, Decimal::from(300));
    assert_eq!(feb.net, Decimal::from(400));
    assert_eq!(months[6].net, Decimal::from(-100));
    assert_eq!(months[0].net, Decimal::ZERO);

    let year = reports::year_totals(conn, 2025).unwrap();
    assert_eq!(year.net, Decimal::from(300));
}

#[test]
fn finance_stats_reads_open_balances_and_current_month() {
    let db = Database::open_in_memory().unwrap();
    let conn = db.conn();
    let receivable = add(conn, TxType::Credit, 1000, "2025-03-02");
    add(conn, TxType::Debt, 400, "2025-03-03");
    add(conn, TxType::Debt, 50, "2025-02-01");
    settlement::partial_settle(
        conn,
        receivable,
        Decimal::from(250),
        "ilk",
        parse_datetime("2025-03-04").unwrap(),
        None,
    )
    .unwrap();

    let stats = reports::finance_stats(conn, parse_datetime("2025-03-20").unwrap()).unwrap();
    assert_eq!(stats.total_receivables, Decimal::from(750));
    assert_eq!(stats.total_payables, Decimal::from(450));
    assert_eq!(stats.monthly_income, Decimal::from(1250));
    assert_eq!(stats.monthly_expenses, Decimal::from(400));
    assert_eq!(stats.net_balance, Decimal::from(850));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn twelve_month_nets_sum_to_the_year(
        entries in prop::collection::vec((2024i32..=2026, 1u32..=12, 1u32..=28, 0u8..4, 1i64..500_000), 0..40)
    ) {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let mut direct = Decimal::ZERO;
        for (year, month, day, k, cents) in &entries {
            let t = match k {
                0 => TxType::Debt,
                1 => TxType::Credit,
                2 => TxType::PaymentMade,
                _ => TxType::PaymentReceived,
            };
            let amount = Decimal::new(*cents, 2);
            let date = parse_datetime(&format!("{}-{:02}-{:02} 12:00", year, month, day)).unwrap();
            store::append(conn, &NewTransaction::new(t, amount, "p", date)).unwrap();
            if *year == 2025 {
                match t {
                    TxType::Credit | TxType::PaymentReceived => direct += amount,
                    _ => direct -= amount,
                }
            }
        }
        let months = reports::monthly_summary(conn, 2025).unwrap();
        let summed: Decimal = months.iter().map(|m| m.net).sum();
        prop_assert_eq!(summed, direct);
        prop_assert_eq!(reports::year_totals(conn, 2025).unwrap().net, direct);
    }
}
