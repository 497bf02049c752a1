// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cariledger::db::Database;
use cariledger::models::{NewTransaction, TxType};
use cariledger::resilience::{wrap_with, RetryMode, RetryPolicy};
use cariledger::utils::parse_datetime;
use cariledger::{store, LedgerError, LedgerResult};
use rusqlite::{ffi, Connection};
use rust_decimal::Decimal;
use std::time::Duration;

fn disconnect() -> LedgerError {
    LedgerError::from(rusqlite::Error::SqliteFailure(
        ffi::Error::new(ffi::SQLITE_BUSY),
        Some("endpoint is disabled".into()),
    ))
}

fn count(conn: &Connection) -> i64 {
    conn.query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap()
}

#[test]
fn transient_failure_is_retried_once_after_base_delay() {
    let db = Database::open_in_memory().unwrap();
    let policy = RetryPolicy::default();
    let mut calls = 0;
    let mut slept = Vec::new();

    let rows: LedgerResult<Vec<_>> = wrap_with(
        db.conn(),
        &policy,
        RetryMode::Replayable,
        |c| {
            calls += 1;
            if calls == 1 {
                Err(disconnect())
            } else {
                store::list(c, None)
            }
        },
        |d| slept.push(d),
    );

    assert!(rows.unwrap().is_empty());
    assert_eq!(calls, 2);
    assert_eq!(slept, vec![Duration::from_millis(1000)]);
    // wake queries write nothing
    assert_eq!(count(db.conn()), 0);
}

#[test]
fn exhausted_retries_surface_the_store_error() {
    let db = Database::open_in_memory().unwrap();
    let policy = RetryPolicy::new(3, 1000);
    let mut calls = 0;
    let mut slept = Vec::new();

    let res: LedgerResult<()> = wrap_with(
        db.conn(),
        &policy,
        RetryMode::Replayable,
        |_| {
            calls += 1;
            Err(disconnect())
        },
        |d| slept.push(d),
    );

    let err = res.unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.status_code(), 503);
    assert!(err.to_string().contains("endpoint is disabled"));
    assert_eq!(calls, 3);
    assert_eq!(
        slept,
        vec![Duration::from_millis(1000), Duration::from_millis(2000)]
    );
}

#[test]
fn genuine_faults_are_not_retried() {
    let db = Database::open_in_memory().unwrap();
    let mut calls = 0;
    let mut slept = Vec::new();

    let res: LedgerResult<()> = wrap_with(
        db.conn(),
        &RetryPolicy::default(),
        RetryMode::Replayable,
        |c| {
            calls += 1;
            c.execute("INSERT INTO no_such_table VALUES (1)", [])?;
            Ok(())
        },
        |d| slept.push(d),
    );

    assert!(matches!(res, Err(LedgerError::Storage(_))));
    assert_eq!(calls, 1);
    assert!(slept.is_empty());
}

#[test]
fn unkeyed_writes_run_at_most_once() {
    let db = Database::open_in_memory().unwrap();
    let mut calls = 0;
    let mut slept = Vec::new();
    let new = NewTransaction::new(
        TxType::Debt,
        Decimal::from(10),
        "once",
        parse_datetime("2025-01-01").unwrap(),
    );

    // the insert commits, then the connection "drops" before the reply
    let res = wrap_with(
        db.conn(),
        &RetryPolicy::default(),
        RetryMode::WakeOnly,
        |c| {
            calls += 1;
            store::append(c, &new)?;
            Err::<(), _>(disconnect())
        },
        |d| slept.push(d),
    );

    assert!(res.unwrap_err().is_transient());
    assert_eq!(calls, 1);
    assert!(slept.is_empty());
    assert_eq!(count(db.conn()), 1);
}

#[test]
fn keyed_writes_replay_without_duplicating() {
    let db = Database::open_in_memory().unwrap();
    let mut calls = 0;
    let new = NewTransaction::new(
        TxType::Credit,
        Decimal::from(10),
        "keyed",
        parse_datetime("2025-01-01").unwrap(),
    )
    .idempotency_key("req-7");

    let stored = wrap_with(
        db.conn(),
        &RetryPolicy::new(3, 0),
        RetryMode::Replayable,
        |c| {
            calls += 1;
            let t = store::append(c, &new)?;
            if calls == 1 {
                return Err(disconnect());
            }
            Ok(t)
        },
        |_| {},
    )
    .unwrap();

    assert_eq!(calls, 2);
    assert_eq!(stored.description, "keyed");
    assert_eq!(count(db.conn()), 1);
}
