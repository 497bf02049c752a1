// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Ledger store: the transactions table is the only persisted source of truth.
//! Every mutation that touches an account recomputes that account's cached
//! totals inside the same immediate transaction.

use crate::balance;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{NewTransaction, Transaction};
use crate::utils::{add_amount, check_amount, decimal_at, fmt_ts, Period};
use chrono::NaiveDateTime;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use rust_decimal::Decimal;

const TX_COLUMNS: &str = "id, account_id, project_id, parent_id, type, amount, description, transaction_date, created_at";

fn map_tx(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        account_id: r.get(1)?,
        project_id: r.get(2)?,
        parent_id: r.get(3)?,
        r#type: r.get(4)?,
        amount: decimal_at(r, 5)?,
        description: r.get(6)?,
        transaction_date: r.get(7)?,
        created_at: r.get(8)?,
    })
}

/// Opens a write transaction that takes the database write lock up front.
pub(crate) fn begin_write(conn: &Connection) -> LedgerResult<rusqlite::Transaction<'_>> {
    Ok(rusqlite::Transaction::new_unchecked(
        conn,
        TransactionBehavior::Immediate,
    )?)
}

pub fn find(conn: &Connection, id: i64) -> LedgerResult<Option<Transaction>> {
    let sql = format!("SELECT {TX_COLUMNS} FROM transactions WHERE id=?1");
    Ok(conn.query_row(&sql, params![id], map_tx).optional()?)
}

pub fn get(conn: &Connection, id: i64) -> LedgerResult<Transaction> {
    find(conn, id)?.ok_or_else(|| LedgerError::not_found("transaction", id))
}

/// Sum of all settlements whose parent is `obligation_id`.
pub fn linked_total(conn: &Connection, obligation_id: i64) -> LedgerResult<Decimal> {
    let mut stmt = conn.prepare("SELECT amount FROM transactions WHERE parent_id=?1")?;
    let rows = stmt.query_map(params![obligation_id], |r| decimal_at(r, 0))?;
    let mut total = Decimal::ZERO;
    for row in rows {
        total = add_amount(total, row?)?;
    }
    Ok(total)
}

/// The row an earlier write stored under `key`, if any.
pub fn find_by_key(conn: &Connection, key: &str) -> LedgerResult<Option<Transaction>> {
    let sql = format!("SELECT {TX_COLUMNS} FROM transactions WHERE idempotency_key=?1");
    Ok(conn.query_row(&sql, params![key], map_tx).optional()?)
}

pub(crate) fn key_reused(key: &str) -> LedgerError {
    LedgerError::validation(format!(
        "idempotency key '{}' reused with a different request",
        key
    ))
}

fn same_request(stored: &Transaction, new: &NewTransaction, amount: Decimal) -> bool {
    stored.r#type == new.r#type
        && stored.amount == amount
        && stored.parent_id == new.parent_id
        && stored.account_id == new.account_id
}

fn exists(conn: &Connection, table: &str, id: i64) -> LedgerResult<bool> {
    let sql = format!("SELECT 1 FROM {table} WHERE id=?1");
    let hit: Option<i64> = conn.query_row(&sql, params![id], |r| r.get(0)).optional()?;
    Ok(hit.is_some())
}

fn check_references(conn: &Connection, tx: &NewTransaction) -> LedgerResult<()> {
    if let Some(account_id) = tx.account_id {
        if !exists(conn, "accounts", account_id)? {
            return Err(LedgerError::not_found("account", account_id));
        }
    }
    if let Some(project_id) = tx.project_id {
        if !exists(conn, "projects", project_id)? {
            return Err(LedgerError::not_found("project", project_id));
        }
    }
    if let Some(parent_id) = tx.parent_id {
        let parent = find(conn, parent_id)?
            .ok_or_else(|| LedgerError::not_found("obligation", parent_id))?;
        if !parent.r#type.is_obligation() {
            return Err(LedgerError::validation(format!(
                "transaction {} is a {} and cannot be settled against",
                parent_id, parent.r#type
            )));
        }
        if parent.r#type.settlement_counterpart() != Some(tx.r#type) {
            return Err(LedgerError::validation(format!(
                "a {} cannot settle a {}",
                tx.r#type, parent.r#type
            )));
        }
        let remaining = parent.amount - linked_total(conn, parent_id)?;
        if tx.amount > remaining {
            return Err(LedgerError::validation(format!(
                "payment {} exceeds remaining {} on obligation {}",
                tx.amount, remaining, parent_id
            )));
        }
    }
    Ok(())
}

/// Appends a ledger entry and recomputes the owning account's totals.
///
/// With an idempotency key that was already used, the stored row is returned
/// and nothing is written, provided it records the same type, amount, parent
/// and account as `new`. Any other reuse of the key is a validation error.
pub fn append(conn: &Connection, new: &NewTransaction) -> LedgerResult<Transaction> {
    let amount = check_amount(new.amount)?;
    if new.description.trim().is_empty() {
        return Err(LedgerError::validation("description must not be empty"));
    }
    if new.parent_id.is_some() && new.r#type.is_obligation() {
        return Err(LedgerError::validation(format!(
            "a {} cannot reference a parent obligation",
            new.r#type
        )));
    }

    let tx = begin_write(conn)?;
    if let Some(key) = new.idempotency_key.as_deref() {
        if let Some(existing) = find_by_key(&tx, key)? {
            if !same_request(&existing, new, amount) {
                return Err(key_reused(key));
            }
            info!(
                "event=tx_append module=store status=replay id={} key={}",
                existing.id, key
            );
            return Ok(existing);
        }
    }
    check_references(&tx, new)?;

    tx.execute(
        "INSERT INTO transactions(account_id, project_id, parent_id, type, amount, description, transaction_date, idempotency_key)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            new.account_id,
            new.project_id,
            new.parent_id,
            new.r#type,
            amount.to_string(),
            new.description.trim(),
            fmt_ts(&new.transaction_date),
            new.idempotency_key,
        ],
    )?;
    let id = tx.last_insert_rowid();
    if let Some(account_id) = new.account_id {
        balance::recompute_in(&tx, account_id)?;
    }
    let stored = get(&tx, id)?;
    tx.commit()?;
    info!(
        "event=tx_append module=store status=ok id={} type={} amount={} account_id={:?} parent_id={:?}",
        stored.id, stored.r#type, stored.amount, stored.account_id, stored.parent_id
    );
    Ok(stored)
}

/// Newest `transaction_date` first; every account when `account_id` is `None`.
pub fn list(conn: &Connection, account_id: Option<i64>) -> LedgerResult<Vec<Transaction>> {
    let mut data = Vec::new();
    match account_id {
        Some(id) => {
            let sql = format!(
                "SELECT {TX_COLUMNS} FROM transactions WHERE account_id=?1 ORDER BY transaction_date DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            for row in stmt.query_map(params![id], map_tx)? {
                data.push(row?);
            }
        }
        None => {
            let sql = format!(
                "SELECT {TX_COLUMNS} FROM transactions ORDER BY transaction_date DESC, id DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            for row in stmt.query_map([], map_tx)? {
                data.push(row?);
            }
        }
    }
    Ok(data)
}

/// Entries inside the period's window, newest first.
pub fn list_for_period(
    conn: &Connection,
    period: Period,
    now: NaiveDateTime,
) -> LedgerResult<Vec<Transaction>> {
    let Some((start, end)) = period.window(now) else {
        return list(conn, None);
    };
    list_between(conn, start, end)
}

pub fn list_between(
    conn: &Connection,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> LedgerResult<Vec<Transaction>> {
    let sql = format!(
        "SELECT {TX_COLUMNS} FROM transactions
         WHERE transaction_date >= ?1 AND transaction_date <= ?2
         ORDER BY transaction_date DESC, id DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut data = Vec::new();
    for row in stmt.query_map(params![fmt_ts(&start), fmt_ts(&end)], map_tx)? {
        data.push(row?);
    }
    Ok(data)
}

/// Removes one entry. Obligations with linked settlements must have those
/// settlements removed first.
pub fn delete(conn: &Connection, id: i64) -> LedgerResult<Transaction> {
    let tx = begin_write(conn)?;
    let victim = get(&tx, id)?;
    let linked: i64 = tx.query_row(
        "SELECT COUNT(*) FROM transactions WHERE parent_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    if linked > 0 {
        return Err(LedgerError::validation(format!(
            "obligation {} still has {} linked settlement(s)",
            id, linked
        )));
    }
    tx.execute("DELETE FROM transactions WHERE id=?1", params![id])?;
    if let Some(account_id) = victim.account_id {
        balance::recompute_in(&tx, account_id)?;
    }
    tx.commit()?;
    info!(
        "event=tx_delete module=store status=ok id={} account_id={:?}",
        id, victim.account_id
    );
    Ok(victim)
}
