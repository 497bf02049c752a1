// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Settlement engine. Obligations are never rewritten: every payment, full or
//! partial, is a separate settlement row whose `parent_id` points at the
//! obligation, and the remaining amount is always folded from those rows.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{NewTransaction, Transaction};
use crate::store;
use crate::utils::check_amount;
use chrono::NaiveDateTime;
use log::info;
use rusqlite::Connection;
use rust_decimal::Decimal;

fn obligation(conn: &Connection, id: i64) -> LedgerResult<Transaction> {
    match store::find(conn, id)? {
        Some(t) if t.r#type.is_obligation() => Ok(t),
        _ => Err(LedgerError::not_found("obligation", id)),
    }
}

/// A payment already stored under `key`. It must belong to `obligation_id`
/// and, when `amount` is given, record that amount.
fn replayed(
    conn: &Connection,
    key: Option<&str>,
    obligation_id: i64,
    amount: Option<Decimal>,
) -> LedgerResult<Option<Transaction>> {
    let Some(key) = key else {
        return Ok(None);
    };
    match store::find_by_key(conn, key)? {
        Some(t) if t.parent_id == Some(obligation_id) && amount.is_none_or(|a| a == t.amount) => {
            Ok(Some(t))
        }
        Some(_) => Err(store::key_reused(key)),
        None => Ok(None),
    }
}

pub fn remaining(conn: &Connection, obligation_id: i64) -> LedgerResult<Decimal> {
    let ob = obligation(conn, obligation_id)?;
    Ok(ob.amount - store::linked_total(conn, obligation_id)?)
}

/// Records a payment of `amount` against an obligation.
///
/// An empty description falls back to "<obligation> - partial payment".
pub fn partial_settle(
    conn: &Connection,
    obligation_id: i64,
    amount: Decimal,
    description: &str,
    date: NaiveDateTime,
    idempotency_key: Option<&str>,
) -> LedgerResult<Transaction> {
    let amount = check_amount(amount)?;
    if let Some(done) = replayed(conn, idempotency_key, obligation_id, Some(amount))? {
        return Ok(done);
    }
    let ob = obligation(conn, obligation_id)?;
    let left = ob.amount - store::linked_total(conn, obligation_id)?;
    if amount > left {
        return Err(LedgerError::validation(format!(
            "payment {} exceeds remaining {} on obligation {}",
            amount, left, obligation_id
        )));
    }
    let Some(kind) = ob.r#type.settlement_counterpart() else {
        return Err(LedgerError::not_found("obligation", obligation_id));
    };
    let description = if description.trim().is_empty() {
        format!("{} - partial payment", ob.description)
    } else {
        description.trim().to_string()
    };
    let mut new = NewTransaction::new(kind, amount, description, date).parent(ob.id);
    new.account_id = ob.account_id;
    new.project_id = ob.project_id;
    new.idempotency_key = idempotency_key.map(str::to_string);
    let payment = store::append(conn, &new)?;
    info!(
        "event=settle module=settlement status=ok obligation_id={} payment_id={} amount={} remaining={}",
        obligation_id,
        payment.id,
        amount,
        left - amount
    );
    Ok(payment)
}

/// Settles whatever is still open on an obligation in one payment.
///
/// Returns `None` when there is nothing to do: the obligation is already
/// fully paid, or `id` names a settlement row.
pub fn settle(
    conn: &Connection,
    id: i64,
    date: NaiveDateTime,
    idempotency_key: Option<&str>,
) -> LedgerResult<Option<Transaction>> {
    if let Some(done) = replayed(conn, idempotency_key, id, None)? {
        return Ok(Some(done));
    }
    let row = store::get(conn, id)?;
    if row.r#type.is_settlement() {
        return Ok(None);
    }
    let left = row.amount - store::linked_total(conn, id)?;
    if left <= Decimal::ZERO {
        return Ok(None);
    }
    let description = format!("{} - full settlement", row.description);
    partial_settle(conn, id, left, &description, date, idempotency_key).map(Some)
}
