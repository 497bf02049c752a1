// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::accounts;
use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, Bucket, TxType};
use crate::store::begin_write;
use crate::utils::{add_amount, decimal_at};
use log::info;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Totals {
    pub total_debt: Decimal,
    pub total_credit: Decimal,
    pub balance: Decimal,
}

/// Full rescan of one account's entries into the outflow and inflow buckets.
pub fn fold_totals(conn: &Connection, account_id: i64) -> LedgerResult<Totals> {
    let mut stmt = conn.prepare("SELECT type, amount FROM transactions WHERE account_id=?1")?;
    let rows = stmt.query_map(params![account_id], |r| {
        Ok((r.get::<_, TxType>(0)?, decimal_at(r, 1)?))
    })?;
    let mut outflow = Decimal::ZERO;
    let mut inflow = Decimal::ZERO;
    for row in rows {
        let (t, amount) = row?;
        match t.bucket() {
            Bucket::Outflow => outflow = add_amount(outflow, amount)?,
            Bucket::Inflow => inflow = add_amount(inflow, amount)?,
        }
    }
    Ok(Totals {
        total_debt: outflow,
        total_credit: inflow,
        balance: outflow - inflow,
    })
}

/// Writes fresh totals for `account_id`. Runs inside the caller's transaction.
pub(crate) fn recompute_in(conn: &Connection, account_id: i64) -> LedgerResult<Totals> {
    let totals = fold_totals(conn, account_id)?;
    let changed = conn.execute(
        "UPDATE accounts SET total_debt=?1, total_credit=?2, balance=?3, updated_at=datetime('now')
         WHERE id=?4",
        params![
            totals.total_debt.normalize().to_string(),
            totals.total_credit.normalize().to_string(),
            totals.balance.normalize().to_string(),
            account_id
        ],
    )?;
    if changed == 0 {
        return Err(LedgerError::not_found("account", account_id));
    }
    info!(
        "event=balance_recompute module=balance status=ok account_id={} total_debt={} total_credit={} balance={}",
        account_id, totals.total_debt, totals.total_credit, totals.balance
    );
    Ok(totals)
}

/// Recomputes one account's cached totals from the ledger and returns the
/// refreshed account. Rerunning without intervening writes changes nothing
/// but `updated_at`.
pub fn recompute(conn: &Connection, account_id: i64) -> LedgerResult<Account> {
    let tx = begin_write(conn)?;
    recompute_in(&tx, account_id)?;
    let account = accounts::get(&tx, account_id)?;
    tx.commit()?;
    Ok(account)
}

/// Rebuilds every account; returns how many were refreshed.
pub fn recompute_all(conn: &Connection) -> LedgerResult<usize> {
    let tx = begin_write(conn)?;
    let ids: Vec<i64> = {
        let mut stmt = tx.prepare("SELECT id FROM accounts ORDER BY id")?;
        let rows = stmt.query_map([], |r| r.get(0))?;
        rows.collect::<rusqlite::Result<_>>()?
    };
    for id in &ids {
        recompute_in(&tx, *id)?;
    }
    tx.commit()?;
    Ok(ids.len())
}
