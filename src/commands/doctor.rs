// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::balance::fold_totals;
use crate::error::LedgerResult;
use crate::models::TxType;
use crate::service::Ledger;
use crate::utils::{add_amount, decimal_at, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::HashMap;

pub fn handle(ledger: &Ledger) -> Result<()> {
    let issues = ledger.read(diagnose)?;
    if issues.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], issues));
    }
    Ok(())
}

/// Read-only invariant check. Each issue is `[kind, detail]`.
pub fn diagnose(conn: &Connection) -> LedgerResult<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Cached totals that drifted from the ledger
    let mut stmt =
        conn.prepare("SELECT id, total_debt, total_credit, balance FROM accounts ORDER BY id")?;
    let accounts = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            decimal_at(r, 1)?,
            decimal_at(r, 2)?,
            decimal_at(r, 3)?,
        ))
    })?;
    for acct in accounts {
        let (id, debt, credit, balance) = acct?;
        let fresh = fold_totals(conn, id)?;
        if fresh.total_debt != debt || fresh.total_credit != credit || fresh.balance != balance {
            rows.push(vec![
                "stale_balance".into(),
                format!(
                    "account {}: cached {}/{}/{} vs ledger {}/{}/{}",
                    id, debt, credit, balance, fresh.total_debt, fresh.total_credit, fresh.balance
                ),
            ]);
        }
    }

    // 2) Settlement rows hanging off something that is not an obligation
    let mut stmt = conn.prepare(
        "SELECT s.id, s.parent_id, p.type FROM transactions s
         LEFT JOIN transactions p ON s.parent_id = p.id
         WHERE s.parent_id IS NOT NULL",
    )?;
    let links = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, i64>(1)?,
            r.get::<_, Option<TxType>>(2)?,
        ))
    })?;
    for link in links {
        let (id, parent, kind) = link?;
        if !kind.is_some_and(|k| k.is_obligation()) {
            rows.push(vec![
                "bad_parent".into(),
                format!("settlement {} points at {}", id, parent),
            ]);
        }
    }

    // 3) Obligations paid past their amount
    let mut paid: HashMap<i64, Decimal> = HashMap::new();
    let mut stmt =
        conn.prepare("SELECT parent_id, amount FROM transactions WHERE parent_id IS NOT NULL")?;
    for row in stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, decimal_at(r, 1)?)))? {
        let (parent, amount) = row?;
        let total = paid.entry(parent).or_insert(Decimal::ZERO);
        *total = add_amount(*total, amount)?;
    }
    let mut stmt =
        conn.prepare("SELECT id, amount FROM transactions WHERE type IN ('debt','credit') ORDER BY id")?;
    for row in stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, decimal_at(r, 1)?)))? {
        let (id, amount) = row?;
        let settled = paid.get(&id).copied().unwrap_or(Decimal::ZERO);
        if settled > amount {
            rows.push(vec![
                "over_settled".into(),
                format!("obligation {}: {} paid against {}", id, settled, amount),
            ]);
        }
    }

    Ok(rows)
}
