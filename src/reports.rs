// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Bucket, FinanceStats, MonthSummary, PendingItem, TxType};
use crate::store;
use crate::utils::{add_amount, decimal_at, month_bounds, Period};
use chrono::{Datelike, NaiveDateTime};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Obligations with something left to pay, newest first.
pub fn pending_list(conn: &Connection) -> LedgerResult<Vec<PendingItem>> {
    let mut paid: HashMap<i64, Decimal> = HashMap::new();
    {
        let mut stmt =
            conn.prepare("SELECT parent_id, amount FROM transactions WHERE parent_id IS NOT NULL")?;
        let rows = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, decimal_at(r, 1)?)))?;
        for row in rows {
            let (parent, amount) = row?;
            let total = paid.entry(parent).or_insert(Decimal::ZERO);
            *total = add_amount(*total, amount)?;
        }
    }

    let mut stmt = conn.prepare(
        "SELECT id, type, amount, description, transaction_date, account_id
         FROM transactions WHERE type IN ('debt','credit')
         ORDER BY transaction_date DESC, id DESC",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, TxType>(1)?,
            decimal_at(r, 2)?,
            r.get::<_, String>(3)?,
            r.get::<_, NaiveDateTime>(4)?,
            r.get::<_, Option<i64>>(5)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (id, t, amount, description, date, account_id) = row?;
        let paid_amount = paid.get(&id).copied().unwrap_or(Decimal::ZERO);
        let remaining_amount = amount - paid_amount;
        if remaining_amount > Decimal::ZERO {
            data.push(PendingItem {
                id,
                r#type: t,
                amount,
                paid_amount,
                remaining_amount,
                description,
                date,
                account_id,
            });
        }
    }
    Ok(data)
}

/// Entries in the period's window, newest first, at most `limit` of them.
pub fn recent_list(
    conn: &Connection,
    limit: usize,
    period: &str,
    now: NaiveDateTime,
) -> LedgerResult<Vec<crate::models::Transaction>> {
    let period: Period = period.parse()?;
    let mut rows = store::list_for_period(conn, period, now)?;
    rows.truncate(limit);
    Ok(rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct YearTotals {
    pub year: i32,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

fn year_rows(conn: &Connection, year: i32) -> LedgerResult<Vec<(u32, TxType, Decimal)>> {
    let (Some((start, _)), Some((_, end))) = (month_bounds(year, 1), month_bounds(year, 12))
    else {
        return Err(LedgerError::validation(format!("year {} out of range", year)));
    };
    let rows = store::list_between(conn, start, end)?;
    Ok(rows
        .into_iter()
        .map(|t| (t.transaction_date.month(), t.r#type, t.amount))
        .collect())
}

/// Twelve rows, January first. Months without activity report zeros.
pub fn monthly_summary(conn: &Connection, year: i32) -> LedgerResult<Vec<MonthSummary>> {
    let mut map: BTreeMap<u32, (Decimal, Decimal)> =
        (1..=12).map(|m| (m, (Decimal::ZERO, Decimal::ZERO))).collect();
    for (month, t, amount) in year_rows(conn, year)? {
        let entry = map.entry(month).or_insert((Decimal::ZERO, Decimal::ZERO));
        match t.bucket() {
            Bucket::Inflow => entry.0 = add_amount(entry.0, amount)?,
            Bucket::Outflow => entry.1 = add_amount(entry.1, amount)?,
        }
    }
    Ok(map
        .into_iter()
        .map(|(month, (income, expense))| MonthSummary {
            month,
            income,
            expense,
            net: income - expense,
        })
        .collect())
}

/// Whole-year figures computed without month grouping.
pub fn year_totals(conn: &Connection, year: i32) -> LedgerResult<YearTotals> {
    let mut totals = YearTotals {
        year,
        ..YearTotals::default()
    };
    for (_, t, amount) in year_rows(conn, year)? {
        match t.bucket() {
            Bucket::Inflow => totals.income = add_amount(totals.income, amount)?,
            Bucket::Outflow => totals.expense = add_amount(totals.expense, amount)?,
        }
    }
    totals.net = totals.income - totals.expense;
    Ok(totals)
}

/// Dashboard figures: open receivables/payables plus the current month's flow.
pub fn finance_stats(conn: &Connection, now: NaiveDateTime) -> LedgerResult<FinanceStats> {
    let mut total_receivables = Decimal::ZERO;
    let mut total_payables = Decimal::ZERO;
    for item in pending_list(conn)? {
        match item.r#type {
            TxType::Credit => {
                total_receivables = add_amount(total_receivables, item.remaining_amount)?
            }
            TxType::Debt => total_payables = add_amount(total_payables, item.remaining_amount)?,
            _ => {}
        }
    }
    let months = monthly_summary(conn, now.year())?;
    let (monthly_income, monthly_expenses) = months
        .iter()
        .find(|m| m.month == now.month())
        .map(|m| (m.income, m.expense))
        .unwrap_or_default();
    Ok(FinanceStats {
        total_receivables,
        total_payables,
        monthly_income,
        monthly_expenses,
        net_balance: monthly_income - monthly_expenses,
    })
}
