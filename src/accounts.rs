// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{Account, AccountPatch, AccountType, NewAccount};
use crate::utils::decimal_at;
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};

const ACCOUNT_COLUMNS: &str = "id, name, phone, email, address, account_type, total_debt, total_credit, balance, created_at, updated_at";

fn map_account(r: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: r.get(0)?,
        name: r.get(1)?,
        phone: r.get(2)?,
        email: r.get(3)?,
        address: r.get(4)?,
        account_type: r.get(5)?,
        total_debt: decimal_at(r, 6)?,
        total_credit: decimal_at(r, 7)?,
        balance: decimal_at(r, 8)?,
        created_at: r.get(9)?,
        updated_at: r.get(10)?,
    })
}

pub fn create(conn: &Connection, new: &NewAccount) -> LedgerResult<Account> {
    let name = new.name.trim();
    if name.is_empty() {
        return Err(LedgerError::validation("account name must not be empty"));
    }
    conn.execute(
        "INSERT INTO accounts(name, phone, email, address, account_type) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            name,
            new.phone,
            new.email,
            new.address,
            new.account_type.unwrap_or(AccountType::Other)
        ],
    )?;
    let id = conn.last_insert_rowid();
    info!("event=account_create module=accounts status=ok id={}", id);
    get(conn, id)
}

pub fn find(conn: &Connection, id: i64) -> LedgerResult<Option<Account>> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id=?1");
    Ok(conn.query_row(&sql, params![id], map_account).optional()?)
}

pub fn get(conn: &Connection, id: i64) -> LedgerResult<Account> {
    find(conn, id)?.ok_or_else(|| LedgerError::not_found("account", id))
}

pub fn list(conn: &Connection) -> LedgerResult<Vec<Account>> {
    let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts ORDER BY name, id");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], map_account)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Edits descriptive fields. Cached totals are owned by the balance
/// aggregator and never touched here.
pub fn update(conn: &Connection, id: i64, patch: &AccountPatch) -> LedgerResult<Account> {
    let current = get(conn, id)?;
    let name = match patch.name.as_deref().map(str::trim) {
        Some("") => return Err(LedgerError::validation("account name must not be empty")),
        Some(n) => n.to_string(),
        None => current.name,
    };
    conn.execute(
        "UPDATE accounts SET name=?1, phone=?2, email=?3, address=?4, account_type=?5, updated_at=datetime('now')
         WHERE id=?6",
        params![
            name,
            patch.phone.clone().or(current.phone),
            patch.email.clone().or(current.email),
            patch.address.clone().or(current.address),
            patch.account_type.unwrap_or(current.account_type),
            id
        ],
    )?;
    get(conn, id)
}

pub fn delete(conn: &Connection, id: i64) -> LedgerResult<()> {
    get(conn, id)?;
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM transactions WHERE account_id=?1",
        params![id],
        |r| r.get(0),
    )?;
    if n > 0 {
        return Err(LedgerError::validation(format!(
            "account {} still has {} transaction(s)",
            id, n
        )));
    }
    conn.execute("DELETE FROM accounts WHERE id=?1", params![id])?;
    info!("event=account_delete module=accounts status=ok id={}", id);
    Ok(())
}
