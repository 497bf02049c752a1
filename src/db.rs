// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult};
use crate::models::{AccountType, TxType};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use log::{error, info};
use once_cell::sync::Lazy;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::Connection;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Cariledger", "cariledger"));

pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("cariledger.sqlite"))
}

/// Owned handle to the ledger database. Built once at startup and handed to
/// whoever needs it; `close` releases it during shutdown.
pub struct Database {
    conn: Connection,
}

impl Database {
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> LedgerResult<Database> {
        let path = path.as_ref();
        let started_at = Instant::now();
        info!("event=db_open module=db status=start path={}", path.display());
        let conn = Connection::open(path).map_err(|err| {
            error!(
                "event=db_open module=db status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            LedgerError::from(err)
        })?;
        conn.busy_timeout(busy_timeout)?;
        init_schema(&conn)?;
        info!(
            "event=db_open module=db status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(Database { conn })
    }

    pub fn open_in_memory() -> LedgerResult<Database> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Database { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    pub fn close(self) -> LedgerResult<()> {
        self.conn.close().map_err(|(_, err)| LedgerError::from(err))?;
        info!("event=db_close module=db status=ok");
        Ok(())
    }
}

pub fn init_schema(conn: &Connection) -> LedgerResult<()> {
    conn.execute_batch(
        r#"
    PRAGMA foreign_keys = ON;

    CREATE TABLE IF NOT EXISTS accounts(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        phone TEXT,
        email TEXT,
        address TEXT,
        account_type TEXT NOT NULL CHECK(account_type IN ('customer','supplier','other')),
        total_debt TEXT NOT NULL DEFAULT '0',
        total_credit TEXT NOT NULL DEFAULT '0',
        balance TEXT NOT NULL DEFAULT '0',
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE IF NOT EXISTS projects(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        description TEXT,
        client_name TEXT NOT NULL,
        client_phone TEXT,
        client_email TEXT,
        project_type TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'planned'
            CHECK(status IN ('planned','in_progress','completed','cancelled')),
        total_amount TEXT,
        start_date TEXT,
        end_date TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    -- amount is a canonical decimal string, summed in application code
    CREATE TABLE IF NOT EXISTS transactions(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        account_id INTEGER,
        project_id INTEGER,
        parent_id INTEGER,
        type TEXT NOT NULL
            CHECK(type IN ('debt','credit','payment_made','payment_received')),
        amount TEXT NOT NULL,
        description TEXT NOT NULL,
        transaction_date TEXT NOT NULL,
        idempotency_key TEXT UNIQUE,
        created_at TEXT NOT NULL DEFAULT (datetime('now')),
        CHECK(parent_id IS NULL OR type IN ('payment_made','payment_received')),
        FOREIGN KEY(account_id) REFERENCES accounts(id),
        FOREIGN KEY(project_id) REFERENCES projects(id),
        FOREIGN KEY(parent_id) REFERENCES transactions(id)
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(transaction_date);
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_parent ON transactions(parent_id);
    "#,
    )?;
    Ok(())
}

impl ToSql for TxType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TxType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: LedgerError| FromSqlError::Other(Box::new(e)))
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: LedgerError| FromSqlError::Other(Box::new(e)))
    }
}
