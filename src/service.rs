// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! `Ledger` is the entry point for callers. It owns the database handle and
//! routes every operation through the retry wrapper. Reads are replayed on a
//! transient failure; writes are replayed only when they carry an
//! idempotency key.

use crate::balance;
use crate::config::Config;
use crate::db::Database;
use crate::error::LedgerResult;
use crate::models::{
    Account, AccountPatch, FinanceStats, MonthSummary, NewAccount, NewProject, NewTransaction,
    PendingItem, Project, ProjectPatch, Transaction,
};
use crate::reports::{self, YearTotals};
use crate::resilience::{wrap, RetryMode, RetryPolicy};
use crate::utils::Period;
use crate::{accounts, projects, settlement, store};
use chrono::{Local, NaiveDateTime};
use rusqlite::Connection;
use rust_decimal::Decimal;

pub struct Ledger {
    db: Database,
    policy: RetryPolicy,
}

fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl Ledger {
    pub fn new(db: Database, policy: RetryPolicy) -> Self {
        Ledger { db, policy }
    }

    pub fn open(cfg: &Config) -> LedgerResult<Self> {
        let db = Database::open(&cfg.db_path, cfg.busy_timeout)?;
        Ok(Ledger::new(db, cfg.retry))
    }

    pub fn conn(&self) -> &Connection {
        self.db.conn()
    }

    pub fn close(self) -> LedgerResult<()> {
        self.db.close()
    }

    /// Runs a read-only query with full retry.
    pub fn read<T, F>(&self, op: F) -> LedgerResult<T>
    where
        F: FnMut(&Connection) -> LedgerResult<T>,
    {
        wrap(self.db.conn(), &self.policy, RetryMode::Replayable, op)
    }

    fn write<T, F>(&self, idempotency_key: Option<&str>, op: F) -> LedgerResult<T>
    where
        F: FnMut(&Connection) -> LedgerResult<T>,
    {
        let mode = if idempotency_key.is_some() {
            RetryMode::Replayable
        } else {
            RetryMode::WakeOnly
        };
        wrap(self.db.conn(), &self.policy, mode, op)
    }

    pub fn create_account(&self, new: &NewAccount) -> LedgerResult<Account> {
        self.write(None, |c| accounts::create(c, new))
    }

    pub fn get_account(&self, id: i64) -> LedgerResult<Account> {
        self.read(|c| accounts::get(c, id))
    }

    pub fn list_accounts(&self) -> LedgerResult<Vec<Account>> {
        self.read(accounts::list)
    }

    pub fn update_account(&self, id: i64, patch: &AccountPatch) -> LedgerResult<Account> {
        self.write(None, |c| accounts::update(c, id, patch))
    }

    pub fn delete_account(&self, id: i64) -> LedgerResult<()> {
        self.write(None, |c| accounts::delete(c, id))
    }

    /// Recomputing is idempotent, so it is replayed like a read.
    pub fn recompute_balance(&self, account_id: i64) -> LedgerResult<Account> {
        self.read(|c| balance::recompute(c, account_id))
    }

    pub fn recompute_all(&self) -> LedgerResult<usize> {
        self.read(balance::recompute_all)
    }

    pub fn create_project(&self, new: &NewProject) -> LedgerResult<Project> {
        self.write(None, |c| projects::create(c, new))
    }

    pub fn get_project(&self, id: i64) -> LedgerResult<Project> {
        self.read(|c| projects::get(c, id))
    }

    pub fn update_project(&self, id: i64, patch: &ProjectPatch) -> LedgerResult<Project> {
        self.write(None, |c| projects::update(c, id, patch))
    }

    pub fn list_projects(&self) -> LedgerResult<Vec<Project>> {
        self.read(projects::list)
    }

    pub fn delete_project(&self, id: i64) -> LedgerResult<()> {
        self.write(None, |c| projects::delete(c, id))
    }

    pub fn create_transaction(&self, new: &NewTransaction) -> LedgerResult<Transaction> {
        self.write(new.idempotency_key.as_deref(), |c| store::append(c, new))
    }

    pub fn get_transaction(&self, id: i64) -> LedgerResult<Transaction> {
        self.read(|c| store::get(c, id))
    }

    pub fn list_transactions(&self, account_id: Option<i64>) -> LedgerResult<Vec<Transaction>> {
        self.read(|c| store::list(c, account_id))
    }

    pub fn delete_transaction(&self, id: i64) -> LedgerResult<Transaction> {
        self.write(None, |c| store::delete(c, id))
    }

    pub fn list_pending(&self) -> LedgerResult<Vec<PendingItem>> {
        self.read(reports::pending_list)
    }

    pub fn list_recent(&self, limit: usize, period: &str) -> LedgerResult<Vec<Transaction>> {
        // Reject a malformed token before touching the store.
        period.parse::<Period>()?;
        let at = now();
        self.read(|c| reports::recent_list(c, limit, period, at))
    }

    pub fn partial_settle(
        &self,
        parent_id: i64,
        amount: Decimal,
        description: &str,
        date: NaiveDateTime,
        idempotency_key: Option<&str>,
    ) -> LedgerResult<Transaction> {
        self.write(idempotency_key, |c| {
            settlement::partial_settle(c, parent_id, amount, description, date, idempotency_key)
        })
    }

    pub fn settle(
        &self,
        id: i64,
        date: Option<NaiveDateTime>,
        idempotency_key: Option<&str>,
    ) -> LedgerResult<Option<Transaction>> {
        let date = date.unwrap_or_else(now);
        self.write(idempotency_key, |c| {
            settlement::settle(c, id, date, idempotency_key)
        })
    }

    pub fn remaining(&self, obligation_id: i64) -> LedgerResult<Decimal> {
        self.read(|c| settlement::remaining(c, obligation_id))
    }

    pub fn monthly_summary(&self, year: i32) -> LedgerResult<Vec<MonthSummary>> {
        self.read(|c| reports::monthly_summary(c, year))
    }

    pub fn year_totals(&self, year: i32) -> LedgerResult<YearTotals> {
        self.read(|c| reports::year_totals(c, year))
    }

    pub fn finance_stats(&self) -> LedgerResult<FinanceStats> {
        let at = now();
        self.read(|c| reports::finance_stats(c, at))
    }
}
