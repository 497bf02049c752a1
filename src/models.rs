// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Customer,
    Supplier,
    Other,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Customer => "customer",
            AccountType::Supplier => "supplier",
            AccountType::Other => "other",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "customer" => Ok(AccountType::Customer),
            "supplier" => Ok(AccountType::Supplier),
            "other" => Ok(AccountType::Other),
            other => Err(LedgerError::validation(format!(
                "unknown account type '{}', expected customer|supplier|other",
                other
            ))),
        }
    }
}

/// Ledger entry type. A structural tag only: `debt`/`payment_made` feed the
/// outflow bucket, `credit`/`payment_received` the inflow bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TxType {
    Debt,
    Credit,
    PaymentMade,
    PaymentReceived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Outflow,
    Inflow,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Debt => "debt",
            TxType::Credit => "credit",
            TxType::PaymentMade => "payment_made",
            TxType::PaymentReceived => "payment_received",
        }
    }

    pub fn is_obligation(&self) -> bool {
        matches!(self, TxType::Debt | TxType::Credit)
    }

    pub fn is_settlement(&self) -> bool {
        !self.is_obligation()
    }

    /// The type a payment against an obligation of this type carries.
    pub fn settlement_counterpart(&self) -> Option<TxType> {
        match self {
            TxType::Debt => Some(TxType::PaymentMade),
            TxType::Credit => Some(TxType::PaymentReceived),
            _ => None,
        }
    }

    pub fn bucket(&self) -> Bucket {
        match self {
            TxType::Debt | TxType::PaymentMade => Bucket::Outflow,
            TxType::Credit | TxType::PaymentReceived => Bucket::Inflow,
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TxType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "debt" => Ok(TxType::Debt),
            "credit" => Ok(TxType::Credit),
            "payment_made" => Ok(TxType::PaymentMade),
            "payment_received" => Ok(TxType::PaymentReceived),
            other => Err(LedgerError::validation(format!(
                "unknown transaction type '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub account_type: AccountType,
    pub total_debt: Decimal,
    pub total_credit: Decimal,
    pub balance: Decimal,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct NewAccount {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub account_type: Option<AccountType>,
}

/// Fields left `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub account_type: Option<AccountType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub project_type: String,
    pub status: String, // planned | in_progress | completed | cancelled
    pub total_amount: Option<Decimal>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default)]
pub struct NewProject {
    pub name: String,
    pub description: Option<String>,
    pub client_name: String,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub project_type: String,
    pub status: Option<String>,
    pub total_amount: Option<Decimal>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

/// Fields left `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub client_email: Option<String>,
    pub project_type: Option<String>,
    pub status: Option<String>,
    pub total_amount: Option<Decimal>,
    pub start_date: Option<NaiveDateTime>,
    pub end_date: Option<NaiveDateTime>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub account_id: Option<i64>,
    pub project_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub r#type: TxType,
    pub amount: Decimal,
    pub description: String,
    pub transaction_date: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub account_id: Option<i64>,
    pub project_id: Option<i64>,
    pub parent_id: Option<i64>,
    pub r#type: TxType,
    pub amount: Decimal,
    pub description: String,
    pub transaction_date: NaiveDateTime,
    pub idempotency_key: Option<String>,
}

impl NewTransaction {
    pub fn new(
        r#type: TxType,
        amount: Decimal,
        description: impl Into<String>,
        transaction_date: NaiveDateTime,
    ) -> Self {
        NewTransaction {
            account_id: None,
            project_id: None,
            parent_id: None,
            r#type,
            amount,
            description: description.into(),
            transaction_date,
            idempotency_key: None,
        }
    }

    pub fn account(mut self, account_id: i64) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn project(mut self, project_id: i64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn parent(mut self, parent_id: i64) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingItem {
    pub id: i64,
    pub r#type: TxType,
    pub amount: Decimal,
    pub paid_amount: Decimal,
    pub remaining_amount: Decimal,
    pub description: String,
    pub date: NaiveDateTime,
    pub account_id: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub month: u32,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinanceStats {
    pub total_receivables: Decimal,
    pub total_payables: Decimal,
    pub monthly_income: Decimal,
    pub monthly_expenses: Decimal,
    pub net_balance: Decimal,
}
