// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional, required};
use crate::models::{NewTransaction, PendingItem, Transaction, TxType};
use crate::service::Ledger;
use crate::utils::{fmt_money, fmt_ts, maybe_print_json, parse_datetime, parse_decimal, pretty_table};
use anyhow::Result;
use chrono::{Local, NaiveDateTime};
use serde::Serialize;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ledger, sub)?,
        Some(("list", sub)) => {
            let data = ledger.list_transactions(sub.get_one::<i64>("account").copied())?;
            print_transactions(sub, &data)?;
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap_or(&0);
            let removed = ledger.delete_transaction(id)?;
            println!(
                "Removed {} #{} ({})",
                removed.r#type,
                removed.id,
                fmt_money(&removed.amount)
            );
        }
        Some(("pay", sub)) => pay(ledger, sub)?,
        Some(("settle", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap_or(&0);
            let date = optional(sub, "date").map(|d| parse_datetime(&d)).transpose()?;
            let key = optional(sub, "key");
            match ledger.settle(id, date, key.as_deref())? {
                Some(p) => println!(
                    "Settled #{} with {} #{} of {}",
                    id,
                    p.r#type,
                    p.id,
                    fmt_money(&p.amount)
                ),
                None => println!("Nothing left to settle on #{}", id),
            }
        }
        Some(("pending", sub)) => {
            let data = ledger.list_pending()?;
            print_pending(sub, &data)?;
        }
        Some(("recent", sub)) => {
            let limit = *sub.get_one::<usize>("limit").unwrap_or(&10);
            let period = required(sub, "period")?;
            let data = ledger.list_recent(limit, period)?;
            print_transactions(sub, &data)?;
        }
        _ => {}
    }
    Ok(())
}

fn date_or_now(sub: &clap::ArgMatches) -> Result<NaiveDateTime> {
    Ok(match optional(sub, "date") {
        Some(d) => parse_datetime(&d)?,
        None => Local::now().naive_local(),
    })
}

fn add(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let kind = required(sub, "type")?.parse::<TxType>()?;
    let amount = parse_decimal(required(sub, "amount")?)?;
    let desc = required(sub, "desc")?;
    let mut new = NewTransaction::new(kind, amount, desc.trim(), date_or_now(sub)?);
    new.account_id = sub.get_one::<i64>("account").copied();
    new.project_id = sub.get_one::<i64>("project").copied();
    new.idempotency_key = optional(sub, "key");
    let t = ledger.create_transaction(&new)?;
    println!(
        "Recorded {} #{} of {} on {}",
        t.r#type,
        t.id,
        fmt_money(&t.amount),
        fmt_ts(&t.transaction_date)
    );
    Ok(())
}

fn pay(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let parent = *sub.get_one::<i64>("parent").unwrap_or(&0);
    let amount = parse_decimal(required(sub, "amount")?)?;
    let desc = sub.get_one::<String>("desc").map(String::as_str).unwrap_or("");
    let key = optional(sub, "key");
    let p = ledger.partial_settle(parent, amount, desc, date_or_now(sub)?, key.as_deref())?;
    let left = ledger.remaining(parent)?;
    println!(
        "Paid {} against #{} ({} remaining)",
        fmt_money(&p.amount),
        parent,
        fmt_money(&left)
    );
    Ok(())
}

#[derive(Serialize)]
pub struct TransactionRow {
    pub id: i64,
    pub date: String,
    pub r#type: String,
    pub amount: String,
    pub description: String,
    pub account: String,
    pub parent: String,
}

impl From<&Transaction> for TransactionRow {
    fn from(t: &Transaction) -> Self {
        TransactionRow {
            id: t.id,
            date: fmt_ts(&t.transaction_date),
            r#type: t.r#type.to_string(),
            amount: fmt_money(&t.amount),
            description: t.description.clone(),
            account: t.account_id.map(|a| a.to_string()).unwrap_or_default(),
            parent: t.parent_id.map(|p| p.to_string()).unwrap_or_default(),
        }
    }
}

fn print_transactions(sub: &clap::ArgMatches, data: &[Transaction]) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(TransactionRow::from)
        .map(|r| {
            vec![
                r.id.to_string(),
                r.date,
                r.r#type,
                r.amount,
                r.description,
                r.account,
                r.parent,
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Id", "Date", "Type", "Amount", "Description", "Account", "Parent"],
            rows
        )
    );
    Ok(())
}

fn print_pending(sub: &clap::ArgMatches, data: &[PendingItem]) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|p| {
            vec![
                p.id.to_string(),
                fmt_ts(&p.date),
                p.r#type.to_string(),
                fmt_money(&p.amount),
                fmt_money(&p.paid_amount),
                fmt_money(&p.remaining_amount),
                p.description.clone(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Id", "Date", "Type", "Amount", "Paid", "Remaining", "Description"],
            rows
        )
    );
    Ok(())
}
