// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional, required};
use crate::models::{Account, AccountPatch, AccountType, NewAccount};
use crate::service::Ledger;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let new = NewAccount {
                name: required(sub, "name")?.trim().to_string(),
                phone: optional(sub, "phone"),
                email: optional(sub, "email"),
                address: optional(sub, "address"),
                account_type: Some(required(sub, "type")?.parse::<AccountType>()?),
            };
            let acct = ledger.create_account(&new)?;
            println!(
                "Added account #{} '{}' ({})",
                acct.id, acct.name, acct.account_type
            );
        }
        Some(("list", sub)) => {
            let data = ledger.list_accounts()?;
            print_accounts(sub, &data)?;
        }
        Some(("show", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap_or(&0);
            let acct = ledger.get_account(id)?;
            print_accounts(sub, &[acct])?;
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap_or(&0);
            let patch = AccountPatch {
                name: optional(sub, "name"),
                phone: optional(sub, "phone"),
                email: optional(sub, "email"),
                address: optional(sub, "address"),
                account_type: optional(sub, "type")
                    .map(|t| t.parse::<AccountType>())
                    .transpose()?,
            };
            let acct = ledger.update_account(id, &patch)?;
            println!("Updated account #{} '{}'", acct.id, acct.name);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap_or(&0);
            ledger.delete_account(id)?;
            println!("Removed account #{}", id);
        }
        Some(("recompute", sub)) => match sub.get_one::<i64>("id") {
            Some(id) => {
                let acct = ledger.recompute_balance(*id)?;
                println!(
                    "Account #{}: debt {} credit {} balance {}",
                    acct.id,
                    fmt_money(&acct.total_debt),
                    fmt_money(&acct.total_credit),
                    fmt_money(&acct.balance)
                );
            }
            None => {
                let n = ledger.recompute_all()?;
                println!("Recomputed {} account(s)", n);
            }
        },
        _ => {}
    }
    Ok(())
}

fn print_accounts(sub: &clap::ArgMatches, data: &[Account]) -> Result<()> {
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let rows = data
        .iter()
        .map(|a| {
            vec![
                a.id.to_string(),
                a.name.clone(),
                a.account_type.to_string(),
                fmt_money(&a.total_debt),
                fmt_money(&a.total_credit),
                fmt_money(&a.balance),
                a.phone.clone().unwrap_or_default(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Id", "Name", "Type", "Debt", "Credit", "Balance", "Phone"],
            rows
        )
    );
    Ok(())
}
