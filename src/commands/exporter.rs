// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::service::Ledger;
use crate::utils::fmt_ts;
use anyhow::{anyhow, Result};
use serde_json::json;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = required(sub, "format")?.to_lowercase();
            let out = required(sub, "out")?;
            let account = sub.get_one::<i64>("account").copied();
            let n = export_transactions(ledger, &fmt, out, account)?;
            println!("Exported {} transaction(s) to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes the ledger oldest-first. Returns the number of rows written.
pub fn export_transactions(
    ledger: &Ledger,
    fmt: &str,
    out: &str,
    account: Option<i64>,
) -> Result<usize> {
    let mut rows = ledger.list_transactions(account)?;
    rows.reverse();

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "date",
                "type",
                "amount",
                "description",
                "account_id",
                "project_id",
                "parent_id",
            ])?;
            for t in &rows {
                wtr.write_record([
                    t.id.to_string(),
                    fmt_ts(&t.transaction_date),
                    t.r#type.to_string(),
                    t.amount.to_string(),
                    t.description.clone(),
                    t.account_id.map(|v| v.to_string()).unwrap_or_default(),
                    t.project_id.map(|v| v.to_string()).unwrap_or_default(),
                    t.parent_id.map(|v| v.to_string()).unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = rows
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "date": fmt_ts(&t.transaction_date),
                        "type": t.r#type,
                        "amount": t.amount.to_string(),
                        "description": t.description,
                        "account_id": t.account_id,
                        "project_id": t.project_id,
                        "parent_id": t.parent_id,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    Ok(rows.len())
}
