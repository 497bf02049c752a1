// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::service::Ledger;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};
use anyhow::Result;

pub fn handle(ledger: &Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("monthly", sub)) => monthly(ledger, sub)?,
        Some(("stats", sub)) => stats(ledger, sub)?,
        _ => {}
    }
    Ok(())
}

fn monthly(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let year = *sub.get_one::<i32>("year").unwrap_or(&0);
    let data = ledger.monthly_summary(year)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        return Ok(());
    }
    let totals = ledger.year_totals(year)?;
    let mut rows: Vec<Vec<String>> = data
        .iter()
        .map(|m| {
            vec![
                format!("{}-{:02}", year, m.month),
                fmt_money(&m.income),
                fmt_money(&m.expense),
                fmt_money(&m.net),
            ]
        })
        .collect();
    rows.push(vec![
        format!("{}", year),
        fmt_money(&totals.income),
        fmt_money(&totals.expense),
        fmt_money(&totals.net),
    ]);
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expense", "Net"], rows)
    );
    Ok(())
}

fn stats(ledger: &Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let s = ledger.finance_stats()?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Receivables".to_string(), fmt_money(&s.total_receivables)],
        vec!["Payables".to_string(), fmt_money(&s.total_payables)],
        vec!["Income (this month)".to_string(), fmt_money(&s.monthly_income)],
        vec!["Expenses (this month)".to_string(), fmt_money(&s.monthly_expenses)],
        vec!["Net (this month)".to_string(), fmt_money(&s.net_balance)],
    ];
    println!("{}", pretty_table(&["Figure", "Amount"], rows));
    Ok(())
}
