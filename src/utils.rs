// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, LedgerResult};
use anyhow::Result;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Type;
use rusqlite::Row;
use rust_decimal::Decimal;
use std::str::FromStr;

const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

static MONTH_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{2})$").unwrap());

pub fn parse_date(s: &str) -> LedgerResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| {
        LedgerError::validation(format!("Invalid date '{}', expected YYYY-MM-DD", s))
    })
}

/// Accepts `YYYY-MM-DD` (midnight), `YYYY-MM-DD HH:MM[:SS]` or the same with a `T`.
pub fn parse_datetime(s: &str) -> LedgerResult<NaiveDateTime> {
    let s = s.trim();
    for fmt in [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    Ok(parse_date(s)?.and_time(NaiveTime::MIN))
}

pub fn parse_decimal(s: &str) -> LedgerResult<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .map_err(|_| LedgerError::validation(format!("Invalid decimal '{}'", s)))
}

/// Largest storable amount, in cents: 9,999,999,999.99.
const MAX_AMOUNT_CENTS: i64 = 999_999_999_999;

/// Amounts are `decimal(12,2)`: positive, at most two fractional digits.
pub fn check_amount(amount: Decimal) -> LedgerResult<Decimal> {
    let amount = amount.normalize();
    if amount <= Decimal::ZERO {
        return Err(LedgerError::validation(format!(
            "amount must be positive, got {}",
            amount
        )));
    }
    if amount.scale() > 2 {
        return Err(LedgerError::validation(format!(
            "amount {} has more than two decimal places",
            amount
        )));
    }
    if amount > Decimal::new(MAX_AMOUNT_CENTS, 2) {
        return Err(LedgerError::validation(format!(
            "amount {} exceeds the maximum of {}",
            amount,
            Decimal::new(MAX_AMOUNT_CENTS, 2)
        )));
    }
    Ok(amount)
}

/// Running-sum step that reports overflow instead of panicking.
pub fn add_amount(total: Decimal, amount: Decimal) -> LedgerResult<Decimal> {
    total
        .checked_add(amount)
        .ok_or_else(|| LedgerError::validation(format!("sum overflowed adding {}", amount)))
}

pub fn fmt_ts(dt: &NaiveDateTime) -> String {
    dt.format(TS_FORMAT).to_string()
}

pub fn fmt_money(d: &Decimal) -> String {
    format!("{:.2}", d.round_dp(2))
}

/// Reads a TEXT decimal column.
pub fn decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = row.get(idx)?;
    s.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub fn opt_decimal_at(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<Decimal>> {
    match row.get::<_, Option<String>>(idx)? {
        Some(s) => s
            .parse::<Decimal>()
            .map(Some)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))),
        None => Ok(None),
    }
}

pub fn last_day_of_month(year: i32, month: u32) -> Option<u32> {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    first_of_next.pred_opt().map(|d| d.day())
}

/// `[day 1 00:00:00, last day 23:59:59]` of the given month.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN);
    let last = last_day_of_month(year, month)?;
    let end = NaiveDate::from_ymd_opt(year, month, last)?.and_hms_opt(23, 59, 59)?;
    Some((start, end))
}

/// Reporting window selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    All,
    /// Rolling seven days ending now.
    Week,
    /// Start of the current calendar month to now.
    Month,
    /// Start of the current calendar year to now.
    Year,
    Explicit { year: i32, month: u32 },
}

impl Period {
    /// Inclusive bounds, `None` for an unbounded window.
    pub fn window(&self, now: NaiveDateTime) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match *self {
            Period::All => None,
            Period::Week => Some((now - Duration::days(7), now)),
            Period::Month => {
                let start = now.date().with_day(1)?.and_time(NaiveTime::MIN);
                Some((start, now))
            }
            Period::Year => {
                let start = NaiveDate::from_ymd_opt(now.year(), 1, 1)?.and_time(NaiveTime::MIN);
                Some((start, now))
            }
            Period::Explicit { year, month } => month_bounds(year, month),
        }
    }
}

impl FromStr for Period {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        match token {
            "all" => return Ok(Period::All),
            "week" => return Ok(Period::Week),
            "month" => return Ok(Period::Month),
            "year" => return Ok(Period::Year),
            _ => {}
        }
        let bad = || {
            LedgerError::validation(format!(
                "Invalid period '{}', expected all|week|month|year|YYYY-MM",
                s
            ))
        };
        let caps = MONTH_TOKEN.captures(token).ok_or_else(bad)?;
        let year: i32 = caps[1].parse().map_err(|_| bad())?;
        let month: u32 = caps[2].parse().map_err(|_| bad())?;
        if !(1..=12).contains(&month) {
            return Err(bad());
        }
        Ok(Period::Explicit { year, month })
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
