// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cariledger::commands::exporter;
use cariledger::db::Database;
use cariledger::models::{NewTransaction, TxType};
use cariledger::resilience::RetryPolicy;
use cariledger::utils::parse_datetime;
use cariledger::Ledger;
use rust_decimal::Decimal;
use serde_json::Value;
use tempfile::tempdir;

fn seeded() -> Ledger {
    let ledger = Ledger::new(Database::open_in_memory().unwrap(), RetryPolicy::new(3, 0));
    let ob = ledger
        .create_transaction(&NewTransaction::new(
            TxType::Credit,
            Decimal::new(120050, 2),
            "Invoice 7",
            parse_datetime("2025-01-10").unwrap(),
        ))
        .unwrap();
    ledger
        .partial_settle(
            ob.id,
            Decimal::from(200),
            "",
            parse_datetime("2025-01-20 15:30").unwrap(),
            None,
        )
        .unwrap();
    ledger
}

#[test]
fn export_transactions_writes_csv_oldest_first() {
    let ledger = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.csv");

    let n = exporter::export_transactions(&ledger, "csv", out.to_str().unwrap(), None).unwrap();
    assert_eq!(n, 2);

    let mut rdr = csv::Reader::from_path(&out).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "id");
    assert_eq!(&headers[7], "parent_id");
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[0][1], "2025-01-10 00:00:00");
    assert_eq!(&records[0][2], "credit");
    assert_eq!(&records[0][3], "1200.5");
    assert_eq!(&records[1][2], "payment_received");
    assert_eq!(&records[1][4], "Invoice 7 - partial payment");
    assert_eq!(&records[1][7], &records[0][0]);
}

#[test]
fn export_transactions_writes_pretty_json() {
    let ledger = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.json");

    exporter::export_transactions(&ledger, "json", out.to_str().unwrap(), None).unwrap();

    let body = std::fs::read_to_string(&out).unwrap();
    assert!(body.contains("\n  {"));
    let items: Value = serde_json::from_str(&body).unwrap();
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["type"], "credit");
    assert_eq!(items[0]["amount"], "1200.5");
    assert!(items[0]["parent_id"].is_null());
    assert_eq!(items[1]["date"], "2025-01-20 15:30:00");
    assert_eq!(items[1]["parent_id"], items[0]["id"]);
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let ledger = seeded();
    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.xml");

    let err = exporter::export_transactions(&ledger, "xml", out.to_str().unwrap(), None)
        .unwrap_err();
    assert!(err.to_string().contains("Unknown format"));
    assert!(!out.exists());
}
