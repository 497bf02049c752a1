// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use cariledger::db::Database;
use cariledger::models::{NewTransaction, TxType};
use cariledger::resilience::RetryPolicy;
use cariledger::utils::parse_datetime;
use cariledger::{settlement, store, Ledger, LedgerError};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn setup() -> Ledger {
    Ledger::new(Database::open_in_memory().unwrap(), RetryPolicy::new(3, 0))
}

fn obligation(ledger: &Ledger, t: TxType, amount: i64, desc: &str, date: &str) -> i64 {
    ledger
        .create_transaction(&NewTransaction::new(
            t,
            Decimal::from(amount),
            desc,
            parse_datetime(date).unwrap(),
        ))
        .unwrap()
        .id
}

#[test]
fn installments_until_fully_paid() {
    let ledger = setup();
    let id = obligation(&ledger, TxType::Debt, 1000, "Malzeme", "2025-01-10");

    let first = ledger
        .partial_settle(id, Decimal::from(400), "ilk ödeme", parse_datetime("2025-01-15").unwrap(), None)
        .unwrap();
    assert_eq!(first.r#type, TxType::PaymentMade);
    assert_eq!(first.parent_id, Some(id));

    let pending = ledger.list_pending().unwrap();
    let item = pending.iter().find(|p| p.id == id).unwrap();
    assert_eq!(item.paid_amount, Decimal::from(400));
    assert_eq!(item.remaining_amount, Decimal::from(600));

    let err = ledger
        .partial_settle(id, Decimal::from(700), "fazla", parse_datetime("2025-01-16").unwrap(), None)
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(ledger.remaining(id).unwrap(), Decimal::from(600));

    ledger
        .partial_settle(id, Decimal::from(600), "son ödeme", parse_datetime("2025-01-20").unwrap(), None)
        .unwrap();
    assert!(ledger.list_pending().unwrap().iter().all(|p| p.id != id));
    assert_eq!(ledger.remaining(id).unwrap(), Decimal::ZERO);
}

#[test]
fn settlement_copies_account_and_project_from_obligation() {
    let ledger = setup();
    let acct = ledger
        .create_account(&cariledger::models::NewAccount {
            name: "Tedarikçi".into(),
            ..Default::default()
        })
        .unwrap();
    let project = ledger
        .create_project(&cariledger::models::NewProject {
            name: "Tabela".into(),
            client_name: "ACME".into(),
            project_type: "signage".into(),
            ..Default::default()
        })
        .unwrap();
    let ob = ledger
        .create_transaction(
            &NewTransaction::new(TxType::Credit, Decimal::from(300), "Fatura", parse_datetime("2025-03-01").unwrap())
                .account(acct.id)
                .project(project.id),
        )
        .unwrap();
    let pay = ledger
        .partial_settle(ob.id, Decimal::from(100), "", parse_datetime("2025-03-05").unwrap(), None)
        .unwrap();
    assert_eq!(pay.r#type, TxType::PaymentReceived);
    assert_eq!(pay.account_id, Some(acct.id));
    assert_eq!(pay.project_id, Some(project.id));
    assert_eq!(pay.description, "Fatura - partial payment");
    assert_eq!(ledger.get_account(acct.id).unwrap().total_credit, Decimal::from(400));
}

#[test]
fn settle_pays_the_remainder_without_touching_the_obligation() {
    let ledger = setup();
    let id = obligation(&ledger, TxType::Credit, 900, "Kira", "2025-04-01");
    ledger
        .partial_settle(id, Decimal::from(250), "kısmi", parse_datetime("2025-04-02").unwrap(), None)
        .unwrap();

    let pay = ledger
        .settle(id, Some(parse_datetime("2025-04-10").unwrap()), None)
        .unwrap()
        .unwrap();
    assert_eq!(pay.amount, Decimal::from(650));
    assert_eq!(pay.description, "Kira - full settlement");

    let ob = ledger.get_transaction(id).unwrap();
    assert_eq!(ob.r#type, TxType::Credit);
    assert_eq!(ob.amount, Decimal::from(900));

    // second call and calls on a settlement row are no-ops
    assert!(ledger.settle(id, None, None).unwrap().is_none());
    assert!(ledger.settle(pay.id, None, None).unwrap().is_none());
    assert_eq!(ledger.list_transactions(None).unwrap().len(), 3);
}

#[test]
fn unknown_or_non_obligation_targets_are_not_found() {
    let ledger = setup();
    let pay = obligation(&ledger, TxType::PaymentMade, 50, "nakit", "2025-01-01");
    let date = parse_datetime("2025-01-02").unwrap();
    let err = ledger.partial_settle(pay, Decimal::from(10), "x", date, None).unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { entity: "obligation", .. }));
    let err = ledger.partial_settle(777, Decimal::from(10), "x", date, None).unwrap_err();
    assert_eq!(err.status_code(), 404);
    assert_eq!(ledger.settle(777, None, None).unwrap_err().status_code(), 404);
}

#[test]
fn non_positive_payment_is_rejected() {
    let ledger = setup();
    let id = obligation(&ledger, TxType::Debt, 100, "x", "2025-01-01");
    let date = parse_datetime("2025-01-02").unwrap();
    assert!(matches!(
        ledger.partial_settle(id, Decimal::ZERO, "x", date, None),
        Err(LedgerError::Validation(_))
    ));
    assert!(matches!(
        ledger.partial_settle(id, Decimal::from(-3), "x", date, None),
        Err(LedgerError::Validation(_))
    ));
}

#[test]
fn keyed_payment_is_recorded_once() {
    let ledger = setup();
    let id = obligation(&ledger, TxType::Debt, 100, "x", "2025-01-01");
    let date = parse_datetime("2025-01-02").unwrap();
    let a = ledger
        .partial_settle(id, Decimal::from(100), "tam", date, Some("pay-1"))
        .unwrap();
    // replay after the obligation is closed returns the stored payment
    let b = ledger
        .partial_settle(id, Decimal::from(100), "tam", date, Some("pay-1"))
        .unwrap();
    assert_eq!(a, b);
    assert_eq!(ledger.remaining(id).unwrap(), Decimal::ZERO);
}

#[test]
fn payment_key_cannot_be_reused_for_another_obligation() {
    let ledger = setup();
    let a = obligation(&ledger, TxType::Debt, 300, "a", "2025-01-01");
    let b = obligation(&ledger, TxType::Debt, 500, "b", "2025-01-01");
    let date = parse_datetime("2025-01-02").unwrap();
    ledger
        .partial_settle(a, Decimal::from(100), "", date, Some("k"))
        .unwrap();

    let err = ledger
        .partial_settle(b, Decimal::from(250), "", date, Some("k"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert_eq!(ledger.remaining(b).unwrap(), Decimal::from(500));

    // same obligation, different amount
    let err = ledger
        .partial_settle(a, Decimal::from(50), "", date, Some("k"))
        .unwrap_err();
    assert!(matches!(err, LedgerError::Validation(_)));
    assert!(matches!(
        ledger.settle(b, Some(date), Some("k")),
        Err(LedgerError::Validation(_))
    ));
    assert_eq!(ledger.remaining(a).unwrap(), Decimal::from(200));
    assert_eq!(ledger.remaining(b).unwrap(), Decimal::from(500));
}

#[test]
fn payments_with_sub_cent_precision_are_rejected() {
    let ledger = setup();
    let id = obligation(&ledger, TxType::Credit, 10, "c", "2025-01-01");
    let date = parse_datetime("2025-01-02").unwrap();
    assert!(matches!(
        ledger.partial_settle(id, Decimal::new(1001, 3), "", date, None),
        Err(LedgerError::Validation(_))
    ));
    ledger
        .partial_settle(id, Decimal::new(1000, 3), "", date, None)
        .unwrap();
    assert_eq!(ledger.remaining(id).unwrap(), Decimal::from(9));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn linked_payments_never_exceed_the_obligation(
        total in 1i64..100_000,
        attempts in prop::collection::vec(1i64..40_000, 1..20)
    ) {
        let db = Database::open_in_memory().unwrap();
        let conn = db.conn();
        let date = parse_datetime("2025-06-01").unwrap();
        let ob = store::append(conn, &NewTransaction::new(TxType::Debt, Decimal::new(total, 2), "ob", date)).unwrap();
        let mut paid = Decimal::ZERO;
        for cents in attempts {
            let amount = Decimal::new(cents, 2);
            let left = Decimal::new(total, 2) - paid;
            let res = settlement::partial_settle(conn, ob.id, amount, "p", date, None);
            if amount <= left {
                prop_assert!(res.is_ok());
                paid += amount;
            } else {
                prop_assert!(matches!(res, Err(LedgerError::Validation(_))));
            }
            prop_assert!(store::linked_total(conn, ob.id).unwrap() <= ob.amount);
        }
        prop_assert_eq!(store::linked_total(conn, ob.id).unwrap(), paid);
    }
}
