use crate::errors::PayoutError;
use crate::holdings::Amount;
use crate::ledger::{BalanceLedger, HolderId};

#[test]
fn test_unknown_holder_has_zero_balance() {
    let ledger = BalanceLedger::new();
    assert!(ledger.is_empty());
    assert_eq!(ledger.balance_of(&HolderId::from("nobody")), Amount::zero());
}

#[test]
fn test_credit_accumulates() {
    let mut ledger = BalanceLedger::new();
    let alice = HolderId::from("alice");
    ledger.credit(&alice, Amount::from(10u64)).unwrap();
    ledger.credit(&alice, Amount::from(5u64)).unwrap();
    assert_eq!(ledger.balance_of(&alice), Amount::from(15u64));
}

#[test]
fn test_zero_credit_creates_entry() {
    let mut ledger = BalanceLedger::new();
    let alice = HolderId::from("alice");
    ledger.credit(&alice, Amount::zero()).unwrap();
    assert_eq!(ledger.holders(), vec![&alice]);
    assert_eq!(ledger.balance_of(&alice), Amount::zero());
}

#[test]
fn test_batch_aggregates_repeated_holders() {
    let mut ledger = BalanceLedger::new();
    let alice = HolderId::from("alice");
    let bob = HolderId::from("bob");
    ledger
        .credit_batch(vec![
            (&alice, Amount::from(33u64)),
            (&bob, Amount::from(1u64)),
            (&alice, Amount::from(45u64)),
        ])
        .unwrap();
    assert_eq!(ledger.balance_of(&alice), Amount::from(78u64));
    assert_eq!(ledger.balance_of(&bob), Amount::from(1u64));
    assert_eq!(ledger.holders(), vec![&alice, &bob]);
    assert_eq!(ledger.total_credited().unwrap(), Amount::from(79u64));
}

#[test]
fn test_batch_overflow_leaves_ledger_untouched() {
    let mut ledger = BalanceLedger::new();
    let alice = HolderId::from("alice");
    let bob = HolderId::from("bob");
    ledger.credit(&alice, Amount::MAX - Amount::from(1u64)).unwrap();
    let before = ledger.clone();

    let err = ledger
        .credit_batch(vec![
            (&bob, Amount::from(7u64)),
            (&alice, Amount::one()),
            (&alice, Amount::one()),
        ])
        .unwrap_err();

    assert_eq!(err, PayoutError::ArithmeticOverflow("balance of alice".to_string()));
    assert_eq!(ledger, before);
    assert_eq!(ledger.balance_of(&bob), Amount::zero());
}
