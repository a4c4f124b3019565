use crate::distribution::{PayoutOperation, PayoutService, PayoutServiceTrait, PayoutSetup};
use crate::errors::{Error, PayoutError};
use crate::holdings::{amounts, amounts_matrix, Amount, HoldingsEncoding, SparseEntry};
use crate::ledger::HolderId;

fn holders(n: usize) -> Vec<HolderId> {
    (0..n).map(|i| HolderId::new(format!("0xholder{}", i))).collect()
}

fn service() -> PayoutService {
    PayoutService::new(PayoutSetup::new(holders(2), 3))
}

fn matrix() -> Vec<Vec<Amount>> {
    amounts_matrix(&[vec![1, 2, 3], vec![2, 3, 4]])
}

fn valuation() -> Vec<Amount> {
    amounts(&[1, 1, 10])
}

fn balances(service: &PayoutService) -> Vec<Amount> {
    service
        .setup()
        .holders()
        .iter()
        .map(|h| service.get_balance(h))
        .collect()
}

#[test]
fn test_payout_naive_credits_each_holder() {
    let mut service = service();
    let receipt = service.payout_naive(matrix(), &valuation()).unwrap();

    assert_eq!(receipt.operation, PayoutOperation::PayoutNaive);
    assert_eq!(receipt.payouts, amounts(&[33, 45]));
    assert_eq!(receipt.operations_used, 12);
    assert_eq!(balances(&service), amounts(&[33, 45]));
}

#[test]
fn test_every_entry_point_credits_the_same_balances() {
    let expected = amounts(&[33, 45]);

    let mut sparse = service();
    let entries = vec![
        SparseEntry::new(0, 0, 1u64),
        SparseEntry::new(0, 1, 2u64),
        SparseEntry::new(0, 2, 3u64),
        SparseEntry::new(1, 0, 2u64),
        SparseEntry::new(1, 1, 3u64),
        SparseEntry::new(1, 2, 4u64),
    ];
    let receipt = sparse.payout_sparse(entries, &valuation()).unwrap();
    assert_eq!(receipt.operation, PayoutOperation::PayoutSparse);
    assert_eq!(balances(&sparse), expected);

    let mut repeated = service();
    let receipt = repeated
        .payout_repeated_columns(
            vec![0, 1, 2],
            amounts_matrix(&[vec![1, 2], vec![2, 3], vec![3, 4]]),
            &valuation(),
        )
        .unwrap();
    assert_eq!(receipt.operation, PayoutOperation::PayoutRepeatedColumns);
    assert_eq!(balances(&repeated), expected);

    let mut low_rank = service();
    let receipt = low_rank
        .payout_low_rank(
            amounts_matrix(&[vec![1, 0], vec![0, 1]]),
            matrix(),
            &valuation(),
        )
        .unwrap();
    assert_eq!(receipt.operation, PayoutOperation::PayoutLowRank);
    assert_eq!(balances(&low_rank), expected);
}

#[test]
fn test_dimension_mismatch_leaves_balances_unchanged() {
    let mut service = service();
    service.payout_naive(matrix(), &valuation()).unwrap();
    let before = balances(&service);

    let bad = amounts_matrix(&[vec![1, 2, 3], vec![2, 3]]);
    let err = service.payout_naive(bad, &valuation()).unwrap_err();

    assert!(matches!(
        err,
        Error::Payout(PayoutError::DimensionMismatch {
            expected: 3,
            actual: 2,
            ..
        })
    ));
    assert_eq!(balances(&service), before);
}

#[test]
fn test_overflow_leaves_ledger_empty() {
    let mut service = service();
    let huge = vec![vec![Amount::MAX, Amount::zero(), Amount::zero()]; 2];
    let err = service.payout_naive(huge, &valuation()).unwrap_err();

    assert!(matches!(err, Error::Payout(PayoutError::ArithmeticOverflow(_))));
    assert!(service.ledger().is_empty());
}

#[test]
fn test_balance_overflow_rolls_back_whole_call() {
    let mut service = service();
    let first = vec![
        vec![Amount::zero(); 3],
        vec![Amount::MAX, Amount::zero(), Amount::zero()],
    ];
    service.payout_naive(first, &amounts(&[1, 0, 0])).unwrap();

    // Security 0 would be credited fine, security 1 overflows its holder.
    let err = service.payout_naive(matrix(), &valuation()).unwrap_err();
    assert!(matches!(err, Error::Payout(PayoutError::ArithmeticOverflow(_))));
    assert_eq!(balances(&service), vec![Amount::zero(), Amount::MAX]);
}

#[test]
fn test_repeated_investors_aggregate_into_one_holder() {
    let mut service = service();
    let receipt = service
        .payout_repeated_investors(matrix(), &valuation(), &[1, 1])
        .unwrap();

    assert_eq!(receipt.operation, PayoutOperation::PayoutRepeatedInvestors);
    assert_eq!(receipt.payouts, amounts(&[33, 45]));
    assert_eq!(balances(&service), amounts(&[0, 78]));
}

#[test]
fn test_repeated_investors_across_many_securities() {
    let mut service = PayoutService::new(PayoutSetup::new(holders(6), 1));
    let matrix = amounts_matrix(&[vec![1], vec![2], vec![3], vec![4], vec![5], vec![6]]);
    // Securities 2 and 5 share holder 0.
    let investors = [1, 3, 0, 4, 2, 0];
    service
        .payout_repeated_investors(matrix, &amounts(&[10]), &investors)
        .unwrap();

    assert_eq!(balances(&service), amounts(&[90, 10, 50, 20, 40, 0]));
}

#[test]
fn test_investors_length_and_range_are_validated() {
    let mut service = service();

    let err = service
        .payout_repeated_investors(matrix(), &valuation(), &[0])
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Payout(PayoutError::DimensionMismatch { expected: 2, actual: 1, .. })
    ));

    let err = service
        .payout_repeated_investors(matrix(), &valuation(), &[0, 2])
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Payout(PayoutError::IndexOutOfRange { index: 2, bound: 2, .. })
    ));
    assert!(service.ledger().is_empty());
}

#[test]
fn test_payout_to_investors_works_for_sparse() {
    let mut service = service();
    let receipt = service
        .payout_to_investors(
            vec![SparseEntry::new(0, 2, 1u64), SparseEntry::new(1, 2, 2u64)].into(),
            &valuation(),
            &[0, 0],
        )
        .unwrap();

    assert_eq!(receipt.operation, PayoutOperation::PayoutSparse);
    assert_eq!(balances(&service), amounts(&[30, 0]));
}

#[test]
fn test_repeated_calls_are_cumulative() {
    let mut service = service();
    service.payout_naive(matrix(), &valuation()).unwrap();
    service.payout_naive(matrix(), &valuation()).unwrap();
    assert_eq!(balances(&service), amounts(&[66, 90]));
}

#[test]
fn test_preview_does_not_credit() {
    let service = service();
    let receipt = service
        .preview(&HoldingsEncoding::Dense(matrix()), &valuation())
        .unwrap();
    assert_eq!(receipt.payouts, amounts(&[33, 45]));
    assert!(service.ledger().is_empty());
}

#[test]
fn test_operation_budget_aborts_without_credit() {
    let mut service = service().with_operation_budget(11);
    let err = service.payout_naive(matrix(), &valuation()).unwrap_err();
    assert!(matches!(
        err,
        Error::Payout(PayoutError::BudgetExceeded {
            limit: 11,
            required: 12
        })
    ));
    assert!(service.ledger().is_empty());

    // A deduplicated encoding with two unique columns fits in the same budget.
    let mut dedup_service =
        PayoutService::new(PayoutSetup::new(holders(2), 3)).with_operation_budget(11);
    dedup_service
        .payout_repeated_columns(
            vec![0, 0, 1],
            amounts_matrix(&[vec![1, 1], vec![5, 5]]),
            &valuation(),
        )
        .unwrap();
    assert_eq!(balances(&dedup_service), amounts(&[52, 52]));
}

#[test]
fn test_unknown_holder_balance_is_zero() {
    let service = service();
    assert_eq!(service.get_balance(&HolderId::from("0xstranger")), Amount::zero());
}
