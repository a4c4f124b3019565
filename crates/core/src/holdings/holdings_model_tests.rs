use crate::errors::PayoutError;
use crate::holdings::{
    amounts, amounts_matrix, materialize, Amount, DeduplicatedColumns, HoldingsEncoding,
    HoldingsShape, LowRankFactor, SparseEntry,
};
use crate::payout::{compute_payouts, OperationMeter};

fn sample_matrix() -> Vec<Vec<Amount>> {
    amounts_matrix(&[vec![1, 2, 3], vec![2, 3, 4]])
}

fn shape() -> HoldingsShape {
    HoldingsShape::new(2, 3)
}

#[test]
fn test_dense_validation_rejects_short_row() {
    let matrix = amounts_matrix(&[vec![1, 2, 3], vec![2, 3]]);
    let err = HoldingsEncoding::Dense(matrix).validate(&shape()).unwrap_err();
    assert_eq!(
        err,
        PayoutError::DimensionMismatch {
            context: "dense matrix row 1".to_string(),
            expected: 3,
            actual: 2,
        }
    );
}

#[test]
fn test_dense_validation_rejects_missing_security() {
    let matrix = amounts_matrix(&[vec![1, 2, 3]]);
    let err = HoldingsEncoding::Dense(matrix).validate(&shape()).unwrap_err();
    assert!(matches!(
        err,
        PayoutError::DimensionMismatch {
            expected: 2,
            actual: 1,
            ..
        }
    ));
}

#[test]
fn test_sparse_validation_rejects_out_of_range_asset() {
    let entries = vec![SparseEntry::new(0, 0, 1u64), SparseEntry::new(1, 3, 1u64)];
    let err = HoldingsEncoding::SparseEntries(entries)
        .validate(&shape())
        .unwrap_err();
    assert_eq!(
        err,
        PayoutError::IndexOutOfRange {
            context: "sparse entry asset".to_string(),
            index: 3,
            bound: 3,
        }
    );
}

#[test]
fn test_sparse_validation_rejects_out_of_range_security() {
    let entries = vec![SparseEntry::new(2, 0, 1u64)];
    let err = HoldingsEncoding::SparseEntries(entries)
        .validate(&shape())
        .unwrap_err();
    assert!(matches!(err, PayoutError::IndexOutOfRange { index: 2, bound: 2, .. }));
}

#[test]
fn test_dedup_validation() {
    let columns = amounts_matrix(&[vec![1, 2], vec![3, 4]]);

    let short_ids = DeduplicatedColumns::new(vec![0, 1], columns.clone());
    assert!(matches!(
        HoldingsEncoding::from(short_ids).validate(&shape()),
        Err(PayoutError::DimensionMismatch { expected: 3, actual: 2, .. })
    ));

    let bad_id = DeduplicatedColumns::new(vec![0, 2, 1], columns.clone());
    assert!(matches!(
        HoldingsEncoding::from(bad_id).validate(&shape()),
        Err(PayoutError::IndexOutOfRange { index: 2, bound: 2, .. })
    ));

    let ragged = DeduplicatedColumns::new(vec![0, 1, 1], amounts_matrix(&[vec![1, 2], vec![3]]));
    assert!(matches!(
        HoldingsEncoding::from(ragged).validate(&shape()),
        Err(PayoutError::DimensionMismatch { expected: 2, actual: 1, .. })
    ));

    let ok = DeduplicatedColumns::new(vec![0, 1, 1], columns);
    assert!(HoldingsEncoding::from(ok).validate(&shape()).is_ok());
}

#[test]
fn test_low_rank_validation() {
    let zero_rank = LowRankFactor::new(vec![vec![], vec![]], vec![]);
    assert!(matches!(
        HoldingsEncoding::from(zero_rank).validate(&shape()),
        Err(PayoutError::DimensionMismatch { expected: 1, actual: 0, .. })
    ));

    let rank_disagrees = LowRankFactor::new(
        amounts_matrix(&[vec![1, 2], vec![1]]),
        amounts_matrix(&[vec![1, 1, 1], vec![2, 2, 2]]),
    );
    assert!(matches!(
        HoldingsEncoding::from(rank_disagrees).validate(&shape()),
        Err(PayoutError::DimensionMismatch { expected: 2, actual: 1, .. })
    ));

    let short_right = LowRankFactor::new(
        amounts_matrix(&[vec![1], vec![2]]),
        amounts_matrix(&[vec![1, 1]]),
    );
    assert!(matches!(
        HoldingsEncoding::from(short_right).validate(&shape()),
        Err(PayoutError::DimensionMismatch { expected: 3, actual: 2, .. })
    ));
}

#[test]
fn test_sparse_from_dense_skips_zeros() {
    let matrix = amounts_matrix(&[vec![0, 5, 0], vec![7, 0, 1]]);
    let entries = SparseEntry::from_dense(&matrix, &shape()).unwrap();
    assert_eq!(
        entries,
        vec![
            SparseEntry::new(0, 1, 5u64),
            SparseEntry::new(1, 0, 7u64),
            SparseEntry::new(1, 2, 1u64),
        ]
    );
}

#[test]
fn test_dedup_from_dense_groups_identical_columns() {
    // Assets 0 and 2 share a column, asset 3 equals asset 1.
    let matrix = amounts_matrix(&[vec![1, 4, 1, 4], vec![2, 5, 2, 5]]);
    let dedup = DeduplicatedColumns::from_dense(&matrix, &HoldingsShape::new(2, 4)).unwrap();
    assert_eq!(dedup.column_ids, vec![0, 1, 0, 1]);
    assert_eq!(dedup.columns, amounts_matrix(&[vec![1, 2], vec![4, 5]]));
    assert_eq!(dedup.unique_columns(), 2);
}

#[test]
fn test_trivial_factorization_picks_smaller_side() {
    let tall = amounts_matrix(&[vec![1], vec![2], vec![3]]);
    let factor = LowRankFactor::trivial(&tall, &HoldingsShape::new(3, 1)).unwrap();
    assert_eq!(factor.rank(), 1);
    assert_eq!(factor.right, vec![amounts(&[1])]);

    let factor = LowRankFactor::trivial(&sample_matrix(), &shape()).unwrap();
    assert_eq!(factor.rank(), 2);
    assert_eq!(factor.right, sample_matrix());
}

#[test]
fn test_trivial_factorization_of_empty_side_is_rank_one() {
    for (n, m) in [(2, 0), (0, 3)] {
        let shape = HoldingsShape::new(n, m);
        let matrix = vec![Vec::new(); n];
        let valuation = vec![Amount::one(); m];
        let dense = compute_payouts(
            &HoldingsEncoding::Dense(matrix.clone()),
            &valuation,
            &shape,
            &mut OperationMeter::unbounded(),
        )
        .unwrap();

        let factors = [
            LowRankFactor::trivial(&matrix, &shape).unwrap(),
            LowRankFactor::identity_left(&matrix, &shape).unwrap(),
            LowRankFactor::identity_right(&matrix, &shape).unwrap(),
        ];
        for factor in factors {
            assert!(factor.rank() >= 1, "rank 0 factor for shape ({}, {})", n, m);
            let encoding: HoldingsEncoding = factor.into();
            let payouts = compute_payouts(
                &encoding,
                &valuation,
                &shape,
                &mut OperationMeter::unbounded(),
            )
            .unwrap();
            assert_eq!(payouts, dense);
            assert_eq!(materialize(&encoding, &shape).unwrap(), matrix);
        }
    }
}

#[test]
fn test_materialize_every_encoding() {
    let matrix = sample_matrix();
    let encodings = vec![
        HoldingsEncoding::Dense(matrix.clone()),
        SparseEntry::from_dense(&matrix, &shape()).unwrap().into(),
        DeduplicatedColumns::from_dense(&matrix, &shape()).unwrap().into(),
        LowRankFactor::identity_left(&matrix, &shape()).unwrap().into(),
        LowRankFactor::identity_right(&matrix, &shape()).unwrap().into(),
    ];
    for encoding in encodings {
        assert_eq!(
            materialize(&encoding, &shape()).unwrap(),
            matrix,
            "{} did not round-trip",
            encoding.kind()
        );
    }
}

#[test]
fn test_materialize_sums_repeated_sparse_entries() {
    let entries = vec![SparseEntry::new(0, 0, 1u64), SparseEntry::new(0, 0, 1u64)];
    let dense = materialize(&entries.into(), &HoldingsShape::new(1, 1)).unwrap();
    assert_eq!(dense, amounts_matrix(&[vec![2]]));
}

#[test]
fn test_materialize_reports_overflow() {
    let entries = vec![
        SparseEntry::new(0, 0, Amount::MAX),
        SparseEntry::new(0, 0, 1u64),
    ];
    let err = materialize(&entries.into(), &HoldingsShape::new(1, 1)).unwrap_err();
    assert!(matches!(err, PayoutError::ArithmeticOverflow(_)));
}
