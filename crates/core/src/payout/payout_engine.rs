//! Payout computation over every holdings encoding.
//!
//! `payout[i] = Σ_j M[i][j] · valuation[j]` for the logical matrix `M`. The
//! compact encodings contract the valuation vector against their smaller
//! factor first and never build `M`.

use log::debug;

use crate::errors::PayoutError;
use crate::holdings::{
    Amount, DeduplicatedColumns, HoldingsEncoding, HoldingsShape, LowRankFactor, SparseEntry,
};

use super::op_meter::OperationMeter;

/// Computes one payout per security.
///
/// The encoding and valuation are validated against `shape` before the first
/// arithmetic operation. Every multiplication and addition is checked and
/// charged to `meter`.
pub fn compute_payouts(
    encoding: &HoldingsEncoding,
    valuation: &[Amount],
    shape: &HoldingsShape,
    meter: &mut OperationMeter,
) -> Result<Vec<Amount>, PayoutError> {
    shape.validate_valuation(valuation)?;
    encoding.validate(shape)?;

    let payouts = match encoding {
        HoldingsEncoding::Dense(matrix) => dense_payouts(matrix, valuation, meter)?,
        HoldingsEncoding::SparseEntries(entries) => {
            sparse_payouts(entries, valuation, shape.n_securities, meter)?
        }
        HoldingsEncoding::DeduplicatedColumns(dedup) => {
            deduplicated_payouts(dedup, valuation, shape.n_securities, meter)?
        }
        HoldingsEncoding::LowRankFactor(factor) => low_rank_payouts(factor, valuation, meter)?,
    };

    debug!(
        "Computed {} payouts from {} encoding using {} operations",
        payouts.len(),
        encoding.kind(),
        meter.used()
    );
    Ok(payouts)
}

/// Expected operation count of [`compute_payouts`] for a validated encoding.
pub fn operation_cost(encoding: &HoldingsEncoding, shape: &HoldingsShape) -> u64 {
    let n = shape.n_securities as u64;
    let m = shape.n_assets as u64;
    match encoding {
        HoldingsEncoding::Dense(_) => 2 * n * m,
        HoldingsEncoding::SparseEntries(entries) => 2 * entries.len() as u64,
        HoldingsEncoding::DeduplicatedColumns(dedup) => {
            m + 2 * dedup.unique_columns() as u64 * n
        }
        HoldingsEncoding::LowRankFactor(factor) => {
            let rank = factor.rank() as u64;
            2 * rank * m + 2 * rank * n
        }
    }
}

fn dense_payouts(
    matrix: &[Vec<Amount>],
    valuation: &[Amount],
    meter: &mut OperationMeter,
) -> Result<Vec<Amount>, PayoutError> {
    matrix
        .iter()
        .map(|row| dot(row, valuation, meter, "dense payout"))
        .collect()
}

fn sparse_payouts(
    entries: &[SparseEntry],
    valuation: &[Amount],
    n_securities: usize,
    meter: &mut OperationMeter,
) -> Result<Vec<Amount>, PayoutError> {
    let mut payouts = vec![Amount::zero(); n_securities];
    for entry in entries {
        let slot = &mut payouts[entry.security];
        *slot = meter.mul_add(*slot, entry.quantity, valuation[entry.asset], "sparse payout")?;
    }
    Ok(payouts)
}

fn deduplicated_payouts(
    dedup: &DeduplicatedColumns,
    valuation: &[Amount],
    n_securities: usize,
    meter: &mut OperationMeter,
) -> Result<Vec<Amount>, PayoutError> {
    // Every asset of a class pays the same per unit held, so sum their
    // valuations once per class.
    let mut weights = vec![Amount::zero(); dedup.unique_columns()];
    for (&c, &value) in dedup.column_ids.iter().zip(valuation) {
        weights[c] = meter.add(weights[c], value, "column weight")?;
    }

    let mut payouts = vec![Amount::zero(); n_securities];
    for (column, &weight) in dedup.columns.iter().zip(&weights) {
        for (slot, &qty) in payouts.iter_mut().zip(column) {
            *slot = meter.mul_add(*slot, qty, weight, "deduplicated payout")?;
        }
    }
    Ok(payouts)
}

fn low_rank_payouts(
    factor: &LowRankFactor,
    valuation: &[Amount],
    meter: &mut OperationMeter,
) -> Result<Vec<Amount>, PayoutError> {
    let reduced = factor
        .right
        .iter()
        .map(|row| dot(row, valuation, meter, "right factor reduction"))
        .collect::<Result<Vec<_>, _>>()?;

    factor
        .left
        .iter()
        .map(|row| dot(row, &reduced, meter, "low-rank payout"))
        .collect()
}

fn dot(
    lhs: &[Amount],
    rhs: &[Amount],
    meter: &mut OperationMeter,
    context: &str,
) -> Result<Amount, PayoutError> {
    lhs.iter()
        .zip(rhs)
        .try_fold(Amount::zero(), |acc, (&a, &b)| meter.mul_add(acc, a, b, context))
}
