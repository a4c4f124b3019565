//! Conversions between the dense holdings matrix and the compact encodings.
//!
//! The payout path never calls [`materialize`]; it exists for fixture
//! preparation and equivalence checks.

use std::collections::HashMap;

use crate::errors::PayoutError;

use super::holdings_model::{
    Amount, DeduplicatedColumns, HoldingsEncoding, HoldingsShape, LowRankFactor, SparseEntry,
};

/// Builds the logical dense matrix an encoding represents.
pub fn materialize(
    encoding: &HoldingsEncoding,
    shape: &HoldingsShape,
) -> Result<Vec<Vec<Amount>>, PayoutError> {
    encoding.validate(shape)?;
    let mut dense = vec![vec![Amount::zero(); shape.n_assets]; shape.n_securities];

    match encoding {
        HoldingsEncoding::Dense(matrix) => dense.clone_from(matrix),
        HoldingsEncoding::SparseEntries(entries) => {
            for entry in entries {
                let cell = &mut dense[entry.security][entry.asset];
                *cell = cell
                    .checked_add(entry.quantity)
                    .ok_or_else(|| PayoutError::overflow("sparse entry materialization"))?;
            }
        }
        HoldingsEncoding::DeduplicatedColumns(dedup) => {
            for (j, &c) in dedup.column_ids.iter().enumerate() {
                for (i, row) in dense.iter_mut().enumerate() {
                    row[j] = dedup.columns[c][i];
                }
            }
        }
        HoldingsEncoding::LowRankFactor(factor) => {
            for (i, row) in dense.iter_mut().enumerate() {
                for (j, cell) in row.iter_mut().enumerate() {
                    let mut acc = Amount::zero();
                    for (k, right_row) in factor.right.iter().enumerate() {
                        let term = factor.left[i][k]
                            .checked_mul(right_row[j])
                            .ok_or_else(|| PayoutError::overflow("low-rank materialization"))?;
                        acc = acc
                            .checked_add(term)
                            .ok_or_else(|| PayoutError::overflow("low-rank materialization"))?;
                    }
                    *cell = acc;
                }
            }
        }
    }

    Ok(dense)
}

impl SparseEntry {
    /// Lists the non-zero cells of a dense matrix in row-major order.
    pub fn from_dense(
        matrix: &[Vec<Amount>],
        shape: &HoldingsShape,
    ) -> Result<Vec<SparseEntry>, PayoutError> {
        shape.validate_dense(matrix)?;
        Ok(matrix
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, qty)| !qty.is_zero())
                    .map(move |(j, &qty)| SparseEntry::new(i, j, qty))
            })
            .collect())
    }
}

impl DeduplicatedColumns {
    /// Groups identical asset columns of a dense matrix.
    ///
    /// Class ids are assigned in order of first occurrence, starting at zero.
    pub fn from_dense(
        matrix: &[Vec<Amount>],
        shape: &HoldingsShape,
    ) -> Result<DeduplicatedColumns, PayoutError> {
        shape.validate_dense(matrix)?;
        let mut class_of: HashMap<Vec<Amount>, usize> = HashMap::new();
        let mut column_ids = Vec::with_capacity(shape.n_assets);
        let mut columns: Vec<Vec<Amount>> = Vec::new();

        for j in 0..shape.n_assets {
            let column: Vec<Amount> = matrix.iter().map(|row| row[j]).collect();
            let id = match class_of.get(&column) {
                Some(&id) => id,
                None => {
                    let id = columns.len();
                    class_of.insert(column.clone(), id);
                    columns.push(column);
                    id
                }
            };
            column_ids.push(id);
        }

        Ok(DeduplicatedColumns::new(column_ids, columns))
    }
}

impl LowRankFactor {
    /// `L = I` (securities × securities), `R = M`.
    pub fn identity_left(
        matrix: &[Vec<Amount>],
        shape: &HoldingsShape,
    ) -> Result<LowRankFactor, PayoutError> {
        shape.validate_dense(matrix)?;
        if shape.n_securities == 0 {
            return Ok(Self::zero(shape));
        }
        Ok(LowRankFactor::new(
            identity(shape.n_securities),
            matrix.to_vec(),
        ))
    }

    /// `L = M`, `R = I` (assets × assets). Rank equals the asset count.
    pub fn identity_right(
        matrix: &[Vec<Amount>],
        shape: &HoldingsShape,
    ) -> Result<LowRankFactor, PayoutError> {
        shape.validate_dense(matrix)?;
        if shape.n_assets == 0 {
            return Ok(Self::zero(shape));
        }
        Ok(LowRankFactor::new(matrix.to_vec(), identity(shape.n_assets)))
    }

    /// Exact factorization of rank `max(1, min(n_securities, n_assets))`.
    pub fn trivial(
        matrix: &[Vec<Amount>],
        shape: &HoldingsShape,
    ) -> Result<LowRankFactor, PayoutError> {
        if shape.n_securities <= shape.n_assets {
            Self::identity_left(matrix, shape)
        } else {
            Self::identity_right(matrix, shape)
        }
    }

    /// Rank-one factor of the all-zero matrix; rank 0 is not a valid factor.
    fn zero(shape: &HoldingsShape) -> LowRankFactor {
        LowRankFactor::new(
            vec![vec![Amount::zero()]; shape.n_securities],
            vec![vec![Amount::zero(); shape.n_assets]],
        )
    }
}

/// `n × n` identity matrix.
pub fn identity(n: usize) -> Vec<Vec<Amount>> {
    (0..n)
        .map(|i| {
            let mut row = vec![Amount::zero(); n];
            row[i] = Amount::one();
            row
        })
        .collect()
}
