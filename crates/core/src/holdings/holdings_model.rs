//! Holdings encodings.
//!
//! A holdings matrix has one row per security and one column per asset. It
//! can be handed to the payout engine in four shapes; every shape describes a
//! single *logical* dense matrix, and every payout computed from it must match
//! the dense baseline exactly.

use primitive_types::U256;
use serde::{Deserialize, Serialize};

use crate::errors::PayoutError;

/// Unsigned 256-bit integer used for quantities, valuations, payouts and balances.
pub type Amount = U256;

/// Dimensions fixed at setup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingsShape {
    pub n_securities: usize,
    pub n_assets: usize,
}

impl HoldingsShape {
    pub fn new(n_securities: usize, n_assets: usize) -> Self {
        Self {
            n_securities,
            n_assets,
        }
    }

    /// Checks a valuation vector against the asset count.
    pub fn validate_valuation(&self, valuation: &[Amount]) -> Result<(), PayoutError> {
        if valuation.len() != self.n_assets {
            return Err(PayoutError::dimension(
                "valuation vector",
                self.n_assets,
                valuation.len(),
            ));
        }
        Ok(())
    }

    /// Checks a dense security-major matrix against this shape.
    pub fn validate_dense(&self, matrix: &[Vec<Amount>]) -> Result<(), PayoutError> {
        if matrix.len() != self.n_securities {
            return Err(PayoutError::dimension(
                "dense matrix rows",
                self.n_securities,
                matrix.len(),
            ));
        }
        for (i, row) in matrix.iter().enumerate() {
            if row.len() != self.n_assets {
                return Err(PayoutError::dimension(
                    format!("dense matrix row {}", i),
                    self.n_assets,
                    row.len(),
                ));
            }
        }
        Ok(())
    }
}

/// One non-zero cell of a sparse holdings matrix.
///
/// Repeated `(security, asset)` pairs are additive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparseEntry {
    pub security: usize,
    pub asset: usize,
    pub quantity: Amount,
}

impl SparseEntry {
    pub fn new(security: usize, asset: usize, quantity: impl Into<Amount>) -> Self {
        Self {
            security,
            asset,
            quantity: quantity.into(),
        }
    }
}

/// Assets grouped into equivalence classes of identical holdings columns.
///
/// `column_ids[j]` names the class of asset `j`; `columns[c][i]` is the
/// quantity security `i` holds of every asset in class `c`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeduplicatedColumns {
    pub column_ids: Vec<usize>,
    pub columns: Vec<Vec<Amount>>,
}

impl DeduplicatedColumns {
    pub fn new(column_ids: Vec<usize>, columns: Vec<Vec<Amount>>) -> Self {
        Self {
            column_ids,
            columns,
        }
    }

    /// Number of distinct columns.
    pub fn unique_columns(&self) -> usize {
        self.columns.len()
    }
}

/// Factorization `M = L · R` with `L` of size `n_securities × rank` and `R`
/// of size `rank × n_assets`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LowRankFactor {
    pub left: Vec<Vec<Amount>>,
    pub right: Vec<Vec<Amount>>,
}

impl LowRankFactor {
    pub fn new(left: Vec<Vec<Amount>>, right: Vec<Vec<Amount>>) -> Self {
        Self { left, right }
    }

    pub fn rank(&self) -> usize {
        self.right.len()
    }
}

/// Kind tag of a [`HoldingsEncoding`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EncodingKind {
    Dense,
    SparseEntries,
    DeduplicatedColumns,
    LowRankFactor,
}

impl EncodingKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncodingKind::Dense => "DENSE",
            EncodingKind::SparseEntries => "SPARSE_ENTRIES",
            EncodingKind::DeduplicatedColumns => "DEDUPLICATED_COLUMNS",
            EncodingKind::LowRankFactor => "LOW_RANK_FACTOR",
        }
    }
}

impl std::fmt::Display for EncodingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A holdings matrix in one of the four supported encodings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HoldingsEncoding {
    Dense(Vec<Vec<Amount>>),
    SparseEntries(Vec<SparseEntry>),
    DeduplicatedColumns(DeduplicatedColumns),
    LowRankFactor(LowRankFactor),
}

impl HoldingsEncoding {
    pub fn kind(&self) -> EncodingKind {
        match self {
            HoldingsEncoding::Dense(_) => EncodingKind::Dense,
            HoldingsEncoding::SparseEntries(_) => EncodingKind::SparseEntries,
            HoldingsEncoding::DeduplicatedColumns(_) => EncodingKind::DeduplicatedColumns,
            HoldingsEncoding::LowRankFactor(_) => EncodingKind::LowRankFactor,
        }
    }

    /// Checks every dimension and index of the encoding against `shape`.
    ///
    /// Runs before any arithmetic so that a malformed encoding never reaches
    /// the ledger.
    pub fn validate(&self, shape: &HoldingsShape) -> Result<(), PayoutError> {
        match self {
            HoldingsEncoding::Dense(matrix) => shape.validate_dense(matrix),
            HoldingsEncoding::SparseEntries(entries) => {
                for entry in entries {
                    if entry.security >= shape.n_securities {
                        return Err(PayoutError::index(
                            "sparse entry security",
                            entry.security,
                            shape.n_securities,
                        ));
                    }
                    if entry.asset >= shape.n_assets {
                        return Err(PayoutError::index(
                            "sparse entry asset",
                            entry.asset,
                            shape.n_assets,
                        ));
                    }
                }
                Ok(())
            }
            HoldingsEncoding::DeduplicatedColumns(dedup) => {
                if dedup.column_ids.len() != shape.n_assets {
                    return Err(PayoutError::dimension(
                        "column ids",
                        shape.n_assets,
                        dedup.column_ids.len(),
                    ));
                }
                for (c, column) in dedup.columns.iter().enumerate() {
                    if column.len() != shape.n_securities {
                        return Err(PayoutError::dimension(
                            format!("unique column {}", c),
                            shape.n_securities,
                            column.len(),
                        ));
                    }
                }
                let n_unique = dedup.columns.len();
                if let Some(&bad) = dedup.column_ids.iter().find(|&&c| c >= n_unique) {
                    return Err(PayoutError::index("column id", bad, n_unique));
                }
                Ok(())
            }
            HoldingsEncoding::LowRankFactor(factor) => {
                let rank = factor.rank();
                if rank == 0 {
                    return Err(PayoutError::dimension("low-rank factor rank", 1, 0));
                }
                if factor.left.len() != shape.n_securities {
                    return Err(PayoutError::dimension(
                        "left factor rows",
                        shape.n_securities,
                        factor.left.len(),
                    ));
                }
                for (i, row) in factor.left.iter().enumerate() {
                    if row.len() != rank {
                        return Err(PayoutError::dimension(
                            format!("left factor row {}", i),
                            rank,
                            row.len(),
                        ));
                    }
                }
                for (k, row) in factor.right.iter().enumerate() {
                    if row.len() != shape.n_assets {
                        return Err(PayoutError::dimension(
                            format!("right factor row {}", k),
                            shape.n_assets,
                            row.len(),
                        ));
                    }
                }
                Ok(())
            }
        }
    }
}

impl From<LowRankFactor> for HoldingsEncoding {
    fn from(factor: LowRankFactor) -> Self {
        HoldingsEncoding::LowRankFactor(factor)
    }
}

impl From<DeduplicatedColumns> for HoldingsEncoding {
    fn from(dedup: DeduplicatedColumns) -> Self {
        HoldingsEncoding::DeduplicatedColumns(dedup)
    }
}

impl From<Vec<SparseEntry>> for HoldingsEncoding {
    fn from(entries: Vec<SparseEntry>) -> Self {
        HoldingsEncoding::SparseEntries(entries)
    }
}

/// Converts a `u64` matrix into an [`Amount`] matrix.
pub fn amounts_matrix(rows: &[Vec<u64>]) -> Vec<Vec<Amount>> {
    rows.iter().map(|row| amounts(row)).collect()
}

/// Converts a `u64` vector into an [`Amount`] vector.
pub fn amounts(values: &[u64]) -> Vec<Amount> {
    values.iter().map(|&v| Amount::from(v)).collect()
}
