//! JSON fixture format shared by the generator and the checker.
//!
//! Matrices are security-major: `matrix[i]` and `L[i]` belong to security `i`.
//! `payout_triples` are `(security, asset, quantity)` and `column_id` values
//! are 0-based.
//!
//! The key names match the upstream benchmark generator, but its files are
//! asset-major with `(asset, security, quantity)` triples and 1-based column
//! ids, so they cannot be loaded as-is: `load` rejects them when the header
//! disagrees with the matrix, and misreads them otherwise.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result, ValidationError};
use crate::holdings::{
    amounts, amounts_matrix, Amount, DeduplicatedColumns, HoldingsEncoding, HoldingsShape,
    LowRankFactor, SparseEntry,
};
use crate::payout::{compute_payouts, OperationMeter};

/// One payout scenario with every encoding of the same logical matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutFixture {
    pub n_assets: usize,
    pub n_securities: usize,
    pub assets_cost: Vec<u64>,
    pub matrix: Vec<Vec<u64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payout_triples: Option<Vec<(usize, usize, u64)>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_id: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<Vec<u64>>>,
    #[serde(rename = "L", default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Vec<Vec<u64>>>,
    #[serde(rename = "R", default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Vec<Vec<u64>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investors: Option<Vec<usize>>,
    /// Expected payouts as decimal strings; empty when unknown.
    #[serde(default)]
    pub correct_answer: Vec<String>,
}

impl PayoutFixture {
    /// Derives every encoding from a dense matrix and fills `correct_answer`
    /// from the dense baseline.
    pub fn from_dense(matrix: Vec<Vec<u64>>, assets_cost: Vec<u64>) -> Result<Self> {
        let shape = HoldingsShape::new(matrix.len(), assets_cost.len());
        let dense = amounts_matrix(&matrix);

        let payout_triples = SparseEntry::from_dense(&dense, &shape)?
            .into_iter()
            .map(|e| Ok((e.security, e.asset, to_u64(e.quantity)?)))
            .collect::<Result<Vec<_>>>()?;
        let dedup = DeduplicatedColumns::from_dense(&dense, &shape)?;
        let factor = LowRankFactor::trivial(&dense, &shape)?;

        let mut fixture = PayoutFixture {
            n_assets: shape.n_assets,
            n_securities: shape.n_securities,
            assets_cost,
            matrix,
            payout_triples: Some(payout_triples),
            column_id: Some(dedup.column_ids),
            columns: Some(to_u64_matrix(&dedup.columns)?),
            left: Some(to_u64_matrix(&factor.left)?),
            right: Some(to_u64_matrix(&factor.right)?),
            investors: None,
            correct_answer: Vec::new(),
        };
        fixture.fill_correct_answer()?;
        Ok(fixture)
    }

    pub fn with_investors(mut self, investors: Vec<usize>) -> Self {
        self.investors = Some(investors);
        self
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let fixture: PayoutFixture = serde_json::from_str(&raw)?;
        fixture.check_header()?;
        Ok(fixture)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string(self)?)?;
        Ok(())
    }

    pub fn shape(&self) -> HoldingsShape {
        HoldingsShape::new(self.n_securities, self.n_assets)
    }

    pub fn valuation(&self) -> Vec<Amount> {
        amounts(&self.assets_cost)
    }

    pub fn dense(&self) -> HoldingsEncoding {
        HoldingsEncoding::Dense(amounts_matrix(&self.matrix))
    }

    pub fn sparse(&self) -> Option<HoldingsEncoding> {
        self.payout_triples.as_ref().map(|triples| {
            HoldingsEncoding::SparseEntries(
                triples
                    .iter()
                    .map(|&(i, j, qty)| SparseEntry::new(i, j, qty))
                    .collect(),
            )
        })
    }

    pub fn deduplicated(&self) -> Result<Option<HoldingsEncoding>> {
        match (&self.column_id, &self.columns) {
            (Some(ids), Some(columns)) => Ok(Some(
                DeduplicatedColumns::new(ids.clone(), amounts_matrix(columns)).into(),
            )),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ValidationError::MissingField("columns".to_string()).into()),
            (None, Some(_)) => Err(ValidationError::MissingField("column_id".to_string()).into()),
        }
    }

    pub fn low_rank(&self) -> Result<Option<HoldingsEncoding>> {
        match (&self.left, &self.right) {
            (Some(left), Some(right)) => Ok(Some(
                LowRankFactor::new(amounts_matrix(left), amounts_matrix(right)).into(),
            )),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ValidationError::MissingField("R".to_string()).into()),
            (None, Some(_)) => Err(ValidationError::MissingField("L".to_string()).into()),
        }
    }

    /// Expected payouts parsed from `correct_answer`.
    pub fn expected_payouts(&self) -> Result<Option<Vec<Amount>>> {
        if self.correct_answer.is_empty() {
            return Ok(None);
        }
        self.correct_answer
            .iter()
            .map(|s| {
                Amount::from_dec_str(s).map_err(|e| {
                    Error::from(ValidationError::InvalidInput(format!(
                        "correct_answer '{}': {:?}",
                        s, e
                    )))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Recomputes `correct_answer` from the dense matrix.
    pub fn fill_correct_answer(&mut self) -> Result<()> {
        let payouts = compute_payouts(
            &self.dense(),
            &self.valuation(),
            &self.shape(),
            &mut OperationMeter::unbounded(),
        )?;
        self.correct_answer = payouts.iter().map(|p| p.to_string()).collect();
        Ok(())
    }

    fn check_header(&self) -> Result<()> {
        if self.assets_cost.len() != self.n_assets {
            return Err(ValidationError::InvalidInput(format!(
                "assets_cost has {} entries but n_assets is {}",
                self.assets_cost.len(),
                self.n_assets
            ))
            .into());
        }
        if self.matrix.len() != self.n_securities {
            return Err(ValidationError::InvalidInput(format!(
                "matrix has {} rows but n_securities is {}",
                self.matrix.len(),
                self.n_securities
            ))
            .into());
        }
        Ok(())
    }
}

fn to_u64(value: Amount) -> Result<u64> {
    if value > Amount::from(u64::MAX) {
        return Err(Error::Fixture(format!(
            "quantity {} does not fit a fixture integer",
            value
        )));
    }
    Ok(value.low_u64())
}

fn to_u64_matrix(matrix: &[Vec<Amount>]) -> Result<Vec<Vec<u64>>> {
    matrix
        .iter()
        .map(|row| row.iter().map(|&v| to_u64(v)).collect())
        .collect()
}
