//! Distribution domain models.

use serde::{Deserialize, Serialize};

use crate::errors::PayoutError;
use crate::holdings::{Amount, EncodingKind, HoldingsShape};
use crate::ledger::HolderId;

/// Fixed at construction: one holder identity per security, and the asset count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutSetup {
    holders: Vec<HolderId>,
    n_assets: usize,
}

impl PayoutSetup {
    pub fn new(holders: Vec<HolderId>, n_assets: usize) -> Self {
        Self { holders, n_assets }
    }

    pub fn shape(&self) -> HoldingsShape {
        HoldingsShape::new(self.holders.len(), self.n_assets)
    }

    pub fn holders(&self) -> &[HolderId] {
        &self.holders
    }

    /// Holder receiving each security's payout.
    ///
    /// Without `investors` security `i` pays the holder bound to it at setup.
    /// With `investors`, security `i` pays `holders[investors[i]]`.
    pub fn recipients(&self, investors: Option<&[usize]>) -> Result<Vec<&HolderId>, PayoutError> {
        let Some(investors) = investors else {
            return Ok(self.holders.iter().collect());
        };
        if investors.len() != self.holders.len() {
            return Err(PayoutError::dimension(
                "investors",
                self.holders.len(),
                investors.len(),
            ));
        }
        investors
            .iter()
            .map(|&index| {
                self.holders
                    .get(index)
                    .ok_or_else(|| PayoutError::index("investor", index, self.holders.len()))
            })
            .collect()
    }
}

/// Caller-facing payout operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PayoutOperation {
    PayoutNaive,
    PayoutSparse,
    PayoutRepeatedColumns,
    PayoutLowRank,
    PayoutRepeatedInvestors,
}

impl PayoutOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutOperation::PayoutNaive => "payoutNaive",
            PayoutOperation::PayoutSparse => "payoutSparse",
            PayoutOperation::PayoutRepeatedColumns => "payoutRepeatedColumns",
            PayoutOperation::PayoutLowRank => "payoutLowRank",
            PayoutOperation::PayoutRepeatedInvestors => "payoutRepeatedInvestors",
        }
    }

    /// The operation that consumes a given encoding with the setup holder mapping.
    pub fn for_encoding(kind: EncodingKind) -> Self {
        match kind {
            EncodingKind::Dense => PayoutOperation::PayoutNaive,
            EncodingKind::SparseEntries => PayoutOperation::PayoutSparse,
            EncodingKind::DeduplicatedColumns => PayoutOperation::PayoutRepeatedColumns,
            EncodingKind::LowRankFactor => PayoutOperation::PayoutLowRank,
        }
    }
}

impl std::fmt::Display for PayoutOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of one committed (or previewed) payout call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutReceipt {
    pub operation: PayoutOperation,
    pub payouts: Vec<Amount>,
    pub operations_used: u64,
}
