use crate::errors::Result;
use crate::holdings::{Amount, DeduplicatedColumns, HoldingsEncoding, LowRankFactor, SparseEntry};
use crate::ledger::HolderId;

use super::distribution_model::{PayoutOperation, PayoutReceipt};

/// Payout entry points over a setup-bound ledger.
///
/// All encoding-specific operations funnel into [`distribute`], so every
/// variant shares one validation and crediting path.
///
/// [`distribute`]: PayoutServiceTrait::distribute
pub trait PayoutServiceTrait {
    /// Computes payouts for `encoding` and credits them, all or nothing.
    ///
    /// `investors`, when given, overrides the setup holder of each security.
    fn distribute(
        &mut self,
        operation: PayoutOperation,
        encoding: HoldingsEncoding,
        valuation: &[Amount],
        investors: Option<&[usize]>,
    ) -> Result<PayoutReceipt>;

    /// Computes payouts and their cost without touching the ledger.
    fn preview(&self, encoding: &HoldingsEncoding, valuation: &[Amount]) -> Result<PayoutReceipt>;

    /// Current ledger balance of `holder`; zero if never credited.
    fn get_balance(&self, holder: &HolderId) -> Amount;

    fn payout(
        &mut self,
        encoding: HoldingsEncoding,
        valuation: &[Amount],
    ) -> Result<PayoutReceipt> {
        let operation = PayoutOperation::for_encoding(encoding.kind());
        self.distribute(operation, encoding, valuation, None)
    }

    fn payout_to_investors(
        &mut self,
        encoding: HoldingsEncoding,
        valuation: &[Amount],
        investors: &[usize],
    ) -> Result<PayoutReceipt> {
        let operation = PayoutOperation::for_encoding(encoding.kind());
        self.distribute(operation, encoding, valuation, Some(investors))
    }

    fn payout_naive(
        &mut self,
        matrix: Vec<Vec<Amount>>,
        valuation: &[Amount],
    ) -> Result<PayoutReceipt> {
        self.payout(HoldingsEncoding::Dense(matrix), valuation)
    }

    fn payout_sparse(
        &mut self,
        entries: Vec<SparseEntry>,
        valuation: &[Amount],
    ) -> Result<PayoutReceipt> {
        self.payout(HoldingsEncoding::SparseEntries(entries), valuation)
    }

    fn payout_repeated_columns(
        &mut self,
        column_ids: Vec<usize>,
        columns: Vec<Vec<Amount>>,
        valuation: &[Amount],
    ) -> Result<PayoutReceipt> {
        self.payout(DeduplicatedColumns::new(column_ids, columns).into(), valuation)
    }

    fn payout_low_rank(
        &mut self,
        left: Vec<Vec<Amount>>,
        right: Vec<Vec<Amount>>,
        valuation: &[Amount],
    ) -> Result<PayoutReceipt> {
        self.payout(LowRankFactor::new(left, right).into(), valuation)
    }

    /// Dense payout where several securities may share one holder.
    fn payout_repeated_investors(
        &mut self,
        matrix: Vec<Vec<Amount>>,
        valuation: &[Amount],
        investors: &[usize],
    ) -> Result<PayoutReceipt> {
        self.distribute(
            PayoutOperation::PayoutRepeatedInvestors,
            HoldingsEncoding::Dense(matrix),
            valuation,
            Some(investors),
        )
    }
}
