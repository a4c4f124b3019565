use log::{debug, warn};

use crate::errors::Result;
use crate::holdings::{Amount, HoldingsEncoding};
use crate::ledger::{BalanceLedger, HolderId};
use crate::payout::{compute_payouts, OperationMeter};

use super::distribution_model::{PayoutOperation, PayoutReceipt, PayoutSetup};
use super::distribution_traits::PayoutServiceTrait;

/// Setup-bound payout service owning its ledger.
///
/// Repeated payout calls are cumulative: each successful call adds its
/// credits on top of the existing balances.
#[derive(Debug, Clone)]
pub struct PayoutService {
    setup: PayoutSetup,
    ledger: BalanceLedger,
    operation_budget: Option<u64>,
}

impl PayoutService {
    pub fn new(setup: PayoutSetup) -> Self {
        PayoutService {
            setup,
            ledger: BalanceLedger::new(),
            operation_budget: None,
        }
    }

    /// Caps the arithmetic operations a single payout call may perform.
    pub fn with_operation_budget(mut self, limit: u64) -> Self {
        self.operation_budget = Some(limit);
        self
    }

    pub fn setup(&self) -> &PayoutSetup {
        &self.setup
    }

    pub fn ledger(&self) -> &BalanceLedger {
        &self.ledger
    }

    fn meter(&self) -> OperationMeter {
        match self.operation_budget {
            Some(limit) => OperationMeter::with_budget(limit),
            None => OperationMeter::unbounded(),
        }
    }

    fn try_distribute(
        &mut self,
        operation: PayoutOperation,
        encoding: &HoldingsEncoding,
        valuation: &[Amount],
        investors: Option<&[usize]>,
    ) -> Result<PayoutReceipt> {
        let shape = self.setup.shape();
        let recipients = self.setup.recipients(investors)?;
        let mut meter = self.meter();
        let payouts = compute_payouts(encoding, valuation, &shape, &mut meter)?;

        self.ledger
            .credit_batch(recipients.into_iter().zip(payouts.iter().copied()))?;

        Ok(PayoutReceipt {
            operation,
            payouts,
            operations_used: meter.used(),
        })
    }
}

impl PayoutServiceTrait for PayoutService {
    fn distribute(
        &mut self,
        operation: PayoutOperation,
        encoding: HoldingsEncoding,
        valuation: &[Amount],
        investors: Option<&[usize]>,
    ) -> Result<PayoutReceipt> {
        match self.try_distribute(operation, &encoding, valuation, investors) {
            Ok(receipt) => {
                debug!(
                    "{} credited {} securities using {} operations",
                    operation,
                    receipt.payouts.len(),
                    receipt.operations_used
                );
                Ok(receipt)
            }
            Err(e) => {
                warn!("{} aborted, ledger unchanged: {}", operation, e);
                Err(e)
            }
        }
    }

    fn preview(&self, encoding: &HoldingsEncoding, valuation: &[Amount]) -> Result<PayoutReceipt> {
        let mut meter = self.meter();
        let payouts = compute_payouts(encoding, valuation, &self.setup.shape(), &mut meter)?;
        Ok(PayoutReceipt {
            operation: PayoutOperation::for_encoding(encoding.kind()),
            payouts,
            operations_used: meter.used(),
        })
    }

    fn get_balance(&self, holder: &HolderId) -> Amount {
        self.ledger.balance_of(holder)
    }
}
