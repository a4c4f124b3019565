//! Arithmetic operation accounting.

use serde::{Deserialize, Serialize};

use crate::errors::PayoutError;
use crate::holdings::Amount;

/// Counts checked additions and multiplications performed by one payout call.
///
/// With a budget set, the charge that would push the count past the limit
/// fails with [`PayoutError::BudgetExceeded`] before the operation runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMeter {
    used: u64,
    limit: Option<u64>,
}

impl OperationMeter {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn with_budget(limit: u64) -> Self {
        Self {
            used: 0,
            limit: Some(limit),
        }
    }

    pub fn used(&self) -> u64 {
        self.used
    }

    pub fn limit(&self) -> Option<u64> {
        self.limit
    }

    /// Records `ops` operations against the budget.
    pub fn charge(&mut self, ops: u64) -> Result<(), PayoutError> {
        let required = self.used.saturating_add(ops);
        if let Some(limit) = self.limit {
            if required > limit {
                return Err(PayoutError::BudgetExceeded { limit, required });
            }
        }
        self.used = required;
        Ok(())
    }

    /// `acc + a * b`, charging one multiplication and one addition.
    pub fn mul_add(
        &mut self,
        acc: Amount,
        a: Amount,
        b: Amount,
        context: &str,
    ) -> Result<Amount, PayoutError> {
        self.charge(1)?;
        let product = a
            .checked_mul(b)
            .ok_or_else(|| PayoutError::overflow(context))?;
        self.add(acc, product, context)
    }

    /// `a + b`, charging one addition.
    pub fn add(&mut self, a: Amount, b: Amount, context: &str) -> Result<Amount, PayoutError> {
        self.charge(1)?;
        a.checked_add(b).ok_or_else(|| PayoutError::overflow(context))
    }
}
