//! Runs every encoding of a fixture and compares payouts, balances and cost.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::SYNTHETIC_HOLDER_PREFIX;
use crate::distribution::{PayoutOperation, PayoutService, PayoutServiceTrait, PayoutSetup};
use crate::errors::{PayoutError, Result};
use crate::holdings::{Amount, HoldingsEncoding};
use crate::ledger::HolderId;

use super::fixtures_model::PayoutFixture;

/// Outcome of one payout operation on a fresh service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRun {
    pub operation: PayoutOperation,
    pub operations_used: Option<u64>,
    pub payouts: Vec<String>,
    pub error: Option<String>,
}

/// Cost and agreement report for a whole fixture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureReport {
    pub n_securities: usize,
    pub n_assets: usize,
    pub runs: Vec<OperationRun>,
    pub mismatches: Vec<String>,
}

impl FixtureReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }

    /// Operations used per payout operation, for runs that completed.
    pub fn costs(&self) -> HashMap<PayoutOperation, u64> {
        self.runs
            .iter()
            .filter_map(|run| run.operations_used.map(|used| (run.operation, used)))
            .collect()
    }
}

/// Synthetic holder identities `holder-0`, `holder-1`, ...
pub fn synthetic_holders(n: usize) -> Vec<HolderId> {
    (0..n)
        .map(|i| HolderId::new(format!("{}{}", SYNTHETIC_HOLDER_PREFIX, i)))
        .collect()
}

/// Runs each encoding the fixture carries on its own fresh service.
///
/// Every run must agree with the dense baseline, with `correct_answer` when
/// present, and must leave balances equal to its payouts (aggregated per
/// investor for the repeated-investor run).
pub fn check_fixture(
    fixture: &PayoutFixture,
    operation_budget: Option<u64>,
) -> Result<FixtureReport> {
    let shape = fixture.shape();
    let holders = synthetic_holders(shape.n_securities);
    let valuation = fixture.valuation();
    let expected = fixture.expected_payouts()?;

    let mut plan: Vec<(PayoutOperation, HoldingsEncoding, Option<&[usize]>)> =
        vec![(PayoutOperation::PayoutNaive, fixture.dense(), None)];
    if let Some(sparse) = fixture.sparse() {
        plan.push((PayoutOperation::PayoutSparse, sparse, None));
    }
    if let Some(dedup) = fixture.deduplicated()? {
        plan.push((PayoutOperation::PayoutRepeatedColumns, dedup, None));
    }
    if let Some(low_rank) = fixture.low_rank()? {
        plan.push((PayoutOperation::PayoutLowRank, low_rank, None));
    }
    if let Some(investors) = fixture.investors.as_deref() {
        plan.push((
            PayoutOperation::PayoutRepeatedInvestors,
            fixture.dense(),
            Some(investors),
        ));
    }

    let mut runs = Vec::with_capacity(plan.len());
    let mut mismatches = Vec::new();
    let mut baseline: Option<Vec<Amount>> = None;

    for (operation, encoding, investors) in plan {
        let mut service = PayoutService::new(PayoutSetup::new(holders.clone(), shape.n_assets));
        if let Some(limit) = operation_budget {
            service = service.with_operation_budget(limit);
        }

        let receipt = match service.distribute(operation, encoding, &valuation, investors) {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!("Fixture check: {} failed: {}", operation, e);
                mismatches.push(format!("{} aborted: {}", operation, e));
                runs.push(OperationRun {
                    operation,
                    operations_used: None,
                    payouts: Vec::new(),
                    error: Some(e.to_string()),
                });
                continue;
            }
        };

        match &baseline {
            None => baseline = Some(receipt.payouts.clone()),
            Some(reference) if *reference != receipt.payouts => {
                mismatches.push(format!("{} disagrees with payoutNaive", operation));
            }
            Some(_) => {}
        }
        if let Some(expected) = &expected {
            if *expected != receipt.payouts {
                mismatches.push(format!("{} disagrees with correct_answer", operation));
            }
        }
        let expected_balances = expected_balances(&receipt.payouts, holders.len(), investors)?;
        let balances_match = holders
            .iter()
            .zip(&expected_balances)
            .all(|(holder, balance)| service.get_balance(holder) == *balance);
        if !balances_match {
            mismatches.push(format!("{} credited unexpected balances", operation));
        }

        debug!(
            "Fixture check: {} used {} operations",
            operation, receipt.operations_used
        );
        runs.push(OperationRun {
            operation,
            operations_used: Some(receipt.operations_used),
            payouts: receipt.payouts.iter().map(|p| p.to_string()).collect(),
            error: None,
        });
    }

    info!(
        "Checked {} payout operations on a {}x{} fixture, {} mismatches",
        runs.len(),
        shape.n_securities,
        shape.n_assets,
        mismatches.len()
    );
    Ok(FixtureReport {
        n_securities: shape.n_securities,
        n_assets: shape.n_assets,
        runs,
        mismatches,
    })
}

fn expected_balances(
    payouts: &[Amount],
    n_holders: usize,
    investors: Option<&[usize]>,
) -> std::result::Result<Vec<Amount>, PayoutError> {
    let mut balances = vec![Amount::zero(); n_holders];
    for (i, payout) in payouts.iter().enumerate() {
        let holder = investors.map_or(i, |inv| inv[i]);
        balances[holder] = balances[holder]
            .checked_add(*payout)
            .ok_or_else(|| PayoutError::overflow("expected balance"))?;
    }
    Ok(balances)
}
