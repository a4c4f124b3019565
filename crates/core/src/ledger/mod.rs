//! Ledger module - holder identities and balances.

mod ledger_model;

pub use ledger_model::{BalanceLedger, HolderId};

#[cfg(test)]
mod ledger_tests;
