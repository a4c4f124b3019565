//! Holder identities and the balance ledger.

use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::PayoutError;
use crate::holdings::Amount;

/// Opaque reference to the party entitled to a security's payout.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderId(String);

impl HolderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HolderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for HolderId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for HolderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Mapping from holder identity to accumulated balance.
///
/// Crediting is the only mutation; balances never shrink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceLedger {
    balances: HashMap<HolderId, Amount>,
}

impl BalanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance, zero for identities never credited.
    pub fn balance_of(&self, holder: &HolderId) -> Amount {
        self.balances.get(holder).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }

    /// Holders with an entry, sorted by identity.
    pub fn holders(&self) -> Vec<&HolderId> {
        let mut holders: Vec<&HolderId> = self.balances.keys().collect();
        holders.sort();
        holders
    }

    /// Sum of all balances.
    pub fn total_credited(&self) -> Result<Amount, PayoutError> {
        self.balances
            .values()
            .try_fold(Amount::zero(), |acc, &balance| acc.checked_add(balance))
            .ok_or_else(|| PayoutError::overflow("ledger total"))
    }

    /// Adds `amount` to one holder's balance.
    pub fn credit(&mut self, holder: &HolderId, amount: Amount) -> Result<(), PayoutError> {
        self.credit_batch(std::iter::once((holder, amount)))
    }

    /// Applies every credit or none of them.
    ///
    /// Credits to the same holder aggregate. New balances are staged first
    /// and written only once every checked addition has succeeded.
    pub fn credit_batch<'a, I>(&mut self, credits: I) -> Result<(), PayoutError>
    where
        I: IntoIterator<Item = (&'a HolderId, Amount)>,
    {
        let mut staged: HashMap<&HolderId, Amount> = HashMap::new();
        for (holder, amount) in credits {
            let current = match staged.get(holder) {
                Some(&pending) => pending,
                None => self.balance_of(holder),
            };
            let updated = current
                .checked_add(amount)
                .ok_or_else(|| PayoutError::overflow(format!("balance of {}", holder)))?;
            staged.insert(holder, updated);
        }

        debug!("Committing credits for {} holders", staged.len());
        for (holder, balance) in staged {
            self.balances.insert(holder.clone(), balance);
        }
        Ok(())
    }
}
