//! Payout Core - exact-integer payout engine.
//!
//! Distributes the value of a set of assets among security holders. A
//! security's payout is the dot product of its holdings row with the asset
//! valuation vector; the holdings matrix may arrive dense, sparse, with
//! deduplicated columns, or as a low-rank factorization, and every encoding
//! yields the same payouts.

pub mod constants;
pub mod distribution;
pub mod errors;
pub mod fixtures;
pub mod holdings;
pub mod ledger;
pub mod payout;

// Re-export the caller-facing surface
pub use distribution::*;
pub use holdings::*;
pub use ledger::{BalanceLedger, HolderId};

// Re-export error types
pub use errors::Error;
pub use errors::PayoutError;
pub use errors::Result;
