//! Payout engine - variant-specific dot products and operation metering.

mod op_meter;
mod payout_engine;

pub use op_meter::OperationMeter;
pub use payout_engine::{compute_payouts, operation_cost};
