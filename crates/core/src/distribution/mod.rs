//! Distribution module - setup, caller-facing payout operations and the service.

mod distribution_model;
mod distribution_service;
mod distribution_traits;

pub use distribution_model::{PayoutOperation, PayoutReceipt, PayoutSetup};
pub use distribution_service::PayoutService;
pub use distribution_traits::PayoutServiceTrait;

#[cfg(test)]
mod distribution_service_tests;
