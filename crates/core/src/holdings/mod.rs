//! Holdings module - the four matrix encodings and their conversions.

mod holdings_model;
mod holdings_transform;

pub use holdings_model::*;
pub use holdings_transform::{identity, materialize};

#[cfg(test)]
mod holdings_model_tests;
