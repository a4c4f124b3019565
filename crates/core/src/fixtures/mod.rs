//! Fixtures module - JSON scenarios, random generators and the cross-encoding checker.

mod fixture_check;
mod fixtures_model;
mod generators;

pub use fixture_check::{check_fixture, synthetic_holders, FixtureReport, OperationRun};
pub use fixtures_model::PayoutFixture;
pub use generators::*;
