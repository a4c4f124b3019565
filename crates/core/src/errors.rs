//! Core error types for the payout engine.
//!
//! Every payout call is fail-fast: the first error aborts the whole call and
//! nothing is credited. The surrounding caller decides how to report it.

use thiserror::Error;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the payout crate.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Payout aborted: {0}")]
    Payout(#[from] PayoutError),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Fixture error: {0}")]
    Fixture(String),
}

/// Errors raised while validating or computing a payout.
///
/// None of these leave a trace in the ledger.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayoutError {
    /// A supplied row, column or vector length disagrees with the fixed shape.
    #[error("Dimension mismatch for {context}: expected {expected}, got {actual}")]
    DimensionMismatch {
        context: String,
        expected: usize,
        actual: usize,
    },

    /// A sparse triple, column id or investor entry points outside its range.
    #[error("Index {index} out of range for {context} (bound {bound})")]
    IndexOutOfRange {
        context: String,
        index: usize,
        bound: usize,
    },

    /// A checked 256-bit addition or multiplication overflowed.
    #[error("Arithmetic overflow in {0}")]
    ArithmeticOverflow(String),

    /// The computation needs more arithmetic operations than the call allows.
    #[error("Operation budget exceeded: limit {limit}, required at least {required}")]
    BudgetExceeded { limit: u64, required: u64 },
}

impl PayoutError {
    pub(crate) fn dimension(context: impl Into<String>, expected: usize, actual: usize) -> Self {
        PayoutError::DimensionMismatch {
            context: context.into(),
            expected,
            actual,
        }
    }

    pub(crate) fn index(context: impl Into<String>, index: usize, bound: usize) -> Self {
        PayoutError::IndexOutOfRange {
            context: context.into(),
            index,
            bound,
        }
    }

    pub(crate) fn overflow(context: impl Into<String>) -> Self {
        PayoutError::ArithmeticOverflow(context.into())
    }
}

/// Validation errors for fixture files and other external input.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Required field '{0}' is missing")]
    MissingField(String),
}

// === From implementations for common error types ===

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Fixture(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Validation(ValidationError::InvalidInput(err.to_string()))
    }
}
