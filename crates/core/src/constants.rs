/// Default upper bound (inclusive) for generated holdings quantities.
pub const DEFAULT_MAX_QUANTITY: u64 = 100;

/// Default fill percentage for generated sparse matrices.
pub const DEFAULT_SPARSE_CAPACITY: u32 = 20;

/// Default concentration for the Chinese restaurant process investor sampler.
pub const DEFAULT_CRP_ALPHA: f64 = 1.0;

/// Prefix used for synthetic holder identities in fixture checks.
pub const SYNTHETIC_HOLDER_PREFIX: &str = "holder-";
