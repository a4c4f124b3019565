//! Random holdings and investor generators for benchmark fixtures.
//!
//! Every generator takes the caller's `Rng`, so a seeded `StdRng` gives
//! reproducible fixtures.

use log::debug;
use rand::seq::index;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_MAX_QUANTITY, DEFAULT_SPARSE_CAPACITY};
use crate::errors::{Error, Result, ValidationError};

use super::fixtures_model::PayoutFixture;

/// Family of holdings matrix to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FixtureKind {
    Random,
    Sparse,
    LowRank,
    RepeatedColumns,
}

/// How securities are assigned to investors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "kebab-case")]
pub enum InvestorModel {
    /// Every security keeps its own setup holder.
    #[default]
    None,
    /// Security `i` pays investor `i mod n_investors`.
    Naive { n_investors: usize },
    /// Chinese restaurant process with concentration `alpha`.
    Crp { alpha: f64 },
}

/// Parameters for [`generate_fixture`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureSpec {
    pub kind: FixtureKind,
    pub n_securities: usize,
    pub n_assets: usize,
    /// Factor rank for `LowRank`, unique column count for `RepeatedColumns`.
    pub rank: Option<usize>,
    /// Fill percentage for `Sparse`; rank as a percentage of
    /// `min(n_securities, n_assets)` otherwise.
    pub capacity: Option<u32>,
    pub max_value: u64,
    pub investors: InvestorModel,
}

impl FixtureSpec {
    pub fn new(kind: FixtureKind, n_securities: usize, n_assets: usize) -> Self {
        Self {
            kind,
            n_securities,
            n_assets,
            rank: None,
            capacity: None,
            max_value: DEFAULT_MAX_QUANTITY,
            investors: InvestorModel::None,
        }
    }

    fn resolved_rank(&self) -> usize {
        match (self.rank, self.capacity) {
            (Some(rank), _) => rank.max(1),
            (None, Some(cap)) => rank_from_capacity(self.n_securities, self.n_assets, cap),
            (None, None) => rank_from_capacity(self.n_securities, self.n_assets, 50),
        }
    }
}

/// Factors of a generated low-rank matrix together with their product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedLowRank {
    pub left: Vec<Vec<u64>>,
    pub right: Vec<Vec<u64>>,
    pub matrix: Vec<Vec<u64>>,
}

/// A generated deduplicated-column matrix and its dense expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedColumns {
    pub column_id: Vec<usize>,
    pub columns: Vec<Vec<u64>>,
    pub matrix: Vec<Vec<u64>>,
}

/// `n × m` matrix with entries uniform in `0..=max_value`.
pub fn random_matrix<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    m: usize,
    max_value: u64,
) -> Vec<Vec<u64>> {
    (0..n)
        .map(|_| (0..m).map(|_| rng.gen_range(0..=max_value)).collect())
        .collect()
}

/// Valuation vector with entries uniform in `0..=max_value`.
pub fn random_valuation<R: Rng + ?Sized>(rng: &mut R, m: usize, max_value: u64) -> Vec<u64> {
    (0..m).map(|_| rng.gen_range(0..=max_value)).collect()
}

/// `n × m` matrix where `capacity` percent of the cells, chosen without
/// repetition, hold a value in `1..=max_value` and the rest are zero.
pub fn sparse_matrix<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    m: usize,
    capacity: u32,
    max_value: u64,
) -> Vec<Vec<u64>> {
    let mut matrix = vec![vec![0u64; m]; n];
    let cells = n * m;
    let filled = (cells * capacity.min(100) as usize) / 100;
    if filled == 0 || max_value == 0 {
        return matrix;
    }
    for cell in index::sample(rng, cells, filled).into_iter() {
        matrix[cell / m][cell % m] = rng.gen_range(1..=max_value);
    }
    matrix
}

/// `rank = max(1, capacity · min(n, m) / 100)`.
pub fn rank_from_capacity(n: usize, m: usize, capacity: u32) -> usize {
    (capacity as usize * n.min(m) / 100).max(1)
}

/// Random `n × rank` and `rank × m` factors and their product.
pub fn low_rank_by_rank<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    m: usize,
    rank: usize,
    max_value: u64,
) -> Result<GeneratedLowRank> {
    let rank = rank.max(1);
    let left = random_matrix(rng, n, rank, max_value);
    let right = random_matrix(rng, rank, m, max_value);

    let mut matrix = vec![vec![0u64; m]; n];
    for (i, row) in matrix.iter_mut().enumerate() {
        for (j, cell) in row.iter_mut().enumerate() {
            let mut acc = 0u64;
            for k in 0..rank {
                acc = left[i][k]
                    .checked_mul(right[k][j])
                    .and_then(|term| acc.checked_add(term))
                    .ok_or_else(|| {
                        Error::Fixture(format!(
                            "low-rank product overflows at ({}, {}); lower max_value",
                            i, j
                        ))
                    })?;
            }
            *cell = acc;
        }
    }

    Ok(GeneratedLowRank {
        left,
        right,
        matrix,
    })
}

pub fn low_rank_by_capacity<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    m: usize,
    capacity: u32,
    max_value: u64,
) -> Result<GeneratedLowRank> {
    low_rank_by_rank(rng, n, m, rank_from_capacity(n, m, capacity), max_value)
}

/// `unique` random columns of height `n`, and a random class for each of the `m` assets.
pub fn repeated_columns_by_rank<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    m: usize,
    unique: usize,
    max_value: u64,
) -> GeneratedColumns {
    let unique = unique.max(1);
    let columns = random_matrix(rng, unique, n, max_value);
    let column_id: Vec<usize> = (0..m).map(|_| rng.gen_range(0..unique)).collect();
    let matrix = (0..n)
        .map(|i| column_id.iter().map(|&c| columns[c][i]).collect())
        .collect();

    GeneratedColumns {
        column_id,
        columns,
        matrix,
    }
}

pub fn repeated_columns_by_capacity<R: Rng + ?Sized>(
    rng: &mut R,
    n: usize,
    m: usize,
    capacity: u32,
    max_value: u64,
) -> GeneratedColumns {
    repeated_columns_by_rank(rng, n, m, rank_from_capacity(n, m, capacity), max_value)
}

/// Security `i` belongs to investor `i mod n_investors`.
pub fn investors_naive(n_securities: usize, n_investors: usize) -> Vec<usize> {
    let n_investors = n_investors.max(1);
    (0..n_securities).map(|i| i % n_investors).collect()
}

/// Chinese restaurant process: each security joins an existing investor with
/// probability proportional to that investor's security count, or a new
/// investor with probability proportional to `alpha`.
///
/// Investor ids are assigned in order of first appearance, so every id is
/// below `n_securities`.
pub fn investors_crp<R: Rng + ?Sized>(
    rng: &mut R,
    n_securities: usize,
    alpha: f64,
) -> Result<Vec<usize>> {
    if !(alpha.is_finite() && alpha > 0.0) {
        return Err(ValidationError::InvalidInput(format!(
            "CRP alpha must be positive, got {}",
            alpha
        ))
        .into());
    }

    let mut counts: Vec<usize> = Vec::new();
    let mut assigned = Vec::with_capacity(n_securities);
    for seated in 0..n_securities {
        let norm = seated as f64 + alpha;
        let u: f64 = rng.gen();
        let mut cumulative = 0.0;
        let mut table = counts.len();
        for (t, &count) in counts.iter().enumerate() {
            cumulative += count as f64 / norm;
            if u < cumulative {
                table = t;
                break;
            }
        }
        if table == counts.len() {
            counts.push(1);
        } else {
            counts[table] += 1;
        }
        assigned.push(table);
    }

    debug!(
        "CRP seated {} securities at {} investors (alpha {})",
        n_securities,
        counts.len(),
        alpha
    );
    Ok(assigned)
}

/// Builds a complete fixture of the requested family.
///
/// The dense matrix, sparse triples and deduplicated columns are always
/// present. Low-rank fixtures keep their generated factors and
/// repeated-column fixtures keep their generated classes; the other families
/// carry the trivial factorization.
pub fn generate_fixture<R: Rng + ?Sized>(
    rng: &mut R,
    spec: &FixtureSpec,
) -> Result<PayoutFixture> {
    let (n, m, max) = (spec.n_securities, spec.n_assets, spec.max_value);
    let assets_cost = random_valuation(rng, m, max);

    let mut fixture = match spec.kind {
        FixtureKind::Random => {
            PayoutFixture::from_dense(random_matrix(rng, n, m, max), assets_cost)?
        }
        FixtureKind::Sparse => {
            let capacity = spec.capacity.unwrap_or(DEFAULT_SPARSE_CAPACITY);
            PayoutFixture::from_dense(sparse_matrix(rng, n, m, capacity, max), assets_cost)?
        }
        FixtureKind::LowRank => {
            let generated = low_rank_by_rank(rng, n, m, spec.resolved_rank(), max)?;
            let mut fixture = PayoutFixture::from_dense(generated.matrix, assets_cost)?;
            fixture.left = Some(generated.left);
            fixture.right = Some(generated.right);
            fixture
        }
        FixtureKind::RepeatedColumns => {
            let generated = repeated_columns_by_rank(rng, n, m, spec.resolved_rank(), max);
            let mut fixture = PayoutFixture::from_dense(generated.matrix, assets_cost)?;
            fixture.column_id = Some(generated.column_id);
            fixture.columns = Some(generated.columns);
            fixture
        }
    };

    fixture.investors = match spec.investors {
        InvestorModel::None => None,
        InvestorModel::Naive { n_investors } => Some(investors_naive(n, n_investors)),
        InvestorModel::Crp { alpha } => Some(investors_crp(rng, n, alpha)?),
    };

    debug!(
        "Generated {:?} fixture with {} securities and {} assets",
        spec.kind, n, m
    );
    Ok(fixture)
}
