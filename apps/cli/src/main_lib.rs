use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use payout_core::constants::{DEFAULT_CRP_ALPHA, DEFAULT_MAX_QUANTITY};
use payout_core::fixtures::{
    check_fixture, generate_fixture, FixtureKind, FixtureSpec, InvestorModel, PayoutFixture,
};

use crate::config::Config;

pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if config.log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Random,
    Sparse,
    LowRank,
    RepeatedColumns,
}

impl From<KindArg> for FixtureKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Random => FixtureKind::Random,
            KindArg::Sparse => FixtureKind::Sparse,
            KindArg::LowRank => FixtureKind::LowRank,
            KindArg::RepeatedColumns => FixtureKind::RepeatedColumns,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum InvestorsArg {
    #[default]
    None,
    Naive,
    Crp,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Family of holdings matrix
    #[arg(long, value_enum)]
    pub kind: KindArg,

    /// Number of securities (rows)
    #[arg(long)]
    pub securities: usize,

    /// Number of assets (columns)
    #[arg(long)]
    pub assets: usize,

    /// Factor rank, or unique column count for repeated-columns
    #[arg(long, conflicts_with = "capacity")]
    pub rank: Option<usize>,

    /// Fill percentage for sparse, rank percentage otherwise
    #[arg(long)]
    pub capacity: Option<u32>,

    /// Largest generated quantity or valuation
    #[arg(long, default_value_t = DEFAULT_MAX_QUANTITY)]
    pub max_value: u64,

    /// How securities are assigned to investors
    #[arg(long, value_enum, default_value_t = InvestorsArg::None)]
    pub investors: InvestorsArg,

    /// Investor count for the naive model
    #[arg(long, default_value_t = 2)]
    pub n_investors: usize,

    /// CRP concentration
    #[arg(long, default_value_t = DEFAULT_CRP_ALPHA)]
    pub alpha: f64,

    /// Output file; defaults to a name under PAYOUT_FIXTURE_DIR
    #[arg(long, short = 'o')]
    pub out: Option<PathBuf>,
}

impl GenerateArgs {
    pub fn fixture_spec(&self) -> FixtureSpec {
        let mut spec = FixtureSpec::new(self.kind.into(), self.securities, self.assets);
        spec.rank = self.rank;
        spec.capacity = self.capacity;
        spec.max_value = self.max_value;
        spec.investors = match self.investors {
            InvestorsArg::None => InvestorModel::None,
            InvestorsArg::Naive => InvestorModel::Naive {
                n_investors: self.n_investors,
            },
            InvestorsArg::Crp => InvestorModel::Crp { alpha: self.alpha },
        };
        spec
    }

    pub fn output_path(&self, fixture_dir: &Path) -> PathBuf {
        self.out.clone().unwrap_or_else(|| {
            let kind = self.kind.to_possible_value().map_or_else(
                || "fixture".to_string(),
                |value| value.get_name().to_string(),
            );
            fixture_dir.join(format!("{}_{}x{}.json", kind, self.securities, self.assets))
        })
    }
}

/// Generates a fixture and writes it; returns the path written.
pub fn run_generate(args: &GenerateArgs, config: &Config) -> anyhow::Result<PathBuf> {
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let spec = args.fixture_spec();
    let fixture = generate_fixture(&mut rng, &spec)
        .with_context(|| format!("Failed to generate {:?} fixture", spec.kind))?;

    let path = args.output_path(&config.fixture_dir);
    fixture
        .save(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(
        "Wrote {:?} fixture ({} securities, {} assets) to {}",
        spec.kind,
        spec.n_securities,
        spec.n_assets,
        path.display()
    );
    Ok(path)
}

/// Checks a fixture file, prints the JSON report, and returns whether every
/// encoding agreed.
pub fn run_check(path: &Path, config: &Config) -> anyhow::Result<bool> {
    let fixture = PayoutFixture::load(path)
        .with_context(|| format!("Failed to load fixture {}", path.display()))?;
    let report = check_fixture(&fixture, config.operation_budget)
        .with_context(|| format!("Failed to check fixture {}", path.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    if !report.is_consistent() {
        for mismatch in &report.mismatches {
            tracing::warn!("{}: {}", path.display(), mismatch);
        }
    }
    Ok(report.is_consistent())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path, seed: Option<u64>, operation_budget: Option<u64>) -> Config {
        Config {
            log_format: "text".to_string(),
            operation_budget,
            seed,
            fixture_dir: dir.to_path_buf(),
        }
    }

    fn args(kind: KindArg) -> GenerateArgs {
        GenerateArgs {
            kind,
            securities: 6,
            assets: 9,
            rank: None,
            capacity: None,
            max_value: 50,
            investors: InvestorsArg::Crp,
            n_investors: 2,
            alpha: DEFAULT_CRP_ALPHA,
            out: None,
        }
    }

    #[test]
    fn test_fixture_spec_maps_investor_model() {
        let mut generate = args(KindArg::Sparse);
        generate.investors = InvestorsArg::Naive;
        generate.n_investors = 3;
        let spec = generate.fixture_spec();

        assert_eq!(spec.kind, FixtureKind::Sparse);
        assert_eq!(spec.max_value, 50);
        assert_eq!(spec.investors, InvestorModel::Naive { n_investors: 3 });
    }

    #[test]
    fn test_default_output_path_uses_kind_and_shape() {
        let path = args(KindArg::RepeatedColumns).output_path(Path::new("data"));
        assert_eq!(path, PathBuf::from("data/repeated-columns_6x9.json"));
    }

    #[test]
    fn test_generate_then_check_is_consistent() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(dir.path(), Some(11), None);

        for kind in [KindArg::Random, KindArg::LowRank] {
            let path = run_generate(&args(kind), &config).unwrap();
            assert!(path.starts_with(dir.path()));
            assert!(run_check(&path, &config).unwrap());
        }
    }

    #[test]
    fn test_check_under_budget_is_inconsistent() {
        let dir = tempfile::tempdir().unwrap();
        let seeded = config(dir.path(), Some(3), None);
        let path = run_generate(&args(KindArg::Random), &seeded).unwrap();

        assert!(!run_check(&path, &config(dir.path(), None, Some(1))).unwrap());
    }
}
