use std::path::PathBuf;

use anyhow::Context;

pub struct Config {
    pub log_format: String,
    pub operation_budget: Option<u64>,
    pub seed: Option<u64>,
    pub fixture_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let log_format = std::env::var("PAYOUT_LOG_FORMAT").unwrap_or_else(|_| "text".into());
        let operation_budget = optional_u64("PAYOUT_OP_BUDGET")?;
        let seed = optional_u64("PAYOUT_SEED")?;
        let fixture_dir = std::env::var("PAYOUT_FIXTURE_DIR")
            .unwrap_or_else(|_| "./test/data".into())
            .into();
        Ok(Self {
            log_format,
            operation_budget,
            seed,
            fixture_dir,
        })
    }
}

fn optional_u64(key: &str) -> anyhow::Result<Option<u64>> {
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .map(Some)
            .with_context(|| format!("Invalid {}: {}", key, raw)),
        _ => Ok(None),
    }
}
