mod config;
mod main_lib;

use std::path::PathBuf;
use std::process::exit;

use clap::{Parser, Subcommand};

use config::Config;
use main_lib::{init_tracing, run_check, run_generate, GenerateArgs};

#[derive(Parser)]
#[command(version, about = "Generate and check payout fixtures", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: PayoutCommand,
}

#[derive(Subcommand)]
enum PayoutCommand {
    /// Generate a random fixture carrying every holdings encoding
    Generate(GenerateArgs),

    /// Run every encoding of a fixture and report cost and agreement
    Check {
        /// Path to the fixture JSON file
        #[arg(value_name = "FIXTURE")]
        fixture: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(&config);

    let cli = Cli::parse();
    match cli.command {
        PayoutCommand::Generate(args) => {
            let path = run_generate(&args, &config)?;
            println!("{}", path.display());
        }
        PayoutCommand::Check { fixture } => {
            if !run_check(&fixture, &config)? {
                exit(1);
            }
        }
    }
    Ok(())
}
