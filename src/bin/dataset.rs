//! Training data tool.
//!
//! Usage:
//!   dataset stats <DIR>
//!   dataset balance <DIR> --output <FILE> [--seed N]

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::error;

use armada::dataset::{self, Dataset, DatasetError};
use armada::engagement::Choice;
use armada::logging;

#[derive(Debug, Parser)]
#[command(name = "dataset", version, about = "Inspect and balance captured training data")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Print record counts per engagement choice.
    Stats {
        /// Directory of .jsonl files written at match end.
        dir: PathBuf,
    },
    /// Write a class-balanced, shuffled copy of the data.
    Balance {
        dir: PathBuf,
        #[arg(long)]
        output: PathBuf,
        /// RNG seed, 0 for entropy.
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

fn main() -> ExitCode {
    logging::init();
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cmd: Cmd) -> Result<(), DatasetError> {
    match cmd {
        Cmd::Stats { dir } => {
            let ds = Dataset::load_dir(&dir)?;
            print_counts(&ds);
        }
        Cmd::Balance { dir, output, seed } => {
            let mut ds = Dataset::load_dir(&dir)?;
            print_counts(&ds);
            let mut rng = if seed != 0 {
                SmallRng::seed_from_u64(seed)
            } else {
                SmallRng::from_entropy()
            };
            ds.balance(&mut rng);
            let records = ds.into_shuffled(&mut rng);
            dataset::write_file(&output, &records)?;
            println!("wrote {} records to {}", records.len(), output.display());
        }
    }
    Ok(())
}

fn print_counts(ds: &Dataset) {
    for (choice, count) in Choice::ALL.iter().zip(ds.counts()) {
        println!("{:>26}: {}", choice.name(), count);
    }
    println!("{:>26}: {}", "total", ds.len());
}
