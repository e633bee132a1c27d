//! # kvbench
//!
//! Runs the same synced write/read/delete workload against sled, redb, LMDB
//! and SQLite and prints how long each phase took.
//!
//! ## Configuration Priority
//! 1. Command line arguments (highest priority)
//! 2. `KVBENCH_*` environment variables
//! 3. Configuration file (`--config <path>`)
//! 4. Default values (lowest priority)
//!
//! Benchmark reports go to stdout. Logging goes to stderr and is controlled
//! with `RUST_LOG` (default `info`).

use anyhow::Result;
use clap::Parser;
use log::error;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::{self, Write};

use kvbench::cli::Cli;
use kvbench::{runner, Config};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(
        out,
        "Running benchmarks with {} operations and key-value length of {}\n",
        config.nops, config.lkv
    )?;

    let outcome = runner::run_all(&config, &mut rng, &mut out);
    out.flush()?;

    match outcome {
        Ok(summary) if summary.is_success() => Ok(()),
        Ok(summary) => {
            error!("{} engine(s) failed", summary.failures.len());
            std::process::exit(1);
        }
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}
