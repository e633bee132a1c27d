//! Command line interface of the `kvbench` binary.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::store::EngineKind;

/// Synced write/read/delete benchmark over embedded key-value stores.
///
/// Every flag overrides the matching key of the config file and of the
/// `KVBENCH_*` environment variables.
#[derive(Debug, Parser)]
#[command(name = "kvbench", version, about)]
pub struct Cli {
    /// Number of operations (key/value pairs) per engine [default: 1000]
    #[arg(long, value_name = "N")]
    pub nops: Option<usize>,

    /// Length of the random letter suffix of keys and values [default: 32]
    #[arg(long, value_name = "N")]
    pub lkv: Option<usize>,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory in which engines create their artifact directories [default: .]
    #[arg(long, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Comma-separated engines to run, in order [default: sled,redb,lmdb,sqlite]
    #[arg(long, value_enum, value_delimiter = ',')]
    pub engines: Option<Vec<EngineKind>>,

    /// Seed for the workload generator, for reproducible content
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep benchmarking the remaining engines after one fails
    #[arg(long)]
    pub keep_going: bool,
}

impl Cli {
    /// Apply the flags that were given on top of `config`.
    pub fn apply(&self, config: &mut Config) {
        if let Some(nops) = self.nops {
            config.nops = nops;
        }
        if let Some(lkv) = self.lkv {
            config.lkv = lkv;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(engines) = &self.engines {
            config.engines = engines.clone();
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        if self.keep_going {
            config.keep_going = true;
        }
    }
}
