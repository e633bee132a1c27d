//! # Configuration Management
//!
//! Benchmark parameters are layered, lowest priority first:
//! 1. Built-in defaults (`Config::default`)
//! 2. An optional TOML file passed with `--config`
//! 3. `KVBENCH_*` environment variables (e.g. `KVBENCH_NOPS=5000`,
//!    `KVBENCH_ENGINES=sled,lmdb`)
//! 4. Command line flags, applied by the driver after loading
//!
//! ## Example Configuration File (kvbench.toml)
//! ```toml
//! nops = 10000
//! lkv = 16
//! data_dir = "/mnt/nvme/bench"
//! engines = ["sled", "lmdb"]
//! seed = 42
//! keep_going = false
//! lmdb_map_size = 1073741824
//! ```

use anyhow::{bail, Result};
use config::{Config as ConfigLib, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::store::{lmdb_engine, EngineKind};
use crate::workload::MAX_PREFIX_DIGITS;

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "KVBENCH";

/// Settings for one harness invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Number of key/value pairs in each engine's workload
    pub nops: usize,

    /// Length of the random letter suffix of every key and value
    pub lkv: usize,

    /// Directory under which each engine creates its artifact directory
    pub data_dir: PathBuf,

    /// Engines to run, in order
    pub engines: Vec<EngineKind>,

    /// Seed for the workload generator; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,

    /// Continue with the remaining engines after one fails
    pub keep_going: bool,

    /// Maximum size of the LMDB memory map in bytes
    pub lmdb_map_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            nops: 1000,
            lkv: 32,
            data_dir: PathBuf::from("."),
            engines: EngineKind::ALL.to_vec(),
            seed: None,
            keep_going: false,
            lmdb_map_size: 1 << 30,
        }
    }
}

impl Config {
    /// Build the configuration from defaults, an optional file and the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let defaults = Config::default();
        let engine_names: Vec<String> = defaults
            .engines
            .iter()
            .map(|kind| kind.key().to_string())
            .collect();

        let mut builder = ConfigLib::builder()
            .set_default("nops", defaults.nops as i64)?
            .set_default("lkv", defaults.lkv as i64)?
            .set_default("data_dir", defaults.data_dir.to_string_lossy().into_owned())?
            .set_default("engines", engine_names)?
            .set_default("keep_going", defaults.keep_going)?
            .set_default("lmdb_map_size", defaults.lmdb_map_size as i64)?;

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("engines"),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no run could make sense of.
    pub fn validate(&self) -> Result<()> {
        if self.engines.is_empty() {
            bail!("no engines configured");
        }
        if self.lmdb_map_size == 0 {
            bail!("lmdb_map_size must be positive");
        }
        let max_key = MAX_PREFIX_DIGITS + self.lkv;
        if self.engines.contains(&EngineKind::Lmdb) && max_key > lmdb_engine::MAX_KEY_SIZE {
            bail!(
                "lkv {} gives keys of up to {} bytes, LMDB accepts at most {}; \
                 use lkv <= {} or drop lmdb from engines",
                self.lkv,
                max_key,
                lmdb_engine::MAX_KEY_SIZE,
                lmdb_engine::MAX_KEY_SIZE - MAX_PREFIX_DIGITS
            );
        }
        Ok(())
    }
}
