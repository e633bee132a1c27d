//! # Storage Engine Module
//!
//! Adapters for the embedded key-value stores under comparison:
//!
//! - **`kv_trait`**: the `BenchEngine` contract shared by every adapter
//! - **`sled_engine`**: sled, a log-structured store
//! - **`redb_engine`**: redb, a copy-on-write B-tree
//! - **`lmdb_engine`**: LMDB through heed, a memory-mapped B+tree
//! - **`sqlite_engine`**: SQLite through rusqlite, a single key/value table
//!
//! ## Fairness
//!
//! Every adapter is opened in its backend's strongest synchronous-durability
//! mode, so a write or delete is on stable storage before the phase reports
//! it done. The per-backend bulk idiom differs (one enclosing transaction
//! for redb and LMDB, one committed operation per call for sled and SQLite),
//! but each logical write is still applied exactly once, in workload order.

pub mod kv_trait;
pub mod lmdb_engine;
pub mod redb_engine;
pub mod sled_engine;
pub mod sqlite_engine;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::StoreError;

pub use kv_trait::{BenchEngine, SyncMode};
pub use lmdb_engine::LmdbEngine;
pub use redb_engine::RedbEngine;
pub use sled_engine::SledEngine;
pub use sqlite_engine::SqliteEngine;

/// The backends this harness knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    Sled,
    Redb,
    Lmdb,
    Sqlite,
}

impl EngineKind {
    /// Default run order.
    pub const ALL: [EngineKind; 4] = [
        EngineKind::Sled,
        EngineKind::Redb,
        EngineKind::Lmdb,
        EngineKind::Sqlite,
    ];

    /// Lowercase name used in config files, environment and CLI.
    pub fn key(self) -> &'static str {
        match self {
            EngineKind::Sled => "sled",
            EngineKind::Redb => "redb",
            EngineKind::Lmdb => "lmdb",
            EngineKind::Sqlite => "sqlite",
        }
    }

    /// Label printed in reports.
    pub fn label(self) -> &'static str {
        match self {
            EngineKind::Sled => "Sled",
            EngineKind::Redb => "Redb",
            EngineKind::Lmdb => "LMDB",
            EngineKind::Sqlite => "SQLite",
        }
    }

    /// Directory holding every on-disk artifact of one run, below `data_dir`.
    pub fn artifact_dir(self, data_dir: &Path) -> PathBuf {
        data_dir.join(format!("{}_bench", self.key()))
    }

    /// Open the backend rooted at `dir` in its synchronous-durability mode.
    pub fn open(self, dir: &Path, config: &Config) -> Result<Box<dyn BenchEngine>, StoreError> {
        let engine: Box<dyn BenchEngine> = match self {
            EngineKind::Sled => Box::new(SledEngine::open(dir)?),
            EngineKind::Redb => Box::new(RedbEngine::open(dir)?),
            EngineKind::Lmdb => Box::new(LmdbEngine::open(dir, config.lmdb_map_size)?),
            EngineKind::Sqlite => Box::new(SqliteEngine::open(dir)?),
        };
        Ok(engine)
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
