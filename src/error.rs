//! Error types for engine adapters and the benchmark runner

use std::path::PathBuf;
use thiserror::Error;

use crate::runner::Phase;
use crate::store::SyncMode;

/// Errors raised by a storage backend while serving one adapter call.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sled: {0}")]
    Sled(#[from] sled::Error),

    #[error("redb: {0}")]
    Redb(#[from] redb::Error),

    #[error("lmdb: {0}")]
    Lmdb(#[from] heed::Error),

    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A key that was written earlier in the run could not be found
    #[error("Key not found: '{key}'")]
    KeyNotFound { key: String },
}

impl StoreError {
    pub fn key_not_found<S: Into<String>>(key: S) -> Self {
        StoreError::KeyNotFound { key: key.into() }
    }
}

/// Errors raised by the benchmark runner.
///
/// `Open` and the phase errors are fatal for the invocation. `Cleanup` is
/// only ever logged.
#[derive(Error, Debug)]
pub enum BenchError {
    #[error("{engine}: failed to open storage at {}: {source}", path.display())]
    Open {
        engine: &'static str,
        path: PathBuf,
        #[source]
        source: StoreError,
    },

    #[error("{engine}: opened with {mode} durability, synchronous writes are required")]
    NotDurable { engine: &'static str, mode: SyncMode },

    #[error("{engine}: write phase failed: {source}")]
    Write {
        engine: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{engine}: read phase failed: {source}")]
    Read {
        engine: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{engine}: delete phase failed: {source}")]
    Delete {
        engine: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{engine}: failed to close storage: {source}")]
    Close {
        engine: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("{engine}: failed to remove {}: {source}", path.display())]
    Cleanup {
        engine: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write report: {0}")]
    Report(#[from] std::io::Error),
}

impl BenchError {
    /// Wrap a backend error raised during `phase`.
    pub fn phase(engine: &'static str, phase: Phase, source: StoreError) -> Self {
        match phase {
            Phase::Write => BenchError::Write { engine, source },
            Phase::Read => BenchError::Read { engine, source },
            Phase::Delete => BenchError::Delete { engine, source },
        }
    }
}
