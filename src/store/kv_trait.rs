//! # Benchmark Engine Trait
//!
//! Common interface implemented once per storage backend. The runner only
//! talks to `dyn BenchEngine`, so swapping or adding a backend never touches
//! the timing code.
//!
//! ## Implementations
//!
//! - `SledEngine`: sled, one flushed operation per call
//! - `RedbEngine`: redb, one immediate-durability transaction per phase
//! - `LmdbEngine`: LMDB through heed, one synced transaction per phase
//! - `SqliteEngine`: SQLite through rusqlite, autocommit with `synchronous = EXTRA`

use std::fmt;

use crate::error::StoreError;
use crate::workload::KvPair;

/// Durability level a backend was opened with.
///
/// Ordered from weakest to strongest so callers can compare modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SyncMode {
    /// Writes may sit in memory until a background flush.
    Buffered,
    /// Writes reach the OS but are not fsynced on every commit.
    Normal,
    /// Every commit is fsynced before the call returns.
    Full,
    /// As `Full`, plus the containing directory is synced (SQLite `EXTRA`).
    Extra,
}

impl SyncMode {
    /// True when a returned write is guaranteed to be on stable storage.
    pub fn is_synchronous(self) -> bool {
        self >= SyncMode::Full
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SyncMode::Buffered => "buffered",
            SyncMode::Normal => "normal",
            SyncMode::Full => "full",
            SyncMode::Extra => "extra",
        };
        f.write_str(s)
    }
}

/// Uniform three-phase contract every backend adapter implements.
///
/// Each bulk operation walks the pairs in order and stops at the first
/// failing pair. None of them retries.
#[cfg_attr(test, mockall::automock)]
pub trait BenchEngine {
    /// Human-readable engine label used in reports.
    fn name(&self) -> &'static str;

    /// Durability mode as reported by the backend.
    fn sync_mode(&self) -> Result<SyncMode, StoreError>;

    /// Write every pair; returns once all of them are durable.
    fn write_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError>;

    /// Look up every key, discarding the values.
    ///
    /// A missing key is an error: everything read was written in the
    /// preceding phase.
    fn read_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError>;

    /// Delete every key durably.
    fn delete_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError>;

    /// Single point lookup, `None` when the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Flush whatever the backend still holds. The engine is dropped afterwards.
    fn close(&mut self) -> Result<(), StoreError>;
}
