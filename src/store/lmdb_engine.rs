use heed::types::Str;
use heed::{Database, Env, EnvFlags, EnvOpenOptions};
use log::debug;
use std::fs;
use std::path::Path;

use super::kv_trait::{BenchEngine, SyncMode};
use crate::error::StoreError;
use crate::workload::KvPair;

/// No `NO_SYNC`, `NO_META_SYNC` or `MAP_ASYNC`: every commit fsyncs data and meta pages.
const OPEN_FLAGS: EnvFlags = EnvFlags::empty();

/// Largest key LMDB accepts with its default build settings.
pub const MAX_KEY_SIZE: usize = 511;

/// LMDB adapter built on heed. Like redb, writes and deletes use one enclosing
/// write transaction per phase and reads share a single read transaction.
pub struct LmdbEngine {
    env: Env,
    db: Database<Str, Str>,
}

impl LmdbEngine {
    pub fn open(dir: &Path, map_size: usize) -> Result<Self, StoreError> {
        Self::open_with_flags(dir, map_size, OPEN_FLAGS)
    }

    fn open_with_flags(dir: &Path, map_size: usize, flags: EnvFlags) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        // SAFETY: the directory is owned by this run and opened exactly once.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(1)
                .flags(flags)
                .open(dir)?
        };

        let mut wtxn = env.write_txn()?;
        let db: Database<Str, Str> = env.create_database(&mut wtxn, Some("bench"))?;
        wtxn.commit()?;

        debug!("lmdb opened at {} (map size {} bytes)", dir.display(), map_size);
        Ok(Self { env, db })
    }
}

impl BenchEngine for LmdbEngine {
    fn name(&self) -> &'static str {
        "LMDB"
    }

    fn sync_mode(&self) -> Result<SyncMode, StoreError> {
        let flags = EnvFlags::from_bits_truncate(self.env.get_flags()?);
        let mode = if flags.intersects(EnvFlags::NO_SYNC | EnvFlags::MAP_ASYNC) {
            SyncMode::Buffered
        } else if flags.contains(EnvFlags::NO_META_SYNC) {
            SyncMode::Normal
        } else {
            SyncMode::Full
        };
        Ok(mode)
    }

    fn write_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn()?;
        for pair in pairs {
            self.db.put(&mut wtxn, pair.key.as_str(), pair.value.as_str())?;
        }
        wtxn.commit()?;
        Ok(())
    }

    fn read_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        let rtxn = self.env.read_txn()?;
        for pair in pairs {
            if self.db.get(&rtxn, pair.key.as_str())?.is_none() {
                return Err(StoreError::key_not_found(pair.key.as_str()));
            }
        }
        Ok(())
    }

    fn delete_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        let mut wtxn = self.env.write_txn()?;
        for pair in pairs {
            self.db.delete(&mut wtxn, pair.key.as_str())?;
        }
        wtxn.commit()?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let rtxn = self.env.read_txn()?;
        let value = self.db.get(&rtxn, key)?.map(str::to_string);
        Ok(value)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.env.force_sync()?;
        Ok(())
    }
}
