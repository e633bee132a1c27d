use log::debug;
use redb::{Database, Durability, ReadableTable, TableDefinition, WriteTransaction};
use std::fs;
use std::path::Path;

use super::kv_trait::{BenchEngine, SyncMode};
use crate::error::StoreError;
use crate::workload::KvPair;

const TABLE: TableDefinition<&str, &str> = TableDefinition::new("bench");

/// Commit durability for every write transaction this adapter opens.
const DURABILITY: Durability = Durability::Immediate;

fn redb_err<E: Into<redb::Error>>(e: E) -> StoreError {
    StoreError::Redb(e.into())
}

#[allow(deprecated)]
fn sync_mode_of(durability: Durability) -> SyncMode {
    match durability {
        Durability::Immediate | Durability::Paranoid => SyncMode::Full,
        Durability::Eventual => SyncMode::Normal,
        _ => SyncMode::Buffered,
    }
}

/// redb adapter. Writes and deletes each run inside one enclosing write
/// transaction that commits with `Durability::Immediate`; reads share one
/// read transaction.
pub struct RedbEngine {
    db: Database,
}

impl RedbEngine {
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        let db = Database::create(dir.join("bench.redb")).map_err(redb_err)?;

        // Create the table up front so reads on an empty workload still find it.
        let txn = Self::begin_write(&db)?;
        txn.open_table(TABLE).map_err(redb_err)?;
        txn.commit().map_err(redb_err)?;

        debug!("redb opened at {}", dir.display());
        Ok(Self { db })
    }

    fn begin_write(db: &Database) -> Result<WriteTransaction, StoreError> {
        let mut txn = db.begin_write().map_err(redb_err)?;
        txn.set_durability(DURABILITY);
        Ok(txn)
    }
}

impl BenchEngine for RedbEngine {
    fn name(&self) -> &'static str {
        "Redb"
    }

    fn sync_mode(&self) -> Result<SyncMode, StoreError> {
        Ok(sync_mode_of(DURABILITY))
    }

    fn write_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        let txn = Self::begin_write(&self.db)?;
        {
            let mut table = txn.open_table(TABLE).map_err(redb_err)?;
            for pair in pairs {
                table
                    .insert(pair.key.as_str(), pair.value.as_str())
                    .map_err(redb_err)?;
            }
        }
        txn.commit().map_err(redb_err)?;
        Ok(())
    }

    fn read_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        let txn = self.db.begin_read().map_err(redb_err)?;
        let table = txn.open_table(TABLE).map_err(redb_err)?;
        for pair in pairs {
            if table.get(pair.key.as_str()).map_err(redb_err)?.is_none() {
                return Err(StoreError::key_not_found(pair.key.as_str()));
            }
        }
        Ok(())
    }

    fn delete_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        let txn = Self::begin_write(&self.db)?;
        {
            let mut table = txn.open_table(TABLE).map_err(redb_err)?;
            for pair in pairs {
                table.remove(pair.key.as_str()).map_err(redb_err)?;
            }
        }
        txn.commit().map_err(redb_err)?;
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let txn = self.db.begin_read().map_err(redb_err)?;
        let table = txn.open_table(TABLE).map_err(redb_err)?;
        let value = table.get(key).map_err(redb_err)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn close(&mut self) -> Result<(), StoreError> {
        // Every write transaction already committed durably.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workload;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_redb_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = RedbEngine::open(&dir.path().join("redb_bench")).unwrap();
        let pairs = workload::generate(&mut StdRng::seed_from_u64(6), 50, 8);

        engine.write_all(&pairs).unwrap();
        engine.read_all(&pairs).unwrap();
        for pair in pairs.iter() {
            assert!(engine.get(&pair.key).unwrap().is_some());
        }

        engine.delete_all(&pairs).unwrap();
        for pair in pairs.iter() {
            assert_eq!(engine.get(&pair.key).unwrap(), None);
        }
        engine.close().unwrap();
    }

    #[test]
    fn test_redb_empty_workload() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = RedbEngine::open(&dir.path().join("redb_bench")).unwrap();
        engine.write_all(&[]).unwrap();
        engine.read_all(&[]).unwrap();
        engine.delete_all(&[]).unwrap();
    }

    #[test]
    fn test_redb_read_missing_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = RedbEngine::open(&dir.path().join("redb_bench")).unwrap();
        let missing = vec![KvPair {
            key: "3nope".to_string(),
            value: "4v".to_string(),
        }];
        assert!(matches!(
            engine.read_all(&missing),
            Err(StoreError::KeyNotFound { .. })
        ));
    }

    #[test]
    fn test_redb_sync_mode() {
        let dir = tempfile::tempdir().unwrap();
        let engine = RedbEngine::open(&dir.path().join("redb_bench")).unwrap();
        assert_eq!(engine.sync_mode().unwrap(), SyncMode::Full);
    }

    #[test]
    #[allow(deprecated)]
    fn test_redb_durability_mapping() {
        assert_eq!(sync_mode_of(Durability::Immediate), SyncMode::Full);
        assert_eq!(sync_mode_of(Durability::Paranoid), SyncMode::Full);
        assert_eq!(sync_mode_of(Durability::Eventual), SyncMode::Normal);
        assert_eq!(sync_mode_of(Durability::None), SyncMode::Buffered);
    }
}
