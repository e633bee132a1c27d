// src/store/sled_engine.rs
use log::debug;
use sled::{Db, Tree};
use std::path::Path;

use super::kv_trait::{BenchEngine, SyncMode};
use crate::error::StoreError;
use crate::workload::KvPair;

/// sled has no per-write sync flag, so the background flusher is disabled and
/// every insert or remove is followed by an explicit `flush`.
pub struct SledEngine {
    db: Db,
    tree: Tree,
}

impl SledEngine {
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        let db = sled::Config::new()
            .path(dir)
            .flush_every_ms(None)
            .open()?;
        let tree = db.open_tree(b"bench")?;
        debug!("sled opened at {}", dir.display());
        Ok(Self { db, tree })
    }
}

impl BenchEngine for SledEngine {
    fn name(&self) -> &'static str {
        "Sled"
    }

    fn sync_mode(&self) -> Result<SyncMode, StoreError> {
        // Durability comes from the flush after every mutation.
        Ok(SyncMode::Full)
    }

    fn write_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        for pair in pairs {
            self.tree.insert(pair.key.as_bytes(), pair.value.as_bytes())?;
            self.tree.flush()?;
        }
        Ok(())
    }

    fn read_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        for pair in pairs {
            if self.tree.get(pair.key.as_bytes())?.is_none() {
                return Err(StoreError::key_not_found(pair.key.as_str()));
            }
        }
        Ok(())
    }

    fn delete_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        for pair in pairs {
            self.tree.remove(pair.key.as_bytes())?;
            self.tree.flush()?;
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self.tree.get(key.as_bytes())?;
        Ok(value.map(|ivec| String::from_utf8_lossy(&ivec).to_string()))
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.db.flush()?;
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
    fn test_sled_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = SledEngine::open(&dir.path().join("sled_bench")).unwrap();
        let pairs = workload::generate(&mut StdRng::seed_from_u64(5), 50, 8);

        engine.write_all(&pairs).unwrap();
        for pair in pairs.iter() {
            assert!(engine.get(&pair.key).unwrap().is_some());
        }
        engine.read_all(&pairs).unwrap();

        engine.delete_all(&pairs).unwrap();
        for pair in pairs.iter() {
            assert_eq!(engine.get(&pair.key).unwrap(), None);
        }
        engine.close().unwrap();
    }

    #[test]
    fn test_sled_read_missing_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = SledEngine::open(&dir.path().join("sled_bench")).unwrap();
        let missing = vec![KvPair {
            key: "1missing".to_string(),
            value: "2value".to_string(),
        }];

        let err = engine.read_all(&missing).unwrap_err();
        assert!(matches!(err, StoreError::KeyNotFound { ref key } if key == "1missing"));
    }

    #[test]
    fn test_sled_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = SledEngine::open(&dir.path().join("sled_bench")).unwrap();
        let pairs = vec![
            KvPair { key: "7dup".into(), value: "1first".into() },
            KvPair { key: "7dup".into(), value: "2second".into() },
        ];

        engine.write_all(&pairs).unwrap();
        assert_eq!(engine.get("7dup").unwrap(), Some("2second".to_string()));
        engine.delete_all(&pairs).unwrap();
        assert_eq!(engine.get("7dup").unwrap(), None);
    }

    #[test]
    fn test_sled_sync_mode() {
        let dir = tempfile::tempdir().unwrap();
        let engine = SledEngine::open(&dir.path().join("sled_bench")).unwrap();
        assert!(engine.sync_mode().unwrap().is_synchronous());
    }
}
