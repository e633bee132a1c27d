use log::debug;
use rusqlite::{params, Connection, OptionalExtension};
use std::fs;
use std::path::Path;

use super::kv_trait::{BenchEngine, SyncMode};
use crate::error::StoreError;
use crate::workload::KvPair;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS kv (key TEXT PRIMARY KEY, value TEXT NOT NULL)";
const UPSERT: &str = "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)";
const SELECT: &str = "SELECT value FROM kv WHERE key = ?1";
const DELETE: &str = "DELETE FROM kv WHERE key = ?1";

/// `PRAGMA synchronous` level EXTRA, the strongest SQLite offers.
const SYNCHRONOUS_EXTRA: i64 = 3;

/// SQLite adapter. Runs in autocommit mode so every statement is its own
/// transaction, synced with `PRAGMA synchronous = EXTRA`.
pub struct SqliteEngine {
    conn: Connection,
}

impl SqliteEngine {
    pub fn open(dir: &Path) -> Result<Self, StoreError> {
        fs::create_dir_all(dir)?;
        let conn = Connection::open(dir.join("bench.sqlite"))?;
        conn.pragma_update(None, "synchronous", SYNCHRONOUS_EXTRA)?;
        conn.execute(SCHEMA, [])?;
        debug!("sqlite opened at {}", dir.display());
        Ok(Self { conn })
    }
}

impl BenchEngine for SqliteEngine {
    fn name(&self) -> &'static str {
        "SQLite"
    }

    fn sync_mode(&self) -> Result<SyncMode, StoreError> {
        let level: i64 = self
            .conn
            .pragma_query_value(None, "synchronous", |row| row.get(0))?;
        Ok(match level {
            0 => SyncMode::Buffered,
            1 => SyncMode::Normal,
            2 => SyncMode::Full,
            _ => SyncMode::Extra,
        })
    }

    fn write_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        let mut stmt = self.conn.prepare_cached(UPSERT)?;
        for pair in pairs {
            stmt.execute(params![pair.key, pair.value])?;
        }
        Ok(())
    }

    fn read_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        let mut stmt = self.conn.prepare_cached(SELECT)?;
        for pair in pairs {
            let found = stmt
                .query_row([&pair.key], |row| row.get::<_, String>(0))
                .optional()?;
            if found.is_none() {
                return Err(StoreError::key_not_found(pair.key.as_str()));
            }
        }
        Ok(())
    }

    fn delete_all(&mut self, pairs: &[KvPair]) -> Result<(), StoreError> {
        let mut stmt = self.conn.prepare_cached(DELETE)?;
        for pair in pairs {
            stmt.execute([&pair.key])?;
        }
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row(SELECT, [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn close(&mut self) -> Result<(), StoreError> {
        self.conn.flush_prepared_statement_cache();
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
    fn test_sqlite_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = SqliteEngine::open(&dir.path().join("sqlite_bench")).unwrap();
        let pairs = workload::generate(&mut StdRng::seed_from_u64(9), 50, 8);

        engine.write_all(&pairs).unwrap();
        engine.read_all(&pairs).unwrap();
        let last = pairs.last().unwrap();
        assert!(engine.get(&last.key).unwrap().is_some());

        engine.delete_all(&pairs).unwrap();
        for pair in pairs.iter() {
            assert_eq!(engine.get(&pair.key).unwrap(), None);
        }
        engine.close().unwrap();
    }

    #[test]
    fn test_sqlite_read_missing_key_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut engine = SqliteEngine::open(&dir.path().join("sqlite_bench")).unwrap();
        let missing = vec![KvPair {
            key: "5gone".to_string(),
            value: "6v".to_string(),
        }];
        let err = engine.read_all(&missing).unwrap_err();
        assert_eq!(err.to_string(), "Key not found: '5gone'");
    }

    #[test]
    fn test_sqlite_synchronous_pragma() {
        let dir = tempfile::tempdir().unwrap();
        let engine = SqliteEngine::open(&dir.path().join("sqlite_bench")).unwrap();
        assert_eq!(engine.sync_mode().unwrap(), SyncMode::Extra);
        assert!(engine.sync_mode().unwrap().is_synchronous());
    }
}
