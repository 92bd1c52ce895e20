use crate::domain::ports::{LedgerStore, WriteBatch};
use crate::error::{MortgageError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, Options};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Column Family holding every ledger key.
pub const CF_LEDGER: &str = "ledger";

/// A persistent ledger backed by RocksDB.
///
/// Batches are written with a single `rocksdb::WriteBatch`. Guard checks and
/// writes are serialized by a commit lock so no other write can land between
/// a guard being checked and the batch being applied.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBLedgerStore {
    db: Arc<DB>,
    commit_lock: Arc<Mutex<()>>,
}

impl RocksDBLedgerStore {
    /// Opens or creates a RocksDB instance at the specified path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_ledger = ColumnFamilyDescriptor::new(CF_LEDGER, Options::default());
        let db = DB::open_cf_descriptors(&opts, path, vec![cf_ledger])?;

        Ok(Self {
            db: Arc::new(db),
            commit_lock: Arc::new(Mutex::new(())),
        })
    }

    fn ledger(&self) -> Result<&ColumnFamily> {
        self.db.cf_handle(CF_LEDGER).ok_or_else(|| {
            MortgageError::Storage("Ledger column family not found".to_string())
        })
    }
}

#[async_trait]
impl LedgerStore for RocksDBLedgerStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let cf = self.ledger()?;
        Ok(self.db.get_cf(cf, key)?)
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let _commit = self.commit_lock.lock().await;
        let cf = self.ledger()?;
        self.db.put_cf(cf, key, value)?;
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        let _commit = self.commit_lock.lock().await;
        let cf = self.ledger()?;

        for guard in batch.guards() {
            let current = self.db.get_pinned_cf(cf, &guard.key)?;
            if current.as_deref() != guard.expected.as_deref() {
                return Err(MortgageError::Conflict {
                    key: guard.key.clone(),
                });
            }
        }

        let mut write = rocksdb::WriteBatch::default();
        for (key, value) in batch.puts() {
            write.put_cf(cf, key, value);
        }
        self.db.write(write)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_rocksdb_open_cf() {
        let dir = tempdir().unwrap();
        let store = RocksDBLedgerStore::open(dir.path()).expect("Failed to open RocksDB");
        assert!(store.db.cf_handle(CF_LEDGER).is_some());
    }

    #[tokio::test]
    async fn test_rocksdb_get_put() {
        let dir = tempdir().unwrap();
        let store = RocksDBLedgerStore::open(dir.path()).unwrap();

        store.put("1000001", b"record".to_vec()).await.unwrap();
        assert_eq!(
            store.get("1000001").await.unwrap(),
            Some(b"record".to_vec())
        );
        assert!(store.get("1000002").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_guarded_commit() {
        let dir = tempdir().unwrap();
        let store = RocksDBLedgerStore::open(dir.path()).unwrap();

        let first = WriteBatch::new()
            .expect("mortgages", None)
            .put("mortgages", b"v1".to_vec())
            .put("1000001", b"record".to_vec());
        store.commit(first).await.unwrap();

        let stale = WriteBatch::new()
            .expect("mortgages", None)
            .put("mortgages", b"v2".to_vec())
            .put("1000002", b"record".to_vec());
        assert!(matches!(
            store.commit(stale).await,
            Err(MortgageError::Conflict { .. })
        ));
        assert_eq!(store.get("mortgages").await.unwrap(), Some(b"v1".to_vec()));
        assert!(store.get("1000002").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rocksdb_reopen_keeps_data() {
        let dir = tempdir().unwrap();
        {
            let store = RocksDBLedgerStore::open(dir.path()).unwrap();
            store.put("mortgages", b"index".to_vec()).await.unwrap();
        }
        let store = RocksDBLedgerStore::open(dir.path()).unwrap();
        assert_eq!(store.get("mortgages").await.unwrap(), Some(b"index".to_vec()));
    }
}
