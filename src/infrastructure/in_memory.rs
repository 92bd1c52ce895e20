use crate::domain::ports::{LedgerStore, WriteBatch};
use crate::error::{MortgageError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A thread-safe in-memory ledger.
///
/// Uses `Arc<RwLock<HashMap<String, Vec<u8>>>>` so clones share one ledger.
/// A commit checks its guards and applies its puts under a single write lock.
#[derive(Default, Clone)]
pub struct InMemoryLedgerStore {
    entries: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl InMemoryLedgerStore {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self.entries.read().await;
        Ok(entries.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn commit(&self, batch: WriteBatch) -> Result<()> {
        let mut entries = self.entries.write().await;
        for guard in batch.guards() {
            if entries.get(&guard.key).map(Vec::as_slice) != guard.expected.as_deref() {
                return Err(MortgageError::Conflict {
                    key: guard.key.clone(),
                });
            }
        }
        for (key, value) in batch.into_puts() {
            entries.insert(key, value);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_get_put() {
        let store = InMemoryLedgerStore::new();
        store.put("1000001", b"record".to_vec()).await.unwrap();

        assert_eq!(
            store.get("1000001").await.unwrap(),
            Some(b"record".to_vec())
        );
        assert!(store.get("1000002").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_commit_applies_all_puts() {
        let store = InMemoryLedgerStore::new();
        let batch = WriteBatch::new()
            .expect("mortgages", None)
            .put("mortgages", b"index".to_vec())
            .put("1000001", b"record".to_vec());

        store.commit(batch).await.unwrap();
        assert_eq!(store.get("mortgages").await.unwrap(), Some(b"index".to_vec()));
        assert_eq!(store.get("1000001").await.unwrap(), Some(b"record".to_vec()));
    }

    #[tokio::test]
    async fn test_commit_with_stale_guard_writes_nothing() {
        let store = InMemoryLedgerStore::new();
        store.put("mortgages", b"v2".to_vec()).await.unwrap();

        let batch = WriteBatch::new()
            .expect("mortgages", Some(b"v1".to_vec()))
            .put("mortgages", b"v3".to_vec())
            .put("1000001", b"record".to_vec());

        let result = store.commit(batch).await;
        assert!(matches!(result, Err(MortgageError::Conflict { key }) if key == "mortgages"));
        assert_eq!(store.get("mortgages").await.unwrap(), Some(b"v2".to_vec()));
        assert!(store.get("1000001").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_clones_share_one_ledger() {
        let store = InMemoryLedgerStore::new();
        let other = store.clone();
        other.put("mortgages", b"index".to_vec()).await.unwrap();
        assert!(store.get("mortgages").await.unwrap().is_some());
    }
}
