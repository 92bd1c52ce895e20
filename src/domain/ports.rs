use crate::error::Result;
use async_trait::async_trait;

/// A precondition on a key: the commit only applies while the key still
/// holds exactly `expected` (`None` meaning absent).
#[derive(Debug, Clone, PartialEq)]
pub struct Guard {
    pub key: String,
    pub expected: Option<Vec<u8>>,
}

/// A set of puts applied all together or not at all.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    guards: Vec<Guard>,
    puts: Vec<(String, Vec<u8>)>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires `key` to be unchanged since it was read as `expected`.
    pub fn expect(mut self, key: impl Into<String>, expected: Option<Vec<u8>>) -> Self {
        self.guards.push(Guard {
            key: key.into(),
            expected,
        });
        self
    }

    pub fn put(mut self, key: impl Into<String>, value: Vec<u8>) -> Self {
        self.puts.push((key.into(), value));
        self
    }

    pub fn guards(&self) -> &[Guard] {
        &self.guards
    }

    pub fn puts(&self) -> &[(String, Vec<u8>)] {
        &self.puts
    }

    pub fn into_puts(self) -> Vec<(String, Vec<u8>)> {
        self.puts
    }
}

/// Durable mapping from string keys to opaque bytes.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<()>;
    /// Applies every put of `batch` atomically if all of its guards hold,
    /// otherwise fails with `MortgageError::Conflict` and writes nothing.
    async fn commit(&self, batch: WriteBatch) -> Result<()>;
}

pub type LedgerStoreBox = Box<dyn LedgerStore>;
