use thiserror::Error;

#[derive(Error, Debug)]
pub enum MortgageError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Write conflict on key '{key}'")]
    Conflict { key: String },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for MortgageError {
    fn from(e: rocksdb::Error) -> Self {
        MortgageError::Storage(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MortgageError>;
