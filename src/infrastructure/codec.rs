//! JSON encoding of ledger documents.
//!
//! Decode failures are classified by where the bytes came from: a caller's
//! payload is a validation problem, a stored document is a serialization one.

use crate::error::{MortgageError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value)
        .map_err(|e| MortgageError::Serialization(format!("Failed to encode document: {}", e)))
}

/// Decodes a document read from the ledger under `key`.
pub fn decode_stored<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| {
        MortgageError::Serialization(format!("Failed to decode document '{}': {}", key, e))
    })
}

/// Decodes a JSON payload supplied by a caller.
pub fn decode_payload<T: DeserializeOwned>(payload: &str) -> Result<T> {
    serde_json::from_str(payload)
        .map_err(|e| MortgageError::Validation(format!("Malformed payload: {}", e)))
}
