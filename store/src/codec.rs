//! Record encoding for the byte-level stores.

use crate::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub fn encode<T: Serialize>(record: &T) -> Result<Vec<u8>, StoreError> {
    bincode::serialize(record).map_err(|e| StoreError::Serialization(e.to_string()))
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
    bincode::deserialize(bytes).map_err(|e| StoreError::Serialization(e.to_string()))
}

/// Decode every record in a listing, failing on the first corrupt entry.
pub fn decode_all<T: DeserializeOwned>(rows: &[Vec<u8>]) -> Result<Vec<T>, StoreError> {
    rows.iter().map(|r| decode(r)).collect()
}
