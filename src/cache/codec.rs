//! Value Codec Module
//!
//! Encodes structured values into the opaque byte blobs persisted by the
//! cache store, and decodes them back.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Error raised when a value cannot be encoded, or a stored blob cannot be
/// decoded back into the requested type.
#[derive(Debug, Error)]
#[error("codec failure: {0}")]
pub struct CodecError(#[from] bincode::Error);

/// Encodes a value into a deterministic binary blob.
pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, CodecError> {
    Ok(bincode::serialize(value)?)
}

/// Decodes a blob produced by [`encode`].
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    Ok(bincode::deserialize(bytes)?)
}
