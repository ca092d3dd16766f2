//! Structured value codec
//!
//! Records are opaque bytes to the store. `put`/`get` hand them to a
//! [`ValueCodec`] to convert from/to a structured value; the store never
//! looks inside the value itself.

use crate::error::{Result, StoreError};

/// The structured value type exchanged by `put`/`get`
pub type StructuredValue = serde_json::Value;

/// Converts structured values to record bytes and back
pub trait ValueCodec: Send + Sync {
    /// Encode a value into record bytes
    fn encode(&self, value: &StructuredValue) -> Result<Vec<u8>>;

    /// Decode record bytes; failures must be reported, not papered over
    fn decode(&self, bytes: &[u8]) -> Result<StructuredValue>;
}

/// JSON text codec backed by serde_json
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl ValueCodec for JsonCodec {
    fn encode(&self, value: &StructuredValue) -> Result<Vec<u8>> {
        serde_json::to_vec(value).map_err(|e| StoreError::Codec(e.to_string()))
    }

    fn decode(&self, bytes: &[u8]) -> Result<StructuredValue> {
        serde_json::from_slice(bytes).map_err(|e| StoreError::Codec(e.to_string()))
    }
}
