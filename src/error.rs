//! Error types for slotstore
//!
//! Provides a unified error type for all operations.

use std::time::Duration;

use thiserror::Error;

/// Result type alias using StoreError
pub type Result<T> = std::result::Result<T, StoreError>;

/// Unified error type for slotstore operations
#[derive(Debug, Error)]
pub enum StoreError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("record not found: {table}[{pos}]")]
    RecordNotFound { table: String, pos: u16 },

    // -------------------------------------------------------------------------
    // Persistence Errors
    // -------------------------------------------------------------------------
    /// The backing file does not follow the chunk stream layout
    #[error("Format error: {0}")]
    Format(String),

    /// A table name or record is too large to be persisted
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),

    // -------------------------------------------------------------------------
    // Value Codec Errors
    // -------------------------------------------------------------------------
    #[error("Codec error: {0}")]
    Codec(String),

    // -------------------------------------------------------------------------
    // Actor Errors
    // -------------------------------------------------------------------------
    /// The request actor has terminated; no request can be served
    #[error("request actor stopped")]
    ActorStopped,

    #[error("no reply from request actor within {0:?}")]
    Timeout(Duration),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StoreError {
    /// True for the lookup errors returned by `get`/`get_raw`
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::TableNotFound(_) | StoreError::RecordNotFound { .. }
        )
    }
}
