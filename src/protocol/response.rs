//! Response definitions
//!
//! Reply payloads that carry more than a bare value.

/// What a save request actually did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The whole store was written to the backing file
    Written {
        /// Number of tables persisted
        tables: usize,
        /// Size of the new file in bytes
        bytes: u64,
    },

    /// Nothing was modified since the last save or load
    Clean,

    /// No backing file is configured
    NoPath,
}

impl SaveOutcome {
    /// True if a file was written
    pub fn is_written(&self) -> bool {
        matches!(self, SaveOutcome::Written { .. })
    }
}
