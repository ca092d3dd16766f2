//! Format Module
//!
//! The on-disk layout of a store: one flat file, rewritten whole on every
//! save, read whole on every load.
//!
//! ## File Format
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │ Table header                                         │
//! │   "TB" (2) | NameLen: u8 (1) | Name (NameLen bytes)  │
//! ├──────────────────────────────────────────────────────┤
//! │ Record chunk (present record)                        │
//! │   "R1" (2) | Len: u16 BE (2) | Payload (Len bytes)   │
//! ├──────────────────────────────────────────────────────┤
//! │ Record chunk (absent slot)                           │
//! │   "R0" (2)                                           │
//! ├──────────────────────────────────────────────────────┤
//! │ ... records for this table, then the next header ... │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! - No file header, magic, version or checksum. The stream ends at EOF.
//! - A record's position is implicit: the n-th record chunk after a table
//!   header is position n of that table.
//! - `R1` with length 0 is an empty record, not an absent one. Older files
//!   that stored absent slots as empty `R1` chunks still load; those slots
//!   come back as empty records.
//! - Tables are written in name order, so equal states encode identically.

mod reader;
mod writer;

pub use reader::{decode, read_snapshot, SnapshotReader};
pub use writer::{encode, write_snapshot, SnapshotWriter};

// =============================================================================
// Shared Constants (used by writer and reader)
// =============================================================================

/// Tag opening a table header chunk
pub const TABLE_TAG: [u8; 2] = *b"TB";

/// Tag of a present record chunk
pub const RECORD_TAG: [u8; 2] = *b"R1";

/// Tag of an absent slot
pub const TOMBSTONE_TAG: [u8; 2] = *b"R0";

/// Longest persistable table name, in bytes
pub const MAX_NAME_LEN: usize = u8::MAX as usize;

/// Longest persistable record, in bytes
pub const MAX_RECORD_LEN: usize = u16::MAX as usize;

/// Most slots a table can hold (positions are u16)
pub const MAX_TABLE_LEN: usize = u16::MAX as usize + 1;
