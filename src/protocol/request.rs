//! Request definitions
//!
//! One variant per operation the actor serves.

use std::fmt;

use bytes::Bytes;
use crossbeam::channel::Sender;

use crate::codec::StructuredValue;
use crate::error::Result;

use super::SaveOutcome;

/// Reply half handed to the actor; replies are sent exactly once
pub type ReplyTx<T> = Sender<Result<T>>;

/// Request kinds, used for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Put,
    Get,
    Del,
    Save,
    Load,
    GetRaw,
    PutRaw,
    Tables,
    Len,
    Modified,
    Stop,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKind::Put => "PUT",
            RequestKind::Get => "GET",
            RequestKind::Del => "DEL",
            RequestKind::Save => "SAVE",
            RequestKind::Load => "LOAD",
            RequestKind::GetRaw => "GET_RAW",
            RequestKind::PutRaw => "PUT_RAW",
            RequestKind::Tables => "TABLES",
            RequestKind::Len => "LEN",
            RequestKind::Modified => "MODIFIED",
            RequestKind::Stop => "STOP",
        };
        f.write_str(name)
    }
}

/// A request queued for the actor
#[derive(Debug)]
pub enum Request {
    /// Encode a structured value, then store it like `PutRaw`
    Put {
        table: String,
        pos: u16,
        value: StructuredValue,
    },

    /// Store raw bytes, creating and growing the table as needed
    PutRaw { table: String, pos: u16, data: Bytes },

    /// Read and decode a record
    Get {
        table: String,
        pos: u16,
        reply: ReplyTx<StructuredValue>,
    },

    /// Read a record without decoding
    GetRaw {
        table: String,
        pos: u16,
        reply: ReplyTx<Bytes>,
    },

    /// Clear a slot; a missing table is ignored
    Del { table: String, pos: u16 },

    /// Persist the store if anything changed
    Save { reply: Option<ReplyTx<SaveOutcome>> },

    /// Replace the in-memory state with the backing file's contents
    Load { reply: Option<ReplyTx<()>> },

    /// List table names in lexicographic order
    Tables { reply: ReplyTx<Vec<String>> },

    /// Number of slots in a table
    Len { table: String, reply: ReplyTx<usize> },

    /// Whether there are unsaved writes
    Modified { reply: ReplyTx<bool> },

    /// Terminate the actor loop
    Stop,
}

impl Request {
    /// Get the request kind
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::Put { .. } => RequestKind::Put,
            Request::PutRaw { .. } => RequestKind::PutRaw,
            Request::Get { .. } => RequestKind::Get,
            Request::GetRaw { .. } => RequestKind::GetRaw,
            Request::Del { .. } => RequestKind::Del,
            Request::Save { .. } => RequestKind::Save,
            Request::Load { .. } => RequestKind::Load,
            Request::Tables { .. } => RequestKind::Tables,
            Request::Len { .. } => RequestKind::Len,
            Request::Modified { .. } => RequestKind::Modified,
            Request::Stop => RequestKind::Stop,
        }
    }

    /// True for requests whose caller blocks on a reply
    pub fn expects_reply(&self) -> bool {
        match self {
            Request::Get { .. }
            | Request::GetRaw { .. }
            | Request::Tables { .. }
            | Request::Len { .. }
            | Request::Modified { .. } => true,
            Request::Save { reply } => reply.is_some(),
            Request::Load { reply } => reply.is_some(),
            Request::Put { .. } | Request::PutRaw { .. } | Request::Del { .. } | Request::Stop => {
                false
            }
        }
    }
}
