//! Protocol Module
//!
//! Defines the messages exchanged between the client façade and the
//! request actor.
//!
//! ## Message Flow
//! ```text
//!   caller ──Request──▶ [ unbounded queue ] ──▶ actor
//!     ▲                                          │
//!     └──────── Result<T> (bounded(1)) ◀─────────┘   (read-like requests only)
//! ```
//!
//! ### Request Kinds
//! - PUT, PUT_RAW, DEL: fire-and-forget, no reply channel
//! - GET, GET_RAW, TABLES, LEN, MODIFIED: always carry a reply channel
//! - SAVE, LOAD: reply channel optional (autosave ticks send none)
//! - STOP: ends the actor loop

mod request;
mod response;

pub use request::{ReplyTx, Request, RequestKind};
pub use response::SaveOutcome;
