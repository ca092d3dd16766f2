//! State Module
//!
//! In-memory tables and the store-wide map that owns them.
//!
//! ## Responsibilities
//! - Dense, position-indexed record storage per table
//! - Lazy table creation on first write
//! - Dirty tracking (per position and store-wide) for the save path
//!
//! ## Ownership
//! Nothing here is synchronized. A [`StoreState`] is owned by exactly one
//! thread, the request actor, and every mutation goes through it.

mod store_state;
mod table;

pub use store_state::StoreState;
pub use table::Table;

/// A slot in a table: record bytes, or absent
pub type Record = Option<bytes::Bytes>;
