//! # slotstore
//!
//! An embedded, in-process record store:
//! - Named tables of dense, position-indexed byte records
//! - One request actor owns all state; callers talk to it through a queue
//! - Periodic autosave to a single flat file, plus a final flush on shutdown
//! - Atomic save (temp file + rename) and all-or-nothing load
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Store (client façade)                     │
//! │             put / put_raw / del      get / get_raw           │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ Request              ▲ Result<T>
//! ┌─────────────────────▼──────────────────────┴────────────────┐
//! │                     Request queue                            │◀── Autosave
//! │                  (strict arrival order)                      │    (tick / final)
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!                       ▼
//!               ┌───────────────┐        ┌─────────────┐
//!               │ Request Actor │───────▶│ StoreState  │
//!               │ (one thread)  │        │  (tables)   │
//!               └───────┬───────┘        └─────────────┘
//!                       │ save / load
//!                       ▼
//!               ┌───────────────┐
//!               │    Format     │
//!               │  (flat file)  │
//!               └───────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use slotstore::{Config, Shutdown, Store};
//!
//! let shutdown = Shutdown::new();
//! let config = Config::builder().path("data.db").build();
//! let store = Store::open(config, shutdown.clone(), None)?;
//!
//! store.put_raw("test", 0, &b"blah"[..])?;
//! assert_eq!(&store.get_raw("test", 0)?[..], b"blah");
//!
//! store.close()?;
//! # Ok::<(), slotstore::StoreError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod codec;
pub mod format;
pub mod protocol;
pub mod shutdown;
pub mod state;
pub mod store;

mod actor;
mod autosave;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use codec::{JsonCodec, StructuredValue, ValueCodec};
pub use config::Config;
pub use error::{Result, StoreError};
pub use protocol::SaveOutcome;
pub use shutdown::Shutdown;
pub use store::Store;

/// Re-exported so callers can build a shutdown-completion tracker
pub use crossbeam::sync::WaitGroup;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of slotstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
