//! Store Module
//!
//! The public façade. Each call becomes one request on the actor's queue.
//!
//! ## Blocking Behavior
//! - `put`, `put_raw`, `del`: enqueue and return; the only possible error is
//!   `ActorStopped` when the request cannot be enqueued
//! - everything else waits for the actor's reply, bounded by
//!   `Config::request_timeout`. A stopped actor is reported as
//!   `ActorStopped`, never as a hang.

use std::sync::Arc;
use std::thread::JoinHandle;

use bytes::Bytes;
use crossbeam::channel::{bounded, unbounded, RecvTimeoutError, Sender};
use crossbeam::sync::WaitGroup;
use tracing::{debug, info, warn};

use crate::actor::RequestActor;
use crate::autosave::Autosave;
use crate::codec::{JsonCodec, StructuredValue, ValueCodec};
use crate::config::Config;
use crate::error::{Result, StoreError};
use crate::format;
use crate::protocol::{ReplyTx, Request, SaveOutcome};
use crate::shutdown::Shutdown;
use crate::state::StoreState;

/// Handle to a running store
///
/// ## Concurrency Model: single owner, message passing
///
/// - All state lives on the actor thread; `Store` only holds the sending
///   half of its queue, so every method takes `&self` and a `Store` can be
///   shared across threads (e.g. behind an `Arc`).
/// - A read issued after a write from any thread observes that write once
///   the write was enqueued, because both travel through the same queue.
pub struct Store {
    config: Config,

    /// Request queue into the actor
    requests: Sender<Request>,

    /// Dropped to tell the autosave thread the store is going away
    detach: Option<Sender<()>>,

    autosave: Option<JoinHandle<()>>,
    actor: Option<JoinHandle<()>>,
}

impl Store {
    /// Open a store with the JSON value codec
    ///
    /// On startup:
    /// 1. Load the backing file if one is configured and exists
    /// 2. Spawn the request actor
    /// 3. Spawn the autosave thread (persistent stores with autosave only)
    ///
    /// `wait_group` is held by the autosave thread and released after its
    /// final flush; without autosave it is released immediately.
    pub fn open(config: Config, shutdown: Shutdown, wait_group: Option<WaitGroup>) -> Result<Self> {
        Self::open_with_codec(config, Arc::new(JsonCodec), shutdown, wait_group)
    }

    /// Open a store with a custom value codec
    pub fn open_with_codec(
        config: Config,
        codec: Arc<dyn ValueCodec>,
        shutdown: Shutdown,
        wait_group: Option<WaitGroup>,
    ) -> Result<Self> {
        let state = Self::hydrate(&config)?;
        let autosave_enabled = config.autosave_enabled();

        let (requests, inbox) = unbounded();

        // With autosave the actor is stopped by the autosave thread after
        // the final flush, not by cancellation directly. Otherwise the actor
        // holds its own token clone so the caller dropping theirs is not a
        // cancel.
        let actor_shutdown = if autosave_enabled {
            None
        } else {
            Some(shutdown.clone())
        };

        let actor =
            RequestActor::new(state, config.path.clone(), codec, inbox, actor_shutdown).spawn()?;

        let (detach, autosave) = if autosave_enabled {
            let (detach_tx, detach_rx) = bounded(0);
            let handle = Autosave::new(
                requests.clone(),
                config.autosave_interval,
                config.request_timeout,
                shutdown,
                detach_rx,
                wait_group,
            )
            .spawn()?;
            (Some(detach_tx), Some(handle))
        } else {
            (None, None)
        };

        info!(
            path = ?config.path,
            autosave = autosave_enabled,
            "Store opened"
        );

        Ok(Self {
            config,
            requests,
            detach,
            autosave,
            actor: Some(actor),
        })
    }

    /// Open a non-persistent store
    pub fn in_memory(shutdown: Shutdown) -> Result<Self> {
        Self::open(Config::default(), shutdown, None)
    }

    /// Initial state: the backing file's contents, or empty if there is no
    /// path or no file yet
    fn hydrate(config: &Config) -> Result<StoreState> {
        let Some(path) = config.path.as_deref() else {
            return Ok(StoreState::new());
        };

        match format::read_snapshot(path) {
            Ok(tables) => {
                let state = StoreState::from_tables(tables);
                info!(
                    path = %path.display(),
                    tables = state.table_count(),
                    records = state.record_count(),
                    "Loaded backing file"
                );
                Ok(state)
            }
            Err(StoreError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No backing file yet; starting empty");
                Ok(StoreState::new())
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Writes (fire-and-forget)
    // =========================================================================

    /// Store raw bytes at `table[pos]`
    pub fn put_raw(&self, table: &str, pos: u16, data: impl Into<Bytes>) -> Result<()> {
        self.send(Request::PutRaw {
            table: table.to_string(),
            pos,
            data: data.into(),
        })
    }

    /// Encode `value` with the store's codec and store it at `table[pos]`.
    /// Encoding happens on the actor; a failure there is logged.
    pub fn put(&self, table: &str, pos: u16, value: StructuredValue) -> Result<()> {
        self.send(Request::Put {
            table: table.to_string(),
            pos,
            value,
        })
    }

    /// Clear `table[pos]`. Deleting from a missing table is a silent no-op.
    pub fn del(&self, table: &str, pos: u16) -> Result<()> {
        self.send(Request::Del {
            table: table.to_string(),
            pos,
        })
    }

    // =========================================================================
    // Reads (blocking)
    // =========================================================================

    /// Raw bytes at `table[pos]`
    pub fn get_raw(&self, table: &str, pos: u16) -> Result<Bytes> {
        self.call(|reply| Request::GetRaw {
            table: table.to_string(),
            pos,
            reply,
        })
    }

    /// Decoded value at `table[pos]`; decode failures are returned as
    /// `StoreError::Codec`
    pub fn get(&self, table: &str, pos: u16) -> Result<StructuredValue> {
        self.call(|reply| Request::Get {
            table: table.to_string(),
            pos,
            reply,
        })
    }

    /// Table names, sorted
    pub fn tables(&self) -> Result<Vec<String>> {
        self.call(|reply| Request::Tables { reply })
    }

    /// Number of slots in `table`, absent ones included
    pub fn table_len(&self, table: &str) -> Result<usize> {
        self.call(|reply| Request::Len {
            table: table.to_string(),
            reply,
        })
    }

    /// Whether there are writes not yet saved
    pub fn is_modified(&self) -> Result<bool> {
        self.call(|reply| Request::Modified { reply })
    }

    // =========================================================================
    // Persistence
    // =========================================================================

    /// Flush to the backing file and wait for it
    pub fn save(&self) -> Result<SaveOutcome> {
        self.call(|reply| Request::Save { reply: Some(reply) })
    }

    /// Replace the in-memory state with the backing file's contents.
    /// On failure the current state is kept.
    pub fn load(&self) -> Result<()> {
        self.call(|reply| Request::Load { reply: Some(reply) })
    }

    /// Save one last time, then stop and join the background threads
    pub fn close(mut self) -> Result<SaveOutcome> {
        let outcome = self.save();
        self.teardown();
        outcome
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn send(&self, request: Request) -> Result<()> {
        self.requests
            .send(request)
            .map_err(|_| StoreError::ActorStopped)
    }

    /// Send a request carrying a fresh reply channel and wait for the answer
    fn call<T>(&self, make: impl FnOnce(ReplyTx<T>) -> Request) -> Result<T> {
        let (reply, result) = bounded(1);
        self.send(make(reply))?;

        match result.recv_timeout(self.config.request_timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(StoreError::Timeout(self.config.request_timeout)),
            Err(RecvTimeoutError::Disconnected) => Err(StoreError::ActorStopped),
        }
    }

    /// Stop autosave (which flushes and stops the actor), then make sure
    /// the actor is stopped and join both threads
    fn teardown(&mut self) {
        drop(self.detach.take());

        if let Some(handle) = self.autosave.take() {
            if handle.join().is_err() {
                warn!("Autosave thread panicked");
            }
        }

        if let Some(handle) = self.actor.take() {
            // Already stopped if autosave ran; the send then just fails
            let _ = self.requests.send(Request::Stop);
            if handle.join().is_err() {
                warn!("Request actor thread panicked");
            }
        }
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        self.teardown();
    }
}
