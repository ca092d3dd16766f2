//! Request Actor
//!
//! The single owner of [`StoreState`]. Requests are taken off one queue and
//! applied strictly in arrival order, one at a time, so no operation can
//! observe a half-applied predecessor and tables need no locking.
//!
//! ## Loop Termination
//! - a `Stop` request
//! - every request sender dropped
//! - cancellation of the actor's own [`Shutdown`] clone. When autosave runs
//!   the actor gets no token: the autosave thread owns shutdown, flushes one
//!   last time and then sends `Stop`. Without autosave the actor exits on
//!   cancel directly and unsaved writes are dropped.
//!
//! Stopping with unsaved writes is logged at `warn` whichever way it happens.
//!
//! Requests still queued when the loop ends are dropped with it; their
//! reply senders disconnect, which callers see as `ActorStopped`.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use bytes::Bytes;
use crossbeam::channel::{never, Receiver};
use crossbeam::select;
use tracing::{debug, info, trace, warn};

use crate::codec::ValueCodec;
use crate::error::{Result, StoreError};
use crate::format;
use crate::protocol::{ReplyTx, Request, SaveOutcome};
use crate::shutdown::Shutdown;
use crate::state::StoreState;

pub(crate) struct RequestActor {
    state: StoreState,
    path: Option<PathBuf>,
    codec: Arc<dyn ValueCodec>,
    requests: Receiver<Request>,

    /// Held for the lifetime of the loop; `done()` also disconnects once
    /// every clone is gone
    shutdown: Option<Shutdown>,
}

impl RequestActor {
    pub(crate) fn new(
        state: StoreState,
        path: Option<PathBuf>,
        codec: Arc<dyn ValueCodec>,
        requests: Receiver<Request>,
        shutdown: Option<Shutdown>,
    ) -> Self {
        Self {
            state,
            path,
            codec,
            requests,
            shutdown,
        }
    }

    /// Run the actor on its own thread
    pub(crate) fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("slotstore-actor".to_string())
            .spawn(move || self.run())
    }

    fn run(mut self) {
        debug!(tables = self.state.table_count(), "Request actor started");

        let cancelled = match &self.shutdown {
            Some(shutdown) => shutdown.done(),
            None => never(),
        };

        let reason = loop {
            select! {
                recv(self.requests) -> msg => match msg {
                    Ok(Request::Stop) => break "stop request",
                    Ok(request) => self.handle(request),
                    Err(_) => break "all request senders dropped",
                },
                recv(cancelled) -> _ => break "cancelled",
            }
        };

        if self.state.is_modified() {
            warn!(reason, "Request actor stopping with unsaved writes; they are discarded");
        }
        debug!(reason, "Request actor stopped");
    }

    fn handle(&mut self, request: Request) {
        trace!(
            kind = %request.kind(),
            expects_reply = request.expects_reply(),
            "Handling request"
        );

        match request {
            Request::Put { table, pos, value } => match self.codec.encode(&value) {
                Ok(data) => self.state.put(&table, pos, Bytes::from(data)),
                Err(e) => warn!(%table, pos, error = %e, "Dropping put: value encoding failed"),
            },

            Request::PutRaw { table, pos, data } => self.state.put(&table, pos, data),

            Request::Get { table, pos, reply } => {
                let result = self
                    .state
                    .get(&table, pos)
                    .and_then(|data| self.codec.decode(&data));
                respond(reply, result);
            }

            Request::GetRaw { table, pos, reply } => {
                respond(reply, self.state.get(&table, pos));
            }

            Request::Del { table, pos } => {
                if !self.state.delete(&table, pos) {
                    debug!(%table, pos, "Delete ignored: no such table or slot");
                }
            }

            Request::Save { reply } => {
                let result = self.save();
                match reply {
                    Some(reply) => respond(reply, result),
                    None => {
                        if let Err(e) = result {
                            warn!(error = %e, "Autosave failed; will retry on next tick");
                        }
                    }
                }
            }

            Request::Load { reply } => {
                let result = self.load();
                match reply {
                    Some(reply) => respond(reply, result),
                    None => {
                        if let Err(e) = result {
                            warn!(error = %e, "Load failed; in-memory state unchanged");
                        }
                    }
                }
            }

            Request::Tables { reply } => respond(reply, Ok(self.state.table_names())),

            Request::Len { table, reply } => {
                let result = self
                    .state
                    .table(&table)
                    .map(|t| t.len())
                    .ok_or(StoreError::TableNotFound(table));
                respond(reply, result);
            }

            Request::Modified { reply } => respond(reply, Ok(self.state.is_modified())),

            // Handled by the loop before dispatch
            Request::Stop => {}
        }
    }

    /// Write the whole store if anything changed since the last save/load.
    /// Dirty markers are cleared only once the file is in place.
    fn save(&mut self) -> Result<SaveOutcome> {
        let Some(path) = self.path.as_deref() else {
            return Ok(SaveOutcome::NoPath);
        };

        if !self.state.is_modified() {
            return Ok(SaveOutcome::Clean);
        }

        let bytes = format::write_snapshot(path, &self.state)?;
        self.state.mark_clean();

        let tables = self.state.table_count();
        info!(path = %path.display(), tables, bytes, "Store saved");
        Ok(SaveOutcome::Written { tables, bytes })
    }

    /// Replace the state with the backing file's contents. The file is
    /// parsed completely before the swap.
    fn load(&mut self) -> Result<()> {
        let Some(path) = self.path.as_deref() else {
            debug!("Load skipped: no backing file configured");
            return Ok(());
        };

        let tables = format::read_snapshot(path)?;
        self.state = StoreState::from_tables(tables);

        info!(
            path = %path.display(),
            tables = self.state.table_count(),
            records = self.state.record_count(),
            "Store loaded"
        );
        Ok(())
    }
}

/// Send a reply. The caller may have timed out and gone away; that is not
/// an error for the actor.
fn respond<T>(reply: ReplyTx<T>, result: Result<T>) {
    if reply.send(result).is_err() {
        trace!("Reply dropped: caller no longer waiting");
    }
}
