//! Autosave lifecycle
//!
//! A background thread that asks the actor to save on every tick, and owns
//! the orderly shutdown of a persistent store:
//!
//! 1. cancellation (or the owning `Store` going away) is observed
//! 2. one last save is queued *with* a reply channel and awaited
//! 3. the wait-group handle, if any, is released
//! 4. `Stop` is sent so the actor exits after that final flush
//!
//! Ticks send saves without a reply; the actor logs their failures.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{bounded, tick, Receiver, Sender};
use crossbeam::select;
use crossbeam::sync::WaitGroup;
use tracing::{debug, info, warn};

use crate::protocol::{Request, SaveOutcome};
use crate::shutdown::Shutdown;

pub(crate) struct Autosave {
    requests: Sender<Request>,
    interval: Duration,
    /// Bound on the final save's reply wait
    timeout: Duration,
    shutdown: Shutdown,
    /// Disconnected when the owning store closes or is dropped
    detach: Receiver<()>,
    wait_group: Option<WaitGroup>,
}

impl Autosave {
    pub(crate) fn new(
        requests: Sender<Request>,
        interval: Duration,
        timeout: Duration,
        shutdown: Shutdown,
        detach: Receiver<()>,
        wait_group: Option<WaitGroup>,
    ) -> Self {
        Self {
            requests,
            interval,
            timeout,
            shutdown,
            detach,
            wait_group,
        }
    }

    /// Run the autosave loop on its own thread
    pub(crate) fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("slotstore-autosave".to_string())
            .spawn(move || self.run())
    }

    fn run(mut self) {
        let ticker = tick(self.interval);
        let cancelled = self.shutdown.done();

        debug!(interval_ms = self.interval.as_millis() as u64, "Autosave started");

        let actor_alive = loop {
            select! {
                recv(ticker) -> _ => {
                    if self.requests.send(Request::Save { reply: None }).is_err() {
                        warn!("Autosave tick: request actor is gone");
                        break false;
                    }
                }
                recv(cancelled) -> _ => {
                    debug!("Autosave observed cancellation");
                    break true;
                }
                recv(self.detach) -> _ => {
                    debug!("Autosave detached from store");
                    break true;
                }
            }
        };

        if actor_alive {
            self.final_flush();
            let _ = self.requests.send(Request::Stop);
        }

        // Release the completion tracker only after the final flush
        drop(self.wait_group.take());
        debug!("Autosave stopped");
    }

    /// Queue a save carrying a reply channel and wait for it
    fn final_flush(&self) {
        let (reply, result) = bounded(1);
        if self
            .requests
            .send(Request::Save { reply: Some(reply) })
            .is_err()
        {
            warn!("Final save skipped: request actor is gone");
            return;
        }

        match result.recv_timeout(self.timeout) {
            Ok(Ok(SaveOutcome::Written { tables, bytes })) => {
                info!(tables, bytes, "Final save written");
            }
            Ok(Ok(outcome)) => debug!(?outcome, "Final save: nothing to write"),
            Ok(Err(e)) => warn!(error = %e, "Final save failed; unsaved writes are lost"),
            Err(e) => warn!(error = %e, "Final save got no reply"),
        }
    }
}
