//! Cancellation token shared by the store's background threads.
//!
//! Cancelling drops the only sender of an internal channel, so every
//! receiver returned by [`Shutdown::done`] becomes ready at once. That lets
//! the actor and the autosave thread wait on cancellation inside a
//! `crossbeam::select!` next to their other work.

use std::sync::Arc;

use crossbeam::channel::{bounded, Receiver, Sender};
use parking_lot::Mutex;

/// Process-wide cancellation signal
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

struct Inner {
    /// Taken (and dropped) on cancel
    trigger: Mutex<Option<Sender<()>>>,
    done: Receiver<()>,
}

impl Shutdown {
    /// Create a new, not yet cancelled, token
    pub fn new() -> Self {
        let (trigger, done) = bounded(0);
        Self {
            inner: Arc::new(Inner {
                trigger: Mutex::new(Some(trigger)),
                done,
            }),
        }
    }

    /// Cancel the token. Calling this more than once has no further effect.
    pub fn cancel(&self) {
        if self.inner.trigger.lock().take().is_some() {
            tracing::debug!("Shutdown requested");
        }
    }

    /// Whether `cancel` has been called
    pub fn is_cancelled(&self) -> bool {
        self.inner.trigger.lock().is_none()
    }

    /// A receiver that never yields a value. It disconnects on cancel, and
    /// also once every clone of this token has been dropped, so a thread
    /// waiting on it must keep a clone alive.
    pub fn done(&self) -> Receiver<()> {
        self.inner.done.clone()
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Shutdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Shutdown")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}
