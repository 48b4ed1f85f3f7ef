//! Background cleanup worker
//!
//! One named OS thread per cache runs eviction and journal rebuilds. Jobs
//! are coalesced through a bounded(1) channel: scheduling while a job is
//! already queued is a no-op, so cleanup never runs concurrently with itself
//! and the queue never grows.

use std::sync::Weak;
use std::thread::{self, JoinHandle};

use crossbeam::channel::{self, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, error};

/// Work the background thread performs on each wake-up
pub(crate) trait Cleanup: Send + Sync + 'static {
    fn cleanup(&self);
}

/// Handle to the cleanup thread
pub(crate) struct CleanupWorker {
    tx: Mutex<Option<Sender<()>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl CleanupWorker {
    /// Spawn the worker. It only holds a weak reference to its target.
    pub(crate) fn spawn<T: Cleanup>(target: Weak<T>, span: tracing::Span) -> Self {
        let (tx, rx) = channel::bounded::<()>(1);
        let spawned = thread::Builder::new()
            .name("disk-lru-cleanup".to_string())
            .spawn(move || {
                let _guard = span.enter();
                while rx.recv().is_ok() {
                    match target.upgrade() {
                        Some(target) => target.cleanup(),
                        None => break,
                    }
                }
                debug!("cleanup worker exiting");
            });

        let (tx, handle) = match spawned {
            Ok(handle) => (Some(tx), Some(handle)),
            Err(e) => {
                // Without a worker, cleanups only happen on flush() and close().
                error!("failed to spawn cleanup worker: {}", e);
                (None, None)
            }
        };
        Self {
            tx: Mutex::new(tx),
            handle: Mutex::new(handle),
        }
    }

    /// Request a cleanup pass. Returns false if one was already pending.
    pub(crate) fn schedule(&self) -> bool {
        match self.tx.lock().as_ref() {
            Some(tx) => match tx.try_send(()) {
                Ok(()) => true,
                Err(TrySendError::Full(())) => false,
                Err(TrySendError::Disconnected(())) => false,
            },
            None => false,
        }
    }

    /// Stop accepting work and wait for the thread to finish
    pub(crate) fn shutdown(&self) {
        self.tx.lock().take();
        let handle = self.handle.lock().take();
        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                return;
            }
            if handle.join().is_err() {
                error!("cleanup worker panicked");
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
