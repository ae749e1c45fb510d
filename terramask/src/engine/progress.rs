//! Batch progress reporting.
//!
//! The engine emits structured events through a sink abstraction and
//! does not know how they are consumed - printed, forwarded over a
//! connection, or ignored. Consumers decide presentation; the engine
//! only guarantees cadence and ordering: `Committed` values are
//! monotonic within a batch, at least one `Committed` precedes the
//! terminal `Completed`, and nothing is emitted after it.

use std::sync::Arc;

/// Events emitted during a Modify batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Tiles committed so far, including propagated descendants.
    Committed(usize),
    /// Terminal event with the batch tallies.
    Completed {
        committed: usize,
        skipped: usize,
        failed: usize,
    },
}

/// Consumer of batch progress events.
///
/// Implementations must be cheap and non-blocking; emissions happen on
/// the reporter thread while tile workers are running.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Sink that discards all events.
pub struct NoOpProgressSink;

impl ProgressSink for NoOpProgressSink {
    fn emit(&self, _event: ProgressEvent) {}
}

/// Shared progress sink handle.
pub type SharedProgressSink = Arc<dyn ProgressSink>;

/// Sink that records every event, for engine tests.
#[cfg(test)]
pub(crate) struct RecordingSink {
    pub(crate) events: std::sync::Mutex<Vec<ProgressEvent>>,
}

#[cfg(test)]
impl RecordingSink {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            events: std::sync::Mutex::new(Vec::new()),
        })
    }
}

#[cfg(test)]
impl ProgressSink for RecordingSink {
    fn emit(&self, event: ProgressEvent) {
        self.events.lock().unwrap().push(event);
    }
}
