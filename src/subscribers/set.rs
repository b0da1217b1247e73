//! # SinkSet: ordered synchronous fan-out over registered sinks.
//!
//! [`SinkSet`] delivers each [`Event`] to every registered sink, awaiting
//! them one at a time in registration order on the caller's task.
//!
//! ## What it guarantees
//! - Registration-order delivery, one sink at a time.
//! - A panicking sink is isolated: the panic is caught and logged, remaining
//!   sinks still receive the event.
//!
//! ## What it does **not** guarantee
//! - Progress while a sink stalls. Dispatch is synchronous with supervision;
//!   buffering is the sink author's job.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::warn;

use crate::events::Event;

use super::EventSink;

/// Ordered collection of event sinks sharing one dispatch path.
pub(crate) struct SinkSet {
    sinks: Vec<Arc<dyn EventSink>>,
}

impl SinkSet {
    /// Creates a set from the sinks registered at build time (maybe empty).
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks }
    }

    /// Delivers one event to every sink, in registration order.
    pub async fn emit(&self, event: &Event) {
        for sink in &self.sinks {
            let fut = sink.on_event(event);
            if AssertUnwindSafe(fut).catch_unwind().await.is_err() {
                warn!(sink = sink.name(), kind = ?event.kind, "event sink panicked");
            }
        }
    }

    /// True if no sinks are registered.
    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}
