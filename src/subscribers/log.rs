//! # Tracing-backed logging sink.
//!
//! [`LogWriter`] forwards every lifecycle event to the `tracing` ecosystem
//! with structured fields, so supervisors show up in whatever subscriber the
//! embedding program installs.
//!
//! ## Levels
//! - `debug`: routine lifecycle (started, exited, stopping)
//! - `warn`: restarts
//! - `error`: panics and intensity exhaustion

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::events::{Event, EventKind};

use super::EventSink;

/// Built-in sink that logs events via `tracing`.
pub struct LogWriter;

#[async_trait]
impl EventSink for LogWriter {
    async fn on_event(&self, e: &Event) {
        let child = e.child.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::ChildStarted => {
                debug!(child, "child started");
            }
            EventKind::ChildExited => {
                debug!(child, error = e.error.as_deref(), "child exited");
            }
            EventKind::ChildRestarted => {
                warn!(child, "child restarted");
            }
            EventKind::ChildPanicked => {
                error!(
                    child,
                    error = e.error.as_deref(),
                    stack = e.stack_trace.as_deref(),
                    "child panicked"
                );
            }
            EventKind::SupervisorStopping => {
                debug!("supervisor stopping");
            }
            EventKind::SupervisorFailedIntensity => {
                error!(child, "restart intensity exceeded");
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
