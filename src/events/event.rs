//! # Lifecycle events emitted by the supervisor.
//!
//! The [`EventKind`] enum classifies event types across two categories:
//! - **Child events**: one child's lifecycle (started, exited, restarted, panicked)
//! - **Supervisor events**: state changes of the supervisor itself
//!
//! The [`Event`] struct carries metadata such as the timestamp, child name,
//! error message and, for panics, the captured stack trace.
//!
//! ## Ordering guarantees
//! Events are dispatched synchronously from the control loop, so for one
//! child `ChildStarted` always precedes its `ChildExited`/`ChildPanicked`,
//! which precedes any `ChildRestarted` for the same slot. For group restarts
//! (`OneForAll`, `RestForOne`), `ChildRestarted` events follow the original
//! insertion order of the children.
//!
//! ## Example
//! ```rust
//! use overseer::{Event, EventKind};
//!
//! let ev = Event::now(EventKind::ChildExited)
//!     .with_child("worker")
//!     .with_error("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::ChildExited);
//! assert_eq!(ev.child.as_deref(), Some("worker"));
//! assert_eq!(ev.error.as_deref(), Some("connection refused"));
//! ```

use std::time::SystemTime;

/// Classification of supervisor lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Child lifecycle events ===
    /// A child was launched (initial start or dynamic add).
    ChildStarted,
    /// A child exited by returning from its body.
    ChildExited,
    /// A child was replaced with a fresh incarnation and relaunched.
    ChildRestarted,
    /// A child panicked; the event carries the captured stack trace.
    ChildPanicked,

    // === Supervisor events ===
    /// The supervisor began orderly shutdown.
    SupervisorStopping,
    /// The restart budget was exhausted; the supervisor terminates with
    /// an intensity error right after this event.
    SupervisorFailedIntensity,
}

/// Lifecycle event with optional metadata.
#[derive(Debug, Clone)]
pub struct Event {
    /// Wall-clock timestamp, stamped at construction.
    pub at: SystemTime,
    /// Name of the child involved, if any (`None` for supervisor-level events).
    pub child: Option<String>,
    /// The kind of event.
    pub kind: EventKind,
    /// Error message, if the event represents a failure.
    pub error: Option<String>,
    /// Captured stack trace for [`EventKind::ChildPanicked`].
    pub stack_trace: Option<String>,
}

impl Event {
    /// Creates a new event of the given kind stamped with the current time.
    pub fn now(kind: EventKind) -> Self {
        Self {
            at: SystemTime::now(),
            kind,
            child: None,
            error: None,
            stack_trace: None,
        }
    }

    /// Attaches a child name.
    pub fn with_child(mut self, name: impl Into<String>) -> Self {
        self.child = Some(name.into());
        self
    }

    /// Attaches an error message.
    pub fn with_error(mut self, msg: impl Into<String>) -> Self {
        self.error = Some(msg.into());
        self
    }

    /// Attaches a captured stack trace.
    pub fn with_stack_trace(mut self, stack: impl Into<String>) -> Self {
        self.stack_trace = Some(stack.into());
        self
    }
}
