//! # Core sink trait.
//!
//! `EventSink` is the extension point for plugging custom event handlers into
//! the supervisor. Sinks are registered at build time and invoked inline by
//! the control loop.
//!
//! ## Contract
//! - `on_event` is awaited on the control loop; return promptly. A sink that
//!   needs to block or do I/O should enqueue the event into its own buffer
//!   and process it elsewhere.
//! - Sinks must not call back into the supervisor that is invoking them.

use async_trait::async_trait;

use crate::events::Event;

/// Contract for lifecycle event sinks.
///
/// Called from the supervisor's control loop. Implementations should avoid
/// blocking the async runtime (prefer handing off to a channel).
#[async_trait]
pub trait EventSink: Send + Sync + 'static {
    /// Handles a single event.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
