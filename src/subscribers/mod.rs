//! # Event sinks for the supervisor.
//!
//! This module provides the [`EventSink`] trait and the built-in
//! [`LogWriter`] implementation for handling lifecycle events.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   control loop ── emit(Event) ──► SinkSet ──► sinks in registration order
//!                                                 │
//!                                            ┌────┴──────┬─────────┐
//!                                            ▼           ▼         ▼
//!                                         LogWriter   Metrics   Custom ...
//! ```
//!
//! Dispatch is **synchronous**: each sink's `on_event` is awaited on the
//! control loop before the next sink runs and before the loop continues.
//! Slow sinks therefore stall supervision; sinks that need to do real work
//! should hand events off to their own queue. A sink must not call back into
//! the supervisor that invoked it.
//!
//! ## Implementing custom sinks
//! ```no_run
//! use async_trait::async_trait;
//! use overseer::{Event, EventKind, EventSink};
//!
//! struct FailureCounter;
//!
//! #[async_trait]
//! impl EventSink for FailureCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::ChildPanicked {
//!             // increment a counter, push to a channel, ...
//!         }
//!     }
//! }
//! ```

mod log;
mod set;
mod sink;

pub use log::LogWriter;
pub(crate) use set::SinkSet;
pub use sink::EventSink;
