//! Lifecycle events emitted by the supervisor.
//!
//! This module holds the event **data model**; delivery lives in
//! [`subscribers`](crate::subscribers), where registered sinks receive every
//! event synchronously from the control loop, in registration order.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//!
//! ## Quick reference
//! - **Publisher**: the supervisor's control loop (sole emitter).
//! - **Consumers**: sinks registered at build time via
//!   `SupervisorBuilder::with_sink`.

mod event;

pub use event::{Event, EventKind};
