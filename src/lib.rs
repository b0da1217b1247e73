//! # overseer
//!
//! **Overseer** is an in-process fault-tolerance library modeled on
//! Erlang/OTP supervisors.
//!
//! It manages a set of long-lived async children, restarts them according to
//! declared policies, rate-limits crash loops, and propagates orderly
//! shutdown. Supervisors compose: a supervisor is itself a valid child of
//! another supervisor, yielding supervision trees.
//!
//! ## Features
//!
//! | Area           | Description                                                      | Key types / traits                    |
//! |----------------|------------------------------------------------------------------|---------------------------------------|
//! | **Children**   | Define supervised bodies as trait objects or closures.           | [`Child`], [`ChildFn`], [`ChildSpec`] |
//! | **Strategies** | Decide which children restart together.                          | [`Strategy`]                          |
//! | **Policies**   | Configure per-child restart conditions and restart delays.       | [`RestartPolicy`], [`BackoffPolicy`]  |
//! | **Intensity**  | Bound restarts per rolling window before giving up.              | [`SupervisorBuilder::with_intensity`] |
//! | **Events**     | Observe the lifecycle (logging, metrics, custom sinks).          | [`EventSink`], [`Event`], [`LogWriter`] |
//! | **Errors**     | Typed errors for the runtime and for child bodies.               | [`SupervisorError`], [`ChildError`]   |
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use overseer::{
//!     BackoffPolicy, ChildError, ChildFn, ChildSpec, LogWriter, RestartPolicy, Strategy,
//!     Supervisor,
//! };
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sup = Supervisor::builder(Strategy::OneForOne)
//!         .with_name("app")
//!         .with_intensity(10, Duration::from_secs(60))
//!         .with_backoff(BackoffPolicy::exponential(
//!             Duration::from_millis(100),
//!             Duration::from_secs(5),
//!         ))
//!         .with_sink(Arc::new(LogWriter))
//!         .with_child(ChildSpec::new(
//!             ChildFn::arc("worker", |ctx: CancellationToken| async move {
//!                 while !ctx.is_cancelled() {
//!                     // do work...
//!                     tokio::time::sleep(Duration::from_millis(250)).await;
//!                 }
//!                 Ok::<_, ChildError>(())
//!             }),
//!             RestartPolicy::Permanent,
//!         ))
//!         .build();
//!
//!     sup.start().await?;
//!     sup.wait().await?;
//!     Ok(())
//! }
//! ```
//!
//! ---

mod children;
mod error;
mod events;
mod policies;
mod strategy;
mod subscribers;
mod supervisor;

// ---- Public re-exports ----

pub use children::{BoxChildFuture, Child, ChildFn, ChildRef, ChildSpec};
pub use error::{ChildError, SupervisorError};
pub use events::{Event, EventKind};
pub use policies::{BackoffPolicy, RestartPolicy};
pub use strategy::Strategy;
pub use subscribers::{EventSink, LogWriter};
pub use supervisor::{Supervisor, SupervisorBuilder};
