//! # Supervisor: the control loop and its public handle.
//!
//! ## Architecture
//! ```text
//! SupervisorBuilder::build()
//!        │
//!        ├──► spawns SupervisorCore (single control-loop task)
//!        │         ├──► owns children vec + name index + restart history
//!        │         ├──► consumes commands (start/add/remove/restart)
//!        │         ├──► consumes child exits ──► restart decisions
//!        │         └──► emits events to sinks (in order, inline)
//!        │
//!        └──► returns Supervisor (cloneable handle)
//!                  ├──► sends commands, awaits replies
//!                  ├──► stop(): fires cancellation, awaits completion
//!                  └──► wait(): awaits completion, returns final error
//! ```
//!
//! ## Rules
//! - All supervisor state is mutated by the control loop only; the handle
//!   talks to it exclusively through channels.
//! - Every transition (add, remove, restart, group restart) is atomic from
//!   the outside: the loop finishes one input before taking the next.
//! - The completion signal is released exactly once, after teardown, with
//!   the final error already recorded.

mod builder;
mod core;
mod handle;

pub use builder::SupervisorBuilder;
pub use handle::Supervisor;
