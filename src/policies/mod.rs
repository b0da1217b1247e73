//! Policies consulted by the supervisor when a child exits:
//!  - [`BackoffPolicy`] for restart delays;
//!  - [`RestartPolicy`] for restart decisions.
//!
//! ## Overview
//! - [`backoff`] — compute the delay before a restart from the child's restart count.
//! - [`restart`] — decide whether an exited child comes back: *permanent / transient / temporary*.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use overseer::{BackoffPolicy, RestartPolicy};
//!
//! // Delays double per restart of the same child, capped at 5s.
//! let backoff = BackoffPolicy::exponential(Duration::from_millis(100), Duration::from_secs(5));
//! assert_eq!(backoff.compute_delay(0), Duration::from_millis(100));
//! assert_eq!(backoff.compute_delay(2), Duration::from_millis(400));
//! assert_eq!(backoff.compute_delay(10), Duration::from_secs(5));
//!
//! // Transient children restart only after an abnormal exit.
//! assert!(matches!(RestartPolicy::default(), RestartPolicy::Transient));
//! ```

mod backoff;
mod restart;

pub use backoff::BackoffPolicy;
pub use restart::RestartPolicy;
