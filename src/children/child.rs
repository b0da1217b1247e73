//! # Child abstraction for supervised execution.
//!
//! Defines the core [`Child`] trait for async, cancelable child bodies.
//!
//! - **[`Child`]** — trait for implementing child bodies with cancellation support
//! - **[`ChildRef`]** — shared handle (`Arc<dyn Child>`) for passing children around
//! - **[`ChildFn`]** — function-backed implementation wrapping closures
//! - **[`BoxChildFuture`]** — type alias for boxed child futures
//!
//! ## Rules
//! - Each call to [`Child::run`] creates a **new** independent future; the
//!   supervisor calls it again on every restart of the slot.
//! - Bodies receive a [`CancellationToken`] and **must** observe it promptly,
//!   otherwise they hold up graceful shutdown until the supervisor's
//!   shutdown timeout expires.

use std::borrow::Cow;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::error::ChildError;

/// Boxed future returned by [`Child::run`].
pub type BoxChildFuture = Pin<Box<dyn Future<Output = Result<(), ChildError>> + Send + 'static>>;

/// Shared handle to a child object.
///
/// Type alias for `Arc<dyn Child>`; specs hold children through this so a
/// restart can re-run the same body without cloning user state.
pub type ChildRef = Arc<dyn Child>;

/// Asynchronous, cancelable child body.
///
/// A `Child` is a unit of long-lived work the supervisor can run, cancel and
/// re-run. Returning `Ok(())` is a normal exit; returning an error is an
/// abnormal exit; panics are recovered by the runtime and treated as abnormal
/// exits too.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use overseer::{BoxChildFuture, Child};
///
/// struct Heartbeat;
///
/// impl Child for Heartbeat {
///     fn name(&self) -> &str {
///         "heartbeat"
///     }
///
///     fn run(&self, ctx: CancellationToken) -> BoxChildFuture {
///         Box::pin(async move {
///             while !ctx.is_cancelled() {
///                 tokio::time::sleep(std::time::Duration::from_secs(1)).await;
///             }
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Child: Send + Sync + 'static {
    /// Returns the child's stable name, unique within one supervisor.
    fn name(&self) -> &str;

    /// Creates a fresh future that runs the body until completion or
    /// cancellation.
    ///
    /// The returned future must check `ctx.is_cancelled()` (or await
    /// `ctx.cancelled()`) and exit promptly when asked; the supervisor never
    /// aborts a body forcibly.
    fn run(&self, ctx: CancellationToken) -> BoxChildFuture;
}

/// Function-backed child implementation.
///
/// Wraps a closure that *creates* a new future per run, so restarts never
/// share mutable state. If shared state is needed, move an `Arc` into the
/// closure explicitly.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use overseer::{ChildError, ChildFn, ChildRef};
///
/// let worker: ChildRef = ChildFn::arc("worker", |ctx: CancellationToken| async move {
///     ctx.cancelled().await;
///     Ok::<_, ChildError>(())
/// });
/// assert_eq!(worker.name(), "worker");
/// ```
pub struct ChildFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> ChildFn<F> {
    /// Creates a new function-backed child.
    ///
    /// Prefer [`ChildFn::arc`] when you immediately need a [`ChildRef`].
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the child and returns it as a shared handle (`Arc<dyn Child>`).
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

impl<F, Fut> Child for ChildFn<F>
where
    F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ChildError>> + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&self, ctx: CancellationToken) -> BoxChildFuture {
        Box::pin((self.f)(ctx))
    }
}
