//! # Public supervisor handle.
//!
//! [`Supervisor`] is a cheap, cloneable handle to a running control loop.
//! Lifecycle and child-management calls are forwarded to the loop over the
//! command channel and answered synchronously; `stop`/`wait` observe the
//! shared completion state.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;

use crate::children::{ChildFn, ChildSpec};
use crate::error::{ChildError, SupervisorError};
use crate::policies::RestartPolicy;
use crate::strategy::Strategy;

use super::builder::SupervisorBuilder;
use super::core::Command;

/// Completion state shared between the handle and the control loop.
///
/// The outcome watch holds `None` while the loop runs and the final result
/// forever after; doneness and the final error flip together, so observers
/// never see a finished supervisor without its error.
pub(crate) struct Shared {
    stopped: AtomicBool,
    outcome: watch::Sender<Option<Result<(), SupervisorError>>>,
}

impl Shared {
    pub fn new() -> Self {
        let (outcome, _) = watch::channel(None);
        Self {
            stopped: AtomicBool::new(false),
            outcome,
        }
    }

    /// True once the supervisor has stopped (or decided to stop fatally).
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(AtomicOrdering::SeqCst)
    }

    /// Marks the supervisor stopped without publishing an outcome yet.
    pub fn mark_stopped(&self) {
        self.stopped.store(true, AtomicOrdering::SeqCst);
    }

    /// Publishes the terminal result. Called exactly once, after teardown.
    pub fn finish(&self, result: Result<(), SupervisorError>) {
        self.mark_stopped();
        self.outcome.send_replace(Some(result));
    }

    /// Waits for the loop to terminate and returns the recorded result.
    pub async fn outcome(&self) -> Result<(), SupervisorError> {
        let mut rx = self.outcome.subscribe();
        // The sender lives in `self`, so `wait_for` cannot observe a closed
        // channel while we are borrowing it.
        rx.wait_for(|outcome| outcome.is_some())
            .await
            .map(|outcome| (*outcome).clone().unwrap_or(Ok(())))
            .unwrap_or(Ok(()))
    }
}

/// Handle to a running supervisor.
///
/// All methods are safe to call from any task; clones share the same
/// underlying supervisor.
///
/// ## Example
/// ```no_run
/// use std::time::Duration;
/// use tokio_util::sync::CancellationToken;
/// use overseer::{
///     BackoffPolicy, ChildError, ChildFn, ChildSpec, RestartPolicy, Strategy, Supervisor,
/// };
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let sup = Supervisor::builder(Strategy::OneForOne)
///         .with_name("app")
///         .with_backoff(BackoffPolicy::constant(Duration::from_millis(100)))
///         .with_child(ChildSpec::new(
///             ChildFn::arc("worker", |ctx: CancellationToken| async move {
///                 ctx.cancelled().await;
///                 Ok::<_, ChildError>(())
///             }),
///             RestartPolicy::Permanent,
///         ))
///         .build();
///
///     sup.start().await?;
///     // ... later:
///     sup.stop().await?;
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Supervisor {
    name: Arc<str>,
    commands: mpsc::Sender<Command>,
    cancel: CancellationToken,
    shared: Arc<Shared>,
}

impl Supervisor {
    /// Starts building a supervisor with the given restart strategy.
    pub fn builder(strategy: Strategy) -> SupervisorBuilder {
        SupervisorBuilder::new(strategy)
    }

    pub(crate) fn new_internal(
        name: Arc<str>,
        commands: mpsc::Sender<Command>,
        cancel: CancellationToken,
        shared: Arc<Shared>,
    ) -> Self {
        Self {
            name,
            commands,
            cancel,
            shared,
        }
    }

    /// The supervisor's informational name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Starts every initial child in insertion order.
    ///
    /// A failure to launch one child aborts the call; already-launched
    /// children keep running and the children after the offending one are
    /// retained, so calling `start` again resumes with them. Once every
    /// initial child has launched, further `start` calls are no-ops.
    pub async fn start(&self) -> Result<(), SupervisorError> {
        self.command(|reply| Command::Start { reply }).await
    }

    /// Adds a child at runtime and starts it immediately.
    pub async fn add_child(&self, spec: ChildSpec) -> Result<(), SupervisorError> {
        self.command(|reply| Command::Add { spec, reply }).await
    }

    /// Stops a child and unregisters it.
    ///
    /// The call returns once the child's cancellation fired and the slot is
    /// gone; the body itself winds down asynchronously.
    pub async fn remove_child(&self, name: &str) -> Result<(), SupervisorError> {
        let name = name.to_string();
        self.command(|reply| Command::Remove { name, reply }).await
    }

    /// Replaces a child with a fresh incarnation of the same spec.
    ///
    /// Manual restarts bump the slot's restart counter but are not charged
    /// against the intensity budget.
    pub async fn restart_child(&self, name: &str) -> Result<(), SupervisorError> {
        let name = name.to_string();
        self.command(|reply| Command::Restart { name, reply }).await
    }

    /// Requests shutdown, waits for teardown, and returns the final error.
    ///
    /// Idempotent: repeated calls return the same recorded result.
    pub async fn stop(&self) -> Result<(), SupervisorError> {
        self.cancel.cancel();
        self.shared.outcome().await
    }

    /// Blocks until the supervisor terminates and returns the final error.
    pub async fn wait(&self) -> Result<(), SupervisorError> {
        self.shared.outcome().await
    }

    /// True once the supervisor has stopped.
    pub fn is_stopped(&self) -> bool {
        self.shared.is_stopped()
    }

    /// Wraps this supervisor in a [`ChildSpec`] so it can run under a parent
    /// supervisor, forming a supervision tree.
    ///
    /// The child body starts this supervisor, forwards the parent's
    /// cancellation to [`stop`](Self::stop), and surfaces a terminal error
    /// (such as an exceeded restart budget) as a child failure the parent
    /// can react to.
    ///
    /// A stopped supervisor cannot be relaunched, so this adapter ties the
    /// subtree's lifetime to the parent's. If the parent should be able to
    /// *restart* the subtree, build a fresh supervisor inside a [`ChildFn`]
    /// body instead.
    pub fn into_child_spec(self, restart: RestartPolicy) -> ChildSpec {
        let name = self.name.to_string();
        let sup = self;
        ChildSpec::new(
            ChildFn::arc(name, move |ctx: CancellationToken| {
                let sup = sup.clone();
                async move {
                    sup.start()
                        .await
                        .map_err(|e| ChildError::failure(e.to_string()))?;
                    tokio::select! {
                        result = sup.wait() => {
                            result.map_err(|e| ChildError::failure(e.to_string()))
                        }
                        _ = ctx.cancelled() => {
                            sup.stop()
                                .await
                                .map_err(|e| ChildError::failure(e.to_string()))
                        }
                    }
                }
            }),
            restart,
        )
    }

    async fn command(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<(), SupervisorError>>) -> Command,
    ) -> Result<(), SupervisorError> {
        if self.shared.is_stopped() {
            return Err(SupervisorError::Stopped);
        }
        let (reply, response) = oneshot::channel();
        self.commands
            .send(make(reply))
            .await
            .map_err(|_| SupervisorError::Stopped)?;
        response.await.map_err(|_| SupervisorError::Stopped)?
    }
}
