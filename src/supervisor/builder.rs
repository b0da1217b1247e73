//! # Builder for constructing a supervisor.
//!
//! [`SupervisorBuilder`] collects the strategy, intensity budget, backoff
//! policy, event sinks and initial children, then spawns the control loop.
//! Initial children are registered but not launched until
//! [`Supervisor::start`] is called; dynamic adds work as soon as `build`
//! returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::children::ChildSpec;
use crate::policies::BackoffPolicy;
use crate::strategy::Strategy;
use crate::subscribers::{EventSink, SinkSet};

use super::core::{CoreParams, SupervisorCore, COMMAND_CHANNEL_CAPACITY};
use super::handle::{Shared, Supervisor};

const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

/// Builder for a [`Supervisor`].
pub struct SupervisorBuilder {
    name: String,
    strategy: Strategy,
    max_restarts: usize,
    restart_window: Duration,
    backoff: BackoffPolicy,
    shutdown_timeout: Duration,
    sinks: Vec<Arc<dyn EventSink>>,
    children: Vec<ChildSpec>,
    parent: Option<CancellationToken>,
}

impl SupervisorBuilder {
    /// Creates a builder with the given strategy and defaults:
    /// intensity 10 restarts per 60s, exponential backoff (100ms..5s),
    /// 30s shutdown timeout, no sinks, no children.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            name: "supervisor".to_string(),
            strategy,
            max_restarts: 10,
            restart_window: Duration::from_secs(60),
            backoff: BackoffPolicy::default(),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            sinks: Vec::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Sets the supervisor's name, used in logs and as the child name when
    /// nested under a parent supervisor.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the restart intensity budget: more than `max_restarts` restarts
    /// within `window` terminate the supervisor with an intensity error.
    pub fn with_intensity(mut self, max_restarts: usize, window: Duration) -> Self {
        self.max_restarts = max_restarts;
        self.restart_window = window;
        self
    }

    /// Sets the backoff policy applied before each strategy-driven restart.
    pub fn with_backoff(mut self, policy: BackoffPolicy) -> Self {
        self.backoff = policy;
        self
    }

    /// Registers an event sink. May be called repeatedly; sinks are invoked
    /// in registration order.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Sets how long teardown waits for children to wind down.
    ///
    /// A zero duration reverts to the 30s default.
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = if timeout.is_zero() {
            DEFAULT_SHUTDOWN_TIMEOUT
        } else {
            timeout
        };
        self
    }

    /// Adds one initial child. Initial children launch on `start()`, in the
    /// order they were added.
    pub fn with_child(mut self, spec: ChildSpec) -> Self {
        self.children.push(spec);
        self
    }

    /// Adds several initial children at once.
    pub fn with_children(mut self, specs: impl IntoIterator<Item = ChildSpec>) -> Self {
        self.children.extend(specs);
        self
    }

    /// Roots this supervisor's cancellation tree under `parent`: cancelling
    /// the parent token shuts the supervisor (and all its children) down.
    /// Defaults to an independent root.
    pub fn with_parent_token(mut self, parent: CancellationToken) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Spawns the control loop and returns the handle.
    ///
    /// Must be called within a tokio runtime.
    pub fn build(self) -> Supervisor {
        let cancel = match &self.parent {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let shared = Arc::new(Shared::new());
        let name: Arc<str> = self.name.into();

        let core = SupervisorCore::new(
            Arc::clone(&name),
            CoreParams {
                strategy: self.strategy,
                max_restarts: self.max_restarts,
                restart_window: self.restart_window,
                backoff: self.backoff,
                shutdown_timeout: self.shutdown_timeout,
            },
            SinkSet::new(self.sinks),
            cancel.clone(),
            commands_rx,
            self.children,
            Arc::clone(&shared),
        );
        tokio::spawn(core.run());

        Supervisor::new_internal(name, commands_tx, cancel, shared)
    }
}
