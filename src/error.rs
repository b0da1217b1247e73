//! # Error types used by the supervisor runtime and child bodies.
//!
//! This module defines two error enums:
//!
//! - [`SupervisorError`] errors raised by the supervision runtime itself.
//! - [`ChildError`] errors raised by individual child executions.
//!
//! Both types provide an `as_label` helper for logs/metrics. Child errors
//! never cross the public API boundary: they drive restart decisions and show
//! up in the event stream, nothing else.

use thiserror::Error;

/// # Errors produced by the supervision runtime.
///
/// These represent failures of the supervisor itself, surfaced from the
/// public API (`start`, `stop`, `wait`, dynamic child management).
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum SupervisorError {
    /// Operation attempted on a supervisor that has already stopped.
    #[error("supervisor is stopped")]
    Stopped,

    /// Too many restarts occurred within the configured window; the
    /// supervisor shut itself down.
    #[error("restart intensity exceeded")]
    IntensityExceeded,

    /// No child with the given name is registered.
    #[error("child '{name}' not found")]
    ChildNotFound {
        /// The missing child name.
        name: String,
    },

    /// Attempted to add a child with a name that is already registered.
    #[error("child '{name}' already exists")]
    ChildAlreadyExists {
        /// The duplicate child name.
        name: String,
    },

    /// A child could not be launched during `start` or a restart.
    #[error("failed to start child '{name}': {reason}")]
    StartFailed {
        /// Name of the offending child.
        name: String,
        /// Why the launch was rejected.
        reason: String,
    },
}

impl SupervisorError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            SupervisorError::Stopped => "supervisor_stopped",
            SupervisorError::IntensityExceeded => "supervisor_intensity_exceeded",
            SupervisorError::ChildNotFound { .. } => "supervisor_child_not_found",
            SupervisorError::ChildAlreadyExists { .. } => "supervisor_child_already_exists",
            SupervisorError::StartFailed { .. } => "supervisor_start_failed",
        }
    }
}

/// # Errors produced by child execution.
///
/// A child body returns `Result<(), ChildError>`; panics inside the body are
/// recovered by the runtime and converted into [`ChildError::Panicked`].
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum ChildError {
    /// The child body returned an error.
    #[error("{reason}")]
    Failure {
        /// Human-readable failure description.
        reason: String,
    },

    /// The child body panicked; the payload description is preserved.
    #[error("panic: {reason}")]
    Panicked {
        /// Description of the panic payload.
        reason: String,
    },
}

impl ChildError {
    /// Creates a failure error from any displayable reason.
    pub fn failure(reason: impl Into<String>) -> Self {
        ChildError::Failure {
            reason: reason.into(),
        }
    }

    pub(crate) fn panicked(reason: impl Into<String>) -> Self {
        ChildError::Panicked {
            reason: reason.into(),
        }
    }

    /// Returns a short stable label.
    pub fn as_label(&self) -> &'static str {
        match self {
            ChildError::Failure { .. } => "child_failure",
            ChildError::Panicked { .. } => "child_panicked",
        }
    }

    /// True if this error came from a recovered panic.
    pub fn is_panic(&self) -> bool {
        matches!(self, ChildError::Panicked { .. })
    }
}

impl From<&str> for ChildError {
    fn from(reason: &str) -> Self {
        ChildError::failure(reason)
    }
}

impl From<String> for ChildError {
    fn from(reason: String) -> Self {
        ChildError::Failure { reason }
    }
}
