//! # Child specification.
//!
//! [`ChildSpec`] is the immutable descriptor the supervisor keeps for every
//! slot: the body to run and the restart policy to apply when it exits. The
//! spec survives restarts unchanged; only the live record around it is
//! replaced.

use crate::children::child::ChildRef;
use crate::policies::RestartPolicy;

/// Immutable descriptor of a supervised child.
///
/// Cloning a spec is cheap (the body is behind an `Arc`); the supervisor
/// clones it on every restart to build the replacement record.
///
/// ## Example
/// ```rust
/// use tokio_util::sync::CancellationToken;
/// use overseer::{ChildError, ChildFn, ChildSpec, RestartPolicy};
///
/// let spec = ChildSpec::new(
///     ChildFn::arc("ticker", |ctx: CancellationToken| async move {
///         ctx.cancelled().await;
///         Ok::<_, ChildError>(())
///     }),
///     RestartPolicy::Permanent,
/// );
/// assert_eq!(spec.name(), "ticker");
/// ```
#[derive(Clone)]
pub struct ChildSpec {
    child: ChildRef,
    restart: RestartPolicy,
}

impl ChildSpec {
    /// Creates a spec from a child body and a restart policy.
    pub fn new(child: ChildRef, restart: RestartPolicy) -> Self {
        Self { child, restart }
    }

    /// The child's unique name (delegates to the body).
    pub fn name(&self) -> &str {
        self.child.name()
    }

    /// The body this spec runs.
    pub fn child(&self) -> &ChildRef {
        &self.child
    }

    /// When to restart the child after an exit.
    pub fn restart(&self) -> RestartPolicy {
        self.restart
    }
}

impl std::fmt::Debug for ChildSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildSpec")
            .field("name", &self.name())
            .field("restart", &self.restart)
            .finish()
    }
}
