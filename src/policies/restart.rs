//! # Restart policies for supervised children.
//!
//! [`RestartPolicy`] determines whether a child is restarted after it exits.
//!
//! - [`RestartPolicy::Permanent`] the child is always restarted, even after a clean exit.
//! - [`RestartPolicy::Transient`] the child is restarted only after an error or panic (default).
//! - [`RestartPolicy::Temporary`] the child runs once and is never restarted.

/// Policy controlling whether a child is restarted after it exits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestartPolicy {
    /// Always restart, including after a normal exit.
    ///
    /// Use for services that must keep running for the lifetime of the
    /// supervisor.
    Permanent,

    /// Restart only after an abnormal exit (error return or panic).
    ///
    /// Use for work that may legitimately finish but should retry on failure.
    Transient,

    /// Never restart.
    ///
    /// Use for one-off initialization or fire-and-forget work.
    Temporary,
}

impl Default for RestartPolicy {
    /// Returns [`RestartPolicy::Transient`].
    fn default() -> Self {
        RestartPolicy::Transient
    }
}
