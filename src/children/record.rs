//! # Live per-child state owned by the control loop.
//!
//! A [`ChildRecord`] pairs a [`ChildSpec`] with everything the supervisor
//! needs to manage one incarnation of that child: a cancellation token
//! derived from the supervisor's root, the slot's restart counter, and the
//! sender half of the shared exit channel.
//!
//! ## Rules
//! - `start()` spawns the body and is non-blocking; exactly one
//!   [`ChildExit`] is eventually delivered for every started record.
//! - Panics inside the body are recovered: the exit carries the panic
//!   payload description and a captured backtrace.
//! - `stop()` only fires the token; it never waits for the body. Records are
//!   identified by a process-unique id so late exits from replaced
//!   incarnations can be told apart from the current one.

use std::backtrace::Backtrace;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use futures::FutureExt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::children::ChildSpec;
use crate::error::ChildError;

/// Process-wide record id counter; ids are never reused.
static RECORD_SEQ: AtomicU64 = AtomicU64::new(0);

/// Exit notification sent by a child body when it finishes.
#[derive(Debug)]
pub(crate) struct ChildExit {
    /// Name of the child that exited.
    pub name: String,
    /// Identity of the record incarnation that produced this exit.
    pub record_id: u64,
    /// Error returned by the body, or the recovered panic.
    pub err: Option<ChildError>,
    /// True if the body panicked rather than returning.
    pub panicked: bool,
    /// Captured backtrace; present iff `panicked`.
    pub stack_trace: Option<String>,
}

/// One live incarnation of a supervised child.
pub(crate) struct ChildRecord {
    spec: ChildSpec,
    id: u64,
    cancel: CancellationToken,
    exits: mpsc::Sender<ChildExit>,
    restart_count: u32,
    stopped: bool,
    exited: bool,
}

impl ChildRecord {
    /// Creates a record whose cancellation derives from `parent`.
    pub fn new(
        spec: ChildSpec,
        parent: &CancellationToken,
        exits: mpsc::Sender<ChildExit>,
        restart_count: u32,
    ) -> Self {
        Self {
            spec,
            id: RECORD_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            cancel: parent.child_token(),
            exits,
            restart_count,
            stopped: false,
            exited: false,
        }
    }

    /// Builds the replacement record for this slot: same spec, fresh token
    /// from the supervisor root, restart counter bumped by one.
    pub fn replacement(&self, parent: &CancellationToken) -> Self {
        Self::new(
            self.spec.clone(),
            parent,
            self.exits.clone(),
            self.restart_count + 1,
        )
    }

    /// Launches the body on its own task. Non-blocking.
    ///
    /// The spawned task recovers panics and always sends exactly one
    /// [`ChildExit`] for this record.
    pub fn start(&self) {
        let fut = self.spec.child().run(self.cancel.clone());
        let exits = self.exits.clone();
        let name = self.spec.name().to_string();
        let record_id = self.id;

        tokio::spawn(async move {
            let exit = match AssertUnwindSafe(fut).catch_unwind().await {
                Ok(Ok(())) => ChildExit {
                    name,
                    record_id,
                    err: None,
                    panicked: false,
                    stack_trace: None,
                },
                Ok(Err(err)) => ChildExit {
                    name,
                    record_id,
                    err: Some(err),
                    panicked: false,
                    stack_trace: None,
                },
                Err(payload) => {
                    let reason = describe_panic(payload.as_ref());
                    ChildExit {
                        name,
                        record_id,
                        err: Some(ChildError::panicked(reason)),
                        panicked: true,
                        stack_trace: Some(Backtrace::force_capture().to_string()),
                    }
                }
            };
            // The receiver is gone only when the control loop already tore
            // down, at which point nobody cares about this exit.
            let _ = exits.send(exit).await;
        });
    }

    /// Fires the record's cancellation token. Idempotent, never waits.
    pub fn stop(&mut self) {
        self.stopped = true;
        self.cancel.cancel();
    }

    /// True iff [`stop`](Self::stop) has been called on this record.
    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Marks that this record's exit notification was consumed by the loop.
    pub fn mark_exited(&mut self) {
        self.exited = true;
    }

    /// True once the loop has observed this record's exit.
    pub fn has_exited(&self) -> bool {
        self.exited
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn spec(&self) -> &ChildSpec {
        &self.spec
    }

    pub fn restart_count(&self) -> u32 {
        self.restart_count
    }
}

/// Renders a panic payload into a human-readable message.
fn describe_panic(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
