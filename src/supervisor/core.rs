//! # SupervisorCore: the single-threaded control loop.
//!
//! The core is the sole owner and mutator of supervisor state. It waits on
//! three inputs and handles one at a time:
//!
//! ```text
//! loop {
//!   ├─► cancellation fired      → emit SupervisorStopping → teardown → exit
//!   ├─► command received        → execute, answer on its reply channel
//!   └─► child exit received     → emit ChildExited/ChildPanicked
//!         ├─► stale incarnation → ignore
//!         ├─► restart policy says no → done (maybe natural completion)
//!         ├─► intensity budget blown → SupervisorFailedIntensity → fatal
//!         └─► backoff sleep → strategy restart (stop / replace / start)
//! }
//! ```
//!
//! ## Rules
//! - The backoff sleep runs on the loop: restart decisions are serialized,
//!   and a pending shutdown interrupts the sleep.
//! - Restart history is one supervisor-wide sliding window across all
//!   children; manual restarts are not charged against it.
//! - Teardown cancels every child, then drains the exit channel until all
//!   live incarnations reported or the shutdown timeout expires. Bodies are
//!   never aborted forcibly.

use std::collections::{HashMap, HashSet, VecDeque};
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::children::record::{ChildExit, ChildRecord};
use crate::children::ChildSpec;
use crate::error::SupervisorError;
use crate::events::{Event, EventKind};
use crate::policies::{BackoffPolicy, RestartPolicy};
use crate::strategy::Strategy;
use crate::subscribers::SinkSet;

use super::handle::Shared;

pub(crate) const COMMAND_CHANNEL_CAPACITY: usize = 16;
const EXIT_CHANNEL_CAPACITY: usize = 64;

pub(crate) type Reply = oneshot::Sender<Result<(), SupervisorError>>;

/// Commands the handle submits to the control loop.
pub(crate) enum Command {
    Start { reply: Reply },
    Add { spec: ChildSpec, reply: Reply },
    Remove { name: String, reply: Reply },
    Restart { name: String, reply: Reply },
}

/// Configuration snapshot handed from the builder to the loop.
pub(crate) struct CoreParams {
    pub strategy: Strategy,
    pub max_restarts: usize,
    pub restart_window: Duration,
    pub backoff: BackoffPolicy,
    pub shutdown_timeout: Duration,
}

/// The control-loop actor. Consumed by [`run`](Self::run).
pub(crate) struct SupervisorCore {
    name: Arc<str>,
    strategy: Strategy,
    max_restarts: usize,
    restart_window: Duration,
    backoff: BackoffPolicy,
    shutdown_timeout: Duration,
    sinks: SinkSet,
    cancel: CancellationToken,
    commands: mpsc::Receiver<Command>,
    exit_tx: mpsc::Sender<ChildExit>,
    exit_rx: mpsc::Receiver<ChildExit>,
    initial: Vec<ChildSpec>,
    children: Vec<ChildRecord>,
    index: HashMap<String, u64>,
    restart_history: VecDeque<Instant>,
    shared: Arc<Shared>,
}

impl SupervisorCore {
    pub fn new(
        name: Arc<str>,
        params: CoreParams,
        sinks: SinkSet,
        cancel: CancellationToken,
        commands: mpsc::Receiver<Command>,
        initial: Vec<ChildSpec>,
        shared: Arc<Shared>,
    ) -> Self {
        let (exit_tx, exit_rx) = mpsc::channel(EXIT_CHANNEL_CAPACITY);
        Self {
            name,
            strategy: params.strategy,
            max_restarts: params.max_restarts,
            restart_window: params.restart_window,
            backoff: params.backoff,
            shutdown_timeout: params.shutdown_timeout,
            sinks,
            cancel,
            commands,
            exit_tx,
            exit_rx,
            initial,
            children: Vec::new(),
            index: HashMap::new(),
            restart_history: VecDeque::new(),
            shared,
        }
    }

    /// Runs the loop to completion, then tears down and publishes the
    /// terminal result. The completion signal flips as the very last step.
    pub async fn run(mut self) {
        debug!(supervisor = %self.name, "control loop started");
        let fatal = self.event_loop().await;
        self.teardown().await;
        debug!(
            supervisor = %self.name,
            error = fatal.as_ref().map(SupervisorError::as_label),
            "control loop finished"
        );
        self.shared.finish(match fatal {
            Some(err) => Err(err),
            None => Ok(()),
        });
    }

    async fn event_loop(&mut self) -> Option<SupervisorError> {
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    self.emit(Event::now(EventKind::SupervisorStopping)).await;
                    return None;
                }
                Some(cmd) = self.commands.recv() => {
                    self.handle_command(cmd).await;
                }
                Some(exit) = self.exit_rx.recv() => {
                    match self.handle_exit(exit).await {
                        Err(err) => {
                            warn!(supervisor = %self.name, error = err.as_label(), "supervisor failed");
                            self.shared.mark_stopped();
                            self.cancel.cancel();
                            return Some(err);
                        }
                        Ok(()) => {
                            if self.all_children_finished() {
                                debug!(supervisor = %self.name, "all children finished");
                                return None;
                            }
                        }
                    }
                }
            }
        }
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Start { reply } => {
                let _ = reply.send(self.start_initial().await);
            }
            Command::Add { spec, reply } => {
                let _ = reply.send(self.add_child(spec).await);
            }
            Command::Remove { name, reply } => {
                let _ = reply.send(self.remove_child(&name));
            }
            Command::Restart { name, reply } => {
                let _ = reply.send(self.manual_restart(&name).await);
            }
        }
    }

    /// Launches the builder-provided children sequentially. A launch failure
    /// aborts the call but keeps the untried tail, so a later `start` resumes
    /// with the children after the offending one. Once the list drains,
    /// further `start` calls are no-ops.
    async fn start_initial(&mut self) -> Result<(), SupervisorError> {
        if self.shared.is_stopped() {
            return Err(SupervisorError::Stopped);
        }
        let mut specs = std::mem::take(&mut self.initial).into_iter();
        while let Some(spec) = specs.next() {
            if let Err(err) = self.register_and_start(spec).await {
                self.initial = specs.collect();
                return Err(err);
            }
        }
        Ok(())
    }

    async fn add_child(&mut self, spec: ChildSpec) -> Result<(), SupervisorError> {
        if self.shared.is_stopped() {
            return Err(SupervisorError::Stopped);
        }
        self.register_and_start(spec).await
    }

    async fn register_and_start(&mut self, spec: ChildSpec) -> Result<(), SupervisorError> {
        let name = spec.name().to_string();
        if name.is_empty() {
            return Err(SupervisorError::StartFailed {
                name,
                reason: "child name must not be empty".to_string(),
            });
        }
        if self.index.contains_key(&name) {
            return Err(SupervisorError::ChildAlreadyExists { name });
        }

        let record = ChildRecord::new(spec, &self.cancel, self.exit_tx.clone(), 0);
        self.index.insert(name.clone(), record.id());
        self.emit(Event::now(EventKind::ChildStarted).with_child(&name))
            .await;
        record.start();
        self.children.push(record);
        debug!(supervisor = %self.name, child = %name, "child started");
        Ok(())
    }

    fn remove_child(&mut self, name: &str) -> Result<(), SupervisorError> {
        let Some(pos) = self.position(name) else {
            return Err(SupervisorError::ChildNotFound {
                name: name.to_string(),
            });
        };
        let mut record = self.children.remove(pos);
        record.stop();
        self.index.remove(name);
        debug!(supervisor = %self.name, child = name, "child removed");
        Ok(())
    }

    async fn manual_restart(&mut self, name: &str) -> Result<(), SupervisorError> {
        let Some(pos) = self.position(name) else {
            return Err(SupervisorError::ChildNotFound {
                name: name.to_string(),
            });
        };
        self.restart_slots(pos..pos + 1).await
    }

    /// Processes one child exit. A returned error is fatal for the
    /// supervisor.
    async fn handle_exit(&mut self, exit: ChildExit) -> Result<(), SupervisorError> {
        let kind = if exit.panicked {
            EventKind::ChildPanicked
        } else {
            EventKind::ChildExited
        };
        let mut event = Event::now(kind).with_child(&exit.name);
        if let Some(err) = &exit.err {
            event = event.with_error(err.to_string());
        }
        if let Some(stack) = &exit.stack_trace {
            event = event.with_stack_trace(stack.clone());
        }
        self.emit(event).await;

        // Exits from removed children or replaced incarnations carry a
        // record id that no longer matches the slot; they must not trigger
        // restart decisions.
        let Some(pos) = self.position(&exit.name) else {
            return Ok(());
        };
        if self.children[pos].id() != exit.record_id {
            return Ok(());
        }
        self.children[pos].mark_exited();

        let should_restart = match self.children[pos].spec().restart() {
            RestartPolicy::Permanent => true,
            RestartPolicy::Transient => exit.err.is_some() || exit.panicked,
            RestartPolicy::Temporary => false,
        };
        if !should_restart {
            return Ok(());
        }

        if !self.within_intensity() {
            self.emit(Event::now(EventKind::SupervisorFailedIntensity).with_child(&exit.name))
                .await;
            return Err(SupervisorError::IntensityExceeded);
        }

        let delay = self
            .backoff
            .compute_delay(self.children[pos].restart_count());
        if delay > Duration::ZERO {
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                // Shutdown interrupts the wait; the restart is abandoned and
                // the next loop iteration observes the cancellation.
                _ = self.cancel.cancelled() => return Ok(()),
            }
        }

        let span = self.strategy.restart_span(pos, self.children.len());
        self.restart_slots(span).await
    }

    /// Recycles a contiguous range of slots: stop every record, install the
    /// replacements, then emit `ChildRestarted` and start each in order.
    async fn restart_slots(&mut self, span: Range<usize>) -> Result<(), SupervisorError> {
        for idx in span.clone() {
            self.children[idx].stop();
        }
        for idx in span.clone() {
            let next = self.children[idx].replacement(&self.cancel);
            self.index.insert(next.name().to_string(), next.id());
            self.children[idx] = next;
        }
        for idx in span {
            let name = self.children[idx].name().to_string();
            self.emit(Event::now(EventKind::ChildRestarted).with_child(&name))
                .await;
            self.children[idx].start();
            debug!(
                supervisor = %self.name,
                child = %name,
                restarts = self.children[idx].restart_count(),
                "child restarted"
            );
        }
        Ok(())
    }

    /// Charges one restart against the sliding window and prunes entries
    /// older than the window. False means the budget is exhausted.
    fn within_intensity(&mut self) -> bool {
        let now = Instant::now();
        self.restart_history.push_back(now);
        if let Some(cutoff) = now.checked_sub(self.restart_window) {
            while self
                .restart_history
                .front()
                .is_some_and(|at| *at <= cutoff)
            {
                self.restart_history.pop_front();
            }
        }
        self.restart_history.len() <= self.max_restarts
    }

    /// True when every registered child has exited for good: nothing left to
    /// supervise, the loop can complete cleanly.
    fn all_children_finished(&self) -> bool {
        self.initial.is_empty()
            && !self.children.is_empty()
            && self.children.iter().all(ChildRecord::has_exited)
    }

    /// Cancels every child and waits for the stragglers, bounded by the
    /// shutdown timeout. Bodies that ignore cancellation are left behind.
    async fn teardown(&mut self) {
        for record in &mut self.children {
            if !record.is_stopped() {
                record.stop();
            }
        }
        let mut pending: HashSet<u64> = self
            .children
            .iter()
            .filter(|record| !record.has_exited())
            .map(ChildRecord::id)
            .collect();
        if pending.is_empty() {
            return;
        }

        let grace = self.shutdown_timeout;
        let exits = &mut self.exit_rx;
        let drain = async {
            while !pending.is_empty() {
                match exits.recv().await {
                    Some(exit) => {
                        pending.remove(&exit.record_id);
                    }
                    None => break,
                }
            }
        };
        if tokio::time::timeout(grace, drain).await.is_err() {
            warn!(
                supervisor = %self.name,
                lingering = pending.len(),
                "shutdown timeout expired with children still running"
            );
        }
    }

    async fn emit(&self, event: Event) {
        if self.sinks.is_empty() {
            return;
        }
        self.sinks.emit(&event).await;
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|record| record.name() == name)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tokio::time::timeout;

    use super::*;
    use crate::children::ChildFn;
    use crate::error::ChildError;
    use crate::subscribers::EventSink;
    use crate::supervisor::Supervisor;

    // -- Test infrastructure ------------------------------------------------

    /// Sink that records every event for later assertions.
    struct Collector {
        events: Mutex<Vec<Event>>,
    }

    impl Collector {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                events: Mutex::new(Vec::new()),
            })
        }

        fn kinds(&self) -> Vec<EventKind> {
            self.events.lock().unwrap().iter().map(|e| e.kind).collect()
        }

        fn find(&self, kind: EventKind) -> Option<Event> {
            self.events
                .lock()
                .unwrap()
                .iter()
                .find(|e| e.kind == kind)
                .cloned()
        }
    }

    #[async_trait]
    impl EventSink for Collector {
        async fn on_event(&self, event: &Event) {
            self.events.lock().unwrap().push(event.clone());
        }
    }

    fn counter() -> Arc<AtomicU32> {
        Arc::new(AtomicU32::new(0))
    }

    /// Child that counts its runs and then blocks until cancelled.
    fn blocker(name: &'static str, runs: Arc<AtomicU32>) -> ChildSpec {
        ChildSpec::new(
            ChildFn::arc(name, move |ctx: CancellationToken| {
                runs.fetch_add(1, AtomicOrdering::SeqCst);
                async move {
                    ctx.cancelled().await;
                    Ok::<_, ChildError>(())
                }
            }),
            RestartPolicy::Permanent,
        )
    }

    /// Child that fails its first `failures` runs, then blocks until
    /// cancelled.
    fn flaky(name: &'static str, runs: Arc<AtomicU32>, failures: u32) -> ChildSpec {
        ChildSpec::new(
            ChildFn::arc(name, move |ctx: CancellationToken| {
                let run = runs.fetch_add(1, AtomicOrdering::SeqCst) + 1;
                async move {
                    if run <= failures {
                        return Err(ChildError::failure("flaky run"));
                    }
                    ctx.cancelled().await;
                    Ok(())
                }
            }),
            RestartPolicy::Permanent,
        )
    }

    /// Child that fails every run immediately.
    fn hopeless(name: &'static str, runs: Arc<AtomicU32>) -> ChildSpec {
        ChildSpec::new(
            ChildFn::arc(name, move |_ctx: CancellationToken| {
                runs.fetch_add(1, AtomicOrdering::SeqCst);
                async move { Err::<(), _>(ChildError::failure("always fails")) }
            }),
            RestartPolicy::Permanent,
        )
    }

    fn fast_backoff() -> BackoffPolicy {
        BackoffPolicy::constant(Duration::from_millis(10))
    }

    async fn settle(ms: u64) {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }

    // -- Lifecycle ----------------------------------------------------------

    #[tokio::test]
    async fn starts_and_stops_cleanly() {
        let runs = counter();
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_name("basic")
            .with_child(blocker("worker", Arc::clone(&runs)))
            .build();

        sup.start().await.unwrap();
        settle(50).await;
        assert_eq!(runs.load(AtomicOrdering::SeqCst), 1);

        timeout(Duration::from_secs(2), sup.stop())
            .await
            .expect("stop should not hang")
            .unwrap();
        assert!(sup.is_stopped());
    }

    #[tokio::test]
    async fn stop_is_idempotent_and_wait_agrees() {
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_child(blocker("worker", counter()))
            .build();
        sup.start().await.unwrap();

        sup.stop().await.unwrap();
        sup.stop().await.unwrap();
        sup.wait().await.unwrap();
    }

    #[tokio::test]
    async fn operations_after_stop_fail_with_stopped() {
        let sup = Supervisor::builder(Strategy::OneForOne).build();
        sup.start().await.unwrap();
        sup.stop().await.unwrap();

        let err = sup.add_child(blocker("late", counter())).await.unwrap_err();
        assert!(matches!(err, SupervisorError::Stopped));
        assert!(matches!(
            sup.start().await.unwrap_err(),
            SupervisorError::Stopped
        ));
    }

    #[tokio::test]
    async fn empty_child_name_is_a_start_failure() {
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_child(blocker("", counter()))
            .build();

        let err = sup.start().await.unwrap_err();
        assert!(matches!(err, SupervisorError::StartFailed { name, .. } if name.is_empty()));
        sup.stop().await.unwrap();
    }

    #[tokio::test]
    async fn start_failure_keeps_the_untried_children() {
        let a_runs = counter();
        let b_runs = counter();
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_children([
                blocker("a", Arc::clone(&a_runs)),
                blocker("", counter()),
                blocker("b", Arc::clone(&b_runs)),
            ])
            .build();

        let err = sup.start().await.unwrap_err();
        assert!(matches!(err, SupervisorError::StartFailed { name, .. } if name.is_empty()));
        settle(20).await;

        // Children before the offending spec launched; the tail did not.
        assert_eq!(a_runs.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(b_runs.load(AtomicOrdering::SeqCst), 0);

        // The untried tail survives the failure; the next start launches it
        // without relaunching what already runs.
        sup.start().await.unwrap();
        settle(20).await;
        assert_eq!(a_runs.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(b_runs.load(AtomicOrdering::SeqCst), 1);

        sup.stop().await.unwrap();
    }

    // -- Restart policies ---------------------------------------------------

    #[tokio::test]
    async fn permanent_child_restarts_after_normal_exit() {
        let runs = counter();
        let runs_in = Arc::clone(&runs);
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_intensity(20, Duration::from_secs(1))
            .with_backoff(fast_backoff())
            .with_child(ChildSpec::new(
                ChildFn::arc("oneshot", move |_ctx: CancellationToken| {
                    runs_in.fetch_add(1, AtomicOrdering::SeqCst);
                    async { Ok::<_, ChildError>(()) }
                }),
                RestartPolicy::Permanent,
            ))
            .build();

        sup.start().await.unwrap();
        settle(200).await;
        assert!(runs.load(AtomicOrdering::SeqCst) >= 3);

        timeout(Duration::from_secs(2), sup.stop())
            .await
            .expect("stop should not hang")
            .ok();
    }

    #[tokio::test]
    async fn transient_child_is_done_after_clean_exit() {
        let runs = counter();
        let runs_in = Arc::clone(&runs);
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_child(ChildSpec::new(
                ChildFn::arc("job", move |_ctx: CancellationToken| {
                    runs_in.fetch_add(1, AtomicOrdering::SeqCst);
                    async { Ok::<_, ChildError>(()) }
                }),
                RestartPolicy::Transient,
            ))
            .build();

        sup.start().await.unwrap();
        timeout(Duration::from_secs(2), sup.wait())
            .await
            .expect("wait should return once the job is done")
            .unwrap();
        assert_eq!(runs.load(AtomicOrdering::SeqCst), 1);
    }

    #[tokio::test]
    async fn transient_child_retries_until_success() {
        let runs = counter();
        let runs_in = Arc::clone(&runs);
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_backoff(fast_backoff())
            .with_child(ChildSpec::new(
                ChildFn::arc("retrier", move |_ctx: CancellationToken| {
                    let run = runs_in.fetch_add(1, AtomicOrdering::SeqCst) + 1;
                    async move {
                        if run < 3 {
                            Err(ChildError::failure("not yet"))
                        } else {
                            Ok(())
                        }
                    }
                }),
                RestartPolicy::Transient,
            ))
            .build();

        sup.start().await.unwrap();
        timeout(Duration::from_secs(2), sup.wait())
            .await
            .expect("wait should return after the third run")
            .unwrap();
        assert_eq!(runs.load(AtomicOrdering::SeqCst), 3);
    }

    #[tokio::test]
    async fn temporary_child_never_restarts() {
        let runs = counter();
        let runs_in = Arc::clone(&runs);
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_child(ChildSpec::new(
                ChildFn::arc("once", move |_ctx: CancellationToken| {
                    runs_in.fetch_add(1, AtomicOrdering::SeqCst);
                    async { Err::<(), _>(ChildError::failure("failed once")) }
                }),
                RestartPolicy::Temporary,
            ))
            .build();

        sup.start().await.unwrap();
        timeout(Duration::from_secs(2), sup.wait())
            .await
            .expect("wait should return")
            .unwrap();
        assert_eq!(runs.load(AtomicOrdering::SeqCst), 1);
    }

    // -- Strategies ---------------------------------------------------------

    #[tokio::test]
    async fn one_for_one_leaves_healthy_children_alone() {
        let failing_runs = counter();
        let stable_runs = counter();
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_intensity(5, Duration::from_secs(1))
            .with_backoff(fast_backoff())
            .with_child(hopeless("failing", Arc::clone(&failing_runs)))
            .with_child(blocker("stable", Arc::clone(&stable_runs)))
            .build();

        sup.start().await.unwrap();
        settle(200).await;

        assert!(failing_runs.load(AtomicOrdering::SeqCst) >= 3);
        assert_eq!(stable_runs.load(AtomicOrdering::SeqCst), 1);

        // The failing child may have exhausted the budget by now; stopping
        // must still return promptly either way.
        timeout(Duration::from_secs(2), sup.stop())
            .await
            .expect("stop should not hang")
            .ok();
    }

    #[tokio::test]
    async fn one_for_all_recycles_every_child_together() {
        let flaky_runs = counter();
        let steady_runs = counter();
        let sup = Supervisor::builder(Strategy::OneForAll)
            .with_backoff(fast_backoff())
            .with_child(flaky("flaky", Arc::clone(&flaky_runs), 2))
            .with_child(blocker("steady", Arc::clone(&steady_runs)))
            .build();

        sup.start().await.unwrap();
        settle(200).await;

        assert!(flaky_runs.load(AtomicOrdering::SeqCst) >= 3);
        assert!(steady_runs.load(AtomicOrdering::SeqCst) >= 2);

        sup.stop().await.unwrap();
    }

    #[tokio::test]
    async fn rest_for_one_restarts_the_failed_child_and_later_ones() {
        let a_runs = counter();
        let b_runs = counter();
        let c_runs = counter();
        let sup = Supervisor::builder(Strategy::RestForOne)
            .with_backoff(fast_backoff())
            .with_child(blocker("a", Arc::clone(&a_runs)))
            .with_child(flaky("b", Arc::clone(&b_runs), 2))
            .with_child(blocker("c", Arc::clone(&c_runs)))
            .build();

        sup.start().await.unwrap();
        settle(200).await;

        assert_eq!(a_runs.load(AtomicOrdering::SeqCst), 1);
        assert_eq!(b_runs.load(AtomicOrdering::SeqCst), 3);
        assert_eq!(c_runs.load(AtomicOrdering::SeqCst), 3);

        sup.stop().await.unwrap();
    }

    // -- Intensity ----------------------------------------------------------

    #[tokio::test]
    async fn intensity_budget_terminates_the_supervisor() {
        let events = Collector::new();
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_intensity(3, Duration::from_millis(100))
            .with_backoff(BackoffPolicy::constant(Duration::from_millis(1)))
            .with_sink(events.clone())
            .with_child(hopeless("doomed", counter()))
            .build();

        sup.start().await.unwrap();
        let err = timeout(Duration::from_secs(2), sup.wait())
            .await
            .expect("wait should return after the budget is blown")
            .unwrap_err();
        assert!(matches!(err, SupervisorError::IntensityExceeded));

        assert!(events.find(EventKind::SupervisorFailedIntensity).is_some());
        // Repeated observations agree on the recorded error.
        assert!(matches!(
            sup.wait().await.unwrap_err(),
            SupervisorError::IntensityExceeded
        ));
        assert!(matches!(
            sup.stop().await.unwrap_err(),
            SupervisorError::IntensityExceeded
        ));
    }

    // -- Panic recovery -----------------------------------------------------

    #[tokio::test]
    async fn panicking_child_is_recovered_and_restarted() {
        let runs = counter();
        let runs_in = Arc::clone(&runs);
        let events = Collector::new();
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_backoff(fast_backoff())
            .with_sink(events.clone())
            .with_child(ChildSpec::new(
                ChildFn::arc("panicky", move |ctx: CancellationToken| {
                    let run = runs_in.fetch_add(1, AtomicOrdering::SeqCst) + 1;
                    async move {
                        if run == 1 {
                            panic!("first run explodes");
                        }
                        ctx.cancelled().await;
                        Ok::<_, ChildError>(())
                    }
                }),
                RestartPolicy::Permanent,
            ))
            .build();

        sup.start().await.unwrap();
        settle(150).await;

        assert!(runs.load(AtomicOrdering::SeqCst) >= 2);
        let panic_event = events
            .find(EventKind::ChildPanicked)
            .expect("panic event expected");
        assert_eq!(panic_event.child.as_deref(), Some("panicky"));
        assert!(panic_event.error.unwrap().contains("first run explodes"));
        assert!(!panic_event.stack_trace.unwrap().is_empty());

        sup.stop().await.unwrap();
    }

    // -- Dynamic management -------------------------------------------------

    #[tokio::test]
    async fn dynamic_add_remove_and_error_cases() {
        let sup = Supervisor::builder(Strategy::SimpleOneForOne)
            .with_name("pool")
            .build();
        sup.start().await.unwrap();

        sup.add_child(blocker("w", counter())).await.unwrap();
        let err = sup.add_child(blocker("w", counter())).await.unwrap_err();
        assert!(matches!(err, SupervisorError::ChildAlreadyExists { name } if name == "w"));

        sup.remove_child("w").await.unwrap();
        let err = sup.remove_child("x").await.unwrap_err();
        assert!(matches!(err, SupervisorError::ChildNotFound { name } if name == "x"));

        // A removed name is free for reuse.
        sup.add_child(blocker("w", counter())).await.unwrap();

        sup.stop().await.unwrap();
    }

    #[tokio::test]
    async fn removed_child_exit_does_not_resurrect_it() {
        let runs = counter();
        let events = Collector::new();
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_sink(events.clone())
            .with_child(blocker("ghost", Arc::clone(&runs)))
            .build();

        sup.start().await.unwrap();
        settle(20).await;
        sup.remove_child("ghost").await.unwrap();
        // Let the cancelled body exit and its notification reach the loop.
        settle(50).await;

        assert_eq!(runs.load(AtomicOrdering::SeqCst), 1);
        assert!(!events.kinds().contains(&EventKind::ChildRestarted));

        sup.stop().await.unwrap();
    }

    #[tokio::test]
    async fn manual_restart_replaces_the_child() {
        let runs = counter();
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_child(blocker("worker", Arc::clone(&runs)))
            .build();

        sup.start().await.unwrap();
        settle(20).await;
        sup.restart_child("worker").await.unwrap();
        settle(50).await;

        assert_eq!(runs.load(AtomicOrdering::SeqCst), 2);
        assert!(matches!(
            sup.restart_child("nobody").await.unwrap_err(),
            SupervisorError::ChildNotFound { .. }
        ));

        sup.stop().await.unwrap();
    }

    // -- Events -------------------------------------------------------------

    #[tokio::test]
    async fn events_follow_the_child_lifecycle_order() {
        let events = Collector::new();
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_backoff(fast_backoff())
            .with_sink(events.clone())
            .with_child(flaky("w", counter(), 1))
            .build();

        sup.start().await.unwrap();
        settle(150).await;
        sup.stop().await.unwrap();

        let kinds = events.kinds();
        let started = kinds
            .iter()
            .position(|k| *k == EventKind::ChildStarted)
            .expect("started event");
        let exited = kinds
            .iter()
            .position(|k| *k == EventKind::ChildExited)
            .expect("exited event");
        let restarted = kinds
            .iter()
            .position(|k| *k == EventKind::ChildRestarted)
            .expect("restarted event");
        assert!(started < exited && exited < restarted);
        assert!(kinds.contains(&EventKind::SupervisorStopping));
    }

    // -- Shutdown -----------------------------------------------------------

    #[tokio::test]
    async fn shutdown_timeout_bounds_stop_latency() {
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_shutdown_timeout(Duration::from_millis(100))
            .with_child(ChildSpec::new(
                ChildFn::arc("sluggish", |ctx: CancellationToken| async move {
                    ctx.cancelled().await;
                    tokio::time::sleep(Duration::from_secs(2)).await;
                    Ok::<_, ChildError>(())
                }),
                RestartPolicy::Permanent,
            ))
            .build();

        sup.start().await.unwrap();
        settle(20).await;

        let begun = Instant::now();
        sup.stop().await.unwrap();
        assert!(begun.elapsed() <= Duration::from_millis(500));
    }

    #[tokio::test]
    async fn zero_shutdown_timeout_reverts_to_default() {
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_shutdown_timeout(Duration::ZERO)
            .with_child(blocker("worker", counter()))
            .build();

        sup.start().await.unwrap();
        // Cooperative children wind down long before the 30s default.
        timeout(Duration::from_secs(2), sup.stop())
            .await
            .expect("stop should not hang")
            .unwrap();
    }

    #[tokio::test]
    async fn parent_token_cancellation_shuts_the_supervisor_down() {
        let parent = CancellationToken::new();
        let sup = Supervisor::builder(Strategy::OneForOne)
            .with_parent_token(parent.clone())
            .with_child(blocker("worker", counter()))
            .build();

        sup.start().await.unwrap();
        parent.cancel();
        timeout(Duration::from_secs(2), sup.wait())
            .await
            .expect("cancelling the parent must stop the supervisor")
            .unwrap();
    }

    // -- Supervision trees --------------------------------------------------

    #[tokio::test]
    async fn supervisor_runs_as_a_child_of_another_supervisor() {
        let inner_runs = counter();
        let inner = Supervisor::builder(Strategy::OneForOne)
            .with_name("inner")
            .with_child(blocker("leaf", Arc::clone(&inner_runs)))
            .build();

        let outer = Supervisor::builder(Strategy::OneForOne)
            .with_name("outer")
            .with_child(inner.into_child_spec(RestartPolicy::Permanent))
            .build();

        outer.start().await.unwrap();
        settle(100).await;
        assert_eq!(inner_runs.load(AtomicOrdering::SeqCst), 1);

        timeout(Duration::from_secs(2), outer.stop())
            .await
            .expect("tree shutdown should not hang")
            .unwrap();
    }
}
