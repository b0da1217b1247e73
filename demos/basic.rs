//! # Example: basic
//!
//! Minimal supervised setup: one permanent worker, one transient job.
//!
//! Demonstrates how to:
//! - Build a supervisor with a strategy, backoff and the built-in log sink.
//! - Declare children with different restart policies.
//! - Stop the supervisor after a while and observe graceful shutdown.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example basic
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use overseer::{
    BackoffPolicy, ChildError, ChildFn, ChildSpec, LogWriter, RestartPolicy, Strategy, Supervisor,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // 1) A worker that ticks until cancelled; restarted if it ever dies.
    let ticker = ChildSpec::new(
        ChildFn::arc("ticker", |ctx: CancellationToken| async move {
            loop {
                if ctx.is_cancelled() {
                    return Ok::<_, ChildError>(());
                }
                println!("[ticker] tick");
                tokio::time::sleep(Duration::from_millis(500)).await;
            }
        }),
        RestartPolicy::Permanent,
    );

    // 2) A flaky job: fails twice, then succeeds and stays finished.
    let attempts = Arc::new(std::sync::atomic::AtomicU32::new(0));
    let job = ChildSpec::new(
        ChildFn::arc("flaky-job", move |_ctx: CancellationToken| {
            let attempt = attempts.fetch_add(1, std::sync::atomic::Ordering::SeqCst) + 1;
            async move {
                println!("[flaky-job] attempt {attempt}");
                if attempt < 3 {
                    return Err(ChildError::failure("not this time"));
                }
                println!("[flaky-job] done");
                Ok(())
            }
        }),
        RestartPolicy::Transient,
    );

    // 3) Build and start.
    let sup = Supervisor::builder(Strategy::OneForOne)
        .with_name("basic-demo")
        .with_backoff(BackoffPolicy::exponential(
            Duration::from_millis(200),
            Duration::from_secs(2),
        ))
        .with_sink(Arc::new(LogWriter))
        .with_children([ticker, job])
        .build();

    sup.start().await?;

    // 4) Let it run, then shut down.
    tokio::time::sleep(Duration::from_secs(3)).await;
    sup.stop().await?;

    println!("[main] supervisor stopped cleanly");
    Ok(())
}
