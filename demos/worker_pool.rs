//! # Example: worker_pool
//!
//! Dynamic pool of homogeneous workers under `SimpleOneForOne`.
//!
//! Demonstrates how to:
//! - Start an empty supervisor and add workers at runtime.
//! - Scale the pool down again with `remove_child`.
//! - Keep crashing workers alive via the restart strategy.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example worker_pool
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use overseer::{
    BackoffPolicy, ChildError, ChildFn, ChildSpec, LogWriter, RestartPolicy, Strategy, Supervisor,
};

fn worker(id: usize) -> ChildSpec {
    ChildSpec::new(
        ChildFn::arc(format!("worker-{id}"), move |ctx: CancellationToken| {
            async move {
                loop {
                    if ctx.is_cancelled() {
                        return Ok::<_, ChildError>(());
                    }
                    println!("[worker-{id}] processing");
                    tokio::time::sleep(Duration::from_millis(400)).await;

                    // Workers occasionally crash; the supervisor revives them.
                    if id == 2 {
                        return Err(ChildError::failure("worker-2 crashed"));
                    }
                }
            }
        }),
        RestartPolicy::Permanent,
    )
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let sup = Supervisor::builder(Strategy::SimpleOneForOne)
        .with_name("pool")
        .with_backoff(BackoffPolicy::constant(Duration::from_millis(300)))
        .with_intensity(20, Duration::from_secs(10))
        .with_sink(Arc::new(LogWriter))
        .build();

    sup.start().await?;

    // Scale up to three workers.
    for id in 1..=3 {
        println!("[main] adding worker-{id}");
        sup.add_child(worker(id)).await?;
        tokio::time::sleep(Duration::from_millis(200)).await;
    }

    tokio::time::sleep(Duration::from_secs(2)).await;

    // Scale back down.
    println!("[main] removing worker-1");
    sup.remove_child("worker-1").await?;

    tokio::time::sleep(Duration::from_secs(1)).await;
    sup.stop().await?;

    println!("[main] pool drained");
    Ok(())
}
