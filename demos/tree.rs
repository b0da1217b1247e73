//! # Example: tree
//!
//! Two-level supervision tree: a root supervisor owning a regular worker and
//! a nested supervisor with its own children.
//!
//! ## Flow
//! ```text
//! root (OneForOne)
//!   ├─► ChildSpec "gateway"            (Permanent worker)
//!   └─► ChildSpec "storage"            (nested supervisor, Permanent)
//!             ├─► "writer"             (Permanent worker)
//!             └─► "compactor"          (Permanent worker)
//! ```
//!
//! Stopping the root cascades: the nested supervisor observes cancellation,
//! stops its own children, and reports a clean exit upward.
//!
//! ## Run
//! ```bash
//! RUST_LOG=debug cargo run --example tree
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use overseer::{ChildError, ChildFn, ChildSpec, LogWriter, RestartPolicy, Strategy, Supervisor};

fn looper(name: &'static str, period: Duration) -> ChildSpec {
    ChildSpec::new(
        ChildFn::arc(name, move |ctx: CancellationToken| async move {
            loop {
                if ctx.is_cancelled() {
                    return Ok::<_, ChildError>(());
                }
                println!("[{name}] working");
                tokio::time::sleep(period).await;
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

    // Inner supervisor with its own children.
    let storage = Supervisor::builder(Strategy::OneForAll)
        .with_name("storage")
        .with_sink(Arc::new(LogWriter))
        .with_child(looper("writer", Duration::from_millis(600)))
        .with_child(looper("compactor", Duration::from_millis(900)))
        .build();

    // Root supervisor: one plain worker plus the nested supervisor.
    let root = Supervisor::builder(Strategy::OneForOne)
        .with_name("root")
        .with_sink(Arc::new(LogWriter))
        .with_child(looper("gateway", Duration::from_millis(400)))
        .with_child(storage.into_child_spec(RestartPolicy::Permanent))
        .build();

    root.start().await?;

    tokio::time::sleep(Duration::from_secs(3)).await;
    root.stop().await?;

    println!("[main] tree shut down");
    Ok(())
}
