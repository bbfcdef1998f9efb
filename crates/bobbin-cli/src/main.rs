//! bobbin - runs a worker pool against an in-process coordinator.
//!
//! Seeds `--tasks` hello tasks, starts `--concurrency` loops, and stops on
//! Ctrl-C or after `--run-secs`. Prints the metrics snapshot as JSON.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clap::Parser;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use bobbin_core::app::WorkerConfig;
use bobbin_core::error::HandlerError;
use bobbin_core::impls::{InMemoryMetrics, InMemoryTaskClient};
use bobbin_core::ports::HandlerResult;
use bobbin_core::typed::{Handler, TaskInput};
use bobbin_core::{Task, TaskId, TaskResult, TaskType, WorkerPool};

/// Bobbin - polling task worker demo
#[derive(Parser, Debug)]
#[command(name = "bobbin")]
#[command(about = "Run a worker pool against an in-memory coordinator", long_about = None)]
struct Cli {
    /// Loops per task type
    #[arg(short, long, env = "BOBBIN_CONCURRENCY", default_value_t = 2)]
    concurrency: usize,

    /// Sleep after an empty poll, in milliseconds
    #[arg(long, env = "BOBBIN_POLLING_INTERVAL_MS", default_value_t = 1000)]
    polling_interval_ms: u64,

    /// Tasks to seed
    #[arg(short, long, env = "BOBBIN_TASKS", default_value_t = 10)]
    tasks: u64,

    /// Fail every n-th task (0 = never)
    #[arg(long, env = "BOBBIN_FAIL_EVERY", default_value_t = 0)]
    fail_every: u64,

    /// Stop after this many seconds
    #[arg(long, env = "BOBBIN_RUN_SECS", default_value_t = 5)]
    run_secs: u64,
}

#[derive(Debug, Deserialize)]
struct Hello {
    name: String,
}

impl TaskInput for Hello {
    const TYPE: &'static str = "hello";
}

struct HelloHandler {
    fail_every: u64,
    handled: AtomicU64,
}

#[async_trait]
impl Handler<Hello> for HelloHandler {
    async fn handle(&self, task: &Task, input: Hello) -> HandlerResult {
        let n = self.handled.fetch_add(1, Ordering::Relaxed) + 1;
        let result = TaskResult::for_task(task)
            .with_output("greeting", json!(format!("Hello, {}!", input.name)))
            .with_log(format!("handled #{n}"));

        if self.fail_every > 0 && n % self.fail_every == 0 {
            return Err(HandlerError::new(format!("intentional failure (n={n})")).with_result(result));
        }
        Ok(Some(result.completed()))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let client = Arc::new(InMemoryTaskClient::new());
    for i in 0..cli.tasks {
        let task = Task::new(TaskType::new(Hello::TYPE), TaskId::new(format!("hello-{i}")))
            .with_input(json!({ "name": format!("bobbin #{i}") }));
        client.enqueue(task);
    }
    info!(tasks = cli.tasks, "Seeded coordinator");

    let metrics = Arc::new(InMemoryMetrics::new());
    let pool = WorkerPool::new(client.clone(), metrics.clone());

    let config = WorkerConfig::typed::<Hello, _>(HelloHandler {
        fail_every: cli.fail_every,
        handled: AtomicU64::new(0),
    })
    .concurrency(cli.concurrency)
    .polling_interval(Duration::from_millis(cli.polling_interval_ms))
    .build()?;
    pool.start_worker(config);

    tokio::select! {
        res = tokio::signal::ctrl_c() => {
            if let Err(e) = res {
                warn!(error = %e, "Failed to listen for Ctrl-C");
            }
            info!("Ctrl-C received");
        }
        _ = tokio::time::sleep(Duration::from_secs(cli.run_secs)) => {
            info!(run_secs = cli.run_secs, "Run time elapsed");
        }
    }

    pool.shutdown_and_wait().await;

    info!(
        reported = client.reported().len(),
        pending = client.pending(&TaskType::new(Hello::TYPE)),
        "Done"
    );
    println!("{}", serde_json::to_string_pretty(&metrics.snapshot())?);
    Ok(())
}
