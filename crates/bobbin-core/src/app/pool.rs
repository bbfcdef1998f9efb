//! WorkerPool - starts worker loops and tracks them until they stop.
//!
//! - `start_worker()` spawns `concurrency` loops for one task type
//! - `shutdown()` asks every loop to stop before its next poll
//! - `wait()` blocks until every loop started so far has stopped
//!
//! Shutdown never cancels a task in flight: a loop that is executing or
//! reporting finishes that first, then sees the flag.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::task::TaskTracker;
use tracing::{Instrument, info, info_span};

use super::config::WorkerConfig;
use super::worker_loop::WorkerLoop;
use crate::domain::{TaskType, WorkerId};
use crate::error::ConfigError;
use crate::ports::{MetricsSink, TaskClient, TaskHandler};

/// Pool handle.
///
/// Dropping the pool without calling `shutdown()` leaves the loops
/// running.
pub struct WorkerPool {
    client: Arc<dyn TaskClient>,
    metrics: Arc<dyn MetricsSink>,
    tracker: TaskTracker,
    shutdown_tx: watch::Sender<bool>,
}

impl WorkerPool {
    pub fn new(client: Arc<dyn TaskClient>, metrics: Arc<dyn MetricsSink>) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            client,
            metrics,
            tracker: TaskTracker::new(),
            shutdown_tx,
        }
    }

    /// Spawn `config.concurrency()` loops for `config.task_type()`.
    ///
    /// Each loop is tracked before it gets a chance to run, so a `wait()`
    /// issued right after this call already covers it. Must be called
    /// from within a tokio runtime.
    pub fn start_worker(&self, config: WorkerConfig) -> Vec<WorkerId> {
        let config = Arc::new(config);
        let mut ids = Vec::with_capacity(config.concurrency());

        for _ in 0..config.concurrency() {
            let worker = WorkerLoop::new(
                Arc::clone(&config),
                Arc::clone(&self.client),
                Arc::clone(&self.metrics),
                self.shutdown_tx.subscribe(),
            );
            let span = info_span!(
                "worker",
                task_type = %config.task_type(),
                worker_id = %worker.id()
            );
            ids.push(worker.id());
            self.tracker.spawn(worker.run().instrument(span));
        }

        info!(
            task_type = %config.task_type(),
            concurrency = config.concurrency(),
            polling_interval_ms = config.polling_interval().as_millis() as u64,
            "Started workers"
        );
        ids
    }

    /// Validate and start in one go.
    pub fn start(
        &self,
        task_type: impl Into<TaskType>,
        handler: Arc<dyn TaskHandler>,
        concurrency: usize,
        polling_interval_ms: u64,
    ) -> Result<Vec<WorkerId>, ConfigError> {
        let config = WorkerConfig::new(task_type, handler, concurrency, polling_interval_ms)?;
        Ok(self.start_worker(config))
    }

    /// Loops started and not yet stopped.
    pub fn active_workers(&self) -> usize {
        self.tracker.len()
    }

    /// Request shutdown for all loops. Idempotent.
    pub fn shutdown(&self) {
        if !self.shutdown_tx.send_replace(true) {
            info!(active_workers = self.active_workers(), "Shutdown requested");
        }
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Block until every loop started so far has stopped.
    ///
    /// Loops only stop after `shutdown()`, so without it this waits forever.
    /// Returns immediately if no loop was ever started.
    pub async fn wait(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }

    pub async fn shutdown_and_wait(&self) {
        self.shutdown();
        self.wait().await;
        info!("All workers stopped");
    }
}
