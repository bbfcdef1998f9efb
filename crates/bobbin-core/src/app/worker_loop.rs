//! WorkerLoop - one poll → execute → report slot.
//!
//! # フロー
//! 1. Shutdown requested? Stop before polling
//! 2. `TaskClient::poll()` for the bound task type
//! 3. No task (or a poll error): sleep `polling_interval`, next iteration
//! 4. `TaskExecutor::run()` → `TaskResult`
//! 5. `TaskClient::report()`; a failed report is logged and dropped
//!
//! Nothing escapes an iteration: every phase recovers locally, and a panic
//! outside the handler is caught at the loop boundary as well.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error, info, trace};

use super::config::WorkerConfig;
use super::executor::{TaskExecutor, panic_message};
use crate::domain::{Task, TaskResult, WorkerId};
use crate::error::ClientError;
use crate::ports::{CounterName, MetricsSink, TaskClient, TimerName};

/// What a single iteration did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iteration {
    /// No task available; slept for the polling interval.
    Idle,
    /// Poll failed; treated like `Idle`.
    PollFailed,
    /// Task executed and its result accepted by the coordinator.
    Reported,
    /// Task executed but the report failed. The result is gone.
    ReportFailed,
    /// Handler produced no result; nothing was reported.
    Skipped,
    /// Shutdown was requested; no poll was made.
    Cancelled,
}

/// WorkerLoop drives one concurrent slot for one task type.
///
/// # 状態遷移
/// - POLLING → (no task) → POLLING, after the idle sleep
/// - POLLING → (task) → EXECUTING → REPORTING → POLLING
///
/// At most one task is in flight: the next poll only happens after the
/// current task was reported (or skipped).
pub struct WorkerLoop {
    id: WorkerId,
    config: Arc<WorkerConfig>,
    client: Arc<dyn TaskClient>,
    metrics: Arc<dyn MetricsSink>,
    executor: TaskExecutor,
    shutdown_rx: watch::Receiver<bool>,
}

impl WorkerLoop {
    pub fn new(
        config: Arc<WorkerConfig>,
        client: Arc<dyn TaskClient>,
        metrics: Arc<dyn MetricsSink>,
        shutdown_rx: watch::Receiver<bool>,
    ) -> Self {
        let id = WorkerId::generate();
        Self {
            id,
            executor: TaskExecutor::new(Arc::clone(&metrics)).with_worker_id(id),
            config,
            client,
            metrics,
            shutdown_rx,
        }
    }

    pub fn id(&self) -> WorkerId {
        self.id
    }

    /// Run iterations until shutdown is requested.
    ///
    /// Without a shutdown request this never returns.
    pub async fn run(mut self) {
        info!(task_type = %self.config.task_type(), worker_id = %self.id, "Worker loop started");

        loop {
            match AssertUnwindSafe(self.run_iteration()).catch_unwind().await {
                Ok(Iteration::Cancelled) => break,
                Ok(_) => {}
                Err(panic) => {
                    error!(
                        task_type = %self.config.task_type(),
                        worker_id = %self.id,
                        panic = %panic_message(panic.as_ref()),
                        "Worker iteration panicked"
                    );
                    self.idle().await;
                }
            }
        }

        info!(task_type = %self.config.task_type(), worker_id = %self.id, "Worker loop stopped");
    }

    /// One poll → execute → report cycle.
    pub async fn run_iteration(&mut self) -> Iteration {
        if self.shutdown_requested() {
            return Iteration::Cancelled;
        }

        let task = match self.poll().await {
            Ok(Some(task)) => task,
            Ok(None) => {
                self.idle().await;
                return Iteration::Idle;
            }
            Err(_) => {
                self.idle().await;
                return Iteration::PollFailed;
            }
        };

        let Some(result) = self.executor.run(self.config.handler(), &task).await else {
            return Iteration::Skipped;
        };

        self.report(result).await
    }

    async fn poll(&self) -> Result<Option<Task>, ClientError> {
        let task_type = self.config.task_type();
        self.metrics
            .increment_counter(CounterName::TaskPoll, task_type);

        let started = Instant::now();
        let polled = self.client.poll(task_type).await;
        self.metrics
            .record_duration(TimerName::TaskPollTime, task_type, started.elapsed());

        match &polled {
            Ok(Some(task)) => {
                debug!(task_type = %task_type, task_id = %task.task_id(), "Polled task");
            }
            Ok(None) => {
                trace!(task_type = %task_type, "No task available");
            }
            Err(e) => {
                error!(task_type = %task_type, error = %e, "Error polling for task");
                self.metrics
                    .increment_counter(CounterName::TaskPollError, task_type);
            }
        }
        polled
    }

    async fn report(&self, result: TaskResult) -> Iteration {
        let task_type = self.config.task_type();
        let started = Instant::now();

        // At-most-once: a failed report is not retried.
        match self.client.report(task_type, &result).await {
            Ok(()) => {
                self.metrics
                    .record_duration(TimerName::TaskUpdateTime, task_type, started.elapsed());
                debug!(
                    task_type = %task_type,
                    task_id = %result.task_id,
                    status = ?result.status,
                    "Updated task"
                );
                Iteration::Reported
            }
            Err(e) => {
                error!(
                    task_type = %task_type,
                    task_id = %result.task_id,
                    status = ?result.status,
                    error = %e,
                    "Error on task update"
                );
                self.metrics
                    .increment_counter(CounterName::TaskUpdateError, task_type);
                Iteration::ReportFailed
            }
        }
    }

    /// Sleep for the polling interval, or less if shutdown comes first.
    async fn idle(&mut self) {
        let interval = self.config.polling_interval();
        if interval.is_zero() {
            tokio::task::yield_now().await;
            return;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown_signal(&mut self.shutdown_rx) => {
                debug!(task_type = %self.config.task_type(), worker_id = %self.id, "Idle sleep interrupted by shutdown");
            }
        }
    }

    fn shutdown_requested(&self) -> bool {
        *self.shutdown_rx.borrow()
    }
}

/// Resolves once shutdown is requested.
///
/// If the sender is gone without ever requesting shutdown, the loops keep
/// running, so this never resolves.
async fn shutdown_signal(rx: &mut watch::Receiver<bool>) {
    let closed = rx.wait_for(|stop| *stop).await.is_err();
    if closed {
        std::future::pending::<()>().await;
    }
}
