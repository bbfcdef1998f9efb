//! TaskExecutor - runs a handler and always comes back with something
//! well-formed.
//!
//! # フロー
//! 1. Start the clock
//! 2. Run the handler inside `catch_unwind`
//! 3. Record `task_execute_time` whatever happened
//! 4. Normalize the outcome:
//!    - result            → passed through untouched
//!    - error + result    → FAILED, reason = error message, output kept
//!    - no result         → logged, nothing to report
//!    - panic             → FAILED result built from the task

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::domain::{Task, TaskResult, WorkerId};
use crate::error::ExecuteError;
use crate::ports::{CounterName, MetricsSink, TaskHandler, TimerName};

pub struct TaskExecutor {
    metrics: Arc<dyn MetricsSink>,
    worker_id: Option<WorkerId>,
}

impl TaskExecutor {
    pub fn new(metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            metrics,
            worker_id: None,
        }
    }

    /// Stamp results synthesized after a panic with this worker's id.
    pub fn with_worker_id(mut self, worker_id: WorkerId) -> Self {
        self.worker_id = Some(worker_id);
        self
    }

    /// Execute `task` with `handler`.
    ///
    /// Returns `None` only when the handler produced no result; the caller
    /// must then skip reporting. Never panics because the handler did.
    pub async fn run(&self, handler: &dyn TaskHandler, task: &Task) -> Option<TaskResult> {
        let task_type = task.task_type();
        let started = Instant::now();

        let outcome = AssertUnwindSafe(handler.execute(task)).catch_unwind().await;

        self.metrics
            .record_duration(TimerName::TaskExecuteTime, task_type, started.elapsed());

        let outcome = match outcome {
            Ok(returned) => returned,
            Err(panic) => {
                let err = ExecuteError::Fault {
                    task_id: task.task_id().clone(),
                    message: panic_message(panic.as_ref()),
                };
                error!(task_type = %task_type, kind = err.kind(), error = %err, "Error executing task");
                self.metrics
                    .increment_counter(CounterName::TaskExecuteError, task_type);
                return Some(self.fault_result(task, &err));
            }
        };

        match outcome {
            Ok(Some(result)) => {
                debug!(
                    task_type = %task_type,
                    task_id = %task.task_id(),
                    status = ?result.status,
                    "Executed task"
                );
                Some(result)
            }
            Ok(None) => {
                self.nil_result(task, None);
                None
            }
            Err(handler_err) => match handler_err.into_parts() {
                (message, Some(mut result)) => {
                    let err = ExecuteError::Handler {
                        task_id: task.task_id().clone(),
                        message: message.clone(),
                    };
                    error!(task_type = %task_type, kind = err.kind(), error = %err, "Error executing task");
                    // FAILED wins over whatever status the handler set.
                    result.mark_failed(message);
                    self.metrics
                        .increment_counter(CounterName::TaskExecuteError, task_type);
                    Some(result)
                }
                (message, None) => {
                    self.nil_result(task, Some(message));
                    None
                }
            },
        }
    }

    fn nil_result(&self, task: &Task, handler_error: Option<String>) {
        let err = ExecuteError::NilResult {
            task_id: task.task_id().clone(),
        };
        error!(
            task_type = %task.task_type(),
            kind = err.kind(),
            handler_error = handler_error.as_deref(),
            error = %err,
            "TaskResult cannot be empty"
        );
    }

    fn fault_result(&self, task: &Task, err: &ExecuteError) -> TaskResult {
        let result = TaskResult::for_task(task).failed(err.to_string());
        match self.worker_id {
            Some(worker_id) => result.with_worker_id(worker_id),
            None => result,
        }
    }
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{TaskId, TaskResultStatus, TaskType};
    use crate::error::HandlerError;
    use crate::impls::InMemoryMetrics;
    use crate::ports::{HandlerResult, handler_fn};
    use crate::testing::count_errors;
    use rstest::rstest;
    use serde_json::json;
    use std::sync::atomic::Ordering;

    fn task() -> Task {
        Task::new(TaskType::new("email_send"), TaskId::new("t-1"))
    }

    fn executor() -> (TaskExecutor, Arc<InMemoryMetrics>) {
        let metrics = Arc::new(InMemoryMetrics::new());
        (TaskExecutor::new(metrics.clone()), metrics)
    }

    #[tokio::test]
    async fn completed_result_passes_through_unmodified() {
        let (executor, metrics) = executor();
        let expected = TaskResult::for_task(&task())
            .with_output("sent", json!(true))
            .with_log("ok")
            .completed();
        let returned = expected.clone();
        let handler = handler_fn(move |_task: Task| {
            let returned = returned.clone();
            async move { HandlerResult::Ok(Some(returned)) }
        });

        let result = executor.run(&handler, &task()).await;

        assert_eq!(result, Some(expected));
        let t = TaskType::new("email_send");
        assert_eq!(metrics.duration(TimerName::TaskExecuteTime, &t).count, 1);
        assert_eq!(metrics.counter(CounterName::TaskExecuteError, &t), 0);
    }

    #[rstest]
    #[case(TaskResultStatus::Completed)]
    #[case(TaskResultStatus::InProgress)]
    #[case(TaskResultStatus::Failed)]
    #[tokio::test]
    async fn handler_error_forces_failed(#[case] status_set_by_handler: TaskResultStatus) {
        let (executor, metrics) = executor();
        let handler = handler_fn(move |task: Task| async move {
            let mut result = TaskResult::for_task(&task).with_output("partial", json!(1));
            result.status = status_set_by_handler;
            result.reason_for_incompletion = Some("set by handler".to_string());
            HandlerResult::Err(HandlerError::new("smtp timeout").with_result(result))
        });

        let result = executor.run(&handler, &task()).await.unwrap();

        assert_eq!(result.status, TaskResultStatus::Failed);
        assert_eq!(result.reason_for_incompletion.as_deref(), Some("smtp timeout"));
        assert_eq!(result.output_data["partial"], 1);
        assert_eq!(
            metrics.counter(CounterName::TaskExecuteError, &TaskType::new("email_send")),
            1
        );
    }

    #[tokio::test]
    async fn missing_result_yields_none_and_one_error_log() {
        let (executor, metrics) = executor();
        let handler = handler_fn(|_task: Task| async move { HandlerResult::Ok(None) });
        let (_guard, errors) = count_errors();

        let result = executor.run(&handler, &task()).await;

        assert!(result.is_none());
        assert_eq!(errors.load(Ordering::SeqCst), 1);
        let t = TaskType::new("email_send");
        assert_eq!(metrics.duration(TimerName::TaskExecuteTime, &t).count, 1);
    }

    #[tokio::test]
    async fn error_without_result_yields_none() {
        let (executor, _metrics) = executor();
        let handler = handler_fn(|_task: Task| async move { HandlerResult::Err(HandlerError::new("boom")) });

        assert!(executor.run(&handler, &task()).await.is_none());
    }

    #[tokio::test]
    async fn panic_becomes_failed_result() {
        let (executor, metrics) = executor();
        let worker_id = WorkerId::generate();
        let executor = executor.with_worker_id(worker_id);
        let handler = handler_fn(|_task: Task| async move {
            if true {
                panic!("index out of bounds");
            }
            HandlerResult::Ok(None)
        });

        let result = executor.run(&handler, &task()).await.unwrap();

        assert_eq!(result.status, TaskResultStatus::Failed);
        assert_eq!(result.task_id.as_str(), "t-1");
        let reason = result.reason_for_incompletion.unwrap();
        assert!(reason.contains("index out of bounds"), "{reason}");
        assert_eq!(result.worker_id, Some(worker_id.to_string()));

        let t = TaskType::new("email_send");
        assert_eq!(metrics.counter(CounterName::TaskExecuteError, &t), 1);
        assert_eq!(metrics.duration(TimerName::TaskExecuteTime, &t).count, 1);
    }

    #[test]
    fn panic_message_reads_common_payloads() {
        let s: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(s.as_ref()), "static");
        let s: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(s.as_ref()), "owned");
        let s: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(s.as_ref()), "non-string panic payload");
    }
}
