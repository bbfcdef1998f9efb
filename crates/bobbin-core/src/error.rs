use thiserror::Error;

use crate::domain::{TaskId, TaskResult, TaskType};

/// Failure talking to the coordinator (poll or report).
///
/// Never fatal to a worker loop: poll errors count as "no task", report
/// errors are logged and the result is dropped.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("protocol error: {0}")]
    Protocol(String),
}

/// Error returned by a task handler.
///
/// A handler can fail after building (part of) a result. If it hands that
/// result back here, the executor reports it as `FAILED` with this error's
/// message as the reason and keeps the output. Without a result there is
/// nothing well-formed to report and the task is skipped.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    result: Option<Box<TaskResult>>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            result: None,
        }
    }

    /// Attach the partial result built before the failure.
    pub fn with_result(mut self, result: TaskResult) -> Self {
        self.result = Some(Box::new(result));
        self
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn result(&self) -> Option<&TaskResult> {
        self.result.as_deref()
    }

    pub fn into_parts(self) -> (String, Option<TaskResult>) {
        (self.message, self.result.map(|r| *r))
    }
}

/// What went wrong while executing a task. All variants are local to the
/// iteration that produced them.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// Handler returned an error next to its result.
    #[error("handler failed task {task_id}: {message}")]
    Handler { task_id: TaskId, message: String },

    /// Handler returned no result at all.
    #[error("handler returned no result for task {task_id}")]
    NilResult { task_id: TaskId },

    /// Handler panicked.
    #[error("handler panicked on task {task_id}: {message}")]
    Fault { task_id: TaskId, message: String },
}

impl ExecuteError {
    pub fn kind(&self) -> &'static str {
        match self {
            ExecuteError::Handler { .. } => "handler_error",
            ExecuteError::NilResult { .. } => "handler_nil_result",
            ExecuteError::Fault { .. } => "handler_fault",
        }
    }
}

/// Rejected worker configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("concurrency for task_type={0} must be at least 1")]
    ZeroConcurrency(TaskType),

    #[error("task_type must not be empty")]
    EmptyTaskType,
}
