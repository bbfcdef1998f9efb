//! TaskResult: the record reported back to the coordinator after a task runs.
//!
//! Created by the handler (or synthesized by the executor when the handler
//! misbehaves), consumed by `TaskClient::report`, then dropped. Nothing here
//! is persisted by the worker side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Task, TaskId, WorkerId};

/// Status of a task as reported to the coordinator.
///
/// Serialized as SCREAMING_SNAKE_CASE to match the coordinator's wire names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskResultStatus {
    InProgress,
    Failed,
    FailedWithTerminalError,
    Completed,
}

impl TaskResultStatus {
    pub fn is_failure(self) -> bool {
        matches!(
            self,
            TaskResultStatus::Failed | TaskResultStatus::FailedWithTerminalError
        )
    }
}

/// A log line attached to a result. The coordinator shows these next to the task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskExecLog {
    pub log: String,
    pub task_id: TaskId,
    pub created_time: DateTime<Utc>,
}

/// Outcome of executing one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub task_id: TaskId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_instance_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_id: Option<String>,

    pub status: TaskResultStatus,

    /// Only set on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason_for_incompletion: Option<String>,

    #[serde(default)]
    pub output_data: serde_json::Map<String, serde_json::Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub logs: Vec<TaskExecLog>,

    /// Ask the coordinator to hand the task out again after this many seconds
    /// (only meaningful with `IN_PROGRESS`).
    #[serde(default)]
    pub callback_after_seconds: u64,
}

impl TaskResult {
    /// Start a result for `task`: ids copied, status `IN_PROGRESS`.
    pub fn for_task(task: &Task) -> Self {
        Self {
            task_id: task.task_id().clone(),
            workflow_instance_id: task.workflow_instance_id().map(str::to_owned),
            worker_id: None,
            status: TaskResultStatus::InProgress,
            reason_for_incompletion: None,
            output_data: serde_json::Map::new(),
            logs: Vec::new(),
            callback_after_seconds: 0,
        }
    }

    pub fn completed(mut self) -> Self {
        self.status = TaskResultStatus::Completed;
        self.reason_for_incompletion = None;
        self
    }

    pub fn failed(mut self, reason: impl Into<String>) -> Self {
        self.mark_failed(reason);
        self
    }

    /// Force `FAILED` with `reason`, whatever status was set before.
    /// Output data and logs are left as they are.
    pub fn mark_failed(&mut self, reason: impl Into<String>) {
        self.status = TaskResultStatus::Failed;
        self.reason_for_incompletion = Some(reason.into());
    }

    pub fn in_progress(mut self, callback_after_seconds: u64) -> Self {
        self.status = TaskResultStatus::InProgress;
        self.callback_after_seconds = callback_after_seconds;
        self
    }

    pub fn with_output(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.output_data.insert(key.into(), value);
        self
    }

    pub fn with_log(mut self, message: impl Into<String>) -> Self {
        self.logs.push(TaskExecLog {
            log: message.into(),
            task_id: self.task_id.clone(),
            created_time: Utc::now(),
        });
        self
    }

    pub fn with_worker_id(mut self, worker_id: WorkerId) -> Self {
        self.worker_id = Some(worker_id.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskType;
    use rstest::rstest;
    use serde_json::json;

    fn task() -> Task {
        Task::new(TaskType::new("email_send"), TaskId::new("t-1")).with_workflow_instance_id("wf-1")
    }

    #[rstest]
    #[case(TaskResultStatus::InProgress, "\"IN_PROGRESS\"")]
    #[case(TaskResultStatus::Failed, "\"FAILED\"")]
    #[case(TaskResultStatus::FailedWithTerminalError, "\"FAILED_WITH_TERMINAL_ERROR\"")]
    #[case(TaskResultStatus::Completed, "\"COMPLETED\"")]
    fn status_serializes_as_wire_name(#[case] status: TaskResultStatus, #[case] expected: &str) {
        assert_eq!(serde_json::to_string(&status).unwrap(), expected);
    }

    #[test]
    fn for_task_copies_ids() {
        let result = TaskResult::for_task(&task());
        assert_eq!(result.task_id.as_str(), "t-1");
        assert_eq!(result.workflow_instance_id.as_deref(), Some("wf-1"));
        assert_eq!(result.status, TaskResultStatus::InProgress);
    }

    #[test]
    fn mark_failed_overrides_completed_and_keeps_output() {
        let mut result = TaskResult::for_task(&task())
            .with_output("sent", json!(true))
            .completed();

        result.mark_failed("smtp timeout");

        assert_eq!(result.status, TaskResultStatus::Failed);
        assert_eq!(result.reason_for_incompletion.as_deref(), Some("smtp timeout"));
        assert_eq!(result.output_data["sent"], true);
    }

    #[test]
    fn result_json_shape() {
        let result = TaskResult::for_task(&task())
            .with_output("n", json!(1))
            .with_log("sent one mail")
            .completed();

        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["taskId"], "t-1");
        assert_eq!(v["status"], "COMPLETED");
        assert_eq!(v["outputData"]["n"], 1);
        assert_eq!(v["logs"][0]["log"], "sent one mail");
        assert_eq!(v["logs"][0]["taskId"], "t-1");
        assert!(v.get("reasonForIncompletion").is_none());
    }

    #[test]
    fn failure_statuses() {
        assert!(TaskResultStatus::Failed.is_failure());
        assert!(TaskResultStatus::FailedWithTerminalError.is_failure());
        assert!(!TaskResultStatus::Completed.is_failure());
    }
}
