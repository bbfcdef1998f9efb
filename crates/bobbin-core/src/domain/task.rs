use serde::{Deserialize, Serialize};
use std::fmt;

use super::TaskId;

/// Name of a kind of work. Workers are bound to exactly one task type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskType(String);

impl TaskType {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for TaskType {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TaskType {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A unit of work claimed from the coordinator.
///
/// Design:
/// - Created by the coordinator and handed to us by `TaskClient::poll`.
/// - Immutable once received. Handlers only get `&Task`.
/// - Field names follow the coordinator's JSON (camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    task_type: TaskType,
    task_id: TaskId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    workflow_instance_id: Option<String>,

    /// Handler-visible input.
    #[serde(default)]
    input_data: serde_json::Map<String, serde_json::Value>,

    #[serde(default)]
    poll_count: u32,

    #[serde(default)]
    retry_count: u32,

    #[serde(default)]
    callback_after_seconds: u64,

    /// Worker that claimed the task, as recorded by the coordinator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    worker_id: Option<String>,
}

impl Task {
    pub fn new(task_type: TaskType, task_id: TaskId) -> Self {
        Self {
            task_type,
            task_id,
            workflow_instance_id: None,
            input_data: serde_json::Map::new(),
            poll_count: 0,
            retry_count: 0,
            callback_after_seconds: 0,
            worker_id: None,
        }
    }

    /// Replace the input payload. Non-object values are stored under `"value"`.
    pub fn with_input(mut self, input: serde_json::Value) -> Self {
        self.input_data = match input {
            serde_json::Value::Object(map) => map,
            other => {
                let mut map = serde_json::Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        self
    }

    pub fn with_workflow_instance_id(mut self, id: impl Into<String>) -> Self {
        self.workflow_instance_id = Some(id.into());
        self
    }

    pub fn task_type(&self) -> &TaskType {
        &self.task_type
    }

    pub fn task_id(&self) -> &TaskId {
        &self.task_id
    }

    pub fn workflow_instance_id(&self) -> Option<&str> {
        self.workflow_instance_id.as_deref()
    }

    pub fn input_data(&self) -> &serde_json::Map<String, serde_json::Value> {
        &self.input_data
    }

    pub fn poll_count(&self) -> u32 {
        self.poll_count
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn callback_after_seconds(&self) -> u64 {
        self.callback_after_seconds
    }

    pub fn worker_id(&self) -> Option<&str> {
        self.worker_id.as_deref()
    }
}
