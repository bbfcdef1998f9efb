//! MetricsSink port - counters and timings per task type.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::TaskType;

/// Counters emitted by the worker loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterName {
    TaskPoll,
    TaskPollError,
    TaskExecuteError,
    TaskUpdateError,
}

impl CounterName {
    pub fn as_str(self) -> &'static str {
        match self {
            CounterName::TaskPoll => "task_poll",
            CounterName::TaskPollError => "task_poll_error",
            CounterName::TaskExecuteError => "task_execute_error",
            CounterName::TaskUpdateError => "task_update_error",
        }
    }
}

impl fmt::Display for CounterName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Duration samples emitted by the worker loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerName {
    TaskPollTime,
    TaskExecuteTime,
    TaskUpdateTime,
}

impl TimerName {
    pub fn as_str(self) -> &'static str {
        match self {
            TimerName::TaskPollTime => "task_poll_time",
            TimerName::TaskExecuteTime => "task_execute_time",
            TimerName::TaskUpdateTime => "task_update_time",
        }
    }
}

impl fmt::Display for TimerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// MetricsSink records telemetry from every loop of every pool that holds it.
///
/// Implementations are internally synchronized: callers never lock, and
/// concurrent increments must not be lost.
pub trait MetricsSink: Send + Sync {
    fn increment_counter(&self, name: CounterName, task_type: &TaskType);

    /// Record one sample. Backends store it in seconds.
    fn record_duration(&self, name: TimerName, task_type: &TaskType, elapsed: Duration);
}
