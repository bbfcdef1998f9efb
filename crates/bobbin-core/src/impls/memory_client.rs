//! InMemoryTaskClient - a coordinator stand-in for development and tests.
//!
//! # 実装詳細
//! - `HashMap<TaskType, VecDeque<Task>>`: one FIFO per task type
//! - `Mutex` for exclusion; the lock is never held across an `.await`
//! - Reported results are kept so callers can inspect them afterwards

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::domain::{Task, TaskResult, TaskType};
use crate::error::ClientError;
use crate::ports::TaskClient;

#[derive(Default)]
struct State {
    queues: HashMap<TaskType, VecDeque<Task>>,
    reported: Vec<(TaskType, TaskResult)>,
    polls: u64,
}

/// InMemoryTaskClient hands out enqueued tasks in FIFO order per task type.
///
/// Each task is handed out once, which gives the same "one poller per task
/// id" guarantee a real coordinator gives.
///
/// # 使用例
/// ```ignore
/// let client = InMemoryTaskClient::new();
/// client.enqueue(Task::new(TaskType::new("email_send"), TaskId::new("t-1")));
/// ```
#[derive(Default)]
pub struct InMemoryTaskClient {
    state: Mutex<State>,
}

impl InMemoryTaskClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, task: Task) {
        let mut state = self.lock();
        state
            .queues
            .entry(task.task_type().clone())
            .or_default()
            .push_back(task);
    }

    /// Tasks of `task_type` not handed out yet.
    pub fn pending(&self, task_type: &TaskType) -> usize {
        self.lock().queues.get(task_type).map_or(0, VecDeque::len)
    }

    /// Every result reported so far, in report order.
    pub fn reported(&self) -> Vec<TaskResult> {
        self.lock()
            .reported
            .iter()
            .map(|(_, result)| result.clone())
            .collect()
    }

    pub fn poll_count(&self) -> u64 {
        self.lock().polls
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl TaskClient for InMemoryTaskClient {
    async fn poll(&self, task_type: &TaskType) -> Result<Option<Task>, ClientError> {
        let mut state = self.lock();
        state.polls += 1;
        Ok(state
            .queues
            .get_mut(task_type)
            .and_then(VecDeque::pop_front))
    }

    async fn report(&self, task_type: &TaskType, result: &TaskResult) -> Result<(), ClientError> {
        self.lock()
            .reported
            .push((task_type.clone(), result.clone()));
        Ok(())
    }
}
