//! TaskClient port - the coordinator as seen from a worker loop.
//!
//! Wire protocol and authentication live behind this trait. The loop only
//! needs "give me a task of this type" and "here is the outcome".

use async_trait::async_trait;

use crate::domain::{Task, TaskResult, TaskType};
use crate::error::ClientError;

/// TaskClient claims tasks from and reports results to the coordinator.
///
/// # Contract
/// - `poll` returns `Ok(None)` when there is no work. That is not an error.
/// - Any `Err` from `poll` is a transport/protocol failure.
/// - The coordinator guarantees a task id is handed to at most one poller
///   at a time. Loops trust this and do no de-duplication of their own.
///
/// # Thread Safety
/// - `Send + Sync`: one client is shared by every loop of a pool.
#[async_trait]
pub trait TaskClient: Send + Sync {
    async fn poll(&self, task_type: &TaskType) -> Result<Option<Task>, ClientError>;

    async fn report(&self, task_type: &TaskType, result: &TaskResult) -> Result<(), ClientError>;
}
