//! TaskHandler port - the caller's domain logic for one task type.

use std::future::Future;

use async_trait::async_trait;

use crate::domain::{Task, TaskResult};
use crate::error::HandlerError;

/// What a handler hands back.
///
/// - `Ok(Some(result))`: reported as is.
/// - `Err(e)` carrying a result: reported as `FAILED` with `e` as the reason.
/// - `Ok(None)`, or `Err(e)` without a result: nothing is reported.
pub type HandlerResult = Result<Option<TaskResult>, HandlerError>;

/// TaskHandler executes one task.
///
/// # 使用例
/// ```ignore
/// struct SendEmail;
///
/// #[async_trait]
/// impl TaskHandler for SendEmail {
///     async fn execute(&self, task: &Task) -> HandlerResult {
///         Ok(Some(TaskResult::for_task(task).completed()))
///     }
/// }
/// ```
///
/// A panic inside `execute` is caught by the executor and reported as a
/// failure; it never takes the loop down.
#[async_trait]
pub trait TaskHandler: Send + Sync {
    async fn execute(&self, task: &Task) -> HandlerResult;
}

/// Adapter that turns an async closure into a `TaskHandler`.
///
/// The closure receives an owned copy of the task so the returned future
/// does not borrow from the loop.
pub struct FnHandler<F> {
    f: F,
}

/// Build a handler from `Fn(Task) -> impl Future<Output = HandlerResult>`.
pub fn handler_fn<F, Fut>(f: F) -> FnHandler<F>
where
    F: Fn(Task) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut> TaskHandler for FnHandler<F>
where
    F: Fn(Task) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    async fn execute(&self, task: &Task) -> HandlerResult {
        (self.f)(task.clone()).await
    }
}
