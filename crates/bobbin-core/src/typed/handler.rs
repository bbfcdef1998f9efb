//! Handler trait - typed handlers and their adapter to `TaskHandler`.
//!
//! # 学習ポイント
//! - ジェネリック trait (Handler<T>)
//! - Type erasure: TypedHandler<T, H> → dyn TaskHandler

use std::marker::PhantomData;

use async_trait::async_trait;

use super::task::TaskInput;
use crate::domain::{Task, TaskResult};
use crate::error::HandlerError;
use crate::ports::{HandlerResult, TaskHandler};

/// Handler receives the decoded input alongside the raw task.
///
/// The raw task is still needed to build the result (`TaskResult::for_task`).
#[async_trait]
pub trait Handler<T: TaskInput>: Send + Sync {
    async fn handle(&self, task: &Task, input: T) -> HandlerResult;
}

/// Adapts a `Handler<T>` to the object-safe `TaskHandler` port.
///
/// Input that does not decode into `T` is reported as `FAILED`: the task
/// reached us, so the coordinator gets an answer.
pub struct TypedHandler<T: TaskInput, H: Handler<T>> {
    handler: H,
    _marker: PhantomData<fn() -> T>,
}

impl<T: TaskInput, H: Handler<T>> TypedHandler<T, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            _marker: PhantomData,
        }
    }
}

#[async_trait]
impl<T: TaskInput, H: Handler<T>> TaskHandler for TypedHandler<T, H> {
    async fn execute(&self, task: &Task) -> HandlerResult {
        let raw = serde_json::Value::Object(task.input_data().clone());
        let input: T = match serde_json::from_value(raw) {
            Ok(input) => input,
            Err(e) => {
                return Err(HandlerError::new(format!("decode input for {}: {e}", T::TYPE))
                    .with_result(TaskResult::for_task(task)));
            }
        };
        self.handler.handle(task, input).await
    }
}

#[cfg(test)]
pub(crate) use self::fixtures::GreetingHandler;

#[cfg(test)]
mod fixtures {
    use async_trait::async_trait;
    use serde_json::json;

    use super::Handler;
    use crate::domain::{Task, TaskResult};
    use crate::error::HandlerError;
    use crate::ports::HandlerResult;
    use crate::typed::task::Greeting;

    pub(crate) struct GreetingHandler;

    #[async_trait]
    impl Handler<Greeting> for GreetingHandler {
        async fn handle(&self, task: &Task, input: Greeting) -> HandlerResult {
            let result = TaskResult::for_task(task)
                .with_output("greeting", json!(format!("Hello, {}!", input.name)));
            if input.fail {
                return Err(HandlerError::new("asked to fail").with_result(result));
            }
            Ok(Some(result.completed()))
        }
    }
}
