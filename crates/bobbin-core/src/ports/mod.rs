//! Ports - the seams between the worker loops and the outside world.
//!
//! Each trait is a capability injected into the pool. Production code
//! plugs in a real coordinator client and metrics backend; `impls` has
//! in-memory versions for development and tests.

pub mod handler;
pub mod metrics;
pub mod task_client;

pub use self::handler::{FnHandler, HandlerResult, TaskHandler, handler_fn};
pub use self::metrics::{CounterName, MetricsSink, TimerName};
pub use self::task_client::TaskClient;
