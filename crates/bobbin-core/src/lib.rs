//! bobbin-core
//!
//! Polling worker runtime: a pool of loops that pull tasks from a
//! coordinator, run a handler, and report the result back.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（TaskId, WorkerId, TaskType, Task, TaskResult）
//! - **error**: エラー型（ClientError, HandlerError, ExecuteError, ConfigError）
//! - **ports**: 抽象化レイヤー（TaskClient, TaskHandler, MetricsSink）
//! - **app**: アプリケーションロジック（WorkerConfig, WorkerPool, WorkerLoop, TaskExecutor）
//! - **typed**: 型付き handler API（TaskInput trait, Handler trait）
//! - **impls**: 実装（InMemoryTaskClient, InMemoryMetrics など開発用）

pub mod app;
pub mod domain;
pub mod error;
pub mod impls;
pub mod ports;
pub mod typed;

#[cfg(test)]
mod testing;

pub use app::{Iteration, WorkerConfig, WorkerLoop, WorkerPool};
pub use domain::{Task, TaskId, TaskResult, TaskResultStatus, TaskType, WorkerId};
pub use error::{ClientError, ConfigError, ExecuteError, HandlerError};
pub use ports::{HandlerResult, MetricsSink, TaskClient, TaskHandler, handler_fn};
