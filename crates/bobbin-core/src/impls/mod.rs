//! Impls - in-process implementations of the ports.
//!
//! # 含まれる実装
//! - **InMemoryTaskClient**: coordinator stand-in (per-task-type FIFO)
//! - **InMemoryMetrics**: mutex-guarded counters and duration stats
//! - **NoopMetrics**: discards everything
//!
//! A real coordinator client (HTTP, gRPC, ...) lives in its own crate and
//! only has to implement `ports::TaskClient`.

pub mod memory_client;
pub mod metrics;

pub use self::memory_client::InMemoryTaskClient;
pub use self::metrics::{DurationStats, InMemoryMetrics, MetricsSnapshot, NoopMetrics};
