//! WorkerConfig - per-task-type settings for a set of worker loops.
//!
//! Validation happens once, when the config is built. A pool never sees an
//! invalid config, so starting workers cannot fail.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::TaskType;
use crate::error::ConfigError;
use crate::ports::TaskHandler;
use crate::typed::{Handler, TaskInput, TypedHandler};

/// Default idle sleep after an empty poll.
pub const DEFAULT_POLLING_INTERVAL: Duration = Duration::from_millis(100);

/// Settings for the loops of one task type. Immutable once built.
#[derive(Clone)]
pub struct WorkerConfig {
    task_type: TaskType,
    handler: Arc<dyn TaskHandler>,
    concurrency: usize,
    polling_interval: Duration,
}

impl WorkerConfig {
    /// Same shape as the pool's `start`: concurrency and interval in ms.
    pub fn new(
        task_type: impl Into<TaskType>,
        handler: Arc<dyn TaskHandler>,
        concurrency: usize,
        polling_interval_ms: u64,
    ) -> Result<Self, ConfigError> {
        Self::builder(task_type, handler)
            .concurrency(concurrency)
            .polling_interval(Duration::from_millis(polling_interval_ms))
            .build()
    }

    pub fn builder(
        task_type: impl Into<TaskType>,
        handler: Arc<dyn TaskHandler>,
    ) -> WorkerConfigBuilder {
        WorkerConfigBuilder {
            task_type: task_type.into(),
            handler,
            concurrency: 1,
            polling_interval: DEFAULT_POLLING_INTERVAL,
        }
    }

    /// Builder for a typed handler; the task type comes from `T::TYPE`.
    pub fn typed<T, H>(handler: H) -> WorkerConfigBuilder
    where
        T: TaskInput,
        H: Handler<T> + 'static,
    {
        Self::builder(T::TYPE, Arc::new(TypedHandler::<T, H>::new(handler)))
    }

    pub fn task_type(&self) -> &TaskType {
        &self.task_type
    }

    pub fn handler(&self) -> &dyn TaskHandler {
        self.handler.as_ref()
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    pub fn polling_interval(&self) -> Duration {
        self.polling_interval
    }
}

impl fmt::Debug for WorkerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkerConfig")
            .field("task_type", &self.task_type)
            .field("concurrency", &self.concurrency)
            .field("polling_interval", &self.polling_interval)
            .finish_non_exhaustive()
    }
}

/// Builder for [`WorkerConfig`].
///
/// # 使用例
/// ```ignore
/// let config = WorkerConfig::builder("email_send", Arc::new(SendEmail))
///     .concurrency(3)
///     .polling_interval(Duration::from_secs(1))
///     .build()?;
/// ```
pub struct WorkerConfigBuilder {
    task_type: TaskType,
    handler: Arc<dyn TaskHandler>,
    concurrency: usize,
    polling_interval: Duration,
}

impl WorkerConfigBuilder {
    /// Number of loops to run in parallel for this task type.
    pub fn concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Sleep after an empty (or failed) poll. Zero means "yield and poll again".
    pub fn polling_interval(mut self, interval: Duration) -> Self {
        self.polling_interval = interval;
        self
    }

    pub fn build(self) -> Result<WorkerConfig, ConfigError> {
        if self.task_type.is_empty() {
            return Err(ConfigError::EmptyTaskType);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency(self.task_type));
        }
        Ok(WorkerConfig {
            task_type: self.task_type,
            handler: self.handler,
            concurrency: self.concurrency,
            polling_interval: self.polling_interval,
        })
    }
}
