//! Test doubles shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

use crate::domain::{Task, TaskId, TaskResult, TaskType};
use crate::error::ClientError;
use crate::ports::TaskClient;

/// One scripted answer to `poll`.
pub enum PollStep {
    Task(Task),
    Empty,
    Error,
    Panic,
}

/// What the client saw, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    PolledTask(TaskId),
    PolledEmpty,
    PollFailed,
    Reported(TaskResult),
    ReportFailed(TaskId),
}

#[derive(Default)]
struct Inner {
    script: VecDeque<PollStep>,
    report_failures: usize,
    events: Vec<ClientEvent>,
}

/// TaskClient that answers polls from a script, then returns "no task"
/// forever.
#[derive(Default)]
pub struct ScriptedClient {
    inner: Mutex<Inner>,
}

impl ScriptedClient {
    pub fn new(script: impl IntoIterator<Item = PollStep>) -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                script: script.into_iter().collect(),
                ..Inner::default()
            }),
        })
    }

    /// Fail the next `n` reports.
    pub fn fail_reports(&self, n: usize) {
        self.inner.lock().unwrap().report_failures = n;
    }

    pub fn events(&self) -> Vec<ClientEvent> {
        self.inner.lock().unwrap().events.clone()
    }

    pub fn polls(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    ClientEvent::PolledTask(_) | ClientEvent::PolledEmpty | ClientEvent::PollFailed
                )
            })
            .count()
    }

    pub fn reports(&self) -> Vec<TaskResult> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ClientEvent::Reported(result) => Some(result),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl TaskClient for ScriptedClient {
    async fn poll(&self, _task_type: &TaskType) -> Result<Option<Task>, ClientError> {
        let mut inner = self.inner.lock().unwrap();
        match inner.script.pop_front().unwrap_or(PollStep::Empty) {
            PollStep::Task(task) => {
                inner.events.push(ClientEvent::PolledTask(task.task_id().clone()));
                Ok(Some(task))
            }
            PollStep::Empty => {
                inner.events.push(ClientEvent::PolledEmpty);
                Ok(None)
            }
            PollStep::Error => {
                inner.events.push(ClientEvent::PollFailed);
                Err(ClientError::Transport("connection refused".to_string()))
            }
            PollStep::Panic => {
                drop(inner);
                panic!("client bug");
            }
        }
    }

    async fn report(&self, _task_type: &TaskType, result: &TaskResult) -> Result<(), ClientError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.report_failures > 0 {
            inner.report_failures -= 1;
            inner
                .events
                .push(ClientEvent::ReportFailed(result.task_id.clone()));
            return Err(ClientError::Transport("503 service unavailable".to_string()));
        }
        inner.events.push(ClientEvent::Reported(result.clone()));
        Ok(())
    }
}

pub fn task(task_type: &str, id: &str) -> Task {
    Task::new(TaskType::new(task_type), TaskId::new(id))
}

struct ErrorCounter(Arc<AtomicUsize>);

impl<S: Subscriber> Layer<S> for ErrorCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == Level::ERROR {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Count ERROR events on the current thread while the guard lives.
///
/// Only sees events from the calling thread, so use it from a
/// current-thread `#[tokio::test]`.
pub fn count_errors() -> (DefaultGuard, Arc<AtomicUsize>) {
    let count = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(ErrorCounter(count.clone()));
    (tracing::subscriber::set_default(subscriber), count)
}
