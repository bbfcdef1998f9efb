//! In-process MetricsSink implementations.
//!
//! # 実装詳細
//! - std `Mutex` around a `HashMap`: the critical sections never await and
//!   are a handful of instructions, so an async mutex buys nothing
//! - A poisoned lock is recovered instead of propagated; counters stay usable
//!   even if some thread panicked while holding the lock

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::TaskType;
use crate::ports::{CounterName, MetricsSink, TimerName};

/// Aggregate of the samples recorded for one timer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DurationStats {
    pub count: u64,
    pub total_secs: f64,
    pub max_secs: f64,
}

impl DurationStats {
    fn record(&mut self, secs: f64) {
        self.count += 1;
        self.total_secs += secs;
        if secs > self.max_secs {
            self.max_secs = secs;
        }
    }

    pub fn mean_secs(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_secs / self.count as f64
        }
    }
}

/// Point-in-time copy of everything recorded, grouped by task type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub counters: BTreeMap<TaskType, BTreeMap<CounterName, u64>>,
    pub durations: BTreeMap<TaskType, BTreeMap<TimerName, DurationStats>>,
}

/// MetricsSink that keeps everything in memory.
///
/// One instance is created per pool (or shared by several) and handed to
/// every loop as `Arc<dyn MetricsSink>`.
#[derive(Default)]
pub struct InMemoryMetrics {
    counters: Mutex<HashMap<(CounterName, TaskType), u64>>,
    durations: Mutex<HashMap<(TimerName, TaskType), DurationStats>>,
}

impl InMemoryMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counter(&self, name: CounterName, task_type: &TaskType) -> u64 {
        lock(&self.counters)
            .get(&(name, task_type.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub fn duration(&self, name: TimerName, task_type: &TaskType) -> DurationStats {
        lock(&self.durations)
            .get(&(name, task_type.clone()))
            .copied()
            .unwrap_or_default()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let mut snapshot = MetricsSnapshot::default();
        for ((name, task_type), value) in lock(&self.counters).iter() {
            snapshot
                .counters
                .entry(task_type.clone())
                .or_default()
                .insert(*name, *value);
        }
        for ((name, task_type), stats) in lock(&self.durations).iter() {
            snapshot
                .durations
                .entry(task_type.clone())
                .or_default()
                .insert(*name, *stats);
        }
        snapshot
    }
}

impl MetricsSink for InMemoryMetrics {
    fn increment_counter(&self, name: CounterName, task_type: &TaskType) {
        *lock(&self.counters)
            .entry((name, task_type.clone()))
            .or_insert(0) += 1;
    }

    fn record_duration(&self, name: TimerName, task_type: &TaskType, elapsed: Duration) {
        lock(&self.durations)
            .entry((name, task_type.clone()))
            .or_default()
            .record(elapsed.as_secs_f64());
    }
}

/// MetricsSink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMetrics;

impl MetricsSink for NoopMetrics {
    fn increment_counter(&self, _name: CounterName, _task_type: &TaskType) {}

    fn record_duration(&self, _name: TimerName, _task_type: &TaskType, _elapsed: Duration) {}
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
