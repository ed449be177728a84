//! InMemoryTaskScheduler - 開発用のスケジューラ
//!
//! # 実装詳細
//! - HashMap<String, VecDeque<..>> でキュー名ごとに PostTask を保持
//! - タスクは実行しない（受け付けるだけ）。取り出しは take() で
//! - capacity を超えると Rejected

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::domain::{RequestContext, TaskName};
use crate::ports::{PostTask, SchedulerError, TaskScheduler};

/// Queue name used when the caller passes `""`.
pub const DEFAULT_QUEUE: &str = "default";

pub struct InMemoryTaskScheduler {
    queues: Mutex<HashMap<String, VecDeque<(TaskName, PostTask)>>>,
    capacity: Option<usize>,
    calls: AtomicUsize,
    available: AtomicBool,
}

impl InMemoryTaskScheduler {
    pub fn new() -> Self {
        Self {
            queues: Mutex::new(HashMap::new()),
            capacity: None,
            calls: AtomicUsize::new(0),
            available: AtomicBool::new(true),
        }
    }

    /// Each queue accepts at most `capacity` pending tasks.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: Some(capacity),
            ..Self::new()
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Snapshot of the pending tasks on `queue`, oldest first.
    pub async fn pending(&self, queue: &str) -> Vec<PostTask> {
        self.queues
            .lock()
            .await
            .get(queue_name(queue))
            .map(|q| q.iter().map(|(_, task)| task.clone()).collect())
            .unwrap_or_default()
    }

    /// Remove and return the oldest pending task on `queue`.
    pub async fn take(&self, queue: &str) -> Option<(TaskName, PostTask)> {
        self.queues
            .lock()
            .await
            .get_mut(queue_name(queue))
            .and_then(VecDeque::pop_front)
    }
}

impl Default for InMemoryTaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

fn queue_name(queue: &str) -> &str {
    if queue.is_empty() { DEFAULT_QUEUE } else { queue }
}

#[async_trait]
impl TaskScheduler for InMemoryTaskScheduler {
    async fn add(
        &self,
        _ctx: &RequestContext,
        task: PostTask,
        queue: &str,
    ) -> Result<TaskName, SchedulerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.available.load(Ordering::SeqCst) {
            return Err(SchedulerError::Unavailable(
                "in-memory scheduler marked down".to_string(),
            ));
        }

        let mut queues = self.queues.lock().await;
        let pending = queues.entry(queue_name(queue).to_string()).or_default();
        if let Some(capacity) = self.capacity
            && pending.len() >= capacity
        {
            return Err(SchedulerError::Rejected(format!(
                "queue '{}' is full ({capacity} pending)",
                queue_name(queue)
            )));
        }

        let name = TaskName::generate();
        pending.push_back((name, task));
        Ok(name)
    }
}
