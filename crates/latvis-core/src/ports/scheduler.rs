//! TaskScheduler port - 非同期タスクのスケジュールサービス

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{RequestContext, TaskName};

/// Form body content type carried by every `PostTask`.
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// A deferred POST as handed to the scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTask {
    pub url: url::Url,
    pub body: Bytes,
    pub content_type: &'static str,
}

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("rejected: {0}")]
    Rejected(String),

    #[error("scheduler unavailable: {0}")]
    Unavailable(String),
}

/// `queue` が空文字なら default キュー
#[async_trait]
pub trait TaskScheduler: Send + Sync {
    async fn add(
        &self,
        ctx: &RequestContext,
        task: PostTask,
        queue: &str,
    ) -> Result<TaskName, SchedulerError>;
}
