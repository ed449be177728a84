//! SchedulerTaskQueue - TaskScheduler backend 上の TaskQueue
//!
//! params を form-urlencoded の body にして PostTask を作り、backend に渡すだけ。
//! 相対パス（`/render` など）は base_url に対して解決する。

use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;
use url::Url;

use crate::domain::{CapabilityError, FormParams, RequestContext};
use crate::ports::{FORM_CONTENT_TYPE, PostTask, SchedulerError, TaskQueue, TaskScheduler};

/// SchedulerTaskQueue は 1 リクエストに束縛された TaskQueue
///
/// # 実装詳細
/// - body は `FormParams::encode()`、content-type は `FORM_CONTENT_TYPE`
/// - target が相対なら base_url に join する。base_url が無ければ `Provider`
/// - backend の `Rejected` は `SchedulingRejected`、それ以外は `Provider`
/// - 受け付けた時点で成功。タスクの実行結果はここからは見えない
pub struct SchedulerTaskQueue {
    ctx: RequestContext,
    scheduler: Arc<dyn TaskScheduler>,
    queue: String,
    base_url: Option<Url>,
}

impl SchedulerTaskQueue {
    pub fn new(
        ctx: RequestContext,
        scheduler: Arc<dyn TaskScheduler>,
        queue: impl Into<String>,
        base_url: Option<Url>,
    ) -> Self {
        Self {
            ctx,
            scheduler,
            queue: queue.into(),
            base_url,
        }
    }

    fn resolve(&self, target_url: &str) -> Result<Url, CapabilityError> {
        match Url::parse(target_url) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base
                    .join(target_url)
                    .map_err(|e| CapabilityError::provider("task_queue.resolve", e)),
                None => Err(CapabilityError::provider(
                    "task_queue.resolve",
                    format!("relative target '{target_url}' and no base_url configured"),
                )),
            },
            Err(e) => Err(CapabilityError::provider("task_queue.resolve", e)),
        }
    }
}

#[async_trait]
impl TaskQueue for SchedulerTaskQueue {
    async fn enqueue(&self, target_url: &str, params: &FormParams) -> Result<(), CapabilityError> {
        let task = PostTask {
            url: self.resolve(target_url)?,
            body: Bytes::from(params.encode()),
            content_type: FORM_CONTENT_TYPE,
        };
        let url = task.url.to_string();

        let name = self
            .ctx
            .guard(async {
                self.scheduler
                    .add(&self.ctx, task, &self.queue)
                    .await
                    .map_err(|e| match e {
                        SchedulerError::Rejected(reason) => CapabilityError::SchedulingRejected {
                            queue: self.queue.clone(),
                            url: url.clone(),
                            reason,
                        },
                        other => CapabilityError::provider("scheduler.add", other),
                    })
            })
            .await?;

        tracing::debug!(parent: self.ctx.span(), task = %name, url = %url, "task enqueued");
        Ok(())
    }
}
