//! Environment - 1 リクエスト分の capability の束
//!
//! 4 つの capability はすべて同じ RequestContext に束縛される。
//! Clone できないので、別リクエストで使い回すことはできない。

use std::sync::Arc;

use crate::domain::RequestContext;
use crate::ports::{BlobStore, Logger, TaskQueue, Transport};

/// Environment は 1 リクエスト分の BlobStore / TaskQueue / Logger / Transport
pub struct Environment {
    context: RequestContext,
    blob_store: Arc<dyn BlobStore>,
    task_queue: Arc<dyn TaskQueue>,
    logger: Arc<dyn Logger>,
    transport: Arc<dyn Transport>,
}

impl Environment {
    pub fn new(
        context: RequestContext,
        blob_store: Arc<dyn BlobStore>,
        task_queue: Arc<dyn TaskQueue>,
        logger: Arc<dyn Logger>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            context,
            blob_store,
            task_queue,
            logger,
            transport,
        }
    }

    pub fn context(&self) -> &RequestContext {
        &self.context
    }

    pub fn blob_store(&self) -> &dyn BlobStore {
        self.blob_store.as_ref()
    }

    pub fn task_queue(&self) -> &dyn TaskQueue {
        self.task_queue.as_ref()
    }

    pub fn logger(&self) -> &dyn Logger {
        self.logger.as_ref()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }
}

impl std::fmt::Debug for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Environment")
            .field("request_id", &self.context.request_id())
            .finish_non_exhaustive()
    }
}
