//! EnvironmentFactory - リクエストから Environment を組み立てる
//!
//! # 設計原則
//! - 純粋なワイヤリング: context の導出以外に backend を一切呼ばない
//! - 常に成功する（backend の障害は capability を呼んだ時に初めて表面化する）
//! - factory 自体は可変状態を持たない

use std::sync::Arc;
use url::Url;

use super::Environment;
use crate::domain::RequestContext;
use crate::impls::{
    DatastoreBlobStore, HeaderContextProvider, InMemoryDatastore, InMemoryTaskScheduler,
    MemoryLogger, ReqwestTransport, SchedulerTaskQueue, StaticRoutes, StaticTransport,
    TracingLogger,
};
use crate::ports::{ContextProvider, Datastore, LATVIS_OUTPUT_KIND, Logger, TaskScheduler, Transport};

/// Entry point the host calls once per inbound request.
pub trait EnvironmentFactory: Send + Sync {
    fn for_request(&self, request: &http::request::Parts) -> Environment;
}

/// Per-deployment values every Environment is wired with.
#[derive(Debug, Clone)]
pub struct Wiring {
    pub blob_kind: String,
    pub queue_name: String,
    pub task_base_url: Option<Url>,
}

impl Default for Wiring {
    fn default() -> Self {
        Self {
            blob_kind: LATVIS_OUTPUT_KIND.to_string(),
            queue_name: String::new(),
            task_base_url: None,
        }
    }
}

impl Wiring {
    fn assemble(
        &self,
        ctx: RequestContext,
        datastore: Arc<dyn Datastore>,
        scheduler: Arc<dyn TaskScheduler>,
        logger: Arc<dyn Logger>,
        transport: Arc<dyn Transport>,
    ) -> Environment {
        let blob_store = DatastoreBlobStore::new(
            ctx.clone(),
            datastore,
            logger.clone(),
            self.blob_kind.clone(),
        );
        let task_queue = SchedulerTaskQueue::new(
            ctx.clone(),
            scheduler,
            self.queue_name.clone(),
            self.task_base_url.clone(),
        );
        Environment::new(
            ctx,
            Arc::new(blob_store),
            Arc::new(task_queue),
            logger,
            transport,
        )
    }
}

/// Production wiring: tracing logger, reqwest transport, injected backends.
pub struct PlatformEnvironmentFactory {
    context_provider: Arc<dyn ContextProvider>,
    datastore: Arc<dyn Datastore>,
    scheduler: Arc<dyn TaskScheduler>,
    client: reqwest::Client,
    wiring: Wiring,
}

impl PlatformEnvironmentFactory {
    pub fn new(
        context_provider: Arc<dyn ContextProvider>,
        datastore: Arc<dyn Datastore>,
        scheduler: Arc<dyn TaskScheduler>,
        client: reqwest::Client,
        wiring: Wiring,
    ) -> Self {
        Self {
            context_provider,
            datastore,
            scheduler,
            client,
            wiring,
        }
    }
}

impl EnvironmentFactory for PlatformEnvironmentFactory {
    fn for_request(&self, request: &http::request::Parts) -> Environment {
        let ctx = self.context_provider.derive(request);
        let logger: Arc<dyn Logger> = Arc::new(TracingLogger::new(&ctx));
        let transport = Arc::new(ReqwestTransport::new(ctx.clone(), self.client.clone()));

        self.wiring.assemble(
            ctx,
            self.datastore.clone(),
            self.scheduler.clone(),
            logger,
            transport,
        )
    }
}

/// Test double: in-memory backends, a fresh `MemoryLogger` per request, canned HTTP.
pub struct InMemoryEnvironmentFactory {
    context_provider: HeaderContextProvider,
    datastore: Arc<InMemoryDatastore>,
    scheduler: Arc<InMemoryTaskScheduler>,
    routes: StaticRoutes,
    wiring: Wiring,
}

impl InMemoryEnvironmentFactory {
    pub fn new() -> Self {
        Self {
            context_provider: HeaderContextProvider::new("x-request-id", "x-latvis-user", None),
            datastore: Arc::new(InMemoryDatastore::new()),
            scheduler: Arc::new(InMemoryTaskScheduler::new()),
            routes: StaticRoutes::new(),
            wiring: Wiring::default(),
        }
    }

    pub fn with_datastore(mut self, datastore: Arc<InMemoryDatastore>) -> Self {
        self.datastore = datastore;
        self
    }

    pub fn with_scheduler(mut self, scheduler: Arc<InMemoryTaskScheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_routes(mut self, routes: StaticRoutes) -> Self {
        self.routes = routes;
        self
    }

    pub fn with_wiring(mut self, wiring: Wiring) -> Self {
        self.wiring = wiring;
        self
    }

    pub fn datastore(&self) -> &Arc<InMemoryDatastore> {
        &self.datastore
    }

    pub fn scheduler(&self) -> &Arc<InMemoryTaskScheduler> {
        &self.scheduler
    }

    /// Like `for_request`, also handing back the request's logger for inspection.
    pub fn for_request_with_logger(&self, request: &http::request::Parts) -> (Environment, MemoryLogger) {
        let ctx = self.context_provider.derive(request);
        let logger = MemoryLogger::new();
        let transport = Arc::new(StaticTransport::new(ctx.clone(), self.routes.clone()));

        let env = self.wiring.assemble(
            ctx,
            self.datastore.clone(),
            self.scheduler.clone(),
            Arc::new(logger.clone()),
            transport,
        );
        (env, logger)
    }
}

impl Default for InMemoryEnvironmentFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentFactory for InMemoryEnvironmentFactory {
    fn for_request(&self, request: &http::request::Parts) -> Environment {
        self.for_request_with_logger(request).0
    }
}
