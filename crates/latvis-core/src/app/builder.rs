//! EnvironmentFactoryBuilder - 起動時に一度だけ factory を組み立てる
//!
//! # Fail-fast 設計
//! - 設定の検証と HTTP クライアントの構築は build() で行う
//! - リクエストごとの for_request() は失敗しない
//!
//! # 使用例
//! ```ignore
//! let factory = EnvironmentFactoryBuilder::new(EnvironmentConfig::load(None)?)
//!     .scheduler(Arc::new(InMemoryTaskScheduler::new()))
//!     .build()?;
//! let env = factory.for_request(&parts);
//! ```

use std::sync::Arc;

use super::factory::{PlatformEnvironmentFactory, Wiring};
use crate::config::{ConfigError, DatastoreConfig, EnvironmentConfig};
use crate::impls::{FsDatastore, HeaderContextProvider, InMemoryDatastore};
use crate::ports::{ContextProvider, Datastore, TaskScheduler};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no {0} backend configured")]
    MissingBackend(&'static str),

    #[error("failed to build http client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// EnvironmentFactoryBuilder は起動時に一度だけ factory を組み立てる
///
/// # 設計原則
/// - 設定や backend の不足は `build()` で `BuildError` にする
/// - `build()` が成功した後の `for_request` は失敗しない
///
/// # 学習ポイント
/// - datastore は設定（memory / fs）から選ぶが、明示的に渡したものが優先
/// - scheduler は必須。in-memory 以外の backend はホスト側が渡す
pub struct EnvironmentFactoryBuilder {
    config: EnvironmentConfig,
    datastore: Option<Arc<dyn Datastore>>,
    scheduler: Option<Arc<dyn TaskScheduler>>,
    context_provider: Option<Arc<dyn ContextProvider>>,
}

impl EnvironmentFactoryBuilder {
    pub fn new(config: EnvironmentConfig) -> Self {
        Self {
            config,
            datastore: None,
            scheduler: None,
            context_provider: None,
        }
    }

    /// Overrides the datastore named in the config.
    pub fn datastore(mut self, datastore: Arc<dyn Datastore>) -> Self {
        self.datastore = Some(datastore);
        self
    }

    pub fn scheduler(mut self, scheduler: Arc<dyn TaskScheduler>) -> Self {
        self.scheduler = Some(scheduler);
        self
    }

    /// Overrides the header-based provider built from the config.
    pub fn context_provider(mut self, provider: Arc<dyn ContextProvider>) -> Self {
        self.context_provider = Some(provider);
        self
    }

    pub fn build(self) -> Result<PlatformEnvironmentFactory, BuildError> {
        self.config.validate()?;

        let scheduler = self
            .scheduler
            .ok_or(BuildError::MissingBackend("task scheduler"))?;

        let datastore: Arc<dyn Datastore> = match self.datastore {
            Some(datastore) => datastore,
            None => match &self.config.datastore {
                DatastoreConfig::Memory => {
                    tracing::warn!("using in-memory datastore; blobs will not survive restart");
                    Arc::new(InMemoryDatastore::new())
                }
                DatastoreConfig::Fs { root } => Arc::new(FsDatastore::new(root.clone())),
            },
        };

        let context_provider = self.context_provider.unwrap_or_else(|| {
            Arc::new(HeaderContextProvider::new(
                self.config.request_id_header.clone(),
                self.config.identity_header.clone(),
                self.config.request_timeout(),
            ))
        });

        let client = reqwest::Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .build()?;

        let wiring = Wiring {
            blob_kind: self.config.blob_kind.clone(),
            queue_name: self.config.queue_name.clone(),
            task_base_url: self.config.task_base_url()?,
        };

        tracing::info!(
            blob_kind = %wiring.blob_kind,
            queue = %wiring.queue_name,
            "environment factory ready"
        );
        Ok(PlatformEnvironmentFactory::new(
            context_provider,
            datastore,
            scheduler,
            client,
            wiring,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::EnvironmentFactory;
    use crate::domain::{Blob, Handle};
    use crate::impls::InMemoryTaskScheduler;
    use tempfile::tempdir;

    fn request() -> http::request::Parts {
        http::Request::post("/render").body(()).unwrap().into_parts().0
    }

    #[test]
    fn build_without_scheduler_fails() {
        let result = EnvironmentFactoryBuilder::new(EnvironmentConfig::default()).build();
        assert!(matches!(
            result,
            Err(BuildError::MissingBackend("task scheduler"))
        ));
    }

    #[test]
    fn build_rejects_invalid_config() {
        let config = EnvironmentConfig {
            blob_kind: String::new(),
            ..EnvironmentConfig::default()
        };
        let result = EnvironmentFactoryBuilder::new(config)
            .scheduler(Arc::new(InMemoryTaskScheduler::new()))
            .build();
        assert!(matches!(result, Err(BuildError::Config(_))));
    }

    #[tokio::test]
    async fn fs_config_builds_disk_backed_store() {
        let dir = tempdir().unwrap();
        let config = EnvironmentConfig {
            datastore: DatastoreConfig::Fs {
                root: dir.path().to_path_buf(),
            },
            ..EnvironmentConfig::default()
        };
        let factory = EnvironmentFactoryBuilder::new(config)
            .scheduler(Arc::new(InMemoryTaskScheduler::new()))
            .build()
            .unwrap();

        let writer = factory.for_request(&request());
        writer
            .blob_store()
            .store(&Handle::new("job-42"), &Blob::new("result"))
            .await
            .unwrap();

        // a later request sees what an earlier one stored
        let reader = factory.for_request(&request());
        let blob = reader.blob_store().fetch(&Handle::new("job-42")).await.unwrap();
        assert_eq!(blob.data().as_ref(), b"result");
        assert!(dir.path().join("latvis-output").is_dir());
    }
}
