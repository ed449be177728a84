//! InMemoryDatastore - 開発用・テスト用の Datastore
//!
//! # 実装詳細
//! - HashMap<BlobKey, Bytes> を tokio Mutex で保護
//! - 呼び出し回数を数える（for_request が backend を触らないことの検証用）
//! - set_available(false) で backend 障害を再現

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::domain::RequestContext;
use crate::ports::{BlobKey, Datastore, DatastoreError};

/// InMemoryDatastore はプロセス内 HashMap の Datastore（呼び出し回数と障害スイッチ付き）
pub struct InMemoryDatastore {
    entries: Mutex<HashMap<BlobKey, Bytes>>,
    calls: AtomicUsize,
    available: AtomicBool,
}

impl InMemoryDatastore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            available: AtomicBool::new(true),
        }
    }

    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of put/get calls received so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    fn begin_call(&self) -> Result<(), DatastoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(DatastoreError::Unavailable("in-memory datastore marked down".to_string()))
        }
    }
}

impl Default for InMemoryDatastore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Datastore for InMemoryDatastore {
    async fn put(
        &self,
        _ctx: &RequestContext,
        key: &BlobKey,
        value: Bytes,
    ) -> Result<(), DatastoreError> {
        self.begin_call()?;
        self.entries.lock().await.insert(key.clone(), value);
        Ok(())
    }

    async fn get(&self, _ctx: &RequestContext, key: &BlobKey) -> Result<Bytes, DatastoreError> {
        self.begin_call()?;
        self.entries
            .lock()
            .await
            .get(key)
            .cloned()
            .ok_or_else(|| DatastoreError::NoSuchEntity(key.clone()))
    }
}
