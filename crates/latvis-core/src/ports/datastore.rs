//! Datastore port - (kind, name) -> bytes の外部永続化サービス
//!
//! BlobStore の backend。キーが無い場合は `NoSuchEntity` で区別できること。

use async_trait::async_trait;
use bytes::Bytes;

use super::BlobKey;
use crate::domain::RequestContext;

#[derive(Debug, thiserror::Error)]
pub enum DatastoreError {
    #[error("no such entity: {0}")]
    NoSuchEntity(BlobKey),

    #[error("datastore I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("datastore unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Datastore: Send + Sync {
    async fn put(&self, ctx: &RequestContext, key: &BlobKey, value: Bytes)
        -> Result<(), DatastoreError>;

    async fn get(&self, ctx: &RequestContext, key: &BlobKey) -> Result<Bytes, DatastoreError>;
}
