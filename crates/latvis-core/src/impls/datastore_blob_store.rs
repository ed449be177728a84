//! DatastoreBlobStore - Datastore backend 上の BlobStore
//!
//! Blob はレコード（JSON ヘッダ + 生データ）にエンコードして保存する。
//! 書き込み・読み込みの前に Handle を 1 行ログに出す。

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::{Blob, CapabilityError, Handle, RequestContext};
use crate::ports::{BlobKey, BlobStore, Datastore, DatastoreError, Logger};

/// DatastoreBlobStore は 1 リクエストに束縛された BlobStore
///
/// # 実装詳細
/// - key は `BlobKey { kind, name: handle }`。kind は factory の設定値で固定
/// - store / fetch の前に logger へ 1 行出す（失敗しても出る）
/// - backend 呼び出しは `RequestContext::guard` の中で行う
/// - `NoSuchEntity` だけが `NotFound` になり、それ以外は `Provider`
pub struct DatastoreBlobStore {
    ctx: RequestContext,
    datastore: Arc<dyn Datastore>,
    logger: Arc<dyn Logger>,
    kind: String,
}

impl DatastoreBlobStore {
    pub fn new(
        ctx: RequestContext,
        datastore: Arc<dyn Datastore>,
        logger: Arc<dyn Logger>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            ctx,
            datastore,
            logger,
            kind: kind.into(),
        }
    }

    fn key(&self, handle: &Handle) -> BlobKey {
        BlobKey::for_handle(&self.kind, handle)
    }
}

#[async_trait]
impl BlobStore for DatastoreBlobStore {
    async fn store(&self, handle: &Handle, blob: &Blob) -> Result<(), CapabilityError> {
        self.logger
            .info(format_args!("Storing blob with handle: '{handle}'"));

        let record = blob
            .encode()
            .map_err(|e| CapabilityError::provider("blob.encode", e))?;
        let key = self.key(handle);
        self.ctx
            .guard(async {
                self.datastore
                    .put(&self.ctx, &key, record)
                    .await
                    .map_err(|e| CapabilityError::provider("datastore.put", e))
            })
            .await
    }

    async fn fetch(&self, handle: &Handle) -> Result<Blob, CapabilityError> {
        self.logger
            .info(format_args!("Looking up blob with handle: '{handle}'"));

        let key = self.key(handle);
        let raw = self
            .ctx
            .guard(async {
                match self.datastore.get(&self.ctx, &key).await {
                    Ok(raw) => Ok(raw),
                    Err(DatastoreError::NoSuchEntity(_)) => {
                        Err(CapabilityError::NotFound(handle.clone()))
                    }
                    Err(e) => Err(CapabilityError::provider("datastore.get", e)),
                }
            })
            .await?;

        Blob::decode(raw).map_err(|e| CapabilityError::provider("blob.decode", e))
    }
}
