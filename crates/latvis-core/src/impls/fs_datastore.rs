//! FsDatastore - ローカルディスク上の Datastore
//!
//! `<root>/<escape(kind)>/<sha256(name)>` に 1 エントリ 1 ファイルで保存する。
//! name をハッシュするので Handle に `/` や `..` が含まれても root の外に出ない。
//! kind のエスケープは単射なので、別の kind が同じディレクトリに落ちることはない。
//! 書き込みは put ごとに一意な tmp ファイル + rename で置き換える。

use async_trait::async_trait;
use bytes::Bytes;
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use ulid::Ulid;

use crate::domain::RequestContext;
use crate::ports::{BlobKey, Datastore, DatastoreError};

/// FsDatastore はディレクトリ 1 つを root とする Datastore
///
/// # 実装詳細
/// - kind は `[A-Za-z0-9-]` 以外を `_XX`（16 進）に置き換えてディレクトリ名にする
/// - name は SHA-256 の 16 進をファイル名にする
/// - put は `<entry>.tmp-<ulid>` に書いてから rename するので、
///   同じ key への同時 put でも読み手は古い値か新しい値のどちらかを見る
pub struct FsDatastore {
    root: PathBuf,
}

impl FsDatastore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn entry_path(&self, key: &BlobKey) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(key.name().as_bytes());
        self.root
            .join(escape_kind(key.kind()))
            .join(hex::encode(hasher.finalize()))
    }
}

// `_` always starts an escape, so distinct kinds never share a directory.
fn escape_kind(kind: &str) -> String {
    if kind.is_empty() {
        return "_".to_string();
    }
    let mut out = String::with_capacity(kind.len());
    for byte in kind.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            out.push(char::from(byte));
        } else {
            out.push('_');
            out.push_str(&hex::encode_upper([byte]));
        }
    }
    out
}

#[async_trait]
impl Datastore for FsDatastore {
    async fn put(
        &self,
        _ctx: &RequestContext,
        key: &BlobKey,
        value: Bytes,
    ) -> Result<(), DatastoreError> {
        let path = self.entry_path(key);
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }

        // request ids come from headers and can repeat, so each put gets its own tmp
        let tmp = path.with_extension(format!("tmp-{}", Ulid::new()));
        tokio::fs::write(&tmp, &value).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(e.into());
        }

        tracing::debug!(key = %key, path = %path.display(), bytes = value.len(), "datastore put");
        Ok(())
    }

    async fn get(&self, _ctx: &RequestContext, key: &BlobKey) -> Result<Bytes, DatastoreError> {
        let path = self.entry_path(key);
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(DatastoreError::NoSuchEntity(key.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}
