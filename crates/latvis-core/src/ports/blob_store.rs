//! BlobStore port - Handle で引く content-addressed ストレージ
//!
//! # キー導出
//! - `BlobKey { kind, name }` の kind は「保存物の種類」を表す固定の名前空間
//! - name は Handle の正規文字列
//! - kind が違えば name が同じでも衝突しない

use async_trait::async_trait;
use std::fmt;

use crate::domain::{Blob, CapabilityError, Handle};

/// Namespace for rendered LatVis output blobs.
pub const LATVIS_OUTPUT_KIND: &str = "latvis-output";

/// Storage key derived from a namespace constant and a handle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlobKey {
    kind: String,
    name: String,
}

impl BlobKey {
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }

    pub fn for_handle(kind: &str, handle: &Handle) -> Self {
        Self::new(kind, handle.as_str())
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for BlobKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.kind, self.name)
    }
}

/// BlobStore は Handle -> Blob の永続化
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `blob` under `handle`.
    ///
    /// Storing under a handle that already has a blob replaces it (last write wins).
    async fn store(&self, handle: &Handle, blob: &Blob) -> Result<(), CapabilityError>;

    /// Fails with `CapabilityError::NotFound` if nothing was stored under `handle`.
    async fn fetch(&self, handle: &Handle) -> Result<Blob, CapabilityError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_of_different_kinds_differ() {
        let handle = Handle::new("job-42");
        let output = BlobKey::for_handle(LATVIS_OUTPUT_KIND, &handle);
        let other = BlobKey::for_handle("latvis-oauth", &handle);

        assert_ne!(output, other);
        assert_eq!(output.name(), other.name());
        assert_eq!(output.to_string(), "latvis-output/job-42");
    }
}
