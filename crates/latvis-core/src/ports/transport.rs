//! Transport port - 外向き HTTP の round-trip
//!
//! 独自 API ではなく `http` crate の Request/Response をそのまま使うので、
//! 上に任意の HTTP クライアント抽象を載せられる。

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::CapabilityError;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn round_trip(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, CapabilityError>;
}
