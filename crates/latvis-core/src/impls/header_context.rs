//! HeaderContextProvider - リクエストヘッダから RequestContext を導出
//!
//! - request id: `x-request-id`（ULID として読めなければ新規生成）
//! - identity: 設定したヘッダの値（空なら None）
//! - deadline: `x-request-timeout-ms` か default_timeout の短い方

use std::time::Duration;
use tokio::time::Instant;

use crate::domain::{RequestContext, RequestId};
use crate::ports::ContextProvider;

pub const TIMEOUT_HEADER: &str = "x-request-timeout-ms";

#[derive(Debug, Clone)]
pub struct HeaderContextProvider {
    request_id_header: String,
    identity_header: String,
    default_timeout: Option<Duration>,
}

impl HeaderContextProvider {
    pub fn new(
        request_id_header: impl Into<String>,
        identity_header: impl Into<String>,
        default_timeout: Option<Duration>,
    ) -> Self {
        Self {
            request_id_header: request_id_header.into(),
            identity_header: identity_header.into(),
            default_timeout,
        }
    }

    fn header<'a>(parts: &'a http::request::Parts, name: &str) -> Option<&'a str> {
        parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    fn timeout(&self, parts: &http::request::Parts) -> Option<Duration> {
        let requested = Self::header(parts, TIMEOUT_HEADER)
            .and_then(|value| value.parse::<u64>().ok())
            .map(Duration::from_millis);
        match (requested, self.default_timeout) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl ContextProvider for HeaderContextProvider {
    fn derive(&self, request: &http::request::Parts) -> RequestContext {
        let request_id = Self::header(request, &self.request_id_header)
            .and_then(RequestId::parse)
            .unwrap_or_else(RequestId::generate);

        let mut ctx = RequestContext::new(request_id);
        if let Some(identity) = Self::header(request, &self.identity_header) {
            ctx = ctx.with_identity(identity);
        }
        if let Some(timeout) = self.timeout(request) {
            ctx = ctx.with_deadline(Instant::now() + timeout);
        }
        ctx
    }
}
