//! StaticTransport - テスト用 Transport
//!
//! URI ごとに用意したレスポンスを返す。未登録の URI は 404。
//! 受け取ったリクエストは記録しておく。

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::{CapabilityError, RequestContext};
use crate::ports::Transport;

#[derive(Debug, Clone)]
struct CannedResponse {
    status: http::StatusCode,
    body: Bytes,
}

/// Shared table of canned responses. Cheap to clone.
#[derive(Debug, Clone, Default)]
pub struct StaticRoutes {
    routes: Arc<HashMap<String, CannedResponse>>,
}

impl StaticRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(mut self, uri: &str, status: http::StatusCode, body: impl Into<Bytes>) -> Self {
        Arc::make_mut(&mut self.routes).insert(
            uri.to_string(),
            CannedResponse {
                status,
                body: body.into(),
            },
        );
        self
    }
}

/// StaticTransport は StaticRoutes の応答を返すだけの Transport。送ったリクエストの URI を記録する
pub struct StaticTransport {
    ctx: RequestContext,
    routes: StaticRoutes,
    seen: Mutex<Vec<http::Uri>>,
}

impl StaticTransport {
    pub fn new(ctx: RequestContext, routes: StaticRoutes) -> Self {
        Self {
            ctx,
            routes,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub async fn seen(&self) -> Vec<http::Uri> {
        self.seen.lock().await.clone()
    }
}

#[async_trait]
impl Transport for StaticTransport {
    async fn round_trip(
        &self,
        request: http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, CapabilityError> {
        self.ctx
            .guard(async {
                let uri = request.uri().clone();
                self.seen.lock().await.push(uri.clone());

                let (status, body) = match self.routes.routes.get(&uri.to_string()) {
                    Some(canned) => (canned.status, canned.body.clone()),
                    None => (http::StatusCode::NOT_FOUND, Bytes::new()),
                };
                http::Response::builder()
                    .status(status)
                    .body(body)
                    .map_err(|e| CapabilityError::provider("transport.response", e))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequestId;

    fn get(uri: &str) -> http::Request<Bytes> {
        http::Request::get(uri).body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn serves_canned_and_404() {
        let routes = StaticRoutes::new().route("https://maps.example/tile", http::StatusCode::OK, "png");
        let transport = StaticTransport::new(RequestContext::new(RequestId::generate()), routes);

        let hit = transport.round_trip(get("https://maps.example/tile")).await.unwrap();
        let miss = transport.round_trip(get("https://maps.example/other")).await.unwrap();

        assert_eq!(hit.status(), http::StatusCode::OK);
        assert_eq!(hit.body().as_ref(), b"png");
        assert_eq!(miss.status(), http::StatusCode::NOT_FOUND);
        assert_eq!(transport.seen().await.len(), 2);
    }

    #[tokio::test]
    async fn canceled_context_fails_round_trip() {
        let ctx = RequestContext::new(RequestId::generate());
        let transport = StaticTransport::new(ctx.clone(), StaticRoutes::new());
        ctx.cancel();

        let result = transport.round_trip(get("https://maps.example/tile")).await;

        assert!(matches!(result, Err(CapabilityError::Canceled)));
        assert!(transport.seen().await.is_empty());
    }
}
