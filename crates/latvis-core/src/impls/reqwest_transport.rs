//! ReqwestTransport - 本番用 Transport
//!
//! reqwest::Client はコネクションプールを共有するので factory 側で 1 つだけ持ち、
//! リクエストごとに context と一緒に包む。

use async_trait::async_trait;
use bytes::Bytes;

use crate::domain::{CapabilityError, RequestContext};
use crate::ports::Transport;

/// Header carrying the request id on outbound calls.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// ReqwestTransport は共有 reqwest::Client を 1 リクエストの context に束縛した Transport
///
/// # 実装詳細
/// - `x-request-id` が無ければ context の request id を付ける（呼び出し側の値は上書きしない）
/// - 送信から body の読み切りまでを `RequestContext::guard` の中で行うので、
///   キャンセルや deadline で途中の呼び出しも打ち切られる
/// - reqwest の Response は `http::Response<Bytes>` に詰め替えて返す
pub struct ReqwestTransport {
    ctx: RequestContext,
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(ctx: RequestContext, client: reqwest::Client) -> Self {
        Self { ctx, client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn round_trip(
        &self,
        mut request: http::Request<Bytes>,
    ) -> Result<http::Response<Bytes>, CapabilityError> {
        if !request.headers().contains_key(REQUEST_ID_HEADER)
            && let Ok(value) = http::HeaderValue::from_str(&self.ctx.request_id().to_string())
        {
            request.headers_mut().insert(REQUEST_ID_HEADER, value);
        }

        let method = request.method().clone();
        let uri = request.uri().clone();
        let request = reqwest::Request::try_from(request)
            .map_err(|e| CapabilityError::provider("transport.build", e))?;

        let response = self
            .ctx
            .guard(async {
                let response = self
                    .client
                    .execute(request)
                    .await
                    .map_err(|e| CapabilityError::provider("transport.send", e))?;

                let mut builder = http::Response::builder()
                    .status(response.status())
                    .version(response.version());
                if let Some(headers) = builder.headers_mut() {
                    headers.extend(response.headers().clone());
                }
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| CapabilityError::provider("transport.body", e))?;
                builder
                    .body(body)
                    .map_err(|e| CapabilityError::provider("transport.response", e))
            })
            .await?;

        tracing::debug!(
            parent: self.ctx.span(),
            %method,
            %uri,
            status = response.status().as_u16(),
            "outbound round trip"
        );
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ErrorKind, RequestId};
    use std::time::Duration;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }

    /// Answers every request with 201, an `x-echo` header, and the raw request head as body.
    async fn echo_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut buf = [0u8; 1024];
                    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                        match socket.read(&mut buf).await {
                            Ok(0) | Err(_) => return,
                            Ok(n) => head.extend_from_slice(&buf[..n]),
                        }
                    }
                    let response = format!(
                        "HTTP/1.1 201 Created\r\nx-echo: yes\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                        head.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.write_all(&head).await;
                });
            }
        });
        format!("http://{addr}")
    }

    /// Accepts connections and never answers.
    async fn silent_server() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    fn get(uri: String) -> http::Request<Bytes> {
        http::Request::get(uri).body(Bytes::new()).unwrap()
    }

    #[tokio::test]
    async fn adds_request_id_and_converts_response() {
        let base = echo_server().await;
        let ctx = RequestContext::new(RequestId::generate());
        let transport = ReqwestTransport::new(ctx.clone(), client());

        let response = transport.round_trip(get(format!("{base}/tiles/1"))).await.unwrap();

        assert_eq!(response.status(), http::StatusCode::CREATED);
        assert_eq!(response.headers()["x-echo"], "yes");
        assert_eq!(response.headers()["content-type"], "text/plain");

        let head = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(head.starts_with("GET /tiles/1 HTTP/1.1\r\n"), "{head}");
        assert!(
            head.contains(&format!("x-request-id: {}\r\n", ctx.request_id())),
            "{head}"
        );
    }

    #[tokio::test]
    async fn caller_request_id_is_kept() {
        let base = echo_server().await;
        let ctx = RequestContext::new(RequestId::generate());
        let transport = ReqwestTransport::new(ctx.clone(), client());

        let mut request = get(format!("{base}/"));
        request
            .headers_mut()
            .insert(REQUEST_ID_HEADER, http::HeaderValue::from_static("upstream-7"));
        let response = transport.round_trip(request).await.unwrap();

        let head = String::from_utf8(response.body().to_vec()).unwrap();
        assert!(head.contains("x-request-id: upstream-7\r\n"), "{head}");
        assert!(!head.contains(&ctx.request_id().to_string()), "{head}");
    }

    #[tokio::test]
    async fn connection_failure_is_provider_error() {
        // bind then drop, so nothing listens on the port
        let addr = TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap()
            .local_addr()
            .unwrap();
        let transport = ReqwestTransport::new(RequestContext::new(RequestId::generate()), client());

        let err = transport
            .round_trip(get(format!("http://{addr}/")))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Provider);
    }

    #[tokio::test]
    async fn cancel_aborts_in_flight_round_trip() {
        let base = silent_server().await;
        let ctx = RequestContext::new(RequestId::generate());
        let transport = ReqwestTransport::new(ctx.clone(), client());

        let canceller = ctx.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            canceller.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            transport.round_trip(get(format!("{base}/slow"))),
        )
        .await
        .expect("round trip should stop once the context is canceled");

        assert!(matches!(result, Err(CapabilityError::Canceled)));
    }
}
