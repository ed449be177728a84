//! RequestContext - 1 リクエスト分の実行コンテキスト
//!
//! identity / deadline / キャンセル / tracing span を 1 つの値にまとめ、
//! Environment の構築時と各 capability 呼び出しに明示的に渡します。
//! グローバル状態は持ちません。

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::Span;

use super::{CapabilityError, RequestId};

/// Execution context scoped to one inbound request.
///
/// Clones share the cancellation flag, so canceling any clone cancels every
/// capability bound to the same request.
#[derive(Debug, Clone)]
pub struct RequestContext {
    request_id: RequestId,
    identity: Option<String>,
    deadline: Option<Instant>,
    cancel: Arc<watch::Sender<bool>>,
    span: Span,
}

impl RequestContext {
    pub fn new(request_id: RequestId) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            request_id,
            identity: None,
            deadline: None,
            cancel: Arc::new(cancel),
            span: tracing::info_span!("request", request_id = %request_id),
        }
    }

    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = Some(identity.into());
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Cancel the request. Idempotent.
    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_canceled(&self) -> bool {
        *self.cancel.borrow()
    }

    /// Run one backend call under this context.
    ///
    /// Fails fast if the context is already canceled or past its deadline, and
    /// abandons `call` if either happens while it is in flight.
    pub async fn guard<F, T>(&self, call: F) -> Result<T, CapabilityError>
    where
        F: Future<Output = Result<T, CapabilityError>>,
    {
        if self.is_canceled() {
            return Err(CapabilityError::Canceled);
        }
        if let Some(deadline) = self.deadline
            && Instant::now() >= deadline
        {
            return Err(CapabilityError::DeadlineExceeded);
        }

        let mut cancel_rx = self.cancel.subscribe();
        let canceled = async move {
            // sender lives in self, so this only resolves on cancel
            let _ = cancel_rx.wait_for(|canceled| *canceled).await;
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            result = call => result,
            _ = canceled => Err(CapabilityError::Canceled),
            _ = expired => Err(CapabilityError::DeadlineExceeded),
        }
    }
}
