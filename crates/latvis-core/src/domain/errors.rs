//! Errors - capability 呼び出しのエラー分類
//!
//! backend 固有のエラー（DatastoreError, SchedulerError）は ports 側で定義し、
//! capability の境界で CapabilityError に変換します。

use super::Handle;

/// ErrorKind は capability エラーの運用分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Fetch した Handle に Blob が存在しない
    NotFound,
    /// backend が呼び出しを拒否・失敗した
    Provider,
    /// キュー backend がスケジュールを拒否した
    SchedulingRejected,
    /// リクエストの context がキャンセルされた
    Canceled,
    /// リクエストの deadline を過ぎた
    DeadlineExceeded,
}

/// Error returned by every capability method except logging.
#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("no blob stored under handle '{0}'")]
    NotFound(Handle),

    #[error("{operation} failed: {message}")]
    Provider {
        operation: &'static str,
        message: String,
    },

    #[error("queue '{queue}' rejected task for {url}: {reason}")]
    SchedulingRejected {
        queue: String,
        url: String,
        reason: String,
    },

    #[error("request context canceled")]
    Canceled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,
}

impl CapabilityError {
    pub fn provider(operation: &'static str, message: impl ToString) -> Self {
        Self::Provider {
            operation,
            message: message.to_string(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Provider { .. } => ErrorKind::Provider,
            Self::SchedulingRejected { .. } => ErrorKind::SchedulingRejected,
            Self::Canceled => ErrorKind::Canceled,
            Self::DeadlineExceeded => ErrorKind::DeadlineExceeded,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
