//! TaskQueue port - 遅延 HTTP POST のスケジュール（fire-and-forget）

use async_trait::async_trait;

use crate::domain::{CapabilityError, FormParams};

/// TaskQueue は deferred POST をキュー backend に登録する
///
/// backend が受け付けた時点で返り、タスクの実行は待たない。
/// 2 回の enqueue の間の順序は backend に従う。
#[async_trait]
pub trait TaskQueue: Send + Sync {
    async fn enqueue(&self, target_url: &str, params: &FormParams) -> Result<(), CapabilityError>;
}
