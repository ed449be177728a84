//! 型付き ID（ULID ベース）。
//!
//! `Id<T>` に共通実装を持たせ、`T` は PhantomData のマーカー型としてのみ使います。
//! RequestId と TaskName を取り違えるとコンパイルエラーになります。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// 各 ID 型のマーカー trait
pub trait IdMarker: Send + Sync + 'static {
    /// Display で使うプレフィックス（例: "req-"）
    fn prefix() -> &'static str;
}

#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// 現在時刻から新しい ID を生成
    pub fn generate() -> Self {
        Self::from_ulid(Ulid::new())
    }

    /// `req-01H...` 形式と素の ULID 文字列の両方を受け付ける
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        let raw = value.strip_prefix(T::prefix()).unwrap_or(value);
        Ulid::from_string(raw).ok().map(Self::from_ulid)
    }

    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

/// Request のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Request {}

impl IdMarker for Request {
    fn prefix() -> &'static str {
        "req-"
    }
}

/// スケジュール済みタスクのマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ScheduledTask {}

impl IdMarker for ScheduledTask {
    fn prefix() -> &'static str {
        "task-"
    }
}

/// Identifier of one inbound request (one execution context).
pub type RequestId = Id<Request>;

/// Name assigned by a scheduler to an accepted task.
pub type TaskName = Id<ScheduledTask>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_prefix() {
        let request = RequestId::generate();
        let task = TaskName::generate();

        assert!(request.to_string().starts_with("req-"));
        assert!(task.to_string().starts_with("task-"));
    }

    #[test]
    fn parse_accepts_prefixed_and_bare_forms() {
        let ulid = Ulid::new();
        let prefixed = RequestId::parse(&format!("req-{ulid}")).unwrap();
        let bare = RequestId::parse(&ulid.to_string()).unwrap();

        assert_eq!(prefixed, bare);
        assert_eq!(prefixed.as_ulid(), ulid);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!(RequestId::parse("not-a-ulid").is_none());
        assert!(RequestId::parse("").is_none());
    }

    #[test]
    fn ids_can_be_serialized() {
        let id = RequestId::generate();

        let serialized = serde_json::to_string(&id).unwrap();
        let deserialized: RequestId = serde_json::from_str(&serialized).unwrap();

        assert_eq!(id, deserialized);
    }
}
