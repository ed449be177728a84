//! Logger port - リクエスト単位の診断ログ

use std::fmt;

/// Request-scoped diagnostics. Logging never fails and never aborts the caller.
pub trait Logger: Send + Sync {
    fn error(&self, args: fmt::Arguments<'_>);

    fn info(&self, args: fmt::Arguments<'_>);
}
