//! TracingLogger - 本番用 Logger（tracing イベントをリクエスト span の中で出す）

use std::fmt;
use tracing::Span;

use crate::domain::RequestContext;
use crate::ports::Logger;

/// TracingLogger は `RequestContext` の span を親にして tracing イベントを出す Logger
pub struct TracingLogger {
    span: Span,
}

impl TracingLogger {
    pub fn new(ctx: &RequestContext) -> Self {
        Self {
            span: ctx.span().clone(),
        }
    }
}

impl Logger for TracingLogger {
    fn error(&self, args: fmt::Arguments<'_>) {
        tracing::error!(parent: &self.span, "{}", args);
    }

    fn info(&self, args: fmt::Arguments<'_>) {
        tracing::info!(parent: &self.span, "{}", args);
    }
}
