//! ContextProvider port - inbound request から RequestContext を導出

use crate::domain::RequestContext;

/// Derives the execution context for one inbound request.
///
/// Must be pure: no backend calls, always succeeds.
pub trait ContextProvider: Send + Sync {
    fn derive(&self, request: &http::request::Parts) -> RequestContext;
}
