//! Domain model (handles, blobs, request context, errors).

pub mod blob;
pub mod context;
pub mod errors;
pub mod form;
pub mod handle;
pub mod ids;

pub use blob::Blob;
pub use context::RequestContext;
pub use errors::{CapabilityError, ErrorKind};
pub use form::FormParams;
pub use handle::Handle;
pub use ids::{RequestId, TaskName};
