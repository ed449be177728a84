//! Ports - capability と外部 backend の抽象化レイヤー
//!
//! - capability（application logic が使う）: BlobStore, TaskQueue, Logger, Transport
//! - backend（capability の実装が使う）: Datastore, TaskScheduler, ContextProvider
//!
//! 各 trait は in-memory 実装と本番用実装を差し替え可能にします。

pub mod blob_store;
pub mod context_provider;
pub mod datastore;
pub mod logger;
pub mod scheduler;
pub mod task_queue;
pub mod transport;

pub use self::blob_store::{BlobKey, BlobStore, LATVIS_OUTPUT_KIND};
pub use self::context_provider::ContextProvider;
pub use self::datastore::{Datastore, DatastoreError};
pub use self::logger::Logger;
pub use self::scheduler::{FORM_CONTENT_TYPE, PostTask, SchedulerError, TaskScheduler};
pub use self::task_queue::TaskQueue;
pub use self::transport::Transport;
