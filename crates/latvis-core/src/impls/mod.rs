//! Impls - ports の実装
//!
//! # capability（RequestContext に束縛される）
//! - **DatastoreBlobStore**: Datastore 上の BlobStore
//! - **SchedulerTaskQueue**: TaskScheduler 上の TaskQueue
//! - **TracingLogger** / **MemoryLogger**
//! - **ReqwestTransport** / **StaticTransport**
//!
//! # backend
//! - **InMemoryDatastore** / **FsDatastore**
//! - **InMemoryTaskScheduler**
//! - **HeaderContextProvider**

pub mod datastore_blob_store;
pub mod fs_datastore;
pub mod header_context;
pub mod inmem_datastore;
pub mod inmem_scheduler;
pub mod memory_logger;
pub mod reqwest_transport;
pub mod scheduler_task_queue;
pub mod static_transport;
pub mod tracing_logger;

pub use self::datastore_blob_store::DatastoreBlobStore;
pub use self::fs_datastore::FsDatastore;
pub use self::header_context::{HeaderContextProvider, TIMEOUT_HEADER};
pub use self::inmem_datastore::InMemoryDatastore;
pub use self::inmem_scheduler::{DEFAULT_QUEUE, InMemoryTaskScheduler};
pub use self::memory_logger::{LogLevel, LogRecord, MemoryLogger};
pub use self::reqwest_transport::{REQUEST_ID_HEADER, ReqwestTransport};
pub use self::scheduler_task_queue::SchedulerTaskQueue;
pub use self::static_transport::{StaticRoutes, StaticTransport};
pub use self::tracing_logger::TracingLogger;
