//! latvis-core
//!
//! Per-request capability environment for LatVis.
//!
//! # モジュール構成
//! - **domain**: Handle, Blob, FormParams, RequestContext, CapabilityError
//! - **ports**: capability trait（BlobStore, TaskQueue, Logger, Transport）と backend trait
//! - **impls**: ports の実装（in-memory / filesystem / tracing / reqwest）
//! - **app**: Environment と EnvironmentFactory
//! - **config**: EnvironmentConfig

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use app::{Environment, EnvironmentFactory, EnvironmentFactoryBuilder};
pub use config::EnvironmentConfig;
pub use domain::{Blob, CapabilityError, ErrorKind, FormParams, Handle, RequestContext};
