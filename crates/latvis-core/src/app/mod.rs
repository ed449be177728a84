//! App - リクエストごとの Environment 構築
//!
//! - **Environment**: 1 リクエスト分の capability の束
//! - **EnvironmentFactory**: リクエスト -> Environment（純粋なワイヤリング）
//! - **EnvironmentFactoryBuilder**: 設定から本番用 factory を組み立てる

pub mod builder;
pub mod environment;
pub mod factory;

pub use self::builder::{BuildError, EnvironmentFactoryBuilder};
pub use self::environment::Environment;
pub use self::factory::{
    EnvironmentFactory, InMemoryEnvironmentFactory, PlatformEnvironmentFactory, Wiring,
};
