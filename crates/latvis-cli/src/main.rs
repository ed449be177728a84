use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use latvis_core::impls::InMemoryTaskScheduler;
use latvis_core::{
    Blob, EnvironmentConfig, EnvironmentFactory, EnvironmentFactoryBuilder, FormParams, Handle,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Drive one simulated request through the capability environment.
#[derive(Debug, Parser)]
#[command(name = "latvis", version)]
struct Args {
    /// Config file (toml/yaml/json). `LATVIS__*` env vars override it.
    #[arg(short, long)]
    config: Option<String>,

    /// Handle to store the payload under. Defaults to the payload's content hash.
    #[arg(long)]
    handle: Option<String>,

    /// Payload to store.
    #[arg(long, default_value = "result")]
    data: String,

    /// Deferred POST target to enqueue after storing.
    #[arg(long, default_value = "https://worker/render")]
    enqueue: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "latvis_cli=info,latvis_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    let config = EnvironmentConfig::load(args.config.as_deref()).context("loading config")?;

    // (A) 起動時に一度だけ factory を組み立てる（スケジューラは in-memory）
    let queue_name = config.queue_name.clone();
    let scheduler = Arc::new(InMemoryTaskScheduler::new());
    let factory = EnvironmentFactoryBuilder::new(config)
        .scheduler(scheduler.clone())
        .build()
        .context("building environment factory")?;

    // (B) host runtime が受け取ったリクエストの代わり
    let (parts, ()) = http::Request::post("/render")
        .header("x-latvis-user", "latvis-cli")
        .body(())
        .context("building request")?
        .into_parts();
    let env = factory.for_request(&parts);
    tracing::info!(request_id = %env.context().request_id(), "environment ready");

    // (C) application logic は capability だけを使う
    let handle = match args.handle.as_deref().and_then(Handle::parse) {
        Some(handle) => handle,
        None => Handle::for_content(args.data.as_bytes()),
    };
    env.blob_store()
        .store(&handle, &Blob::new(args.data.clone()).with_content_type("text/plain"))
        .await?;
    let blob = env.blob_store().fetch(&handle).await?;
    println!(
        "fetched {handle}: {} bytes ({})",
        blob.len(),
        blob.content_type().unwrap_or("unknown")
    );

    let params = FormParams::new().with("handle", handle.as_str());
    if let Err(err) = env.task_queue().enqueue(&args.enqueue, &params).await {
        env.logger()
            .error(format_args!("enqueue to {} failed: {err}", args.enqueue));
        return Err(err.into());
    }

    // (D) 受け付けられたが実行はされていないタスクを表示
    while let Some((name, task)) = scheduler.take(&queue_name).await {
        println!("pending {name}: POST {} {}", task.url, String::from_utf8_lossy(&task.body));
    }
    Ok(())
}
