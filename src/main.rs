use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use flightdays::{
    config::{Args, StorageBackend},
    logging,
    pipeline::run_event,
    storage::{LocalStorage, ObjectStorage, S3Storage},
    Status,
};
use tracing::{error, info};

async fn build_storage(args: &Args) -> Box<dyn ObjectStorage> {
    match args.storage {
        StorageBackend::S3 => Box::new(S3Storage::from_env(args.endpoint_url.as_deref()).await),
        StorageBackend::Local => {
            info!(root = %args.local_root.display(), "using local storage");
            Box::new(LocalStorage::new(&args.local_root))
        }
    }
}

async fn invoke(args: &Args) -> Result<Status> {
    let event = args.invocation_event()?;
    let storage = build_storage(args).await;

    let report = run_event(storage.as_ref(), &event)
        .await
        .with_context(|| format!("processing {}/{}", event.src_bucket, event.key))?;

    let response = serde_json::to_string(&report.response()).context("encoding response")?;
    println!("{}", response);
    Ok(report.status)
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    logging::init_tracing(args.debug_enabled());

    match invoke(&args).await {
        Ok(Status::Ok) => {}
        Ok(Status::Error) => process::exit(2),
        Err(e) => {
            error!("invocation failed: {:#}", e);
            process::exit(1);
        }
    }
}
