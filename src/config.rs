// src/config.rs
use std::{env, fs, io::Read, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};

use crate::event::InvocationEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// Amazon S3 or an S3-compatible endpoint
    S3,
    /// Directories on the local filesystem, one per bucket
    Local,
}

/// Split a zipped flight-delay CSV archive into one CSV object per day.
#[derive(Parser, Debug)]
#[command(name = "flightdays", version)]
pub struct Args {
    /// Invocation event JSON file (`-` reads stdin)
    #[arg(long, value_name = "FILE", conflicts_with_all = ["src_bucket", "key", "dst_bucket", "dst_prefix"])]
    pub event: Option<PathBuf>,

    /// Bucket holding the source archive
    #[arg(long)]
    pub src_bucket: Option<String>,

    /// Key of the source archive
    #[arg(long)]
    pub key: Option<String>,

    /// Bucket receiving the daily CSV files
    #[arg(long)]
    pub dst_bucket: Option<String>,

    /// Key prefix for the daily CSV files
    #[arg(long)]
    pub dst_prefix: Option<String>,

    #[arg(long, env = "STORAGE_BACKEND", value_enum, default_value_t = StorageBackend::S3)]
    pub storage: StorageBackend,

    /// Root directory for the `local` backend
    #[arg(long, env = "LOCAL_STORAGE_ROOT", default_value = ".")]
    pub local_root: PathBuf,

    /// Custom S3 endpoint (path-style addressing)
    #[arg(long, env = "S3_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Debug logging (also enabled by DEBUG=true)
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    pub fn debug_enabled(&self) -> bool {
        self.debug || env::var("DEBUG").map(|v| v == "true").unwrap_or(false)
    }

    /// The invocation event, from `--event` or from the individual flags.
    pub fn invocation_event(&self) -> Result<InvocationEvent> {
        if let Some(path) = &self.event {
            let raw = if path.as_os_str() == "-" {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .context("reading event from stdin")?;
                buf
            } else {
                fs::read_to_string(path)
                    .with_context(|| format!("reading event file {}", path.display()))?
            };
            return serde_json::from_str(&raw).context("parsing invocation event");
        }

        let missing: Vec<&str> = [
            ("--src-bucket", &self.src_bucket),
            ("--key", &self.key),
            ("--dst-bucket", &self.dst_bucket),
            ("--dst-prefix", &self.dst_prefix),
        ]
        .iter()
        .filter(|(_, v)| v.is_none())
        .map(|(flag, _)| *flag)
        .collect();
        if !missing.is_empty() {
            bail!(
                "no --event given and missing {}; pass an event file or all four flags",
                missing.join(", ")
            );
        }

        Ok(InvocationEvent {
            src_bucket: self.src_bucket.clone().unwrap_or_default(),
            key: self.key.clone().unwrap_or_default(),
            dst_bucket: self.dst_bucket.clone().unwrap_or_default(),
            dst_prefix: self.dst_prefix.clone().unwrap_or_default(),
        })
    }
}
