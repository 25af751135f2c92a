// src/lib.rs
pub mod config;
pub mod error;
pub mod event;
pub mod logging;
pub mod pipeline;
pub mod process;
pub mod storage;

pub use error::{ArchiveError, PipelineError, StorageError, TransformError, WriteError};
pub use event::{InvocationEvent, InvocationResponse, Status};
pub use pipeline::{run, run_event, EntryReport, RunReport};
