// src/error.rs
use thiserror::Error;

/// Failures while opening the source archive or pulling a CSV member out of it.
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("not a readable zip archive: {0}")]
    Open(#[from] zip::result::ZipError),

    #[error("failed to access zip entry #{index}: {source}")]
    Entry {
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to read {name} into memory: {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Structural CSV failures. Row-level problems are counted, not raised.
#[derive(Error, Debug)]
pub enum TransformError {
    #[error("CSV entry {source_name} has no header line")]
    MissingHeader { source_name: String },

    #[error("CSV parse error in {source_name}: {source}")]
    Csv {
        source_name: String,
        #[source]
        source: csv::Error,
    },
}

#[derive(Error, Debug)]
pub enum WriteError {
    #[error("failed to serialize {key}: {source}")]
    Serialize {
        key: String,
        #[source]
        source: csv::Error,
    },

    #[error("failed to put {bucket}/{key}: {source}")]
    Put {
        bucket: String,
        key: String,
        #[source]
        source: StorageError,
    },
}

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },

    #[error("access denied to {bucket}/{key}")]
    AccessDenied { bucket: String, key: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Anything that aborts a pipeline invocation.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("fetching source archive: {0}")]
    Fetch(#[source] StorageError),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Write(#[from] WriteError),
}
