// src/pipeline.rs
use tracing::{error, info, instrument};

use crate::error::PipelineError;
use crate::event::{InvocationEvent, InvocationResponse, Status};
use crate::process::{
    extract_csv_entries, transform, write_partitions, ArchiveEntry, TransformResult, WriteResult,
    WrittenObject,
};
use crate::storage::ObjectStorage;

/// Line accounting for one CSV entry of the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryReport {
    pub source_name: String,
    /// Data lines in the entry (header excluded).
    pub line_count: usize,
    pub processed_count: usize,
    pub skipped_count: usize,
    pub written_line_count: usize,
    pub written_objects: Vec<WrittenObject>,
    /// Every line read was processed or skipped, and every processed line was written.
    pub validated: bool,
}

impl EntryReport {
    fn reconcile(entry: &ArchiveEntry, transformed: &TransformResult, written: WriteResult) -> Self {
        let name = &entry.name;
        let mut validated = true;

        if entry.line_count != transformed.processed_count + transformed.skipped_count {
            error!(
                read = entry.line_count,
                processed = transformed.processed_count,
                skipped = transformed.skipped_count,
                "not all lines from {} were processed",
                name
            );
            validated = false;
        } else {
            info!("all lines read from {} were processed", name);
        }

        if entry.line_count != written.written_line_count + transformed.skipped_count {
            error!(
                read = entry.line_count,
                written = written.written_line_count,
                skipped = transformed.skipped_count,
                "not all lines from {} were written",
                name
            );
            validated = false;
        } else {
            info!("all lines read from {} were written after processing", name);
        }

        if validated {
            info!("processing of {} completed successfully", name);
        } else {
            error!("error occurred while processing {}", name);
        }

        Self {
            source_name: name.clone(),
            line_count: entry.line_count,
            processed_count: transformed.processed_count,
            skipped_count: transformed.skipped_count,
            written_line_count: written.written_line_count,
            written_objects: written.written_objects,
            validated,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub status: Status,
    pub entries: Vec<EntryReport>,
}

impl RunReport {
    fn from_entries(entries: Vec<EntryReport>) -> Self {
        let status = if entries.iter().all(|e| e.validated) {
            Status::Ok
        } else {
            Status::Error
        };
        Self { status, entries }
    }

    pub fn response(&self) -> InvocationResponse {
        InvocationResponse {
            status: self.status,
        }
    }

    /// Every object written, across all entries, in write order.
    pub fn written_objects(&self) -> impl Iterator<Item = &WrittenObject> {
        self.entries.iter().flat_map(|e| e.written_objects.iter())
    }
}

/// Fetch the archive at `source_bucket`/`source_key`, split every CSV member
/// into one object per calendar day under `destination_bucket`/`destination_prefix`,
/// and reconcile line counts per member.
///
/// A reconciliation failure only flips the returned status to `Error`; storage,
/// archive and structural CSV failures abort the run. Objects already written
/// are left in place.
#[instrument(level = "info", skip(storage))]
pub async fn run(
    storage: &dyn ObjectStorage,
    source_bucket: &str,
    source_key: &str,
    destination_bucket: &str,
    destination_prefix: &str,
) -> Result<RunReport, PipelineError> {
    info!("downloading object {}/{}", source_bucket, source_key);
    let archive_bytes = storage
        .get_object(source_bucket, source_key)
        .await
        .map_err(PipelineError::Fetch)?;

    info!("opening and retrieving CSV files from {}", source_key);
    let entries = extract_csv_entries(&archive_bytes)?;
    drop(archive_bytes);
    if entries.is_empty() {
        info!("no CSV files in {}; nothing to do", source_key);
    }

    let mut reports = Vec::with_capacity(entries.len());
    for entry in entries {
        info!("processing data from {}", entry.name);
        let transformed = transform(&entry.name, &entry.lines)?;

        info!("writing processed data from {}", entry.name);
        let written = write_partitions(
            storage,
            destination_bucket,
            destination_prefix,
            &transformed.date_index,
        )
        .await?;

        info!("validating written data from {}", entry.name);
        reports.push(EntryReport::reconcile(&entry, &transformed, written));
    }

    let report = RunReport::from_entries(reports);
    info!(status = ?report.status, entries = report.entries.len(), "run finished");
    Ok(report)
}

/// `run` driven by an invocation event.
pub async fn run_event(
    storage: &dyn ObjectStorage,
    event: &InvocationEvent,
) -> Result<RunReport, PipelineError> {
    info!("handler invoked for {}/{}", event.src_bucket, event.key);
    run(
        storage,
        &event.src_bucket,
        &event.key,
        &event.dst_bucket,
        &event.dst_prefix,
    )
    .await
}
