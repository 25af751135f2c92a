// src/process/transform.rs
use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info, instrument, warn};

use crate::error::TransformError;
use crate::process::record::{DateIndex, ProjectedRecord, FIELD_COUNT, SELECTED_FIELDS};

/// Outcome of transforming one CSV entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    pub source_name: String,
    pub processed_count: usize,
    pub skipped_count: usize,
    pub date_index: DateIndex,
}

impl TransformResult {
    /// Data rows seen, whether kept or skipped.
    pub fn rows_seen(&self) -> usize {
        self.processed_count + self.skipped_count
    }
}

/// Column position of every selected field in the header, `None` when the
/// header lacks it. Duplicate header names resolve to the last occurrence.
fn locate_fields(headers: &StringRecord) -> [Option<usize>; FIELD_COUNT] {
    let mut positions = [None; FIELD_COUNT];
    for (slot, field) in positions.iter_mut().zip(SELECTED_FIELDS) {
        *slot = headers
            .iter()
            .enumerate()
            .filter(|(_, h)| *h == field)
            .last()
            .map(|(i, _)| i);
    }
    positions
}

/// Copy the selected columns out of `row`. On failure, returns the first
/// selected field the row does not carry.
fn project(
    row: &StringRecord,
    positions: &[Option<usize>; FIELD_COUNT],
) -> Result<ProjectedRecord, &'static str> {
    let mut values: [String; FIELD_COUNT] = Default::default();
    for (i, value) in values.iter_mut().enumerate() {
        let raw = positions[i]
            .and_then(|p| row.get(p))
            .ok_or(SELECTED_FIELDS[i])?;
        *value = raw.to_string();
    }
    Ok(ProjectedRecord::new(values))
}

/// Parse the lines of one CSV entry (first line is the header), project every
/// data row onto `SELECTED_FIELDS` and bucket it by its calendar day.
///
/// Rows missing a selected field, or whose `Year`/`Month`/`DayofMonth` is not
/// an integer, are logged and counted as skipped.
#[instrument(level = "info", skip(lines), fields(entry = %entry_name))]
pub fn transform(entry_name: &str, lines: &[String]) -> Result<TransformResult, TransformError> {
    info!("processing CSV file {}", entry_name);

    let missing_header = || TransformError::MissingHeader {
        source_name: entry_name.to_string(),
    };
    match lines.first() {
        Some(header) if !header.trim().is_empty() => {}
        _ => return Err(missing_header()),
    }

    // lines from the archive keep their terminators; bare lines get `\n`
    let mut text = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        text.push_str(line);
        if !line.ends_with('\n') {
            text.push('\n');
        }
    }
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // short rows are skipped per-row, not rejected wholesale
        .from_reader(text.as_bytes());

    let headers = rdr
        .headers()
        .map_err(|source| TransformError::Csv {
            source_name: entry_name.to_string(),
            source,
        })?
        .clone();
    if headers.is_empty() {
        return Err(missing_header());
    }
    if tracing::enabled!(tracing::Level::DEBUG) {
        let mut names: Vec<&str> = headers.iter().collect();
        names.sort_unstable();
        debug!(fieldnames = ?names, "CSV header");
    }

    let positions = locate_fields(&headers);
    let mut date_index = DateIndex::new();
    let mut processed_count = 0;
    let mut skipped_count = 0;

    for (idx, result) in rdr.records().enumerate() {
        let row = result.map_err(|source| TransformError::Csv {
            source_name: entry_name.to_string(),
            source,
        })?;

        let record = match project(&row, &positions) {
            Ok(record) => record,
            Err(field) => {
                warn!(row = idx + 1, field, "row lacks a selected field, skipping");
                skipped_count += 1;
                continue;
            }
        };

        match record.date_key() {
            Ok(key) => {
                date_index.insert(key, record);
                processed_count += 1;
            }
            Err(e) => {
                warn!(row = idx + 1, "bad date in row, skipping: {}", e);
                skipped_count += 1;
            }
        }
    }

    info!(
        processed = processed_count,
        skipped = skipped_count,
        days = date_index.len(),
        "processed {} lines from {}",
        processed_count,
        entry_name
    );

    Ok(TransformResult {
        source_name: entry_name.to_string(),
        processed_count,
        skipped_count,
        date_index,
    })
}
