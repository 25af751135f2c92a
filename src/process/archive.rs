// src/process/archive.rs
use std::io::{Cursor, Read};

use tracing::{debug, info, instrument};
use zip::ZipArchive;

use crate::error::ArchiveError;

/// One `.csv` member of the source archive, fully buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Member name inside the archive.
    pub name: String,
    /// Raw text lines, header included, each with its line terminator.
    pub lines: Vec<String>,
    /// Number of data lines (`lines.len() - 1`).
    pub line_count: usize,
}

impl ArchiveEntry {
    pub fn new(name: impl Into<String>, lines: Vec<String>) -> Self {
        let line_count = lines.len().saturating_sub(1);
        Self {
            name: name.into(),
            lines,
            line_count,
        }
    }
}

/// Upper bound on the buffer reserved from a member's declared size.
const MAX_PREALLOC: u64 = 1 << 26;

fn is_csv_member(name: &str) -> bool {
    name.ends_with(".csv")
}

fn initial_capacity(declared_size: u64) -> usize {
    declared_size.min(MAX_PREALLOC) as usize
}

/// Open the zip held in `archive_bytes` and buffer every `.csv` member,
/// in archive order. Other members are ignored.
#[instrument(level = "info", skip(archive_bytes), fields(bytes = archive_bytes.len()))]
pub fn extract_csv_entries(archive_bytes: &[u8]) -> Result<Vec<ArchiveEntry>, ArchiveError> {
    let mut archive = ZipArchive::new(Cursor::new(archive_bytes))?;

    let mut entries = Vec::new();
    for index in 0..archive.len() {
        // decide on the name alone so non-CSV members are never opened
        let name = match archive.name_for_index(index) {
            Some(name) if is_csv_member(name) => name.to_string(),
            other => {
                debug!(name = ?other, "skipping non-CSV member");
                continue;
            }
        };

        let mut member = archive
            .by_index(index)
            .map_err(|source| ArchiveError::Entry { index, source })?;
        if !member.is_file() {
            debug!(name = %name, "skipping non-file member");
            continue;
        }
        debug!(name = %name, "CSV file found in archive");

        let mut buf = Vec::with_capacity(initial_capacity(member.size()));
        member
            .read_to_end(&mut buf)
            .map_err(|source| ArchiveError::Read {
                name: name.clone(),
                source,
            })?;

        let text = String::from_utf8_lossy(&buf);
        let lines: Vec<String> = text.split_inclusive('\n').map(str::to_string).collect();
        let entry = ArchiveEntry::new(name, lines);
        info!(name = %entry.name, lines = entry.line_count, "CSV file read into memory");
        entries.push(entry);
    }

    Ok(entries)
}
