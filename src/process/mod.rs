// src/process/mod.rs
pub mod archive;
pub mod partition;
pub mod record;
pub mod transform;

pub use archive::{extract_csv_entries, ArchiveEntry};
pub use partition::{
    object_key, serialize_day, write_partitions, WriteResult, WrittenObject, CSV_CONTENT_TYPE,
};
pub use record::{DateIndex, DateKey, ProjectedRecord, FIELD_COUNT, SELECTED_FIELDS};
pub use transform::{transform, TransformResult};
