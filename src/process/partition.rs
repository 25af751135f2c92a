// src/process/partition.rs
use csv::{Terminator, WriterBuilder};
use tracing::{debug, info, instrument};

use crate::error::WriteError;
use crate::process::record::{DateIndex, DateKey, ProjectedRecord, SELECTED_FIELDS};
use crate::storage::ObjectStorage;

pub const CSV_CONTENT_TYPE: &str = "text/csv";

/// Location of one object created by `write_partitions`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenObject {
    pub bucket: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteResult {
    /// Data rows written across all objects (headers excluded).
    pub written_line_count: usize,
    pub written_objects: Vec<WrittenObject>,
}

/// `<prefix>/<YYYY>/<MM>/<YYYY>_<MM>_<DD>.csv`
///
/// Trailing slashes on `prefix` are dropped; an empty prefix yields a key
/// starting at the year directory.
pub fn object_key(prefix: &str, day: &DateKey) -> String {
    let file = format!(
        "{:04}/{:02}/{:04}_{:02}_{:02}.csv",
        day.year, day.month, day.year, day.month, day.day
    );
    let prefix = prefix.trim_end_matches('/');
    if prefix.is_empty() {
        file
    } else {
        format!("{}/{}", prefix, file)
    }
}

/// Serialize one day's records: header of `SELECTED_FIELDS`, then one row per
/// record, values written verbatim with minimal quoting and CRLF line ends.
pub fn serialize_day(records: &[ProjectedRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = WriterBuilder::new()
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new());

    wtr.write_record(SELECTED_FIELDS)?;
    for record in records {
        wtr.write_record(record.values())?;
    }
    wtr.into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Write every day bucket of `index` as its own CSV object under
/// `bucket`/`prefix`. Objects already present at a key are overwritten.
#[instrument(level = "info", skip(storage, index), fields(days = index.len()))]
pub async fn write_partitions(
    storage: &dyn ObjectStorage,
    bucket: &str,
    prefix: &str,
    index: &DateIndex,
) -> Result<WriteResult, WriteError> {
    let mut result = WriteResult::default();

    for (day, records) in index {
        let key = object_key(prefix, day);
        let body = serialize_day(records).map_err(|source| WriteError::Serialize {
            key: key.clone(),
            source,
        })?;

        debug!(key = %key, bytes = body.len(), "putting CSV object");
        storage
            .put_object(bucket, &key, body, CSV_CONTENT_TYPE)
            .await
            .map_err(|source| WriteError::Put {
                bucket: bucket.to_string(),
                key: key.clone(),
                source,
            })?;

        result.written_line_count += records.len();
        info!(key = %key, lines = records.len(), "data file written");
        result.written_objects.push(WrittenObject {
            bucket: bucket.to_string(),
            key,
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::process::record::record_for;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;

    fn sample_index() -> DateIndex {
        let mut idx = DateIndex::new();
        idx.insert(DateKey::new(2020, 1, 2), record_for("2020", "1", "2", "c"));
        idx.insert(DateKey::new(2020, 1, 1), record_for("2020", "1", "1", "a"));
        idx.insert(DateKey::new(2020, 1, 1), record_for("2020", "1", "1", "b"));
        idx
    }

    #[test]
    fn key_is_zero_padded() {
        let key = object_key("out/flights", &DateKey::new(2015, 3, 9));
        assert_eq!(key, "out/flights/2015/03/2015_03_09.csv");
    }

    #[test]
    fn key_prefix_is_normalised() {
        let day = DateKey::new(987, 12, 31);
        assert_eq!(object_key("p/", &day), "p/0987/12/0987_12_31.csv");
        assert_eq!(object_key("", &day), "0987/12/0987_12_31.csv");
    }

    #[test]
    fn serialized_day_has_fixed_header_and_quoting() {
        let mut rec = record_for("2020", "1", "1", "say \"hi\", ok");
        let text = String::from_utf8(serialize_day(std::slice::from_ref(&rec)).unwrap()).unwrap();
        let mut lines = text.split("\r\n");
        assert_eq!(lines.next().unwrap(), SELECTED_FIELDS.join(","));
        assert_eq!(
            lines.next().unwrap(),
            "2020,1,1,,,,\"say \"\"hi\"\", ok\",,,,,,,,,,,"
        );
        assert_eq!(lines.next(), Some(""));

        rec = record_for("2020", "1", "1", "multi\nline");
        let text = String::from_utf8(serialize_day(&[rec]).unwrap()).unwrap();
        assert!(text.contains("\"multi\nline\""));
    }

    #[tokio::test]
    async fn writes_one_object_per_day() {
        let store = MemoryStorage::new();
        let result = write_partitions(&store, "dst", "daily", &sample_index())
            .await
            .unwrap();

        assert_eq!(result.written_line_count, 3);
        let keys: Vec<_> = result.written_objects.iter().map(|o| o.key.as_str()).collect();
        assert_eq!(keys, ["daily/2020/01/2020_01_01.csv", "daily/2020/01/2020_01_02.csv"]);
        assert!(result.written_objects.iter().all(|o| o.bucket == "dst"));

        let stored = store.object("dst", "daily/2020/01/2020_01_01.csv").unwrap();
        assert_eq!(stored.content_type, CSV_CONTENT_TYPE);
        let body = String::from_utf8(stored.body).unwrap();
        let flights: Vec<_> = body
            .lines()
            .skip(1)
            .map(|l| l.split(',').nth(6).unwrap())
            .collect();
        assert_eq!(flights, ["a", "b"]);
    }

    #[tokio::test]
    async fn rewriting_is_idempotent() {
        let store = MemoryStorage::new();
        let idx = sample_index();
        let first = write_partitions(&store, "dst", "daily", &idx).await.unwrap();
        let snapshot = store.object("dst", "daily/2020/01/2020_01_01.csv").unwrap();

        let second = write_partitions(&store, "dst", "daily", &idx).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.object("dst", "daily/2020/01/2020_01_01.csv").unwrap(),
            snapshot
        );
    }

    struct RejectingStorage;

    #[async_trait]
    impl ObjectStorage for RejectingStorage {
        async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
            Err(StorageError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
        }

        async fn put_object(
            &self,
            bucket: &str,
            key: &str,
            _body: Vec<u8>,
            _content_type: &str,
        ) -> Result<(), StorageError> {
            Err(StorageError::AccessDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn rejected_put_is_a_write_error() {
        let err = write_partitions(&RejectingStorage, "dst", "daily", &sample_index())
            .await
            .unwrap_err();
        match err {
            WriteError::Put { bucket, key, .. } => {
                assert_eq!(bucket, "dst");
                assert_eq!(key, "daily/2020/01/2020_01_01.csv");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
