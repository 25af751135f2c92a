// src/storage/local.rs
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::ObjectStorage;
use crate::error::StorageError;

/// Filesystem-backed store: object `bucket`/`key` lives at `<root>/<bucket>/<key>`.
/// Content types are not persisted.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StorageError> {
        let rel = Path::new(bucket).join(key);
        if rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(StorageError::Backend(format!(
                "refusing object path outside storage root: {}",
                rel.display()
            )));
        }
        Ok(self.root.join(rel))
    }
}

fn map_io(err: std::io::Error, bucket: &str, key: &str) -> StorageError {
    match err.kind() {
        ErrorKind::NotFound => StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        ErrorKind::PermissionDenied => StorageError::AccessDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        _ => StorageError::Io(err),
    }
}

#[async_trait]
impl ObjectStorage for LocalStorage {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.object_path(bucket, key)?;
        debug!(path = %path.display(), "reading local object");
        fs::read(&path).await.map_err(|e| map_io(e, bucket, key))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), StorageError> {
        let path = self.object_path(bucket, key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| map_io(e, bucket, key))?;
        }
        debug!(path = %path.display(), bytes = body.len(), "writing local object");
        fs::write(&path, body).await.map_err(|e| map_io(e, bucket, key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn round_trips_nested_keys() {
        let dir = TempDir::new().unwrap();
        let store = LocalStorage::new(dir.path());

        store
            .put_object("dst", "daily/2020/01/2020_01_01.csv", b"a,b\r\n".to_vec(), "text/csv")
            .await
            .unwrap();

        assert!(dir.path().join("dst/daily/2020/01/2020_01_01.csv").is_file());
        let body = store.get_object("dst", "daily/2020/01/2020_01_01.csv").await.unwrap();
        assert_eq!(body, b"a,b\r\n");
    }

    #[tokio::test]
    async fn missing_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let store = LocalStorage::new(dir.path());
        let err = store.get_object("src", "nope.zip").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[tokio::test]
    async fn parent_components_are_rejected() {
        let dir = TempDir::new().unwrap();
        let store = LocalStorage::new(dir.path());
        let err = store
            .put_object("dst", "../escape.csv", Vec::new(), "text/csv")
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Backend(_)));
    }
}
