// src/storage/mod.rs
use async_trait::async_trait;

use crate::error::StorageError;

pub mod local;
pub mod memory;
pub mod s3;

pub use local::LocalStorage;
pub use memory::{MemoryStorage, StoredObject};
pub use s3::S3Storage;

/// Bucket/key object store the pipeline reads its archive from and writes
/// its daily CSV files to.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Create or overwrite `bucket`/`key`.
    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;
}
