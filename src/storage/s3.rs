// src/storage/s3.rs
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, info};

use super::ObjectStorage;
use crate::error::StorageError;

const HTTP_FORBIDDEN: u16 = 403;

/// Amazon S3 (or S3-compatible) backend.
#[derive(Debug, Clone)]
pub struct S3Storage {
    client: Client,
}

impl S3Storage {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the default AWS credential/region chain.
    /// `endpoint_url` points at an S3-compatible service and switches to
    /// path-style addressing.
    pub async fn from_env(endpoint_url: Option<&str>) -> Self {
        let shared = aws_config::defaults(BehaviorVersion::latest()).load().await;
        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(url) = endpoint_url {
            info!(endpoint = url, "using custom S3 endpoint");
            builder = builder.endpoint_url(url).force_path_style(true);
        }
        Self::new(Client::from_conf(builder.build()))
    }
}

fn backend_error<E, R>(err: SdkError<E, R>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    match err {
        SdkError::ServiceError(service) => StorageError::Backend(service.into_err().to_string()),
        other => StorageError::Backend(format!("{:?}", other)),
    }
}

fn is_forbidden<E>(err: &SdkError<E, aws_sdk_s3::config::http::HttpResponse>) -> bool {
    err.raw_response()
        .map(|r| r.status().as_u16() == HTTP_FORBIDDEN)
        .unwrap_or(false)
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StorageError> {
        debug!(bucket, key, "GetObject");
        let response = match self.client.get_object().bucket(bucket).key(key).send().await {
            Ok(r) => r,
            Err(e) if is_forbidden(&e) => {
                return Err(StorageError::AccessDenied {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            Err(SdkError::ServiceError(s)) if s.err().is_no_such_key() => {
                return Err(StorageError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                })
            }
            Err(e) => return Err(backend_error(e)),
        };

        let body = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(body.into_bytes().to_vec())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        debug!(bucket, key, bytes = body.len(), "PutObject");
        match self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if is_forbidden(&e) => Err(StorageError::AccessDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }),
            Err(e) => Err(backend_error(e)),
        }
    }
}
