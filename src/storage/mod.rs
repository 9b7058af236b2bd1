//! Object storage read side: fetch one object's bytes by bucket and key.

mod s3;

pub use s3::S3ObjectStore;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[cfg(test)]
use mockall::automock;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object s3://{bucket}/{key} not found")]
    NotFound { bucket: String, key: String },
    #[error("Storage request failed: {0}")]
    Request(String),
    #[error("Failed to read object body: {0}")]
    Body(String),
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;
}

#[async_trait]
impl<T: ObjectStore + ?Sized> ObjectStore for std::sync::Arc<T> {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        (**self).get_object(bucket, key).await
    }
}
