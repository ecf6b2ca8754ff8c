//! Object store backends for s3g
//!
//! [`ObjectStore`] is the seam between the image store and a concrete object-store client.
//! Backends classify provider failures into [`StoreErrorKind`] so callers never see
//! provider-specific error codes.

pub mod memory;
pub mod s3;

pub use memory::InMemoryObjectStore;
pub use s3::{S3ObjectStore, S3StoreConfig, classify_error_code};

use async_trait::async_trait;
use bytes::Bytes;
use std::fmt;
use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    AccessDenied,
    NoSuchBucket,
    InvalidBucketName,
    NoSuchKey,
    Transport,
}

impl StoreErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreErrorKind::AccessDenied => "access denied",
            StoreErrorKind::NoSuchBucket => "no such bucket",
            StoreErrorKind::InvalidBucketName => "invalid bucket name",
            StoreErrorKind::NoSuchKey => "no such key",
            StoreErrorKind::Transport => "transport failure",
        }
    }
}

impl fmt::Display for StoreErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("{kind}: {source}")]
pub struct StoreError {
    kind: StoreErrorKind,
    #[source]
    source: BoxError,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, source: impl Into<BoxError>) -> Self {
        Self {
            kind,
            source: source.into(),
        }
    }

    pub fn transport(source: impl Into<BoxError>) -> Self {
        Self::new(StoreErrorKind::Transport, source)
    }

    pub fn kind(&self) -> StoreErrorKind {
        self.kind
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectStat {
    pub size_bytes: u64,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn bucket_exists(&self, bucket: &str) -> StoreResult<bool>;

    async fn create_bucket(&self, bucket: &str) -> StoreResult<()>;

    async fn stat_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectStat>;

    /// Fetches the object and reads its body to the end.
    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes>;

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()>;
}
