use crate::storage::StoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, S3gError>;

#[derive(Error, Debug)]
pub enum S3gError {
    #[error("missing key {0} in env")]
    MissingConfig(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("could not check if bucket {bucket} exists: {source}")]
    BucketCheck {
        bucket: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to create bucket {bucket}: {source}")]
    BucketCreate {
        bucket: String,
        #[source]
        source: StoreError,
    },

    #[error("access denied to object {key} in bucket {bucket}: {source}")]
    AccessDenied {
        bucket: String,
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("bucket {bucket} does not exist: {source}")]
    NoSuchBucket {
        bucket: String,
        #[source]
        source: StoreError,
    },

    #[error("invalid bucket name {bucket}: {source}")]
    InvalidBucketName {
        bucket: String,
        #[source]
        source: StoreError,
    },

    #[error("object {key} was not found: {source}")]
    NoSuchKey {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to get s3 object {key}: {source}")]
    Get {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to upload s3 object {key}: {source}")]
    Put {
        key: String,
        #[source]
        source: StoreError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rpc error: {0}")]
    Rpc(String),

    #[error("server error: {0}")]
    Server(String),
}

impl S3gError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, S3gError::NoSuchKey { .. })
    }
}
