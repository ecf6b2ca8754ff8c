//! s3g core - image objects stored in S3-compatible object stores
//!
//! - [`ObjectNaming`] maps numeric ids to `image/{id}` keys
//! - [`ObjectStore`] abstracts the remote store; [`S3ObjectStore`] and
//!   [`InMemoryObjectStore`] implement it
//! - [`ImageStore`] is the get/put adapter used by the gateway

pub mod error;
pub mod image_store;
pub mod model;
pub mod naming;
pub mod storage;

pub use error::{Result, S3gError};
pub use image_store::{IMAGE_CONTENT_TYPE, ImageStore};
pub use model::ImageObject;
pub use naming::{DEFAULT_IMAGE_PREFIX, ObjectNaming};
pub use storage::{
    InMemoryObjectStore, ObjectStat, ObjectStore, S3ObjectStore, S3StoreConfig, StoreError,
    StoreErrorKind, StoreResult, classify_error_code,
};
