use crate::storage::{ObjectStore, StoreError, StoreErrorKind};
use crate::{ImageObject, ObjectNaming, Result, S3gError};
use std::sync::Arc;

pub const IMAGE_CONTENT_TYPE: &str = "application/octet-stream";

/// ImageStore resolves image ids to object keys and performs one object-store round trip per
/// call. It holds no mutable state and is shared across requests.
#[derive(Clone)]
pub struct ImageStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    naming: ObjectNaming,
}

impl ImageStore {
    /// Builds the store and makes sure the bucket exists, creating it if absent.
    pub async fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Result<Self> {
        Self::with_naming(store, bucket, ObjectNaming::default()).await
    }

    pub async fn with_naming(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        naming: ObjectNaming,
    ) -> Result<Self> {
        let image_store = Self {
            store,
            bucket: bucket.into(),
            naming,
        };
        image_store.ensure_bucket().await?;
        Ok(image_store)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub async fn ensure_bucket(&self) -> Result<()> {
        let exists = self
            .store
            .bucket_exists(&self.bucket)
            .await
            .map_err(|source| S3gError::BucketCheck {
                bucket: self.bucket.clone(),
                source,
            })?;

        if exists {
            tracing::debug!("Bucket {} already exists", self.bucket);
            return Ok(());
        }

        self.store
            .create_bucket(&self.bucket)
            .await
            .map_err(|source| S3gError::BucketCreate {
                bucket: self.bucket.clone(),
                source,
            })?;
        tracing::info!("Created bucket {}", self.bucket);

        Ok(())
    }

    pub async fn get(&self, id: u64) -> Result<ImageObject> {
        let key = self.naming.key_for(id);

        // A failed stat ends the request; the object is never fetched.
        self.store
            .stat_object(&self.bucket, &key)
            .await
            .map_err(|source| self.classified_error(&key, source))?;

        let contents = self
            .store
            .get_object(&self.bucket, &key)
            .await
            .map_err(|source| self.classified_error(&key, source))?;

        tracing::debug!(
            "Fetched object {}/{} ({} bytes)",
            self.bucket,
            key,
            contents.len()
        );

        Ok(ImageObject { id, contents })
    }

    pub async fn put(&self, object: ImageObject) -> Result<()> {
        let key = self.naming.key_for(object.id);
        let size = object.size();

        self.store
            .put_object(&self.bucket, &key, object.contents, IMAGE_CONTENT_TYPE)
            .await
            .map_err(|source| S3gError::Put {
                key: key.clone(),
                source,
            })?;

        tracing::debug!("Uploaded object {}/{} ({} bytes)", self.bucket, key, size);
        Ok(())
    }

    fn classified_error(&self, key: &str, source: StoreError) -> S3gError {
        match source.kind() {
            StoreErrorKind::AccessDenied => S3gError::AccessDenied {
                bucket: self.bucket.clone(),
                key: key.to_string(),
                source,
            },
            StoreErrorKind::NoSuchBucket => S3gError::NoSuchBucket {
                bucket: self.bucket.clone(),
                source,
            },
            StoreErrorKind::InvalidBucketName => S3gError::InvalidBucketName {
                bucket: self.bucket.clone(),
                source,
            },
            StoreErrorKind::NoSuchKey => S3gError::NoSuchKey {
                key: key.to_string(),
                source,
            },
            StoreErrorKind::Transport => S3gError::Get {
                key: key.to_string(),
                source,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::InMemoryObjectStore;
    use bytes::Bytes;

    async fn new_store() -> (Arc<InMemoryObjectStore>, ImageStore) {
        let backend = Arc::new(InMemoryObjectStore::new());
        let store = ImageStore::new(backend.clone(), "images").await.unwrap();
        (backend, store)
    }

    #[tokio::test]
    async fn test_new_creates_missing_bucket() {
        let backend = Arc::new(InMemoryObjectStore::new());
        assert!(!backend.bucket_exists("images").await.unwrap());

        let store = ImageStore::new(backend.clone(), "images").await.unwrap();
        assert_eq!(store.bucket(), "images");
        assert!(backend.bucket_exists("images").await.unwrap());

        // Existing buckets are left alone.
        ImageStore::new(backend.clone(), "images").await.unwrap();
    }

    #[tokio::test]
    async fn test_new_fails_when_bucket_check_fails() {
        let backend = Arc::new(InMemoryObjectStore::new());
        backend.fail_with(Some(StoreErrorKind::AccessDenied)).await;

        let err = ImageStore::new(backend, "images").await.err().unwrap();
        assert!(matches!(err, S3gError::BucketCheck { ref bucket, .. } if bucket == "images"));
    }

    #[tokio::test]
    async fn test_put_get_roundtrip() {
        let (backend, store) = new_store().await;

        store
            .put(ImageObject::new(1, Bytes::from_static(b"hello world")))
            .await
            .unwrap();

        let object = store.get(1).await.unwrap();
        assert_eq!(object.id, 1);
        assert_eq!(object.contents, Bytes::from_static(b"hello world"));
        assert_eq!(
            backend.content_type("images", "image/1").await.as_deref(),
            Some(IMAGE_CONTENT_TYPE)
        );
    }

    #[tokio::test]
    async fn test_custom_prefix_is_used_for_keys() {
        let backend = Arc::new(InMemoryObjectStore::new());
        let store = ImageStore::with_naming(backend.clone(), "images", ObjectNaming::new("thumbs"))
            .await
            .unwrap();

        store.put(ImageObject::new(7, "small")).await.unwrap();
        assert!(backend.content_type("images", "thumbs/7").await.is_some());
        assert!(backend.content_type("images", "image/7").await.is_none());

        let err = store.get(8).await.unwrap_err();
        assert!(matches!(err, S3gError::NoSuchKey { ref key, .. } if key == "thumbs/8"));
    }

    #[tokio::test]
    async fn test_empty_payload_is_preserved() {
        let (_backend, store) = new_store().await;

        store.put(ImageObject::new(1, Bytes::new())).await.unwrap();

        let object = store.get(1).await.unwrap();
        assert!(object.contents.is_empty());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let (backend, store) = new_store().await;

        store.put(ImageObject::new(5, "first")).await.unwrap();
        store.put(ImageObject::new(5, "second")).await.unwrap();

        assert_eq!(store.get(5).await.unwrap().contents, Bytes::from("second"));
        assert_eq!(backend.object_count("images").await, 1);
    }

    #[tokio::test]
    async fn test_missing_id_is_not_found() {
        let (_backend, store) = new_store().await;

        let err = store.get(42).await.unwrap_err();
        assert!(err.is_not_found());
        match err {
            S3gError::NoSuchKey { key, .. } => assert_eq!(key, "image/42"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_get_error_kinds_carry_context() {
        let (backend, store) = new_store().await;

        backend.fail_with(Some(StoreErrorKind::AccessDenied)).await;
        let err = store.get(3).await.unwrap_err();
        assert!(matches!(
            err,
            S3gError::AccessDenied { ref bucket, ref key, .. } if bucket == "images" && key == "image/3"
        ));

        backend.fail_with(Some(StoreErrorKind::NoSuchBucket)).await;
        let err = store.get(3).await.unwrap_err();
        assert!(matches!(err, S3gError::NoSuchBucket { ref bucket, .. } if bucket == "images"));

        backend.fail_with(Some(StoreErrorKind::InvalidBucketName)).await;
        let err = store.get(3).await.unwrap_err();
        assert!(matches!(err, S3gError::InvalidBucketName { .. }));

        backend.fail_with(Some(StoreErrorKind::Transport)).await;
        let err = store.get(3).await.unwrap_err();
        assert!(matches!(err, S3gError::Get { ref key, .. } if key == "image/3"));
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_put_failure_includes_key() {
        let (backend, store) = new_store().await;
        backend.fail_with(Some(StoreErrorKind::Transport)).await;

        let err = store.put(ImageObject::new(9, "data")).await.unwrap_err();
        assert!(matches!(err, S3gError::Put { ref key, .. } if key == "image/9"));
        assert!(err.to_string().contains("image/9"));
    }
}
