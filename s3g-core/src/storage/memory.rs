use super::{ObjectStat, ObjectStore, StoreError, StoreErrorKind, StoreResult};
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error)]
#[error("{0}")]
struct MemoryStoreError(String);

#[derive(Debug, Clone)]
struct StoredObject {
    body: Bytes,
    content_type: String,
}

/// Process-local object store keeping every bucket in memory.
///
/// A failure kind can be injected so callers can exercise their error paths.
#[derive(Default)]
pub struct InMemoryObjectStore {
    buckets: RwLock<HashMap<String, HashMap<String, StoredObject>>>,
    injected_failure: RwLock<Option<StoreErrorKind>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn fail_with(&self, kind: Option<StoreErrorKind>) {
        *self.injected_failure.write().await = kind;
    }

    pub async fn object_count(&self, bucket: &str) -> usize {
        self.buckets
            .read()
            .await
            .get(bucket)
            .map(|objects| objects.len())
            .unwrap_or(0)
    }

    pub async fn content_type(&self, bucket: &str, key: &str) -> Option<String> {
        self.buckets
            .read()
            .await
            .get(bucket)
            .and_then(|objects| objects.get(key))
            .map(|object| object.content_type.clone())
    }

    async fn check_injected(&self, op: &str) -> StoreResult<()> {
        match *self.injected_failure.read().await {
            Some(kind) => Err(StoreError::new(
                kind,
                MemoryStoreError(format!("injected failure during {}", op)),
            )),
            None => Ok(()),
        }
    }
}

fn missing_bucket(bucket: &str) -> StoreError {
    StoreError::new(
        StoreErrorKind::NoSuchBucket,
        MemoryStoreError(format!("bucket {} does not exist", bucket)),
    )
}

fn missing_key(bucket: &str, key: &str) -> StoreError {
    StoreError::new(
        StoreErrorKind::NoSuchKey,
        MemoryStoreError(format!("key {}/{} does not exist", bucket, key)),
    )
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> StoreResult<bool> {
        self.check_injected("bucket_exists").await?;
        Ok(self.buckets.read().await.contains_key(bucket))
    }

    async fn create_bucket(&self, bucket: &str) -> StoreResult<()> {
        self.check_injected("create_bucket").await?;
        self.buckets
            .write()
            .await
            .entry(bucket.to_string())
            .or_default();
        Ok(())
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectStat> {
        self.check_injected("stat_object").await?;
        let buckets = self.buckets.read().await;
        let objects = buckets.get(bucket).ok_or_else(|| missing_bucket(bucket))?;
        let object = objects.get(key).ok_or_else(|| missing_key(bucket, key))?;

        Ok(ObjectStat {
            size_bytes: object.body.len() as u64,
            content_type: Some(object.content_type.clone()),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        self.check_injected("get_object").await?;
        let buckets = self.buckets.read().await;
        let objects = buckets.get(bucket).ok_or_else(|| missing_bucket(bucket))?;
        objects
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| missing_key(bucket, key))
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()> {
        self.check_injected("put_object").await?;
        let mut buckets = self.buckets.write().await;
        let objects = buckets
            .get_mut(bucket)
            .ok_or_else(|| missing_bucket(bucket))?;
        objects.insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}
