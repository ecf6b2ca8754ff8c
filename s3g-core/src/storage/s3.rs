use super::{ObjectStat, ObjectStore, StoreError, StoreErrorKind, StoreResult};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::config::retry::RetryConfig;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{BucketLocationConstraint, CreateBucketConfiguration};
use bytes::Bytes;

const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone)]
pub struct S3StoreConfig {
    /// Full endpoint url including the scheme, e.g. `http://127.0.0.1:9000`.
    pub endpoint: String,
    pub region: String,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl S3StoreConfig {
    /// Builds the endpoint url from a bare `host:port` address. Addresses that already carry a
    /// scheme are kept as they are.
    pub fn endpoint_from_addr(addr: &str, secure: bool) -> String {
        let addr = addr.trim().trim_end_matches('/');
        if addr.starts_with("http://") || addr.starts_with("https://") {
            return addr.to_string();
        }

        let scheme = if secure { "https" } else { "http" };
        format!("{}://{}", scheme, addr)
    }
}

/// S3ObjectStore talks to any S3-compatible service (AWS, MinIO, ...) using path-style
/// addressing. The SDK retry layer is disabled: every call is a single round trip.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    region: String,
}

impl S3ObjectStore {
    pub fn new(config: &S3StoreConfig) -> Self {
        let credentials = Credentials::new(
            config.access_key_id.clone(),
            config.secret_access_key.clone(),
            None,
            None,
            "s3g-static",
        );

        let s3_config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(config.endpoint.clone())
            .credentials_provider(credentials)
            .force_path_style(true)
            .retry_config(RetryConfig::disabled())
            .build();

        Self {
            client: Client::from_conf(s3_config),
            region: config.region.clone(),
        }
    }
}

/// Maps provider error codes (and, for bodiless responses such as HEAD, the HTTP status) to a
/// [`StoreErrorKind`].
pub fn classify_error_code(code: Option<&str>, status: Option<u16>) -> StoreErrorKind {
    match code {
        Some("AccessDenied") => return StoreErrorKind::AccessDenied,
        Some("NoSuchBucket") => return StoreErrorKind::NoSuchBucket,
        Some("InvalidBucketName") => return StoreErrorKind::InvalidBucketName,
        Some("NoSuchKey") | Some("NotFound") => return StoreErrorKind::NoSuchKey,
        _ => {}
    }

    match status {
        Some(403) => StoreErrorKind::AccessDenied,
        Some(404) => StoreErrorKind::NoSuchKey,
        _ => StoreErrorKind::Transport,
    }
}

fn classify<E>(error: &SdkError<E, HttpResponse>) -> StoreErrorKind
where
    E: ProvideErrorMetadata,
{
    let code = error.as_service_error().and_then(|service| service.code());
    let status = error.raw_response().map(|response| response.status().as_u16());
    classify_error_code(code, status)
}

fn store_error<E>(error: SdkError<E, HttpResponse>) -> StoreError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let kind = classify(&error);
    StoreError::new(kind, error)
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn bucket_exists(&self, bucket: &str) -> StoreResult<bool> {
        match self.client.head_bucket().bucket(bucket).send().await {
            Ok(_) => Ok(true),
            Err(error) => {
                let not_found = error
                    .as_service_error()
                    .map(|service| service.is_not_found())
                    .unwrap_or(false)
                    || error
                        .raw_response()
                        .map(|response| response.status().as_u16() == 404)
                        .unwrap_or(false);
                if not_found {
                    Ok(false)
                } else {
                    Err(store_error(error))
                }
            }
        }
    }

    async fn create_bucket(&self, bucket: &str) -> StoreResult<()> {
        let mut request = self.client.create_bucket().bucket(bucket);
        if self.region != DEFAULT_REGION {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(self.region.as_str()))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => Ok(()),
            Err(error)
                if error
                    .as_service_error()
                    .map(|service| service.is_bucket_already_owned_by_you())
                    .unwrap_or(false) =>
            {
                tracing::debug!("Bucket {} already owned by us", bucket);
                Ok(())
            }
            Err(error) => Err(store_error(error)),
        }
    }

    async fn stat_object(&self, bucket: &str, key: &str) -> StoreResult<ObjectStat> {
        let output = self
            .client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(store_error)?;

        Ok(ObjectStat {
            size_bytes: output.content_length().unwrap_or(0).max(0) as u64,
            content_type: output.content_type().map(str::to_string),
        })
    }

    async fn get_object(&self, bucket: &str, key: &str) -> StoreResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(store_error)?;

        let body = output.body.collect().await.map_err(StoreError::transport)?;
        Ok(body.into_bytes())
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> StoreResult<()> {
        let content_length = body.len() as i64;
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type)
            .content_length(content_length)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(store_error)?;

        Ok(())
    }
}
