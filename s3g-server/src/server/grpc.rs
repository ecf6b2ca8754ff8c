use crate::pb::s3_gateway_server::S3Gateway;
use crate::pb::{GetImageObjectRequest, ImageObject as PbImageObject};
use crate::telemetry::record_rpc;
use s3g_core::{ImageObject, ImageStore, S3gError};
use std::sync::Arc;
use std::time::Instant;
use tonic::{Request, Response, Status};

impl From<ImageObject> for PbImageObject {
    fn from(object: ImageObject) -> Self {
        Self {
            id: object.id,
            contents: object.contents,
        }
    }
}

impl From<PbImageObject> for ImageObject {
    fn from(object: PbImageObject) -> Self {
        Self {
            id: object.id,
            contents: object.contents,
        }
    }
}

/// Maps adapter errors to RPC statuses; the message keeps the key and bucket context.
pub(crate) fn status_from_error(error: &S3gError) -> Status {
    let message = error.to_string();
    match error {
        S3gError::NoSuchKey { .. } => Status::not_found(message),
        S3gError::AccessDenied { .. } => Status::permission_denied(message),
        S3gError::NoSuchBucket { .. } => Status::failed_precondition(message),
        S3gError::InvalidBucketName { .. } => Status::invalid_argument(message),
        _ => Status::internal(message),
    }
}

pub struct GatewayService {
    store: Arc<ImageStore>,
}

impl GatewayService {
    pub fn new(store: Arc<ImageStore>) -> Self {
        Self { store }
    }
}

#[tonic::async_trait]
impl S3Gateway for GatewayService {
    async fn get_image_object(
        &self,
        request: Request<GetImageObjectRequest>,
    ) -> Result<Response<PbImageObject>, Status> {
        let id = request.into_inner().id;
        let started = Instant::now();

        let result = self.store.get(id).await;
        record_rpc("GetImageObject", started, result.is_ok());

        match result {
            Ok(object) => Ok(Response::new(object.into())),
            Err(error) => {
                tracing::warn!("GetImageObject failed: id={} error={}", id, error);
                Err(status_from_error(&error))
            }
        }
    }

    async fn put_image_object(
        &self,
        request: Request<PbImageObject>,
    ) -> Result<Response<()>, Status> {
        let object: ImageObject = request.into_inner().into();
        let id = object.id;
        let size = object.size();
        let started = Instant::now();

        let result = self.store.put(object).await;
        record_rpc("PutImageObject", started, result.is_ok());

        match result {
            Ok(()) => Ok(Response::new(())),
            Err(error) => {
                tracing::warn!(
                    "PutImageObject failed: id={} size={} error={}",
                    id,
                    size,
                    error
                );
                Err(status_from_error(&error))
            }
        }
    }
}
