use crate::pb::s3_gateway_client::S3GatewayClient;
use crate::pb::{GetImageObjectRequest, ImageObject as PbImageObject};
use crate::server::MAX_MESSAGE_SIZE;
use bytes::Bytes;
use s3g_core::{ImageObject, Result, S3gError};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use tonic::Status;
use tonic::transport::Channel;

pub type GatewayClient = S3GatewayClient<Channel>;

pub async fn connect(addr: &str) -> Result<GatewayClient> {
    let endpoint = endpoint_url(addr);
    let client = S3GatewayClient::connect(endpoint.clone())
        .await
        .map_err(|e| S3gError::Rpc(format!("failed to connect to {}: {}", endpoint, e)))?;

    Ok(client
        .max_decoding_message_size(MAX_MESSAGE_SIZE)
        .max_encoding_message_size(MAX_MESSAGE_SIZE))
}

pub async fn put_object(client: &mut GatewayClient, id: u64, contents: Bytes) -> Result<()> {
    client
        .put_image_object(PbImageObject { id, contents })
        .await
        .map_err(status_error)?;
    Ok(())
}

pub async fn get_object(client: &mut GatewayClient, id: u64) -> Result<ImageObject> {
    let response = client
        .get_image_object(GetImageObjectRequest { id })
        .await
        .map_err(status_error)?;
    Ok(response.into_inner().into())
}

/// Uploads a local file as image `id`.
pub async fn put_file(addr: &str, id: u64, file: &Path) -> Result<usize> {
    let contents = tokio::fs::read(file).await?;
    let size = contents.len();

    let mut client = connect(addr).await?;
    put_object(&mut client, id, Bytes::from(contents)).await?;
    Ok(size)
}

/// Downloads image `id` into `output`, or to stdout when no path is given.
pub async fn get_to(addr: &str, id: u64, output: Option<&Path>) -> Result<usize> {
    let mut client = connect(addr).await?;
    let object = get_object(&mut client, id).await?;

    match output {
        Some(path) => tokio::fs::write(path, &object.contents).await?,
        None => {
            let mut stdout = tokio::io::stdout();
            stdout.write_all(&object.contents).await?;
            stdout.flush().await?;
        }
    }

    Ok(object.size())
}

fn status_error(status: Status) -> S3gError {
    S3gError::Rpc(format!("{:?}: {}", status.code(), status.message()))
}

fn endpoint_url(addr: &str) -> String {
    let addr = addr.trim();
    if addr.starts_with("http://") || addr.starts_with("https://") {
        addr.to_string()
    } else if addr.starts_with(':') {
        format!("http://127.0.0.1{}", addr)
    } else {
        format!("http://{}", addr)
    }
}
