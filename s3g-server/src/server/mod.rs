use crate::config::Config;
use crate::pb::s3_gateway_server::S3GatewayServer;
use crate::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use s3g_core::{ImageStore, ObjectStore, Result, S3ObjectStore, S3gError};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_stream::wrappers::TcpListenerStream;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

mod grpc;
mod http;

use grpc::GatewayService;

pub const MAX_MESSAGE_SIZE: usize = 64 * 1024 * 1024;

pub async fn run_server(config: Config, metrics: PrometheusHandle) -> Result<()> {
    let object_store: Arc<dyn ObjectStore> =
        Arc::new(S3ObjectStore::new(&config.s3_store_config()));
    let image_store =
        Arc::new(ImageStore::new(object_store, config.s3_bucket_name.clone()).await?);
    tracing::info!("Using bucket {} on {}", image_store.bucket(), config.s3_addr);

    let grpc_listener = TcpListener::bind(&config.grpc_listen_addr).await?;
    tracing::info!("gRPC listening on {}", config.grpc_listen_addr);

    let http_listener = TcpListener::bind(&config.http_listen_addr).await?;
    tracing::info!("HTTP listening on {}", config.http_listen_addr);

    let shutdown = CancellationToken::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));
    tokio::spawn(telemetry::run_upkeep(
        metrics.clone(),
        telemetry::UPKEEP_INTERVAL,
        shutdown.clone(),
    ));

    let grpc = serve_grpc(grpc_listener, image_store, shutdown.clone());
    let http = serve_http(http_listener, metrics, shutdown.clone());

    let result = tokio::try_join!(grpc, http);
    shutdown.cancel();
    result?;

    tracing::info!("Server exiting");
    Ok(())
}

pub async fn serve_grpc(
    listener: TcpListener,
    store: Arc<ImageStore>,
    shutdown: CancellationToken,
) -> Result<()> {
    let service = S3GatewayServer::new(GatewayService::new(store))
        .max_decoding_message_size(MAX_MESSAGE_SIZE)
        .max_encoding_message_size(MAX_MESSAGE_SIZE);

    tonic::transport::Server::builder()
        .layer(TraceLayer::new_for_grpc())
        .add_service(service)
        .serve_with_incoming_shutdown(TcpListenerStream::new(listener), async move {
            shutdown.cancelled().await
        })
        .await
        .map_err(|error| S3gError::Server(format!("gRPC server failed: {}", error)))
}

pub async fn serve_http(
    listener: TcpListener,
    metrics: PrometheusHandle,
    shutdown: CancellationToken,
) -> Result<()> {
    axum::serve(listener, http::router(metrics))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|error| S3gError::Server(format!("HTTP server failed: {}", error)))
}

async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", error);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("Failed to install SIGTERM handler: {}", error);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = shutdown.cancelled() => return,
    }

    tracing::info!("Shutting down server...");
    shutdown.cancel();
}
