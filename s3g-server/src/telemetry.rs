//! Prometheus metrics for the gateway RPCs.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use s3g_core::{Result, S3gError};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

pub const RPC_REQUESTS_TOTAL: &str = "s3g_rpc_requests_total";
pub const RPC_ERRORS_TOTAL: &str = "s3g_rpc_errors_total";
pub const RPC_DURATION_SECONDS: &str = "s3g_rpc_duration_seconds";

pub const UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

/// Installs the global recorder and returns the handle rendering the exposition text.
pub fn install_recorder() -> Result<PrometheusHandle> {
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| S3gError::Config(format!("failed to install metrics recorder: {}", e)))?;

    describe_counter!(RPC_REQUESTS_TOTAL, "Total number of gateway RPCs handled");
    describe_counter!(RPC_ERRORS_TOTAL, "Total number of gateway RPCs that failed");
    describe_histogram!(RPC_DURATION_SECONDS, "Gateway RPC duration in seconds");

    Ok(handle)
}

pub fn record_rpc(method: &'static str, started: Instant, ok: bool) {
    counter!(RPC_REQUESTS_TOTAL, "method" => method).increment(1);
    if !ok {
        counter!(RPC_ERRORS_TOTAL, "method" => method).increment(1);
    }
    histogram!(RPC_DURATION_SECONDS, "method" => method).record(started.elapsed().as_secs_f64());
}

/// Drains buffered histogram samples on a fixed period. Without it samples only drain when
/// `/metrics` is scraped.
pub async fn run_upkeep(handle: PrometheusHandle, period: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => handle.run_upkeep(),
            _ = shutdown.cancelled() => break,
        }
    }

    tracing::debug!("Metrics upkeep stopped");
}
