//! Server startup utilities.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use stratum_config::ObservabilityConfig;
use stratum_core::{StratumError, StratumResult};
use stratum_service::register_metrics;
use tracing::info;

/// Prints the startup banner.
pub fn print_banner() {
    info!(r#"
     _             _
 ___| |_ _ __ __ _| |_ _   _ _ __ ___
/ __| __| '__/ _` | __| | | | '_ ` _ \
\__ \ |_| | | (_| | |_| |_| | | | | | |
|___/\__|_|  \__,_|\__|\__,_|_| |_| |_|
    "#);
}

/// Prints server startup information.
pub fn print_startup_info(rest_addr: &str, observability: &ObservabilityConfig) {
    let separator = "=".repeat(60);
    info!("{}", separator);
    info!("REST API:  http://{}/api/v1", rest_addr);
    info!("Health:    http://{}/health", rest_addr);
    info!("API Docs:  http://{}/swagger-ui", rest_addr);
    if observability.metrics_enabled {
        info!("Metrics:   http://{}/metrics", observability.metrics_addr);
    }
    info!("{}", separator);
}

/// Installs the Prometheus recorder with its own HTTP listener and describes
/// the cache metrics. Must run inside the Tokio runtime.
pub fn install_metrics_exporter(observability: &ObservabilityConfig) -> StratumResult<()> {
    let addr = parse_metrics_addr(&observability.metrics_addr)?;

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| {
            StratumError::Configuration(format!("Failed to install Prometheus exporter: {}", e))
        })?;

    register_metrics();
    info!("Prometheus exporter listening on {}", addr);
    Ok(())
}

fn parse_metrics_addr(addr: &str) -> StratumResult<SocketAddr> {
    addr.parse().map_err(|e| {
        StratumError::Configuration(format!("Invalid metrics address '{}': {}", addr, e))
    })
}
