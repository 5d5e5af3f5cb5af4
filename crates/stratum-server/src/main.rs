//! # Stratum Server
//!
//! Serves the product catalog over REST, reading through a Redis (or
//! in-memory) cache in front of MySQL.

use std::sync::Arc;
use stratum_config::{AppConfig, ConfigLoader, ObservabilityConfig};
use stratum_core::{HealthCheck, StratumError, StratumResult};
use stratum_repository::DatabaseHealthCheck;
use stratum_rest::{create_router, AppState};
use stratum_server::di::{build_module, ComponentResolver};
use stratum_server::startup::{install_metrics_exporter, print_banner, print_startup_info};
use stratum_service::{CacheHealthCheck, CacheMetrics};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            init_logging(&ObservabilityConfig::default());
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.observability);

    print_banner();
    info!("Starting Stratum Server...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(config).await {
        error!("Application error: {}", e);
        std::process::exit(1);
    }
}

fn load_config() -> StratumResult<AppConfig> {
    Ok(ConfigLoader::from_default_location()?.into_config())
}

async fn run(config: AppConfig) -> StratumResult<()> {
    info!("Environment: {}", config.app.environment);

    if config.observability.metrics_enabled {
        install_metrics_exporter(&config.observability)?;
    }

    let module = build_module(&config, CacheMetrics::new()).await?;

    let db_pool = module.database_pool();
    if config.database.run_migrations {
        db_pool.run_migrations().await?;
    }

    if config.cache.warm_on_startup {
        match module.product_service().warm_cache().await {
            Ok(result) => info!("Warmed {} cache entries on startup", result.warmed),
            Err(e) => warn!("Cache warm-up failed: {}", e),
        }
    }

    let health_checks: Vec<Arc<dyn HealthCheck>> = vec![
        Arc::new(DatabaseHealthCheck::new(db_pool.clone())),
        Arc::new(CacheHealthCheck::new(module.cache_store())),
    ];
    let app_state = AppState::from_module(module.as_ref(), &config.cache, health_checks);
    let router = create_router(app_state, &config.server);

    let rest_addr = config.server.addr();
    let listener = tokio::net::TcpListener::bind(&rest_addr)
        .await
        .map_err(|e| StratumError::Internal(format!("Failed to bind REST: {}", e)))?;

    print_startup_info(&rest_addr, &config.observability);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| StratumError::Internal(format!("REST server error: {}", e)))?;

    db_pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

fn init_logging(observability: &ObservabilityConfig) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&observability.log_level));

    let registry = tracing_subscriber::registry().with(filter);
    let result = if observability.json_logs() {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };

    if let Err(e) = result {
        warn!("Logging already initialized: {}", e);
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown...");
        }
        () = terminate => {
            info!("Received terminate signal, initiating graceful shutdown...");
        }
    }
}
