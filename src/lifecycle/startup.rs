//! Startup orchestration.

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GateConfig;
use crate::cv::CvStoreError;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to load CV seed: {0}")]
    Seed(#[from] CvStoreError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

/// Bring the gateway up on the configured address and serve until a
/// shutdown signal arrives.
pub async fn run(config: GateConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind {
            address: address.clone(),
            source,
        })?;
    tracing::info!(address = %address, "Listening for connections");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    server.run(listener, shutdown.wait()).await?;
    Ok(())
}
