//! cv-gateway server binary.

use std::path::PathBuf;

use clap::Parser;

use cv_gateway::config::{check_config, read_config};
use cv_gateway::lifecycle;
use cv_gateway::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "cv-gateway")]
#[command(about = "Rate-limited, webhook-authenticated API for a CV site", long_about = None)]
struct Cli {
    /// TOML config file; environment variables override its values
    #[arg(short, long, env = "CV_GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = read_config(cli.config.as_deref())?;

    init_logging(&config.observability);
    check_config(&config)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "cv-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.listener.request_timeout_secs,
        webhook_configured = config.webhook.secret.is_some(),
        allowed_origins = config.cors.allowed_origins.len(),
        "Configuration loaded"
    );

    lifecycle::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
