//! pscan-ca - Cry Analysis service
//!
//! **Module Identity:**
//! - Name: pscan-ca (Cry Analysis)
//! - Default port: 8000
//!
//! Serves cry feature extraction and dehydration / throat risk assessment
//! for the PediaScan frontend.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use pscan_common::config::{parse_origin_list, ConfigOverrides, ConfigSource, ServiceConfig};
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pscan_ca::{build_router, AppState};

/// Command-line arguments for pscan-ca
#[derive(Parser, Debug)]
#[command(name = "pscan-ca")]
#[command(about = "PediaScan cry analysis and risk assessment service")]
#[command(version)]
struct Args {
    /// Configuration file (TOML)
    #[arg(short, long, env = "PSCAN_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "PSCAN_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PSCAN_PORT")]
    port: Option<u16>,

    /// Comma-separated list of allowed CORS origins
    #[arg(long, env = "PSCAN_ALLOWED_ORIGINS")]
    allowed_origins: Option<String>,

    /// Path to the ffmpeg binary
    #[arg(long, env = "PSCAN_FFMPEG")]
    ffmpeg: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            host: self.host.clone(),
            port: self.port,
            allowed_origins: self.allowed_origins.as_deref().map(parse_origin_list),
            ffmpeg_path: self.ffmpeg.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Config first: the log level comes from it
    let (config, source) =
        ServiceConfig::resolve(&args.overrides()).context("Failed to load configuration")?;

    let level = &config.logging.level;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("pscan_ca={level},tower_http={level}").into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting PediaScan Cry Analysis (pscan-ca) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    match &source {
        ConfigSource::File(path) => info!("Configuration: {}", path.display()),
        ConfigSource::CompiledDefaults => {
            warn!("No configuration file found; using compiled defaults")
        }
    }

    let state = AppState::from_config(&config).context("Failed to initialize audio decoding")?;
    let app = build_router(state, &config).context("Failed to build router")?;

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Listening on http://{}", addr);
    info!("Allowed origins: {}", config.cors.allowed_origins.join(", "));

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
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
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
