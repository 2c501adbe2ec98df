use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use once_cell::sync::OnceCell;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crop_yield_server::api;
use crop_yield_server::{AppConfig, Artifacts};

static ARTIFACTS: OnceCell<Artifacts> = OnceCell::new();

/// Crop yield prediction server
#[derive(Parser, Debug)]
#[command(name = "crop-yield-server")]
#[command(version)]
#[command(about = "Serves crop yield predictions from a trained model", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Address to listen on, overriding the config file
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Artifact directory, overriding the config file
    #[arg(short, long)]
    artifacts: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config_found = args.config.exists();
    let mut config = if config_found {
        AppConfig::load(&args.config)
            .with_context(|| format!("failed to load config {}", args.config.display()))?
    } else {
        AppConfig::default()
    };
    if let Some(bind) = args.bind {
        config.bind = bind;
    }
    if let Some(dir) = args.artifacts {
        config.artifacts.dir = dir;
    }

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level))
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    if !config_found {
        tracing::warn!(path = %args.config.display(), "config file not found, using defaults");
    }

    let artifacts = Artifacts::load(&config.artifacts).with_context(|| {
        format!(
            "failed to load artifacts from {}",
            config.artifacts.dir.display()
        )
    })?;
    let artifacts = ARTIFACTS.get_or_init(|| artifacts);

    let app = api::router(artifacts);

    tracing::info!(addr = %config.bind, "listening");
    axum::Server::try_bind(&config.bind)
        .with_context(|| format!("failed to bind {}", config.bind))?
        .serve(app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {}", e);
        std::future::pending::<()>().await;
    }
}
