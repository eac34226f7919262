//! tiercache - Entry Point
//!
//! Loads configuration, installs logging, boots the cache runtime and
//! keeps it alive (listening for invalidations) until SIGINT or SIGTERM,
//! then drains the background executor.

use clap::Parser;
use std::path::PathBuf;
use tiercache_infrastructure::bootstrap;
use tiercache_infrastructure::config::ConfigLoader;
use tiercache_infrastructure::logging::init_logging;
use tiercache_infrastructure::signals::ShutdownSignals;
use tracing::{info, warn};

/// Command line interface for tiercache
#[derive(Parser, Debug)]
#[command(name = "tiercache")]
#[command(about = "tiercache - Two-tier cache node")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Validate the configuration and exit
    #[arg(long)]
    pub check: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::new();
    if let Some(path) = &cli.config {
        loader = loader.with_config_path(path);
    }
    let config = loader.load()?;
    init_logging(&config.logging)?;

    if cli.check {
        info!("Configuration is valid");
        return Ok(());
    }

    let mut signals = ShutdownSignals::install()?;
    let runtime = bootstrap::build(&config).await?;
    info!(node = %runtime.coordinator.node_id(), "tiercache node running, press Ctrl-C to stop");

    let signal = signals.recv().await?;
    info!(%signal, "Shutdown requested");

    let report = runtime.shutdown().await;
    if report.completed_gracefully {
        info!("Background work drained");
    } else {
        warn!(cancelled = report.cancelled, "Background work cancelled at shutdown");
    }
    Ok(())
}
