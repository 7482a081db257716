//! PhotoTag companion - interactive front end
//!
//! Drives a simulated PhotoTag wearable from a REPL: connect, edit the
//! preview, apply it, press device buttons and feed phone notifications.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use phototag_companion::config::AppConfig;
use phototag_companion::{cli, DeviceService};

/// PhotoTag companion - sync a wearable's state with an editable preview
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Log level (error, warn, info, debug, trace); overrides the config file
    #[arg(short, long, env = "LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let config = AppConfig::load_or_default(&args.config).await?;

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| config.logging.level.clone());
    init_logging(&level, args.json_logs || config.logging.json)?;

    info!("Starting PhotoTag companion...");
    info!("Configuration file: {}", args.config);
    info!(
        device = %config.device.name,
        single_flight = config.device.single_flight,
        "Device configured"
    );

    let service = DeviceService::simulated(&config.device);

    // The one long-lived subscriber; lives until shutdown
    let _subscription = service.subscribe(|state| {
        info!(
            connected = state.is_connected,
            battery = state.battery,
            theme = ?state.theme,
            playing = state.music.is_playing,
            "📟 Device state updated"
        );
    });

    cli::run_repl(service.clone(), shutdown_signal()).await?;

    if service.physical_state().is_connected {
        info!("Disconnecting before exit...");
        if let Err(e) = service.disconnect().await {
            warn!("Failed to disconnect cleanly: {}", e);
        }
    }

    info!("PhotoTag companion shutdown complete");
    Ok(())
}

fn init_logging(level: &str, json: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let fmt_layer = if json {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(false)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install CTRL+C signal handler: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
