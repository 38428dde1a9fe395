mod command;
mod config;
mod launcher;
mod supervisor;
mod web;

use clap::{ArgAction, Parser};
use command::{CommandExecutor, ScriptCatalog};
use config::PanelConfig;
use launcher::ProcessLauncher;
use std::path::PathBuf;
use std::sync::Arc;
use supervisor::LaunchSupervisor;
use tokio::net::TcpListener;
use tracing::{info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use web::AppState;

/// Browser control panel that launches pre-written autopilot scripts
#[derive(Debug, Parser)]
#[command(name = "dronectl", version)]
struct Cli {
    /// Configuration file (defaults to ./dronectl.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Listen address, overrides `server.bind`
    #[arg(short, long)]
    bind: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over -v when set
    let level = match cli.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let mut config = PanelConfig::load_from(cli.config.as_deref())?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }

    let catalog = ScriptCatalog::from_config(&config.scripts)?;
    info!(
        "Script catalog: {} commands via {} in {}",
        catalog.len(),
        config.scripts.program,
        config.scripts.script_dir.display()
    );
    if !config.scripts.disabled.is_empty() {
        info!("  Disabled: {:?}", config.scripts.disabled);
    }

    let supervisor = Arc::new(LaunchSupervisor::new(&config.launch));
    info!("  Launch policy: {:?}", config.launch.policy);
    match config.launch.timeout() {
        Some(limit) => info!("  Script timeout: {:?}", limit),
        None => info!("  Script timeout: none"),
    }

    let launcher = Arc::new(ProcessLauncher::new(config.scripts.capture_output));
    let executor = Arc::new(CommandExecutor::new(catalog, launcher, supervisor.clone()));

    let app = web::router(AppState::new(executor));
    let listener = TcpListener::bind(&config.server.bind).await?;
    info!("Control panel listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    let running = supervisor.running().await;
    if !running.is_empty() {
        warn!("Shutting down with scripts still running: {:?}", running);
    }
    info!("Control panel stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
