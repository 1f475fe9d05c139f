//! VM Service
//!
//! REST API for provisioning VMs through Pulumi, with scheduled auto-deletion

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vm_service::{create_router, AppState, Config, DeletionScheduler, PulumiCli, Registry};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vm_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting VM Service");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.check_pulumi_dir();

    info!("Pulumi project: {}", config.pulumi_dir.display());
    info!("Pulumi stack: {}", config.pulumi_stack);
    info!("VM data file: {}", config.data_file.display());

    let provisioner = PulumiCli::new(
        config.pulumi_binary.clone(),
        config.pulumi_dir.clone(),
        config.pulumi_stack.clone(),
    );
    let registry = Registry::new(config.data_file.clone());
    let scheduler = DeletionScheduler::new();
    scheduler.start();

    // Create application state
    let state = Arc::new(AppState::new(Arc::new(provisioner), registry, scheduler));

    // Create router
    let app = create_router(Arc::clone(&state));

    // Bind and serve
    let listener = TcpListener::bind(&config.address())
        .await
        .with_context(|| format!("Failed to bind to {}", config.address()))?;

    info!("VM Service running on http://{}", config.address());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    let pending = state.scheduler.pending().await;
    if !pending.is_empty() {
        tracing::warn!(
            "Dropping {} scheduled deletions on shutdown: {:?}",
            pending.len(),
            pending
        );
    }
    state.scheduler.shutdown().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
