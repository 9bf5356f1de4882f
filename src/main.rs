// SPDX-License-Identifier: GPL-3.0-only
mod api;
mod config;
mod logging;
mod registry;
mod utils;

#[cfg(test)]
mod test_helpers;

use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};

use api::HttpServer;
use config::Config;
use logging::setup_logging;
use registry::{PlotRegistry, SqlitePlotRegistry, SqliteStore, SqliteWishlistRegistry, WishlistRegistry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    setup_logging(&config.log_level, config.log_json)?;

    info!("Starting PlotsCartServer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize registries over a shared store
    let store = SqliteStore::open(&config.registry_db_path).await?;
    info!("Registry initialized at {}", config.registry_db_path.display());

    let plots: Arc<dyn PlotRegistry> = Arc::new(SqlitePlotRegistry::new(&store));
    let wishlist: Arc<dyn WishlistRegistry> = Arc::new(SqliteWishlistRegistry::new(&store, Arc::clone(&plots)));

    // Start HTTP server
    let http_server = HttpServer::new(
        plots,
        wishlist,
        config.local_api_bind,
        config.cors_allowed_origin.clone(),
    );
    let http_task = tokio::spawn(async move {
        if let Err(e) = http_server.serve().await {
            error!(error = %e, "HTTP server error");
        }
    });

    info!("All services started. Waiting for shutdown signal...");

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Received shutdown signal (Ctrl+C)");
        }
        Err(err) => {
            error!(error = %err, "Unable to listen for shutdown signal");
        }
    }

    // Graceful shutdown
    info!("Initiating graceful shutdown...");

    http_task.abort();
    store.pool().close().await;

    info!("Shutdown complete");
    Ok(())
}
