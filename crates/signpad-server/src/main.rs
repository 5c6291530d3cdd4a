//! Signpad Requisition Intake Server
//!
//! Accepts requisition submissions carrying an exported signature image and
//! keeps them for review.
//!
//! ## Routes
//!
//! ```text
//! GET    /health | /api/health
//! POST   /api/requisitions                store a submission
//! GET    /api/requisitions?type=          list summaries (office | special)
//! GET    /api/requisitions/{id}           full record with signature_data
//! ```

mod api;
mod config;
mod model;
mod store;

use api::AppState;
use config::ServerConfig;
use store::{FileStore, MemoryStore, StoreError};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
enum ServerError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signpad_server=info,tower_http=info".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let state = match &config.data_dir {
        Some(dir) => {
            let store = FileStore::new(dir)?;
            info!("Storing requisitions in {}", store.base_path().display());
            AppState::new(store)
        }
        None => {
            info!("Storing requisitions in memory");
            AppState::new(MemoryStore::new())
        }
    };

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Signpad intake server listening on {}", config.addr);

    axum::serve(listener, api::router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
