//! HTTP API: state wiring, extractors, handlers and the router.

pub mod extract;
pub mod handlers;
pub mod router;
pub mod state;

use anyhow::Context;
use flota_core::storage::{BlobStore, FsBlobStore, InMemoryBlobStore, InMemoryStorage, Storage};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::observability::metrics;

pub use router::create_router;
pub use state::AppState;

async fn open_storage(backend: StorageBackend) -> anyhow::Result<Arc<dyn Storage>> {
    match backend {
        StorageBackend::Memory => {
            info!("Using in-memory document storage");
            Ok(Arc::new(InMemoryStorage::new()))
        }
        #[cfg(feature = "db")]
        StorageBackend::Libsql => {
            let storage = flota_core::storage::DatabaseStorage::new()
                .await
                .context("Failed to open libSQL storage")?;
            info!("Using libSQL document storage");
            Ok(Arc::new(storage))
        }
        #[cfg(not(feature = "db"))]
        StorageBackend::Libsql => {
            anyhow::bail!("libSQL storage requested but the binary was built without the `db` feature")
        }
    }
}

/// Storage, object store and services for the given configuration
pub async fn build_state(config: &Config) -> anyhow::Result<AppState> {
    let storage = open_storage(config.storage).await?;
    let blobs: Arc<dyn BlobStore> = match &config.blob_dir {
        Some(dir) => {
            info!("Object store at {}", dir.display());
            Arc::new(FsBlobStore::new(dir))
        }
        None => Arc::new(InMemoryBlobStore::new()),
    };
    Ok(AppState::new(
        storage,
        blobs,
        config.media_root.clone(),
        config.max_upload_bytes(),
    ))
}

/// Start the HTTP server on the configured port
pub async fn start_server(config: &Config) -> anyhow::Result<()> {
    metrics::init();
    let state = build_state(config).await?;
    let app = create_router(state, &config.cors_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    info!("HTTP server running on http://localhost:{}", config.port);
    info!("Health check: http://localhost:{}/health", config.port);

    axum::serve(listener, app).await.context("HTTP server failed")?;
    Ok(())
}
