//! HTTP server setup and lifecycle management

use crate::{
    config::{ApiConfig, StorageBackend},
    routes,
    state::AppState,
};
use anyhow::{Context, Result};
use lockbox_scopes::{InMemoryScopeStore, ScopeStore};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

/// Build the configured storage backend
pub async fn open_store(config: &ApiConfig) -> Result<Arc<dyn ScopeStore>> {
    info!(backend = %config.storage, "opening scope store");

    match config.storage {
        StorageBackend::Memory => {
            warn!("scopes are held in memory and will not survive a restart");
            let store: Arc<dyn ScopeStore> = Arc::new(InMemoryScopeStore::new());
            Ok(store)
        }
        StorageBackend::Postgres => open_postgres(config).await,
        StorageBackend::Rocksdb => open_rocksdb(config),
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(config: &ApiConfig) -> Result<Arc<dyn ScopeStore>> {
    use lockbox_scopes::store::PostgresScopeStore;

    let url = config
        .database_url
        .as_deref()
        .context("DATABASE_URL is required for postgres storage")?;
    let store = PostgresScopeStore::connect(url)
        .await
        .context("Failed to connect to PostgreSQL")?;
    store
        .run_migrations()
        .await
        .context("Failed to run migrations")?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_config: &ApiConfig) -> Result<Arc<dyn ScopeStore>> {
    anyhow::bail!("built without postgres support; rebuild with --features postgres")
}

#[cfg(feature = "rocksdb")]
fn open_rocksdb(config: &ApiConfig) -> Result<Arc<dyn ScopeStore>> {
    use lockbox_scopes::store::RocksDbScopeStore;

    let store = RocksDbScopeStore::open(&config.rocksdb_path).with_context(|| {
        format!("Failed to open RocksDB at {}", config.rocksdb_path.display())
    })?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "rocksdb"))]
fn open_rocksdb(_config: &ApiConfig) -> Result<Arc<dyn ScopeStore>> {
    anyhow::bail!("built without rocksdb support; rebuild with --features rocksdb")
}

/// Serve the API until a shutdown signal arrives
pub async fn run(config: &ApiConfig, state: AppState) -> Result<()> {
    let addr = config.bind_address();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    let local_addr = listener.local_addr()?;
    info!("Server listening on http://{}", local_addr);

    axum::serve(listener, routes::create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for Ctrl+C");
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
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_memory_store() {
        let store = open_store(&ApiConfig::default()).await.unwrap();
        assert!(store.list_default().await.unwrap().is_empty());
    }

    #[cfg(feature = "rocksdb")]
    #[tokio::test]
    async fn test_open_rocksdb_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = ApiConfig {
            storage: StorageBackend::Rocksdb,
            rocksdb_path: dir.path().to_path_buf(),
            ..Default::default()
        };

        let store = open_store(&config).await.unwrap();
        assert!(store.list_default().await.unwrap().is_empty());
    }

    #[cfg(not(feature = "postgres"))]
    #[tokio::test]
    async fn test_postgres_requires_feature() {
        let config = ApiConfig {
            storage: StorageBackend::Postgres,
            database_url: Some("postgres://localhost/scopes".to_string()),
            ..Default::default()
        };
        assert!(open_store(&config).await.is_err());
    }
}
