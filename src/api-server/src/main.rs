//! Scopes API server
//!
//! ```bash
//! SCOPES_PUBLIC_KEY=<base64 key> scopes-server
//!
//! # Persist to PostgreSQL
//! SCOPES_STORAGE=postgres DATABASE_URL=postgres://localhost/scopes scopes-server
//!
//! # Debug logging
//! RUST_LOG=debug scopes-server
//! ```
//!
//! See [`lockbox_scopes_api::config`] for every variable.

use anyhow::{Context, Result};
use lockbox_scopes_api::{server, ApiConfig, AppState};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ApiConfig::from_env().context("Invalid configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.clone().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        storage = %config.storage,
        "Starting scopes API server"
    );

    let verifying_key = config.verifying_key()?;
    let store = server::open_store(&config).await?;
    let state = AppState::new(store, verifying_key);

    server::run(&config, state).await
}
