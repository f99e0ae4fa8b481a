//! REST API for the scopes service
//!
//! Every `/v1` route verifies an Ed25519-signed payload before touching
//! storage; see [`verify`] for where the payload travels.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;
pub mod state;
pub mod verify;

pub use config::{ApiConfig, ConfigError, StorageBackend};
pub use error::{ApiError, Result};
pub use routes::create_router;
pub use state::AppState;
