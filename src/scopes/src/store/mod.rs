//! Scope storage
//!
//! [`ScopeStore`] is the contract every backend satisfies:
//!
//! - `create` fails with [`ScopeError::AlreadyExists`](crate::ScopeError::AlreadyExists)
//!   on a duplicate ID and leaves the stored record untouched. The uniqueness
//!   check and the insert are atomic.
//! - `get_multi` omits IDs it cannot find.
//! - `list_default` returns default scopes sorted by ID.
//! - `update` and `delete` on a missing ID succeed without doing anything,
//!   and an empty [`Change`] never reaches the backend.

use crate::change::Change;
use crate::error::Result;
use crate::types::Scope;
use async_trait::async_trait;
use std::collections::HashMap;

mod memory;

#[cfg(feature = "postgres")]
pub mod postgres;

#[cfg(feature = "rocksdb")]
pub mod rocksdb;

pub use memory::InMemoryScopeStore;

#[cfg(feature = "postgres")]
pub use postgres::PostgresScopeStore;

#[cfg(feature = "rocksdb")]
pub use self::rocksdb::RocksDbScopeStore;

/// Scope store trait
#[async_trait]
pub trait ScopeStore: Send + Sync {
    /// Insert a new scope
    async fn create(&self, scope: Scope) -> Result<()>;

    /// Get the scopes matching `ids`, keyed by ID
    async fn get_multi(&self, ids: &[String]) -> Result<HashMap<String, Scope>>;

    /// List all default scopes, sorted by ID
    async fn list_default(&self) -> Result<Vec<Scope>>;

    /// Apply a change to the scope with this ID, if it exists
    async fn update(&self, id: &str, change: &Change) -> Result<()>;

    /// Delete the scope with this ID, if it exists
    async fn delete(&self, id: &str) -> Result<()>;
}
