use crate::change::Change;
use crate::error::{Result, ScopeError};
use crate::store::ScopeStore;
use crate::types::{sort_by_id, Scope, ScopeId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory scope store implementation
///
/// Writers hold the table's write lock for the whole read-modify-write, so
/// a duplicate create can never slip in between the check and the insert.
#[derive(Clone, Default)]
pub struct InMemoryScopeStore {
    scopes: Arc<RwLock<HashMap<ScopeId, Scope>>>,
}

impl InMemoryScopeStore {
    /// Create an empty in-memory scope store
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScopeStore for InMemoryScopeStore {
    async fn create(&self, scope: Scope) -> Result<()> {
        let mut scopes = self.scopes.write().await;
        if scopes.contains_key(&scope.id) {
            return Err(ScopeError::AlreadyExists(scope.id));
        }
        scopes.insert(scope.id.clone(), scope);
        Ok(())
    }

    async fn get_multi(&self, ids: &[String]) -> Result<HashMap<String, Scope>> {
        let scopes = self.scopes.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| scopes.get(id).map(|scope| (id.clone(), scope.clone())))
            .collect())
    }

    async fn list_default(&self) -> Result<Vec<Scope>> {
        let scopes = self.scopes.read().await;
        let mut defaults: Vec<Scope> = scopes
            .values()
            .filter(|scope| scope.is_default)
            .cloned()
            .collect();
        sort_by_id(&mut defaults);
        Ok(defaults)
    }

    async fn update(&self, id: &str, change: &Change) -> Result<()> {
        if change.is_empty() {
            return Ok(());
        }
        let mut scopes = self.scopes.write().await;
        if let Some(scope) = scopes.get_mut(id) {
            *scope = change.apply_to(scope);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut scopes = self.scopes.write().await;
        scopes.remove(id);
        Ok(())
    }
}
