use ed25519_dalek::VerifyingKey;
use lockbox_scopes::ScopeStore;
use std::sync::Arc;
use std::time::Instant;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Scope storage backend
    pub store: Arc<dyn ScopeStore>,

    /// Key that signed request payloads must verify against
    pub verifying_key: VerifyingKey,

    /// Server start time for uptime calculation
    pub start_time: Instant,
}

impl AppState {
    pub fn new(store: Arc<dyn ScopeStore>, verifying_key: VerifyingKey) -> Self {
        Self {
            store,
            verifying_key,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
