//! Scope access policy evaluation
//!
//! Decides whether a user or client may use a scope. Evaluation never fails:
//! an unrecognized policy denies access and logs a warning.

use crate::types::{Policy, Scope};
use tracing::warn;

/// Check whether `actor` may use the scope identified by `scope_id` under
/// `policy` and its `exceptions`.
///
/// Exceptions are compared with exact string equality; duplicates are
/// harmless.
pub fn actor_can_use(scope_id: &str, actor: &str, policy: &Policy, exceptions: &[String]) -> bool {
    let excepted = || exceptions.iter().any(|id| id == actor);

    match policy {
        Policy::DenyAll => false,
        Policy::AllowAll => true,
        Policy::DefaultDeny => excepted(),
        Policy::DefaultAllow => !excepted(),
        Policy::Unrecognized(raw) => {
            warn!(
                scope = %scope_id,
                actor = %actor,
                policy = %raw,
                "unknown scope policy presented, denying access"
            );
            false
        }
    }
}

impl Scope {
    /// Whether the user identified by `user` may use this scope
    pub fn user_can_use(&self, user: &str) -> bool {
        actor_can_use(&self.id, user, &self.user_policy, &self.user_exceptions)
    }

    /// Whether the client identified by `client` may use this scope
    pub fn client_can_use(&self, client: &str) -> bool {
        actor_can_use(&self.id, client, &self.client_policy, &self.client_exceptions)
    }
}

/// Scopes from `scopes` that the client identified by `client` can use, in
/// input order
pub fn filter_by_client_id<'a, I>(scopes: I, client: &str) -> Vec<Scope>
where
    I: IntoIterator<Item = &'a Scope>,
{
    scopes
        .into_iter()
        .filter(|scope| scope.client_can_use(client))
        .cloned()
        .collect()
}

/// Scopes from `scopes` that the user identified by `user` can use, in input
/// order
pub fn filter_by_user_id<'a, I>(scopes: I, user: &str) -> Vec<Scope>
where
    I: IntoIterator<Item = &'a Scope>,
{
    scopes
        .into_iter()
        .filter(|scope| scope.user_can_use(user))
        .cloned()
        .collect()
}
