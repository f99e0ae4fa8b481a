//! Core scope types

use crate::error::ScopeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique scope identifier
pub type ScopeId = String;

/// Access policy governing either the users or the clients of a scope.
///
/// Stored records may carry a policy string that is not one of the four
/// known values. Those decode to [`Policy::Unrecognized`] so the raw value
/// survives a round trip, and they never grant access.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Policy {
    /// Nobody may use the scope
    DenyAll,
    /// Only the listed exceptions may use the scope
    DefaultDeny,
    /// Everybody may use the scope
    AllowAll,
    /// Everybody except the listed exceptions may use the scope
    DefaultAllow,
    /// A value read from storage that is none of the above
    Unrecognized(String),
}

impl Policy {
    /// Wire and storage representation of the policy
    pub fn as_str(&self) -> &str {
        match self {
            Policy::DenyAll => "DENY_ALL",
            Policy::DefaultDeny => "DEFAULT_DENY",
            Policy::AllowAll => "ALLOW_ALL",
            Policy::DefaultAllow => "DEFAULT_ALLOW",
            Policy::Unrecognized(raw) => raw,
        }
    }
}

impl FromStr for Policy {
    type Err = ScopeError;

    /// Strict parse used at the API boundary
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Policy::from(s.to_string()) {
            Policy::Unrecognized(raw) => Err(ScopeError::InvalidPolicy(raw)),
            policy => Ok(policy),
        }
    }
}

impl From<String> for Policy {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "DENY_ALL" => Policy::DenyAll,
            "DEFAULT_DENY" => Policy::DefaultDeny,
            "ALLOW_ALL" => Policy::AllowAll,
            "DEFAULT_ALLOW" => Policy::DefaultAllow,
            _ => Policy::Unrecognized(raw),
        }
    }
}

impl From<Policy> for String {
    fn from(policy: Policy) -> Self {
        match policy {
            Policy::Unrecognized(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A scope of access to user data that users can grant to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    /// Scope identifier (e.g., "https://scopes.lockbox.dev/profile")
    pub id: ScopeId,

    /// Policy deciding which users may grant the scope
    pub user_policy: Policy,

    /// Users excepted from `user_policy`
    #[serde(default)]
    pub user_exceptions: Vec<String>,

    /// Policy deciding which clients may request the scope
    pub client_policy: Policy,

    /// Clients excepted from `client_policy`
    #[serde(default)]
    pub client_exceptions: Vec<String>,

    /// Whether the scope is granted without being requested
    #[serde(default)]
    pub is_default: bool,
}

impl Scope {
    /// Create a scope that denies everybody and is not a default
    pub fn new(id: impl Into<ScopeId>) -> Self {
        Self {
            id: id.into(),
            user_policy: Policy::DenyAll,
            user_exceptions: Vec::new(),
            client_policy: Policy::DenyAll,
            client_exceptions: Vec::new(),
            is_default: false,
        }
    }

    /// Set the user policy and its exceptions
    pub fn with_user_policy<I, S>(mut self, policy: Policy, exceptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_policy = policy;
        self.user_exceptions = exceptions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the client policy and its exceptions
    pub fn with_client_policy<I, S>(mut self, policy: Policy, exceptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.client_policy = policy;
        self.client_exceptions = exceptions.into_iter().map(Into::into).collect();
        self
    }

    /// Mark the scope as a default scope
    pub fn with_default(mut self, is_default: bool) -> Self {
        self.is_default = is_default;
        self
    }
}

/// Sort scopes in place, lexicographically by ID
pub fn sort_by_id(scopes: &mut [Scope]) {
    scopes.sort_by(|a, b| a.id.cmp(&b.id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!("DENY_ALL".parse::<Policy>().unwrap(), Policy::DenyAll);
        assert_eq!("DEFAULT_DENY".parse::<Policy>().unwrap(), Policy::DefaultDeny);
        assert_eq!("ALLOW_ALL".parse::<Policy>().unwrap(), Policy::AllowAll);
        assert_eq!("DEFAULT_ALLOW".parse::<Policy>().unwrap(), Policy::DefaultAllow);

        let err = "allow_all".parse::<Policy>().unwrap_err();
        assert!(matches!(err, ScopeError::InvalidPolicy(raw) if raw == "allow_all"));
        assert!("".parse::<Policy>().is_err());
    }

    #[test]
    fn test_unrecognized_policy_is_preserved() {
        let policy = Policy::from("SOMETIMES".to_string());
        assert_eq!(policy, Policy::Unrecognized("SOMETIMES".to_string()));
        assert_eq!(String::from(policy), "SOMETIMES");
    }

    #[test]
    fn test_scope_json_shape() {
        let scope = Scope::new("https://scopes.lockbox.dev/test")
            .with_user_policy(Policy::DefaultAllow, ["user-1"])
            .with_client_policy(Policy::DefaultDeny, ["client-1", "client-2"])
            .with_default(true);

        let json = serde_json::to_value(&scope).unwrap();
        assert_eq!(json["id"], "https://scopes.lockbox.dev/test");
        assert_eq!(json["userPolicy"], "DEFAULT_ALLOW");
        assert_eq!(json["userExceptions"][0], "user-1");
        assert_eq!(json["clientPolicy"], "DEFAULT_DENY");
        assert_eq!(json["clientExceptions"].as_array().unwrap().len(), 2);
        assert_eq!(json["isDefault"], true);

        let decoded: Scope = serde_json::from_value(json).unwrap();
        assert_eq!(decoded, scope);
    }

    #[test]
    fn test_sort_by_id() {
        let mut scopes = vec![Scope::new("b"), Scope::new("c"), Scope::new("a")];
        sort_by_id(&mut scopes);
        let ids: Vec<_> = scopes.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }
}
