//! Wire representations of scopes, changes and responses

use lockbox_scopes::{Change, Policy, Scope};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Error slugs
pub const MISSING: &str = "missing";
pub const INVALID_VALUE: &str = "invalid_value";
pub const INVALID_FORMAT: &str = "invalid_format";
pub const CONFLICT: &str = "conflict";
pub const NOT_FOUND: &str = "not_found";
pub const ACCESS_DENIED: &str = "access_denied";
pub const ACT_OF_GOD: &str = "act_of_god";

/// One problem with a request, located by body field, query param or header
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RequestError {
    /// JSON pointer into the request body
    #[serde(default)]
    pub field: String,

    /// Query or path parameter
    #[serde(default)]
    pub param: String,

    /// Request header
    #[serde(default)]
    pub header: String,

    pub slug: String,
}

impl RequestError {
    pub fn field(field: &str, slug: &str) -> Self {
        Self {
            field: field.to_string(),
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    pub fn param(param: &str, slug: &str) -> Self {
        Self {
            param: param.to_string(),
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    pub fn header(header: &str, slug: &str) -> Self {
        Self {
            header: header.to_string(),
            slug: slug.to_string(),
            ..Default::default()
        }
    }

    pub fn slug(slug: &str) -> Self {
        Self {
            slug: slug.to_string(),
            ..Default::default()
        }
    }
}

/// API representation of a scope; absent and null fields decode as empty
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ScopeBody {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(deserialize_with = "null_as_default")]
    pub user_policy: String,

    #[serde(deserialize_with = "null_as_default")]
    pub user_exceptions: Vec<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub client_policy: String,

    #[serde(deserialize_with = "null_as_default")]
    pub client_exceptions: Vec<String>,

    #[serde(deserialize_with = "null_as_default")]
    pub is_default: bool,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<Scope> for ScopeBody {
    fn from(scope: Scope) -> Self {
        Self {
            id: scope.id,
            user_policy: scope.user_policy.into(),
            user_exceptions: scope.user_exceptions,
            client_policy: scope.client_policy.into(),
            client_exceptions: scope.client_exceptions,
            is_default: scope.is_default,
        }
    }
}

impl ScopeBody {
    /// Validate a create request, collecting every problem found
    pub fn into_scope(self) -> Result<Scope, Vec<RequestError>> {
        let mut errors = Vec::new();
        let client_policy = required_policy("/clientPolicy", &self.client_policy, &mut errors);
        let user_policy = required_policy("/userPolicy", &self.user_policy, &mut errors);
        if self.id.is_empty() {
            errors.push(RequestError::field("/id", MISSING));
        }

        match (user_policy, client_policy) {
            (Some(user_policy), Some(client_policy)) if errors.is_empty() => Ok(Scope {
                id: self.id,
                user_policy,
                user_exceptions: self.user_exceptions,
                client_policy,
                client_exceptions: self.client_exceptions,
                is_default: self.is_default,
            }),
            _ => Err(errors),
        }
    }
}

/// API representation of a change; absent and null fields are left alone
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangeBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_exceptions: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_exceptions: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl ChangeBody {
    /// Validate an update request; policies are checked only when set
    pub fn into_change(self) -> Result<Change, Vec<RequestError>> {
        let mut errors = Vec::new();
        let user_policy = optional_policy("/userPolicy", self.user_policy, &mut errors);
        let client_policy = optional_policy("/clientPolicy", self.client_policy, &mut errors);
        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Change {
            user_policy,
            user_exceptions: self.user_exceptions,
            client_policy,
            client_exceptions: self.client_exceptions,
            is_default: self.is_default,
        })
    }
}

fn required_policy(field: &str, raw: &str, errors: &mut Vec<RequestError>) -> Option<Policy> {
    if raw.is_empty() {
        errors.push(RequestError::field(field, MISSING));
        return None;
    }
    match raw.parse() {
        Ok(policy) => Some(policy),
        Err(_) => {
            errors.push(RequestError::field(field, INVALID_VALUE));
            None
        }
    }
}

fn optional_policy(
    field: &str,
    raw: Option<String>,
    errors: &mut Vec<RequestError>,
) -> Option<Policy> {
    let raw = raw?;
    match raw.parse() {
        Ok(policy) => Some(policy),
        Err(_) => {
            errors.push(RequestError::field(field, INVALID_VALUE));
            None
        }
    }
}

/// Envelope for every API response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Response {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<ScopeBody>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<RequestError>,
}

impl Response {
    pub fn scopes<I>(scopes: I) -> Self
    where
        I: IntoIterator<Item = Scope>,
    {
        Self {
            scopes: scopes.into_iter().map(ScopeBody::from).collect(),
            errors: Vec::new(),
        }
    }

    pub fn errors(errors: Vec<RequestError>) -> Self {
        Self {
            scopes: Vec::new(),
            errors,
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> ScopeBody {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_valid_scope_body() {
        let scope = body(json!({
            "id": "https://scopes.lockbox.dev/email",
            "userPolicy": "ALLOW_ALL",
            "clientPolicy": "DEFAULT_DENY",
            "clientExceptions": ["mail-client"],
            "isDefault": true
        }))
        .into_scope()
        .unwrap();

        assert_eq!(scope.user_policy, Policy::AllowAll);
        assert_eq!(scope.client_exceptions, ["mail-client"]);
        assert!(scope.user_exceptions.is_empty());
        assert!(scope.is_default);
    }

    #[test]
    fn test_scope_body_collects_all_errors() {
        let errors = body(json!({"userPolicy": "allow_all"}))
            .into_scope()
            .unwrap_err();

        assert_eq!(
            errors,
            vec![
                RequestError::field("/clientPolicy", MISSING),
                RequestError::field("/userPolicy", INVALID_VALUE),
                RequestError::field("/id", MISSING),
            ]
        );
    }

    #[test]
    fn test_null_scope_fields_decode_as_empty() {
        let scope = body(json!({
            "id": "s1",
            "userPolicy": "ALLOW_ALL",
            "userExceptions": null,
            "clientPolicy": "DENY_ALL",
            "clientExceptions": null,
            "isDefault": null
        }))
        .into_scope()
        .unwrap();
        assert!(scope.user_exceptions.is_empty());
        assert!(scope.client_exceptions.is_empty());
        assert!(!scope.is_default);

        let errors = body(json!({"id": null, "userPolicy": null, "clientPolicy": "ALLOW_ALL"}))
            .into_scope()
            .unwrap_err();
        assert_eq!(
            errors,
            vec![
                RequestError::field("/userPolicy", MISSING),
                RequestError::field("/id", MISSING),
            ]
        );
    }

    #[test]
    fn test_change_body_validates_only_set_policies() {
        let change: ChangeBody = serde_json::from_value(json!({
            "userPolicy": null,
            "clientExceptions": []
        }))
        .unwrap();
        let change = change.into_change().unwrap();
        assert_eq!(change.user_policy, None);
        assert_eq!(change.client_exceptions, Some(vec![]));

        let change: ChangeBody =
            serde_json::from_value(json!({"userPolicy": "NOPE", "clientPolicy": ""})).unwrap();
        assert_eq!(
            change.into_change().unwrap_err(),
            vec![
                RequestError::field("/userPolicy", INVALID_VALUE),
                RequestError::field("/clientPolicy", INVALID_VALUE),
            ]
        );
    }

    #[test]
    fn test_response_omits_empty_lists() {
        assert_eq!(serde_json::to_value(Response::default()).unwrap(), json!({}));

        let value = serde_json::to_value(Response::errors(vec![RequestError::header(
            "Authorization",
            ACCESS_DENIED,
        )]))
        .unwrap();
        assert_eq!(
            value,
            json!({"errors": [{"field": "", "param": "", "header": "Authorization", "slug": "access_denied"}]})
        );
    }

    #[test]
    fn test_unrecognized_stored_policy_is_echoed() {
        let scope = Scope {
            user_policy: Policy::Unrecognized("LEGACY".to_string()),
            ..Scope::new("legacy")
        };
        assert_eq!(ScopeBody::from(scope).user_policy, "LEGACY");
    }
}
