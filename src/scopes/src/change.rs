//! Partial updates to stored scopes

use crate::types::{Policy, Scope};
use serde::{Deserialize, Serialize};

/// A change to a [`Scope`].
///
/// Every field is either set or absent. For the exception lists, `None`
/// leaves the stored list alone while `Some(vec![])` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_policy: Option<Policy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_exceptions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_policy: Option<Policy>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_exceptions: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl Change {
    /// Whether applying the change would leave any scope as it was
    pub fn is_empty(&self) -> bool {
        self.user_policy.is_none()
            && self.user_exceptions.is_none()
            && self.client_policy.is_none()
            && self.client_exceptions.is_none()
            && self.is_default.is_none()
    }

    /// Copy of `scope` with this change applied. The ID is never touched.
    pub fn apply_to(&self, scope: &Scope) -> Scope {
        if self.is_empty() {
            return scope.clone();
        }

        let mut result = scope.clone();
        if let Some(policy) = &self.user_policy {
            result.user_policy = policy.clone();
        }
        if let Some(exceptions) = &self.user_exceptions {
            result.user_exceptions = exceptions.clone();
        }
        if let Some(policy) = &self.client_policy {
            result.client_policy = policy.clone();
        }
        if let Some(exceptions) = &self.client_exceptions {
            result.client_exceptions = exceptions.clone();
        }
        if let Some(is_default) = self.is_default {
            result.is_default = is_default;
        }
        result
    }
}

/// Return a copy of `scope` with `change` applied
pub fn apply(change: &Change, scope: &Scope) -> Scope {
    change.apply_to(scope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_scope() -> Scope {
        Scope::new("https://scopes.lockbox.dev/test")
            .with_user_policy(Policy::DefaultDeny, ["u1", "u2", "u3"])
            .with_client_policy(Policy::DefaultAllow, ["c1", "c2"])
            .with_default(true)
    }

    #[test]
    fn test_empty_change() {
        let change = Change::default();
        assert!(change.is_empty());

        let scope = sample_scope();
        assert_eq!(apply(&change, &scope), scope);
    }

    #[test]
    fn test_any_field_makes_change_non_empty() {
        let changes = [
            Change { user_policy: Some(Policy::AllowAll), ..Default::default() },
            Change { user_exceptions: Some(vec![]), ..Default::default() },
            Change { client_policy: Some(Policy::DenyAll), ..Default::default() },
            Change { client_exceptions: Some(vec![]), ..Default::default() },
            Change { is_default: Some(false), ..Default::default() },
        ];
        for change in changes {
            assert!(!change.is_empty(), "{change:?} should not be empty");
        }
    }

    #[test]
    fn test_exceptions_are_replaced_not_merged() {
        let scope = sample_scope();
        let change = Change {
            user_exceptions: Some(vec!["u9".to_string()]),
            ..Default::default()
        };

        let updated = apply(&change, &scope);
        assert_eq!(updated.user_exceptions, ["u9"]);
        assert_eq!(updated.client_exceptions, scope.client_exceptions);
        assert_eq!(updated.user_policy, scope.user_policy);
    }

    #[test]
    fn test_setting_empty_list_clears_exceptions() {
        let scope = sample_scope();
        let change = Change {
            client_exceptions: Some(Vec::new()),
            ..Default::default()
        };

        let updated = apply(&change, &scope);
        assert!(updated.client_exceptions.is_empty());
        assert_eq!(updated.user_exceptions, scope.user_exceptions);
    }

    #[test]
    fn test_apply_does_not_mutate_input() {
        let scope = sample_scope();
        let before = scope.clone();
        let change = Change {
            user_policy: Some(Policy::AllowAll),
            user_exceptions: Some(vec![]),
            client_policy: Some(Policy::DenyAll),
            client_exceptions: Some(vec!["x".to_string()]),
            is_default: Some(false),
        };

        let updated = apply(&change, &scope);
        assert_eq!(scope, before);
        assert_eq!(updated.id, scope.id);
        assert_eq!(updated.user_policy, Policy::AllowAll);
        assert!(updated.user_exceptions.is_empty());
        assert_eq!(updated.client_policy, Policy::DenyAll);
        assert_eq!(updated.client_exceptions, ["x"]);
        assert!(!updated.is_default);
    }

    #[test]
    fn test_change_json_distinguishes_absent_from_empty() {
        let change: Change = serde_json::from_str(r#"{"userExceptions": []}"#).unwrap();
        assert_eq!(change.user_exceptions, Some(vec![]));
        assert_eq!(change.client_exceptions, None);

        let change: Change = serde_json::from_str(r#"{"clientPolicy": null}"#).unwrap();
        assert!(change.is_empty());
    }

    fn policy_strategy() -> impl Strategy<Value = Policy> {
        prop_oneof![
            Just(Policy::DenyAll),
            Just(Policy::DefaultDeny),
            Just(Policy::AllowAll),
            Just(Policy::DefaultAllow),
        ]
    }

    fn ids() -> impl Strategy<Value = Vec<String>> {
        proptest::collection::vec("[a-z0-9]{1,8}", 0..5)
    }

    prop_compose! {
        fn scope_strategy()(
            id in "[a-z:/.]{1,24}",
            user_policy in policy_strategy(),
            user_exceptions in ids(),
            client_policy in policy_strategy(),
            client_exceptions in ids(),
            is_default in any::<bool>(),
        ) -> Scope {
            Scope { id, user_policy, user_exceptions, client_policy, client_exceptions, is_default }
        }
    }

    prop_compose! {
        fn change_strategy()(
            user_policy in proptest::option::of(policy_strategy()),
            user_exceptions in proptest::option::of(ids()),
            client_policy in proptest::option::of(policy_strategy()),
            client_exceptions in proptest::option::of(ids()),
            is_default in proptest::option::of(any::<bool>()),
        ) -> Change {
            Change { user_policy, user_exceptions, client_policy, client_exceptions, is_default }
        }
    }

    proptest! {
        #[test]
        fn prop_empty_change_is_identity(scope in scope_strategy()) {
            prop_assert_eq!(apply(&Change::default(), &scope), scope);
        }

        #[test]
        fn prop_id_never_changes(scope in scope_strategy(), change in change_strategy()) {
            prop_assert_eq!(apply(&change, &scope).id, scope.id);
        }

        #[test]
        fn prop_set_fields_replace_and_absent_fields_survive(
            scope in scope_strategy(),
            change in change_strategy(),
        ) {
            let updated = apply(&change, &scope);
            prop_assert_eq!(
                &updated.user_exceptions,
                change.user_exceptions.as_ref().unwrap_or(&scope.user_exceptions)
            );
            prop_assert_eq!(
                &updated.client_exceptions,
                change.client_exceptions.as_ref().unwrap_or(&scope.client_exceptions)
            );
            prop_assert_eq!(
                &updated.user_policy,
                change.user_policy.as_ref().unwrap_or(&scope.user_policy)
            );
            prop_assert_eq!(
                &updated.client_policy,
                change.client_policy.as_ref().unwrap_or(&scope.client_policy)
            );
            prop_assert_eq!(updated.is_default, change.is_default.unwrap_or(scope.is_default));
        }
    }
}
