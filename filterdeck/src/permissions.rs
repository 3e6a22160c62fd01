//! Permission policy consulted before showing resource actions.
//!
//! The policy is injected rather than global: a [`SessionPermissions`] handle is created
//! when a user authenticates and dropped with the session.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// Wildcard accepted for both module and action names.
pub const ANY: &str = "*";

pub mod actions {
    pub const VIEW: &str = "view";
    pub const CREATE: &str = "create";
    pub const EDIT: &str = "edit";
    pub const DELETE: &str = "delete";
    pub const EXPORT: &str = "export";

    pub const ALL: &[&str] = &[VIEW, CREATE, EDIT, DELETE, EXPORT];
}

/// Answers whether `subject` may perform `action` on `module`.
pub trait PermissionPolicy: Send + Sync {
    fn can(&self, subject: &str, module: &str, action: &str) -> bool;
}

/// Static role table: role -> module -> allowed actions.
///
/// ```toml
/// [roles.admin]
/// "*" = ["*"]
///
/// [roles.editor]
/// carousels = ["view", "create", "edit"]
/// webinars = ["view"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleGrants {
    roles: BTreeMap<String, BTreeMap<String, BTreeSet<String>>>,
}

impl RoleGrants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style grant.
    pub fn grant<A, S>(mut self, role: impl Into<String>, module: impl Into<String>, actions: A) -> Self
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.roles
            .entry(role.into())
            .or_default()
            .entry(module.into())
            .or_default()
            .extend(actions.into_iter().map(Into::into));
        self
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    fn allows(actions: &BTreeSet<String>, action: &str) -> bool {
        actions.contains(action) || actions.contains(ANY)
    }
}

impl PermissionPolicy for RoleGrants {
    fn can(&self, subject: &str, module: &str, action: &str) -> bool {
        let Some(modules) = self.roles.get(subject) else {
            return false;
        };
        modules.get(module).is_some_and(|actions| Self::allows(actions, action))
            || modules.get(ANY).is_some_and(|actions| Self::allows(actions, action))
    }
}

/// Permission handle scoped to one authenticated session.
#[derive(Clone)]
pub struct SessionPermissions {
    subject: String,
    policy: Arc<dyn PermissionPolicy>,
}

impl SessionPermissions {
    pub fn new(subject: impl Into<String>, policy: Arc<dyn PermissionPolicy>) -> Self {
        Self {
            subject: subject.into(),
            policy,
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn can(&self, module: &str, action: &str) -> bool {
        let allowed = self.policy.can(&self.subject, module, action);
        log::debug!("permission {}:{module}:{action} -> {allowed}", self.subject);
        allowed
    }

    /// Actions from [`actions::ALL`] this session may perform on `module`.
    pub fn allowed_actions(&self, module: &str) -> Vec<&'static str> {
        actions::ALL
            .iter()
            .copied()
            .filter(|action| self.can(module, action))
            .collect()
    }
}

impl fmt::Debug for SessionPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionPermissions").field("subject", &self.subject).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grants() -> RoleGrants {
        RoleGrants::new()
            .grant("admin", ANY, [ANY])
            .grant("editor", "carousels", [actions::VIEW, actions::CREATE, actions::EDIT])
            .grant("editor", "webinars", [actions::VIEW])
            .grant("auditor", ANY, [actions::VIEW, actions::EXPORT])
    }

    #[test]
    fn role_table_answers_per_module_and_action() {
        let grants = grants();
        assert!(grants.can("editor", "carousels", actions::EDIT));
        assert!(!grants.can("editor", "carousels", actions::DELETE));
        assert!(!grants.can("editor", "institutes", actions::VIEW));
        assert!(grants.can("admin", "institutes", actions::DELETE));
        assert!(grants.can("auditor", "webinars", actions::EXPORT));
        assert!(!grants.can("auditor", "webinars", actions::EDIT));
        assert!(!grants.can("guest", "carousels", actions::VIEW));
    }

    #[test]
    fn session_scopes_policy_to_subject() {
        let session = SessionPermissions::new("editor", Arc::new(grants()));
        assert_eq!(session.subject(), "editor");
        assert!(session.can("webinars", actions::VIEW));
        assert_eq!(session.allowed_actions("carousels"), [actions::VIEW, actions::CREATE, actions::EDIT]);
    }

    #[test]
    fn grants_parse_from_toml() {
        let grants: RoleGrants = toml::from_str(
            r#"
            [admin]
            "*" = ["*"]

            [editor]
            carousels = ["view", "edit"]
            "#,
        )
        .expect("grants should parse");
        assert!(grants.can("admin", "anything", "delete"));
        assert!(grants.can("editor", "carousels", "edit"));
        assert_eq!(grants.roles().collect::<Vec<_>>(), ["admin", "editor"]);
    }
}
