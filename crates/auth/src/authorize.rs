use serde::Serialize;
use thiserror::Error;

use crate::{Action, GrantSet, Subject};

/// Default action for menu checks (showing a screen).
pub const DEFAULT_ACTION: Action = Action::View;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing '{action}' on '{key}'")]
    Forbidden { key: String, action: String },
}

/// Answers `(key, action)` queries for one subject.
///
/// The evaluator is an immutable snapshot of the subject's grants taken when
/// it was built. It must be rebuilt after the grants change; nothing here
/// observes later writes.
///
/// - No IO
/// - No panics
/// - Default-deny: unknown keys, empty grants and unknown actions all deny
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionEvaluator {
    subject: Subject,
    grants: GrantSet,
}

impl PermissionEvaluator {
    pub fn new(subject: Subject, grants: GrantSet) -> Self {
        Self { subject, grants }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn grants(&self) -> &GrantSet {
        &self.grants
    }

    /// The single administrator escape hatch. Checked before any grant lookup.
    fn bypasses(&self) -> bool {
        self.subject.is_administrator()
    }

    /// Typed check for callers that know their action statically.
    pub fn can(&self, key: &str, action: Action) -> bool {
        self.bypasses() || self.grants.actions(key).contains(action)
    }

    pub fn can_view(&self, key: &str) -> bool {
        self.can(key, DEFAULT_ACTION)
    }

    /// `HasPermission(key, action)` with exact string membership.
    ///
    /// Anything that is not one of the four action names denies (for
    /// non-administrators).
    pub fn has_permission(&self, key: &str, action: &str) -> bool {
        self.decide(key, action).granted
    }

    /// True iff at least one key allows `action`. `false` for no keys.
    pub fn has_any_permission<I, K>(&self, keys: I, action: &str) -> bool
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter().any(|k| self.has_permission(k.as_ref(), action))
    }

    /// True iff every key allows `action`. Vacuously `true` for no keys.
    pub fn has_all_permissions<I, K>(&self, keys: I, action: &str) -> bool
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        keys.into_iter().all(|k| self.has_permission(k.as_ref(), action))
    }

    /// Route guard form of [`can`](Self::can).
    pub fn authorize(&self, key: &str, action: Action) -> Result<(), AuthzError> {
        if self.can(key, action) {
            Ok(())
        } else {
            Err(AuthzError::Forbidden {
                key: key.to_string(),
                action: action.to_string(),
            })
        }
    }

    /// Explain why a query is allowed or denied.
    pub fn explain(&self, key: &str, action: &str) -> Decision {
        self.decide(key, action)
    }

    fn decide(&self, key: &str, action: &str) -> Decision {
        let reason = if self.bypasses() {
            DecisionReason::AdministratorBypass
        } else {
            let granted = self.grants.actions(key);
            if granted.is_empty() {
                DecisionReason::KeyNotGranted
            } else {
                match action.parse::<Action>() {
                    Ok(a) if granted.contains(a) => DecisionReason::Granted,
                    _ => DecisionReason::ActionNotGranted,
                }
            }
        };

        Decision {
            key: key.to_string(),
            action: action.to_string(),
            granted: reason.is_grant(),
            reason,
        }
    }
}

/// Outcome of a single query, for audit logs and the explain endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub key: String,
    pub action: String,
    pub granted: bool,
    pub reason: DecisionReason,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionReason {
    /// Subject holds the administrator role.
    AdministratorBypass,
    /// The action is in the subject's set for the key.
    Granted,
    /// No actions (or an empty set) for the key.
    KeyNotGranted,
    /// The key is granted but not this action.
    ActionNotGranted,
}

impl DecisionReason {
    pub fn is_grant(&self) -> bool {
        matches!(self, Self::AdministratorBypass | Self::Granted)
    }
}
