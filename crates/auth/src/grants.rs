//! Per-subject grant mapping and write-side validation.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::{Action, ActionSet, MenuTaxonomy};

/// Unvalidated grants as received from a caller: `key -> [action]`.
pub type RawGrants = BTreeMap<String, Vec<String>>;

/// A subject's resolved grants: `key -> set<action>`.
///
/// Absence of a key and an empty action set are the same thing; empty sets
/// are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GrantSet(BTreeMap<String, ActionSet>);

impl GrantSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the actions for `key`. An empty set removes the key.
    pub fn insert(&mut self, key: impl Into<String>, actions: ActionSet) {
        let key = key.into();
        if actions.is_empty() {
            self.0.remove(&key);
        } else {
            self.0.insert(key, actions);
        }
    }

    /// Actions granted for `key` (empty when not granted).
    pub fn actions(&self, key: &str) -> ActionSet {
        self.0.get(key).copied().unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, ActionSet)> + '_ {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Re-check typed grants against a taxonomy (e.g. after a catalog change).
    pub fn validate(&self, taxonomy: &MenuTaxonomy) -> Validated {
        let mut out = Validated::default();
        for (key, actions) in self.iter() {
            let Some(allowed) = taxonomy.allowed_actions(key) else {
                out.issues.push(GrantIssue::UnknownKey(key.to_string()));
                continue;
            };
            for action in actions.iter().filter(|a| !allowed.contains(*a)) {
                out.issues.push(GrantIssue::InvalidAction {
                    key: key.to_string(),
                    action: action.to_string(),
                });
            }
            out.grants.insert(key, actions.intersection(allowed));
        }
        out
    }
}

impl<K: Into<String>> FromIterator<(K, ActionSet)> for GrantSet {
    fn from_iter<I: IntoIterator<Item = (K, ActionSet)>>(iter: I) -> Self {
        let mut set = GrantSet::new();
        for (key, actions) in iter {
            set.insert(key, actions);
        }
        set
    }
}

impl<'de> Deserialize<'de> for GrantSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = BTreeMap::<String, ActionSet>::deserialize(deserializer)?;
        Ok(map.into_iter().collect())
    }
}

/// A non-fatal problem found while validating grants. The offending entry is
/// dropped; the rest of the payload is kept.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GrantIssue {
    #[error("unknown menu key '{0}'")]
    UnknownKey(String),

    #[error("action '{action}' is not allowed on '{key}'")]
    InvalidAction { key: String, action: String },
}

/// Outcome of validation: the admissible grants and what was dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validated {
    pub grants: GrantSet,
    pub issues: Vec<GrantIssue>,
}

/// Validate caller-supplied grants against a taxonomy.
///
/// Unknown keys are dropped; actions that do not parse or are outside the
/// node's allowed actions are dropped from the set; nodes left with no
/// actions are omitted. Repeated keys are merged.
pub fn validate_grants<K, A, S>(
    raw: impl IntoIterator<Item = (K, A)>,
    taxonomy: &MenuTaxonomy,
) -> Validated
where
    K: AsRef<str>,
    A: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = Validated::default();
    for (key, actions) in raw {
        let key = key.as_ref();
        let Some(allowed) = taxonomy.allowed_actions(key) else {
            out.issues.push(GrantIssue::UnknownKey(key.to_string()));
            continue;
        };

        let mut admitted = out.grants.actions(key);
        for action in actions {
            let action = action.as_ref();
            match action.parse::<Action>() {
                Ok(a) if allowed.contains(a) => admitted.insert(a),
                _ => out.issues.push(GrantIssue::InvalidAction {
                    key: key.to_string(),
                    action: action.to_string(),
                }),
            }
        }
        out.grants.insert(key, admitted);
    }

    for issue in &out.issues {
        tracing::debug!(%issue, "dropping grant entry");
    }
    out
}
