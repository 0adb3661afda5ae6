//! Grant editor support: the toggle matrix for one subject.
//!
//! The editor renders one row per taxonomy node with a toggle for each action
//! the node supports, then submits the complete toggle map back. Because the
//! store replaces a subject's grants wholesale, the submitted map must carry
//! every row, changed or not.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Action, GrantSet, MenuTaxonomy, RawGrants};

/// Wire shape of the batch-update payload: `{ key: { action: enabled } }`.
pub type TogglePayload = BTreeMap<String, BTreeMap<String, bool>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionToggle {
    pub action: Action,
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixRow {
    pub key: String,
    pub name: String,
    pub depth: usize,
    pub parent: Option<String>,
    pub toggles: Vec<ActionToggle>,
}

/// Editable permission state, ordered like [`MenuTaxonomy::flatten`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionMatrix {
    rows: Vec<MatrixRow>,
}

impl PermissionMatrix {
    /// Seed the matrix from the taxonomy and a subject's stored grants.
    pub fn seed(taxonomy: &MenuTaxonomy, grants: &GrantSet) -> Self {
        let rows = taxonomy
            .flatten()
            .iter()
            .map(|entry| {
                let granted = grants.actions(&entry.key);
                MatrixRow {
                    key: entry.key.clone(),
                    name: entry.name.clone(),
                    depth: entry.depth,
                    parent: entry.parent.clone(),
                    toggles: entry
                        .allowed_actions
                        .iter()
                        .map(|action| ActionToggle {
                            action,
                            enabled: granted.contains(action),
                        })
                        .collect(),
                }
            })
            .collect();
        Self { rows }
    }

    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    /// Flip one toggle. Returns `false` when the pair is not togglable.
    pub fn set(&mut self, key: &str, action: Action, enabled: bool) -> bool {
        let toggle = self
            .rows
            .iter_mut()
            .find(|r| r.key == key)
            .and_then(|r| r.toggles.iter_mut().find(|t| t.action == action));
        match toggle {
            Some(t) => {
                t.enabled = enabled;
                true
            }
            None => false,
        }
    }

    /// The full payload for `BatchSetGrants`, including unchanged rows.
    pub fn to_payload(&self) -> TogglePayload {
        self.rows
            .iter()
            .map(|row| {
                let toggles = row
                    .toggles
                    .iter()
                    .map(|t| (t.action.to_string(), t.enabled))
                    .collect();
                (row.key.clone(), toggles)
            })
            .collect()
    }
}

/// Keep only enabled toggles. Validation happens later, on the write path.
pub fn toggles_to_raw(payload: &TogglePayload) -> RawGrants {
    payload
        .iter()
        .map(|(key, toggles)| {
            let actions = toggles
                .iter()
                .filter(|(_, enabled)| **enabled)
                .map(|(action, _)| action.clone())
                .collect();
            (key.clone(), actions)
        })
        .collect()
}
