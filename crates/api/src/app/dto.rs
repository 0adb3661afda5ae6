use serde::{Deserialize, Serialize};

use bizconsole_auth::{ActionSet, FlatEntry, GrantSet, TogglePayload};

// -------------------------
// Request DTOs
// -------------------------

/// Body of `PUT /permissions/batch-update`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdateRequest {
    pub subject_id: String,
    pub permissions: TogglePayload,
}

#[derive(Debug, Deserialize)]
pub struct ExplainQuery {
    pub key: String,
    #[serde(default = "default_action")]
    pub action: String,
}

fn default_action() -> String {
    "view".to_string()
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct PermissionEntry {
    pub key: String,
    pub actions: ActionSet,
}

#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub success: bool,
    pub permissions: Vec<PermissionEntry>,
}

impl From<&GrantSet> for PermissionsResponse {
    fn from(grants: &GrantSet) -> Self {
        Self {
            success: true,
            permissions: grants
                .iter()
                .map(|(key, actions)| PermissionEntry {
                    key: key.to_string(),
                    actions,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// The caller's own session bootstrap (`GET /me/permissions`).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPermissionsResponse {
    pub success: bool,
    pub subject_id: String,
    pub administrator: bool,
    pub permissions: Vec<PermissionEntry>,
}

#[derive(Debug, Serialize)]
pub struct MenuResponse<'a> {
    pub version: u32,
    pub entries: &'a [FlatEntry],
}
