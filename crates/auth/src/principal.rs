use serde::{Deserialize, Serialize};

use bizconsole_core::SubjectId;

use crate::SubjectRole;

/// Identity that permissions are evaluated for (an employee or role).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Subject {
    pub id: SubjectId,
    pub role: SubjectRole,
}

impl Subject {
    pub fn new(id: SubjectId, role: SubjectRole) -> Self {
        Self { id, role }
    }

    pub fn is_administrator(&self) -> bool {
        self.role.is_administrator()
    }
}
