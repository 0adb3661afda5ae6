use serde::{Deserialize, Serialize};

/// Role classification of a subject.
///
/// Roles are numeric codes issued by the employee directory. Exactly one code
/// is privileged ([`SubjectRole::ADMINISTRATOR`]); every other code is
/// evaluated purely from the subject's grants. There is no role hierarchy.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectRole(u8);

impl SubjectRole {
    pub const ADMINISTRATOR: SubjectRole = SubjectRole(1);

    pub const fn new(code: u8) -> Self {
        Self(code)
    }

    pub fn code(&self) -> u8 {
        self.0
    }

    pub fn is_administrator(&self) -> bool {
        *self == Self::ADMINISTRATOR
    }
}

impl core::fmt::Display for SubjectRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}
