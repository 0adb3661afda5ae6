use bizconsole_auth::Subject;
use bizconsole_core::SubjectId;

/// Principal context for a request (authenticated subject + role).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalContext {
    subject: Subject,
}

impl PrincipalContext {
    pub fn new(subject: Subject) -> Self {
        Self { subject }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    pub fn is_administrator(&self) -> bool {
        self.subject.is_administrator()
    }

    /// Administrators may read anyone's grants; everyone may read their own.
    pub fn may_read_grants_of(&self, subject_id: &SubjectId) -> bool {
        self.is_administrator() || self.subject.id == *subject_id
    }
}
