//! Durable per-subject grant storage.
//!
//! A store holds, for each subject, the full `key -> set<action>` mapping.
//! Writes are whole-mapping replacements and must be atomic per subject: a
//! reader sees either the previous mapping or the new one, never a mix.

pub mod in_memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;

use bizconsole_auth::GrantSet;
use bizconsole_core::SubjectId;

pub use in_memory::InMemoryGrantStore;
pub use postgres::PostgresGrantStore;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrantStoreError {
    #[error("storage error: {0}")]
    Storage(String),
}

#[async_trait]
pub trait GrantStore: Send + Sync {
    /// Grants for `subject`; empty (not an error) when none were ever stored.
    async fn get_grants(&self, subject: &SubjectId) -> Result<GrantSet, GrantStoreError>;

    /// Atomically replace every grant of `subject` with `grants`.
    ///
    /// Callers are expected to pass already-validated grants.
    async fn replace_grants(
        &self,
        subject: &SubjectId,
        grants: &GrantSet,
    ) -> Result<(), GrantStoreError>;

    /// Remove every grant of `subject` (the subject was deleted).
    async fn delete_subject(&self, subject: &SubjectId) -> Result<(), GrantStoreError>;
}

#[async_trait]
impl<S> GrantStore for Arc<S>
where
    S: GrantStore + ?Sized,
{
    async fn get_grants(&self, subject: &SubjectId) -> Result<GrantSet, GrantStoreError> {
        (**self).get_grants(subject).await
    }

    async fn replace_grants(
        &self,
        subject: &SubjectId,
        grants: &GrantSet,
    ) -> Result<(), GrantStoreError> {
        (**self).replace_grants(subject, grants).await
    }

    async fn delete_subject(&self, subject: &SubjectId) -> Result<(), GrantStoreError> {
        (**self).delete_subject(subject).await
    }
}
