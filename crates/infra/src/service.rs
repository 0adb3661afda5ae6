//! Grant service: the read path and the `BatchSetGrants` write path.
//!
//! The write path is: parse the subject id, validate the payload against the
//! taxonomy (dropping unknown keys and disallowed actions), then hand the
//! complete validated mapping to the store as one atomic replacement.

use std::sync::Arc;

use thiserror::Error;

use bizconsole_auth::{
    GrantIssue, GrantSet, MenuTaxonomy, PermissionEvaluator, Subject, validate_grants,
};
use bizconsole_core::{DomainError, SubjectId};

use crate::grant_store::{GrantStore, GrantStoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchSetError {
    /// The payload is structurally unusable (e.g. malformed subject id).
    #[error(transparent)]
    Validation(#[from] DomainError),

    /// Persistence failed; the previous grants are intact.
    #[error(transparent)]
    Storage(#[from] GrantStoreError),
}

/// Result of a successful batch update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOutcome {
    pub subject_id: SubjectId,
    pub stored: GrantSet,
    pub dropped: Vec<GrantIssue>,
}

pub struct GrantService<S> {
    store: S,
    taxonomy: Arc<MenuTaxonomy>,
}

impl<S> GrantService<S>
where
    S: GrantStore,
{
    pub fn new(store: S, taxonomy: Arc<MenuTaxonomy>) -> Self {
        Self { store, taxonomy }
    }

    pub fn taxonomy(&self) -> &MenuTaxonomy {
        &self.taxonomy
    }

    pub async fn get_grants(&self, subject: &SubjectId) -> Result<GrantSet, GrantStoreError> {
        self.store.get_grants(subject).await
    }

    /// Full-replace write of a subject's grants.
    ///
    /// `subject_id` is taken raw so a malformed id surfaces as
    /// [`BatchSetError::Validation`] before anything is written.
    pub async fn batch_set_grants<K, A, T>(
        &self,
        subject_id: &str,
        grants: impl IntoIterator<Item = (K, A)>,
    ) -> Result<BatchOutcome, BatchSetError>
    where
        K: AsRef<str>,
        A: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let subject_id = SubjectId::parse(subject_id)?;
        let validated = validate_grants(grants, &self.taxonomy);

        if !validated.issues.is_empty() {
            tracing::warn!(
                subject_id = %subject_id,
                dropped = validated.issues.len(),
                "batch update contained entries outside the menu taxonomy"
            );
        }

        if let Err(e) = self.store.replace_grants(&subject_id, &validated.grants).await {
            tracing::error!(subject_id = %subject_id, "batch update failed: {e}");
            return Err(e.into());
        }

        tracing::info!(
            subject_id = %subject_id,
            keys = validated.grants.len(),
            "grants replaced"
        );

        Ok(BatchOutcome {
            subject_id,
            stored: validated.grants,
            dropped: validated.issues,
        })
    }

    pub async fn delete_subject(&self, subject: &SubjectId) -> Result<(), GrantStoreError> {
        self.store.delete_subject(subject).await?;
        tracing::info!(subject_id = %subject, "grants deleted with subject");
        Ok(())
    }

    /// Load a fresh evaluator snapshot for `subject`.
    ///
    /// Administrators skip the store read entirely.
    pub async fn evaluator_for(&self, subject: Subject) -> Result<PermissionEvaluator, GrantStoreError> {
        let grants = if subject.is_administrator() {
            GrantSet::new()
        } else {
            self.store.get_grants(&subject.id).await?
        };
        Ok(PermissionEvaluator::new(subject, grants))
    }
}
