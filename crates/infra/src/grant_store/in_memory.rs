use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use bizconsole_auth::GrantSet;
use bizconsole_core::SubjectId;

use super::{GrantStore, GrantStoreError};

/// In-memory grant store for tests/dev.
///
/// A replacement is a single map insert under the write lock, so readers
/// observe either the old or the new mapping.
#[derive(Debug, Default)]
pub struct InMemoryGrantStore {
    inner: RwLock<HashMap<SubjectId, GrantSet>>,
}

impl InMemoryGrantStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> GrantStoreError {
        GrantStoreError::Storage("grant store lock poisoned".to_string())
    }
}

#[async_trait]
impl GrantStore for InMemoryGrantStore {
    async fn get_grants(&self, subject: &SubjectId) -> Result<GrantSet, GrantStoreError> {
        let map = self.inner.read().map_err(|_| Self::poisoned())?;
        Ok(map.get(subject).cloned().unwrap_or_default())
    }

    async fn replace_grants(
        &self,
        subject: &SubjectId,
        grants: &GrantSet,
    ) -> Result<(), GrantStoreError> {
        let staged = grants.clone();
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        if staged.is_empty() {
            map.remove(subject);
        } else {
            map.insert(subject.clone(), staged);
        }
        Ok(())
    }

    async fn delete_subject(&self, subject: &SubjectId) -> Result<(), GrantStoreError> {
        let mut map = self.inner.write().map_err(|_| Self::poisoned())?;
        map.remove(subject);
        Ok(())
    }
}
