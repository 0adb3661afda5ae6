//! Postgres-backed grant store.
//!
//! One row per `(subject_id, menu_key)` with the granted actions as a
//! `TEXT[]`. A batch update deletes the subject's rows and inserts the new
//! ones inside a single transaction, so a failure at any point rolls back to
//! the previous mapping.
//!
//! ## Error Mapping
//!
//! Every SQLx error (connection loss, pool closed, constraint or transaction
//! abort) becomes `GrantStoreError::Storage` tagged with the failing step.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::instrument;

use bizconsole_auth::{Action, ActionSet, GrantSet};
use bizconsole_core::SubjectId;

use super::{GrantStore, GrantStoreError};

/// Schema for the grant table (idempotent).
pub const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS subject_grants (
    subject_id  TEXT        NOT NULL,
    menu_key    TEXT        NOT NULL,
    actions     TEXT[]      NOT NULL,
    updated_at  TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    PRIMARY KEY (subject_id, menu_key)
)
"#;

/// Postgres grant store.
///
/// ## Thread Safety
///
/// Uses the SQLx connection pool, which is `Send + Sync`.
///
/// ## Concurrency
///
/// Writers for the same subject are serialized with a transaction-scoped
/// advisory lock; the later commit wins.
#[derive(Debug, Clone)]
pub struct PostgresGrantStore {
    pool: Arc<PgPool>,
}

impl PostgresGrantStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    /// Connect and make sure the schema exists.
    pub async fn connect(database_url: &str) -> Result<Self, GrantStoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        let store = Self::new(pool);
        store.migrate().await?;
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), GrantStoreError> {
        sqlx::query(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl GrantStore for PostgresGrantStore {
    #[instrument(skip(self), fields(subject_id = %subject), err)]
    async fn get_grants(&self, subject: &SubjectId) -> Result<GrantSet, GrantStoreError> {
        let rows = sqlx::query(
            r#"
            SELECT menu_key, actions
            FROM subject_grants
            WHERE subject_id = $1
            "#,
        )
        .bind(subject.as_str())
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_grants", e))?;

        let mut grants = GrantSet::new();
        for row in rows {
            let key: String = row
                .try_get("menu_key")
                .map_err(|e| map_sqlx_error("decode_menu_key", e))?;
            let actions: Vec<String> = row
                .try_get("actions")
                .map_err(|e| map_sqlx_error("decode_actions", e))?;

            let mut set = ActionSet::empty();
            for raw in actions {
                match raw.parse::<Action>() {
                    Ok(a) => set.insert(a),
                    // Unreadable rows deny rather than fail the read.
                    Err(e) => tracing::warn!(key = %key, "ignoring stored action: {e}"),
                }
            }
            grants.insert(key, set);
        }
        Ok(grants)
    }

    #[instrument(skip(self, grants), fields(subject_id = %subject, keys = grants.len()), err)]
    async fn replace_grants(
        &self,
        subject: &SubjectId,
        grants: &GrantSet,
    ) -> Result<(), GrantStoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
            .bind(subject.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("lock_subject", e))?;

        sqlx::query("DELETE FROM subject_grants WHERE subject_id = $1")
            .bind(subject.as_str())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("delete_previous", e))?;

        for (key, actions) in grants.iter() {
            let actions: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
            sqlx::query(
                r#"
                INSERT INTO subject_grants (subject_id, menu_key, actions)
                VALUES ($1, $2, $3)
                "#,
            )
            .bind(subject.as_str())
            .bind(key)
            .bind(&actions)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_grant", e))?;
        }

        // Dropping `tx` on any early return above rolls back.
        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(subject_id = %subject), err)]
    async fn delete_subject(&self, subject: &SubjectId) -> Result<(), GrantStoreError> {
        sqlx::query("DELETE FROM subject_grants WHERE subject_id = $1")
            .bind(subject.as_str())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_subject", e))?;
        Ok(())
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> GrantStoreError {
    GrantStoreError::Storage(format!("{operation}: {err}"))
}
