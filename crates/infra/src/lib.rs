//! Infrastructure layer: grant persistence and the batch-update write path.

pub mod grant_store;
pub mod service;

pub use grant_store::{GrantStore, GrantStoreError, InMemoryGrantStore, PostgresGrantStore};
pub use service::{BatchOutcome, BatchSetError, GrantService};
