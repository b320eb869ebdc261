//! Content store abstraction
//!
//! Handlers talk to a `dyn ContentStore`, so the PostgreSQL store can be
//! swapped for [`MemoryContentStore`](super::MemoryContentStore) in tests.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::models::{Content, NewContent};

/// Storage error
///
/// Displays the underlying driver message unchanged; API clients see it as
/// the body of a 500 response.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    /// Constraint violation raised by a non-SQL store
    #[error("{0}")]
    Constraint(String),
}

/// Content persistence operations.
///
/// Writes are all-or-nothing: a failure part way through leaves no trace.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Content with the given id and its tag labels. Empty when absent.
    async fn fetch_by_id(&self, id: i32) -> Result<Vec<Content>, StoreError>;

    /// Insert content and link its tags, returning the generated id.
    async fn create(&self, content: NewContent) -> Result<i32, StoreError>;

    /// Replace title, body, status and the full tag set of `id`.
    async fn update(&self, id: i32, content: NewContent) -> Result<(), StoreError>;

    /// Remove content and its associations. Deleting a missing id succeeds.
    async fn delete(&self, id: i32) -> Result<(), StoreError>;

    /// Cheap round trip proving the backing store answers.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Drop repeated ids, keeping first occurrences in order.
///
/// Labels differing only in case resolve to the same tag, and linking it
/// twice would violate the `content_tag` primary key.
pub(crate) fn distinct_ids(ids: impl IntoIterator<Item = i32>) -> Vec<i32> {
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}
