//! PostgreSQL content store
//!
//! - fetch: one LEFT JOIN, grouped client-side
//! - create/update/delete: one transaction each
//! - tags: find-or-create by case-insensitive label, race tolerant

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::debug;

use super::rows::{group_rows, ContentRow};
use super::store::{distinct_ids, ContentStore, StoreError};
use crate::models::{Content, NewContent};

const FETCH_CONTENT: &str = r#"
    SELECT
        content.id,
        content.title,
        content.content,
        content.status,
        content.publish_date,
        tag.label AS tag
    FROM content
    LEFT JOIN content_tag ON content.id = content_tag.content_id
    LEFT JOIN tag ON tag.id = content_tag.tag_id
    WHERE content.id = $1
    ORDER BY tag.id
"#;

const FIND_TAG: &str = r#"
    SELECT id FROM tag
    WHERE LOWER(label) = LOWER($1)
    ORDER BY id
    LIMIT 1
"#;

/// Content store backed by a shared connection pool
#[derive(Clone)]
pub struct PgContentStore {
    pool: PgPool,
}

impl PgContentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Find a tag by label ignoring case, inserting it when absent.
///
/// A concurrent request may insert the same label between the lookup and
/// the insert. `ON CONFLICT DO NOTHING` then returns no row and the lookup
/// is repeated, which sees the other transaction's committed row.
async fn find_or_create_tag(conn: &mut PgConnection, label: &str) -> Result<i32, sqlx::Error> {
    let existing: Option<(i32,)> = sqlx::query_as(FIND_TAG)
        .bind(label)
        .fetch_optional(&mut *conn)
        .await?;
    if let Some((id,)) = existing {
        return Ok(id);
    }

    let inserted: Option<(i32,)> = sqlx::query_as(
        "INSERT INTO tag (label) VALUES ($1) ON CONFLICT (label) DO NOTHING RETURNING id",
    )
    .bind(label)
    .fetch_optional(&mut *conn)
    .await?;
    if let Some((id,)) = inserted {
        return Ok(id);
    }

    let (id,): (i32,) = sqlx::query_as(FIND_TAG)
        .bind(label)
        .fetch_one(&mut *conn)
        .await?;
    Ok(id)
}

/// Resolve every label and link the distinct tags to `content_id`.
///
/// Returns the number of associations inserted.
async fn link_tags(
    conn: &mut PgConnection,
    content_id: i32,
    labels: &[String],
) -> Result<usize, sqlx::Error> {
    let mut tag_ids = Vec::with_capacity(labels.len());
    for label in labels {
        tag_ids.push(find_or_create_tag(conn, label).await?);
    }

    let tag_ids = distinct_ids(tag_ids);
    for tag_id in &tag_ids {
        sqlx::query("INSERT INTO content_tag (content_id, tag_id) VALUES ($1, $2)")
            .bind(content_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await?;
    }

    Ok(tag_ids.len())
}

#[async_trait]
impl ContentStore for PgContentStore {
    async fn fetch_by_id(&self, id: i32) -> Result<Vec<Content>, StoreError> {
        let rows: Vec<ContentRow> = sqlx::query_as(FETCH_CONTENT)
            .bind(id)
            .fetch_all(&self.pool)
            .await?;

        debug!(id, rows = rows.len(), "content fetched");
        Ok(group_rows(rows))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create(&self, content: NewContent) -> Result<i32, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (id,): (i32,) = sqlx::query_as(
            "INSERT INTO content (title, content, status) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&content.title)
        .bind(&content.body)
        .bind(content.status)
        .fetch_one(&mut *tx)
        .await?;

        let linked = link_tags(&mut tx, id, &content.tags).await?;

        tx.commit().await?;
        debug!(id, linked, "content created");
        Ok(id)
    }

    async fn update(&self, id: i32, content: NewContent) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE content SET title = $1, content = $2, status = $3 WHERE id = $4",
        )
        .bind(&content.title)
        .bind(&content.body)
        .bind(content.status)
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        sqlx::query("DELETE FROM content_tag WHERE content_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let linked = link_tags(&mut tx, id, &content.tags).await?;

        tx.commit().await?;
        debug!(id, updated, linked, "content updated");
        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let deleted = sqlx::query("DELETE FROM content WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        // Cascade already removed these; zero rows here is expected.
        sqlx::query("DELETE FROM content_tag WHERE content_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(id, deleted, "content deleted");
        Ok(())
    }
}
