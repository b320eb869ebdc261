//! In-memory content store
//!
//! Mirrors the PostgreSQL store's observable behaviour: generated ids,
//! case-insensitive tag reuse, tag rows that outlive their content, and
//! association writes that fail for unknown content. One write lock per
//! operation makes each write atomic.

use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use super::rows::{group_rows, ContentRow};
use super::store::{distinct_ids, ContentStore, StoreError};
use crate::models::{Content, ContentStatus, NewContent};

#[derive(Debug, Clone)]
struct ContentRecord {
    title: String,
    body: String,
    status: ContentStatus,
    publish: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    last_content_id: i32,
    last_tag_id: i32,
    contents: BTreeMap<i32, ContentRecord>,
    tags: BTreeMap<i32, String>,
    /// (content_id, tag_id)
    links: BTreeSet<(i32, i32)>,
}

impl Tables {
    fn find_or_create_tag(&mut self, label: &str) -> i32 {
        let wanted = label.to_lowercase();
        if let Some((id, _)) = self.tags.iter().find(|(_, l)| l.to_lowercase() == wanted) {
            return *id;
        }

        self.last_tag_id += 1;
        self.tags.insert(self.last_tag_id, label.to_string());
        self.last_tag_id
    }

    fn link_tags(&mut self, content_id: i32, labels: &[String]) -> Result<usize, StoreError> {
        if !labels.is_empty() && !self.contents.contains_key(&content_id) {
            return Err(StoreError::Constraint(format!(
                "insert on table \"content_tag\" violates foreign key constraint: content {} does not exist",
                content_id
            )));
        }

        let resolved: Vec<i32> = labels
            .iter()
            .map(|label| self.find_or_create_tag(label))
            .collect();

        let tag_ids = distinct_ids(resolved);
        for tag_id in &tag_ids {
            self.links.insert((content_id, *tag_id));
        }
        Ok(tag_ids.len())
    }

    fn unlink(&mut self, content_id: i32) {
        self.links.retain(|(c, _)| *c != content_id);
    }
}

/// Content store held entirely in process memory
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    tables: RwLock<Tables>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every tag label ever created, in creation order.
    pub async fn tag_labels(&self) -> Vec<String> {
        self.tables.read().await.tags.values().cloned().collect()
    }

    /// Number of associations held for a content id.
    pub async fn link_count(&self, content_id: i32) -> usize {
        self.tables
            .read()
            .await
            .links
            .iter()
            .filter(|(c, _)| *c == content_id)
            .count()
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn fetch_by_id(&self, id: i32) -> Result<Vec<Content>, StoreError> {
        let tables = self.tables.read().await;
        let Some(record) = tables.contents.get(&id) else {
            return Ok(Vec::new());
        };

        let row = |tag: Option<String>| ContentRow {
            id,
            title: record.title.clone(),
            content: record.body.clone(),
            status: record.status,
            publish_date: Some(record.publish),
            tag,
        };

        let mut rows: Vec<ContentRow> = tables
            .links
            .iter()
            .filter(|(c, _)| *c == id)
            .filter_map(|(_, tag_id)| tables.tags.get(tag_id).cloned())
            .map(|label| row(Some(label)))
            .collect();
        if rows.is_empty() {
            rows.push(row(None));
        }

        Ok(group_rows(rows))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn create(&self, content: NewContent) -> Result<i32, StoreError> {
        let mut tables = self.tables.write().await;

        tables.last_content_id += 1;
        let id = tables.last_content_id;
        tables.contents.insert(
            id,
            ContentRecord {
                title: content.title,
                body: content.body,
                status: content.status,
                publish: Utc::now(),
            },
        );
        tables.link_tags(id, &content.tags)?;

        Ok(id)
    }

    async fn update(&self, id: i32, content: NewContent) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;

        if !tables.contents.contains_key(&id) {
            // Nothing to overwrite. Linking tags to the missing row fails
            // the same way the foreign key would.
            return tables.link_tags(id, &content.tags).map(|_| ());
        }

        if let Some(record) = tables.contents.get_mut(&id) {
            record.title = content.title;
            record.body = content.body;
            record.status = content.status;
        }
        tables.unlink(id);
        tables.link_tags(id, &content.tags)?;

        Ok(())
    }

    async fn delete(&self, id: i32) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        tables.contents.remove(&id);
        tables.unlink(id);
        Ok(())
    }
}
