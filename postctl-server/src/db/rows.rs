//! Flat join rows and their grouping into content records

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use sqlx::FromRow;

use crate::models::{Content, ContentStatus};

/// One row of the content / content_tag / tag LEFT JOIN.
///
/// `tag` is `None` for content without associations.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct ContentRow {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub status: ContentStatus,
    pub publish_date: Option<DateTime<Utc>>,
    pub tag: Option<String>,
}

/// Fold join rows into one record per content id, ordered by id.
pub(crate) fn group_rows(rows: impl IntoIterator<Item = ContentRow>) -> Vec<Content> {
    let mut grouped: BTreeMap<i32, Content> = BTreeMap::new();

    for row in rows {
        let content = grouped.entry(row.id).or_insert_with(|| Content {
            id: row.id,
            title: row.title,
            content: row.content,
            tags: Vec::new(),
            publish: row.publish_date,
            status: row.status,
        });

        if let Some(label) = row.tag {
            content.tags.push(label);
        }
    }

    grouped.into_values().collect()
}
