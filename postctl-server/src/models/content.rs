//! Content records and write requests

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::{ContentStatus, ValidationError};

/// Content record as returned by reads
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Content {
    pub id: i32,
    pub title: String,
    pub content: String,
    /// Always present, empty when nothing is linked
    pub tags: Vec<String>,
    pub publish: Option<DateTime<Utc>>,
    pub status: ContentStatus,
}

/// Raw create/update body.
///
/// Missing and `null` fields decode as empty so that validation, not the
/// JSON decoder, decides what is acceptable. Unknown fields (`id`,
/// `publish`) are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContentRequest {
    #[serde(deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(deserialize_with = "null_as_empty")]
    pub content: String,
    pub tags: Option<Vec<String>>,
    #[serde(deserialize_with = "null_as_empty")]
    pub status: String,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Validated content write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContent {
    pub title: String,
    pub body: String,
    pub status: ContentStatus,
    pub tags: Vec<String>,
}

impl ContentRequest {
    /// Validate the request.
    ///
    /// # Rules
    /// - `title` and `content` must be non-empty (checked first)
    /// - `status` must be `draft` or `publish`, any case
    ///
    /// # Example
    /// ```
    /// use postctl_server::models::{ContentRequest, ContentStatus};
    ///
    /// let req = ContentRequest {
    ///     title: "T".into(),
    ///     content: "C".into(),
    ///     tags: None,
    ///     status: "Publish".into(),
    /// };
    /// let new = req.validate().unwrap();
    /// assert_eq!(new.status, ContentStatus::Publish);
    /// assert!(new.tags.is_empty());
    /// ```
    pub fn validate(self) -> Result<NewContent, ValidationError> {
        if self.title.is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        if self.content.is_empty() {
            return Err(ValidationError::Empty { field: "content" });
        }

        let status = ContentStatus::parse(&self.status)
            .ok_or(ValidationError::InvalidStatus { value: self.status })?;

        Ok(NewContent {
            title: self.title,
            body: self.content,
            status,
            tags: self.tags.unwrap_or_default(),
        })
    }
}
