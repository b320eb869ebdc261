//! Publication status
//!
//! Stored in the PostgreSQL `status` enum, serialized as a lowercase string.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Publication state of a content record
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "status", rename_all = "lowercase")]
pub enum ContentStatus {
    #[default]
    Draft,
    Publish,
}

impl ContentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
        }
    }

    /// Parse user input, ignoring case. Empty or unknown values yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "publish" => Some(Self::Publish),
            _ => None,
        }
    }

    pub fn all() -> &'static [Self] {
        &[Self::Draft, Self::Publish]
    }
}

impl fmt::Display for ContentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
