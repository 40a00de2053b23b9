use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::field::{OrderBy, PostField};
use super::slug::is_valid_slug;
use crate::error::DomainError;

pub const TITLE_MAX_LENGTH: usize = 250;
pub const SLUG_MAX_LENGTH: usize = 250;

/// Publication status of a post. Any status may be changed to any other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

impl PostStatus {
    pub const ALL: [PostStatus; 2] = [PostStatus::Draft, PostStatus::Published];

    /// Stored value.
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Published => "published",
        }
    }

    /// Human readable choice label.
    pub fn label(self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Published => "Published",
        }
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PostStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(PostStatus::Draft),
            "published" => Ok(PostStatus::Published),
            other => Err(DomainError::validation(
                "status",
                format!("'{other}' is not one of draft, published"),
            )),
        }
    }
}

/// Post entity - a blog post written by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub title: String,
    /// Unique among posts published on the same date.
    pub slug: String,
    pub author_id: Uuid,
    pub body: String,
    pub publish: DateTime<Utc>,
    pub created: DateTime<Utc>,
    pub updated: DateTime<Utc>,
    pub status: PostStatus,
}

impl Post {
    /// Newest first.
    pub const DEFAULT_ORDERING: &'static [OrderBy] = &[OrderBy::desc(PostField::Publish)];

    /// Create a new draft post published now.
    pub fn new(author_id: Uuid, title: String, slug: String, body: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title,
            slug,
            author_id,
            body,
            publish: now,
            created: now,
            updated: now,
            status: PostStatus::default(),
        }
    }

    pub fn with_publish(mut self, publish: DateTime<Utc>) -> Self {
        self.publish = publish;
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    /// The calendar date (UTC) the slug must be unique for.
    pub fn publish_date(&self) -> NaiveDate {
        self.publish.date_naive()
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated = now;
    }

    /// Check the field constraints of the schema.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::validation("title", "this field is required"));
        }
        let title_len = self.title.chars().count();
        if title_len > TITLE_MAX_LENGTH {
            return Err(DomainError::validation(
                "title",
                format!("at most {TITLE_MAX_LENGTH} characters (it has {title_len})"),
            ));
        }

        if self.slug.is_empty() {
            return Err(DomainError::validation("slug", "this field is required"));
        }
        if self.slug.len() > SLUG_MAX_LENGTH {
            return Err(DomainError::validation(
                "slug",
                format!("at most {SLUG_MAX_LENGTH} characters (it has {})", self.slug.len()),
            ));
        }
        if !is_valid_slug(&self.slug) {
            return Err(DomainError::validation(
                "slug",
                "only letters, numbers, underscores or hyphens",
            ));
        }

        if self.body.trim().is_empty() {
            return Err(DomainError::validation("body", "this field is required"));
        }

        Ok(())
    }
}

impl fmt::Display for Post {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title)
    }
}
