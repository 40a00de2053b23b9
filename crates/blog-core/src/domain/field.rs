use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Columns of the post schema, as referenced by orderings and the admin table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostField {
    Id,
    Title,
    Slug,
    Author,
    Body,
    Publish,
    Created,
    Updated,
    Status,
}

impl PostField {
    pub const ALL: [PostField; 9] = [
        PostField::Id,
        PostField::Title,
        PostField::Slug,
        PostField::Author,
        PostField::Body,
        PostField::Publish,
        PostField::Created,
        PostField::Updated,
        PostField::Status,
    ];

    /// Field name as used in queries and forms.
    pub fn name(self) -> &'static str {
        match self {
            PostField::Id => "id",
            PostField::Title => "title",
            PostField::Slug => "slug",
            PostField::Author => "author",
            PostField::Body => "body",
            PostField::Publish => "publish",
            PostField::Created => "created",
            PostField::Updated => "updated",
            PostField::Status => "status",
        }
    }

    /// Column header shown in the admin.
    pub fn label(self) -> &'static str {
        match self {
            PostField::Id => "ID",
            PostField::Title => "Title",
            PostField::Slug => "Slug",
            PostField::Author => "Author",
            PostField::Body => "Body",
            PostField::Publish => "Publish",
            PostField::Created => "Created",
            PostField::Updated => "Updated",
            PostField::Status => "Status",
        }
    }
}

impl fmt::Display for PostField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PostField {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PostField::ALL
            .into_iter()
            .find(|field| field.name() == s)
            .ok_or_else(|| DomainError::validation("ordering", format!("unknown field '{s}'")))
    }
}

/// A single ordering term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: PostField,
    pub descending: bool,
}

impl OrderBy {
    pub const fn asc(field: PostField) -> Self {
        Self {
            field,
            descending: false,
        }
    }

    pub const fn desc(field: PostField) -> Self {
        Self {
            field,
            descending: true,
        }
    }
}

/// Parses the `-publish` / `status` notation.
impl FromStr for OrderBy {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.strip_prefix('-') {
            Some(name) => Ok(OrderBy::desc(name.parse()?)),
            None => Ok(OrderBy::asc(s.parse()?)),
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.field)
        } else {
            write!(f, "{}", self.field)
        }
    }
}
