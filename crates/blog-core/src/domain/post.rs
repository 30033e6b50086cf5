use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Tag;

/// Maximum length of a post title and slug.
pub const TITLE_MAX_LENGTH: usize = 250;

/// Publication status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PostStatus {
    #[default]
    #[serde(rename = "DF")]
    Draft,
    #[serde(rename = "PB")]
    Published,
}

impl PostStatus {
    /// Two-letter code persisted in the datastore.
    pub fn code(self) -> &'static str {
        match self {
            PostStatus::Draft => "DF",
            PostStatus::Published => "PB",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PostStatus::Draft => "Draft",
            PostStatus::Published => "Published",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "DF" => Some(PostStatus::Draft),
            "PB" => Some(PostStatus::Published),
            _ => None,
        }
    }
}

/// Post entity - an article written by an author.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub publication_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub status: PostStatus,
    /// Tags attached to the post. Loaded by the repository; empty when not fetched.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Post {
    /// Create a new draft post. The slug is derived from the title and the
    /// publication date defaults to now.
    pub fn new(author_id: Uuid, title: impl Into<String>, body: impl Into<String>) -> Self {
        let title = title.into();
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            author_id,
            slug: slug::slugify(&title),
            title,
            body: body.into(),
            publication_date: now,
            created_at: now,
            updated_at: now,
            status: PostStatus::Draft,
            tags: Vec::new(),
        }
    }

    pub fn with_slug(mut self, slug: impl Into<String>) -> Self {
        self.slug = slug.into();
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn published_at(mut self, publication_date: DateTime<Utc>) -> Self {
        self.publication_date = publication_date;
        self
    }

    pub fn with_tags(mut self, tags: Vec<Tag>) -> Self {
        self.tags = tags;
        self
    }

    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Published
    }

    /// Move a draft to published. Publishing is one-way; calling this on a
    /// published post leaves it published.
    pub fn publish(&mut self) {
        self.status = PostStatus::Published;
        self.touch();
    }

    /// Refresh `updated_at`. Called on every save.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Calendar day used for the slug uniqueness rule.
    pub fn publication_day(&self) -> NaiveDate {
        self.publication_date.date_naive()
    }

    /// Path of the detail page for this post.
    pub fn absolute_url(&self) -> String {
        detail_path(
            self.publication_date.year(),
            self.publication_date.month(),
            self.publication_date.day(),
            &self.slug,
        )
    }

    pub fn tag_ids(&self) -> Vec<Uuid> {
        self.tags.iter().map(|t| t.id).collect()
    }
}

impl std::fmt::Display for Post {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.title)
    }
}

/// Letters, digits, underscores and hyphens only.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Build the detail path `/blog/{year}/{month}/{day}/{slug}/`.
pub fn detail_path(year: i32, month: u32, day: u32, slug: &str) -> String {
    format!("/blog/{}/{}/{}/{}/", year, month, day, slug)
}
