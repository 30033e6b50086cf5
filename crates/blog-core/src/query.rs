//! Query descriptors.
//!
//! Repositories receive these plain values and translate them into their own
//! query language (SQL for PostgreSQL, predicates for the in-memory store).
//! Keeping the filters as data means the published-only restriction is a
//! property of the query, not of a special collection type.

use std::cmp::Ordering;

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc};
use uuid::Uuid;

use crate::domain::{Comment, Post, PostStatus};

/// A slice of a result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: u64,
    pub limit: u64,
}

impl Window {
    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }

    /// First `limit` rows.
    pub fn first(limit: u64) -> Self {
        Self { offset: 0, limit }
    }

    /// Apply the window to an already ordered iterator.
    pub fn apply<T>(&self, items: impl IntoIterator<Item = T>) -> Vec<T> {
        items
            .into_iter()
            .skip(self.offset as usize)
            .take(self.limit as usize)
            .collect()
    }
}

/// Half-open `[start, end)` span of time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, instant: &DateTime<Utc>) -> bool {
        *instant >= self.start && *instant < self.end
    }
}

/// Calendar choices of the admin date filters. Every span ends at the
/// start of tomorrow, month or year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFilter {
    Today,
    PastSevenDays,
    ThisMonth,
    ThisYear,
}

impl DateFilter {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "today" => Some(Self::Today),
            "past_7_days" => Some(Self::PastSevenDays),
            "this_month" => Some(Self::ThisMonth),
            "this_year" => Some(Self::ThisYear),
            _ => None,
        }
    }

    /// The span this choice selects, evaluated at `now`.
    pub fn range(self, now: DateTime<Utc>) -> DateRange {
        let today = now.date_naive();
        let midnight = |date: chrono::NaiveDate| date.and_time(NaiveTime::MIN).and_utc();

        match self {
            Self::Today => DateRange {
                start: midnight(today),
                end: midnight(today + Duration::days(1)),
            },
            Self::PastSevenDays => DateRange {
                start: midnight(today - Duration::days(7)),
                end: midnight(today + Duration::days(1)),
            },
            Self::ThisMonth => {
                let first = today - Duration::days(i64::from(today.day0()));
                DateRange {
                    start: midnight(first),
                    end: midnight(first + Months::new(1)),
                }
            }
            Self::ThisYear => {
                let first = today - Duration::days(i64::from(today.ordinal0()));
                DateRange {
                    start: midnight(first),
                    end: midnight(first + Months::new(12)),
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PostOrdering {
    /// Most recent publication first.
    #[default]
    Newest,
    /// Drafts before published, then oldest publication first.
    StatusThenPublication,
}

/// Filters over the post collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostQuery {
    pub status: Option<PostStatus>,
    pub tag_id: Option<Uuid>,
    pub author_id: Option<Uuid>,
    /// Case-insensitive substring match on title or body.
    pub text: Option<String>,
    pub exclude_id: Option<Uuid>,
    pub published_in: Option<DateRange>,
    pub created_in: Option<DateRange>,
    pub ordering: PostOrdering,
}

impl PostQuery {
    /// Every post, regardless of status.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only posts visible to readers.
    pub fn published() -> Self {
        Self {
            status: Some(PostStatus::Published),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn tagged(mut self, tag_id: Uuid) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    pub fn by_author(mut self, author_id: Uuid) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn containing(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = if text.trim().is_empty() {
            None
        } else {
            Some(text.trim().to_string())
        };
        self
    }

    pub fn excluding(mut self, id: Uuid) -> Self {
        self.exclude_id = Some(id);
        self
    }

    pub fn published_within(mut self, range: DateRange) -> Self {
        self.published_in = Some(range);
        self
    }

    pub fn created_within(mut self, range: DateRange) -> Self {
        self.created_in = Some(range);
        self
    }

    pub fn ordered_by(mut self, ordering: PostOrdering) -> Self {
        self.ordering = ordering;
        self
    }

    /// Evaluate the filters against a post whose tags are loaded.
    pub fn matches(&self, post: &Post) -> bool {
        if let Some(status) = self.status {
            if post.status != status {
                return false;
            }
        }
        if let Some(tag_id) = self.tag_id {
            if !post.tags.iter().any(|t| t.id == tag_id) {
                return false;
            }
        }
        if let Some(author_id) = self.author_id {
            if post.author_id != author_id {
                return false;
            }
        }
        if let Some(id) = self.exclude_id {
            if post.id == id {
                return false;
            }
        }
        if let Some(range) = &self.published_in {
            if !range.contains(&post.publication_date) {
                return false;
            }
        }
        if let Some(range) = &self.created_in {
            if !range.contains(&post.created_at) {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            if !post.title.to_lowercase().contains(&needle)
                && !post.body.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }

    pub fn compare(&self, a: &Post, b: &Post) -> Ordering {
        match self.ordering {
            PostOrdering::Newest => b.publication_date.cmp(&a.publication_date),
            PostOrdering::StatusThenPublication => a
                .status
                .code()
                .cmp(b.status.code())
                .then(a.publication_date.cmp(&b.publication_date)),
        }
    }
}

/// Filters over comments. Results are always oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentQuery {
    pub post_id: Option<Uuid>,
    pub visible: Option<bool>,
    /// Case-insensitive substring match on name, email or body.
    pub text: Option<String>,
    pub created_in: Option<DateRange>,
    pub updated_in: Option<DateRange>,
}

impl CommentQuery {
    pub fn all() -> Self {
        Self::default()
    }

    /// Visible comments of one post.
    pub fn visible_for(post_id: Uuid) -> Self {
        Self {
            post_id: Some(post_id),
            visible: Some(true),
            ..Self::default()
        }
    }

    pub fn with_visibility(mut self, visible: bool) -> Self {
        self.visible = Some(visible);
        self
    }

    pub fn containing(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.text = if text.trim().is_empty() {
            None
        } else {
            Some(text.trim().to_string())
        };
        self
    }

    pub fn created_within(mut self, range: DateRange) -> Self {
        self.created_in = Some(range);
        self
    }

    pub fn updated_within(mut self, range: DateRange) -> Self {
        self.updated_in = Some(range);
        self
    }

    pub fn matches(&self, comment: &Comment) -> bool {
        if let Some(post_id) = self.post_id {
            if comment.post_id != post_id {
                return false;
            }
        }
        if let Some(visible) = self.visible {
            if comment.is_visible != visible {
                return false;
            }
        }
        if let Some(range) = &self.created_in {
            if !range.contains(&comment.created_at) {
                return false;
            }
        }
        if let Some(range) = &self.updated_in {
            if !range.contains(&comment.updated_at) {
                return false;
            }
        }
        if let Some(text) = &self.text {
            let needle = text.to_lowercase();
            let hit = [&comment.name, &comment.email, &comment.body]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        true
    }
}
