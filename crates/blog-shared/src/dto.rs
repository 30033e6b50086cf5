//! Data Transfer Objects for the admin API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Staff login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Bearer token issued on login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
}

/// Create or update a post. Absent fields keep their current value on update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostPayload {
    pub title: Option<String>,
    /// Derived from the title when absent on create.
    pub slug: Option<String>,
    pub body: Option<String>,
    /// `DF` or `PB`.
    pub status: Option<String>,
    pub publication_date: Option<DateTime<Utc>>,
    /// Tag names; unknown tags are created.
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub status: String,
    pub status_label: String,
    pub publication_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    pub is_visible: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Show or hide a comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisibilityRequest {
    pub is_visible: bool,
}

/// Filters of the admin post list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostListQuery {
    pub status: Option<String>,
    pub author: Option<Uuid>,
    pub q: Option<String>,
    /// `today`, `past_7_days`, `this_month` or `this_year`.
    pub publication_date: Option<String>,
    pub created_at: Option<String>,
    pub page: Option<String>,
}

/// Filters of the admin comment list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentListQuery {
    pub visible: Option<bool>,
    pub q: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub page: Option<String>,
}

/// One page of an admin listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub num_pages: u64,
    pub count: u64,
}
