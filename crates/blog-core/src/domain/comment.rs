use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Comment entity - a reader's reply attached to a single post.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Soft moderation flag. Hidden comments stay in storage.
    pub is_visible: bool,
}

impl Comment {
    /// Create a new visible comment on a post.
    pub fn new(
        post_id: Uuid,
        name: impl Into<String>,
        email: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            post_id,
            name: name.into(),
            email: email.into(),
            body: body.into(),
            created_at: now,
            updated_at: now,
            is_visible: true,
        }
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.is_visible = visible;
        self.updated_at = Utc::now();
    }
}
