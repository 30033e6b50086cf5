//! The reader-facing view over posts.
//!
//! Every query issued from here is restricted to published posts, so drafts
//! can never be listed, displayed, shared, commented on or searched.

use std::sync::Arc;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::Post;
use crate::error::{DomainError, RepoError};
use crate::pagination::{Page, Paginator};
use crate::ports::{BaseRepository, PostRepository};
use crate::query::{PostQuery, Window};
use crate::similarity::SIMILAR_POSTS_LIMIT;

#[derive(Clone)]
pub struct PublishedPosts {
    posts: Arc<dyn PostRepository>,
}

impl PublishedPosts {
    pub fn new(posts: Arc<dyn PostRepository>) -> Self {
        Self { posts }
    }

    /// The base query of this view.
    pub fn query(&self) -> PostQuery {
        PostQuery::published()
    }

    pub async fn count(&self) -> Result<u64, RepoError> {
        self.posts.count(&self.query()).await
    }

    /// All published posts, newest first.
    pub async fn all(&self) -> Result<Vec<Post>, RepoError> {
        self.posts.find(&self.query(), None).await
    }

    /// The `n` most recently published posts.
    pub async fn latest(&self, n: u64) -> Result<Vec<Post>, RepoError> {
        self.posts.find(&self.query(), Some(Window::first(n))).await
    }

    /// One page of published posts, optionally restricted to a tag. The page
    /// token is clamped by `paginator`.
    pub async fn page(
        &self,
        tag_id: Option<Uuid>,
        paginator: &Paginator,
        token: Option<&str>,
    ) -> Result<Page<Post>, RepoError> {
        let mut query = self.query();
        if let Some(tag_id) = tag_id {
            query = query.tagged(tag_id);
        }

        let count = self.posts.count(&query).await?;
        let window = paginator.resolve(token, count);
        let items = if count == 0 {
            Vec::new()
        } else {
            self.posts.find(&query, Some(window.window())).await?
        };

        Ok(Page::new(items, window))
    }

    /// A published post by id, or `NotFound`.
    pub async fn get_by_id_or_404(&self, id: Uuid) -> Result<Post, DomainError> {
        match self.posts.find_by_id(id).await? {
            Some(post) if post.is_published() => Ok(post),
            _ => Err(DomainError::not_found("post", id)),
        }
    }

    /// A published post by publication day and slug, or `NotFound`.
    /// Impossible dates are treated as missing posts.
    pub async fn get_by_date_and_slug(
        &self,
        year: i32,
        month: u32,
        day: u32,
        slug: &str,
    ) -> Result<Post, DomainError> {
        let key = || format!("{}/{}/{}/{}", year, month, day, slug);
        let date = NaiveDate::from_ymd_opt(year, month, day)
            .ok_or_else(|| DomainError::not_found("post", key()))?;

        self.posts
            .find_on_day(&self.query(), date, slug)
            .await?
            .ok_or_else(|| DomainError::not_found("post", key()))
    }

    /// Up to four published posts sharing the most tags with `post`.
    pub async fn similar_to(&self, post: &Post) -> Result<Vec<Post>, RepoError> {
        if post.tags.is_empty() {
            return Ok(Vec::new());
        }
        self.posts
            .similar_published(post, SIMILAR_POSTS_LIMIT)
            .await
    }

    /// Ranked full-text matches. A blank query matches nothing.
    pub async fn search(&self, text: &str) -> Result<Vec<Post>, RepoError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        self.posts.search_published(text).await
    }

    pub async fn most_commented(&self, n: u64) -> Result<Vec<(Post, u64)>, RepoError> {
        self.posts.most_commented_published(n).await
    }
}
