use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Comment, Post, Tag, User};
use crate::error::RepoError;
use crate::query::{CommentQuery, PostQuery, Window};

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
///
/// Posts returned from every method carry their tags. `save` persists the
/// post's own columns only; tag links are written with [`PostRepository::set_tags`].
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Number of posts matching `query`.
    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError>;

    /// Posts matching `query`, in the query's ordering, optionally windowed.
    async fn find(&self, query: &PostQuery, window: Option<Window>)
    -> Result<Vec<Post>, RepoError>;

    /// The post matching `query` with `slug` published on `day` (UTC).
    async fn find_on_day(
        &self,
        query: &PostQuery,
        day: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError>;

    /// Published posts sharing at least one tag with `post`, most shared
    /// tags first, then newest.
    async fn similar_published(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Published posts whose title and body match `text`, best rank first.
    async fn search_published(&self, text: &str) -> Result<Vec<Post>, RepoError>;

    /// Published posts with the most comments, paired with their comment count.
    async fn most_commented_published(&self, limit: u64)
    -> Result<Vec<(Post, u64)>, RepoError>;

    /// Replace the tag links of a post.
    async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError>;
}

/// Comment repository. Results are ordered oldest first.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    async fn count(&self, query: &CommentQuery) -> Result<u64, RepoError>;

    async fn find(
        &self,
        query: &CommentQuery,
        window: Option<Window>,
    ) -> Result<Vec<Comment>, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    /// Fetch the tag with this name's slug, creating it when missing.
    async fn get_or_create(&self, name: &str) -> Result<Tag, RepoError>;

    async fn for_post(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError>;
}
