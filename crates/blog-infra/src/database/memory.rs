//! In-memory store - used when no database is configured, and by tests.
//!
//! Enforces the same constraints as the PostgreSQL schema: unique user
//! email, unique tag slug, one slug per publication day, and cascading
//! deletes from users to posts and from posts to comments and tag links.
//! Data is lost on process restart.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use blog_core::domain::{Comment, Post, Tag, User};
use blog_core::error::RepoError;
use blog_core::ports::{
    BaseRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};
use blog_core::query::{CommentQuery, PostQuery, Window};
use blog_core::search::rank_matches;
use blog_core::similarity::rank_similar;

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    comments: HashMap<Uuid, Comment>,
    tags: HashMap<Uuid, Tag>,
    post_tags: BTreeSet<(Uuid, Uuid)>,
}

impl Tables {
    /// A stored post with its tags attached, sorted by name.
    fn hydrate(&self, post: &Post) -> Post {
        let mut tags: Vec<Tag> = self
            .post_tags
            .iter()
            .filter(|(post_id, _)| *post_id == post.id)
            .filter_map(|(_, tag_id)| self.tags.get(tag_id).cloned())
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));
        post.clone().with_tags(tags)
    }

    fn hydrated_posts(&self) -> Vec<Post> {
        self.posts.values().map(|p| self.hydrate(p)).collect()
    }

    fn matching_posts(&self, query: &PostQuery) -> Vec<Post> {
        let mut posts: Vec<Post> = self
            .hydrated_posts()
            .into_iter()
            .filter(|p| query.matches(p))
            .collect();
        posts.sort_by(|a, b| query.compare(a, b));
        posts
    }

    fn matching_comments(&self, query: &CommentQuery) -> Vec<Comment> {
        let mut comments: Vec<Comment> = self
            .comments
            .values()
            .filter(|c| query.matches(c))
            .cloned()
            .collect();
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        comments
    }

    fn remove_post(&mut self, id: Uuid) -> bool {
        if self.posts.remove(&id).is_none() {
            return false;
        }
        self.comments.retain(|_, c| c.post_id != id);
        self.post_tags.retain(|(post_id, _)| *post_id != id);
        true
    }
}

/// In-memory implementation of every blog repository.
///
/// One store is shared behind an `Arc` and handed out as each repository
/// trait object.
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn save(&self, entity: User) -> Result<User, RepoError> {
        let mut tables = self.tables.write().await;
        let taken = tables
            .users
            .values()
            .any(|u| u.id != entity.id && u.email == entity.email);
        if taken {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        tables.users.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Err(RepoError::NotFound);
        }

        let authored: Vec<Uuid> = tables
            .posts
            .values()
            .filter(|p| p.author_id == id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            tables.remove_post(post_id);
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.posts.get(&id).map(|p| tables.hydrate(p)))
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&entity.author_id) {
            return Err(RepoError::Constraint(
                "Referenced entity does not exist".to_string(),
            ));
        }

        let day = entity.publication_day();
        let clash = tables.posts.values().any(|p| {
            p.id != entity.id && p.slug == entity.slug && p.publication_day() == day
        });
        if clash {
            return Err(RepoError::Constraint("Entity already exists".to_string()));
        }

        let tags = entity.tags.clone();
        tables
            .posts
            .insert(entity.id, entity.clone().with_tags(Vec::new()));
        Ok(entity.with_tags(tags))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if tables.remove_post(id) {
            Ok(())
        } else {
            Err(RepoError::NotFound)
        }
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.matching_posts(query).len() as u64)
    }

    async fn find(
        &self,
        query: &PostQuery,
        window: Option<Window>,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let posts = tables.matching_posts(query);
        Ok(match window {
            Some(window) => window.apply(posts),
            None => posts,
        })
    }

    async fn find_on_day(
        &self,
        query: &PostQuery,
        day: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .matching_posts(query)
            .into_iter()
            .find(|p| p.slug == slug && p.publication_day() == day))
    }

    async fn similar_published(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let target = match tables.posts.get(&post.id) {
            Some(stored) => tables.hydrate(stored),
            None => post.clone(),
        };
        let candidates = tables.hydrated_posts();
        Ok(rank_similar(&target, &candidates, limit))
    }

    async fn search_published(&self, text: &str) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let published = tables.matching_posts(&PostQuery::published());
        Ok(rank_matches(&published, text))
    }

    async fn most_commented_published(
        &self,
        limit: u64,
    ) -> Result<Vec<(Post, u64)>, RepoError> {
        let tables = self.tables.read().await;
        let mut tallied: Vec<(Post, u64)> = tables
            .matching_posts(&PostQuery::published())
            .into_iter()
            .map(|p| {
                let total = tables.comments.values().filter(|c| c.post_id == p.id).count();
                (p, total as u64)
            })
            .collect();

        // Stable sort keeps the newest-first order among equal counts.
        tallied.sort_by(|(_, a), (_, b)| b.cmp(a));
        tallied.truncate(limit as usize);
        Ok(tallied)
    }

    async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&post_id)
            || tag_ids.iter().any(|id| !tables.tags.contains_key(id))
        {
            return Err(RepoError::Constraint(
                "Referenced entity does not exist".to_string(),
            ));
        }

        tables.post_tags.retain(|(id, _)| *id != post_id);
        for tag_id in tag_ids {
            tables.post_tags.insert((post_id, *tag_id));
        }
        Ok(())
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.comments.get(&id).cloned())
    }

    async fn save(&self, entity: Comment) -> Result<Comment, RepoError> {
        let mut tables = self.tables.write().await;
        if !tables.posts.contains_key(&entity.post_id) {
            return Err(RepoError::Constraint(
                "Referenced entity does not exist".to_string(),
            ));
        }

        tables.comments.insert(entity.id, entity.clone());
        Ok(entity)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut tables = self.tables.write().await;
        tables
            .comments
            .remove(&id)
            .map(|_| ())
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn count(&self, query: &CommentQuery) -> Result<u64, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.matching_comments(query).len() as u64)
    }

    async fn find(
        &self,
        query: &CommentQuery,
        window: Option<Window>,
    ) -> Result<Vec<Comment>, RepoError> {
        let tables = self.tables.read().await;
        let comments = tables.matching_comments(query);
        Ok(match window {
            Some(window) => window.apply(comments),
            None => comments,
        })
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.tags.values().find(|t| t.slug == slug).cloned())
    }

    async fn get_or_create(&self, name: &str) -> Result<Tag, RepoError> {
        let candidate = Tag::new(name.trim());
        let mut tables = self.tables.write().await;
        if let Some(existing) = tables.tags.values().find(|t| t.slug == candidate.slug) {
            return Ok(existing.clone());
        }

        tables.tags.insert(candidate.id, candidate.clone());
        Ok(candidate)
    }

    async fn for_post(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .get(&post_id)
            .map(|p| tables.hydrate(p).tags)
            .unwrap_or_default())
    }
}
