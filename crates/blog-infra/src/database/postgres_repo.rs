//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sea_orm::sea_query::{Condition, Expr, Func, Query};
use sea_orm::{
    ColumnTrait, DbBackend, DbConn, EntityTrait, FromQueryResult, JoinType, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Statement, TransactionTrait,
};
use uuid::Uuid;

use blog_core::domain::{Comment, Post, Tag, User};
use blog_core::error::RepoError;
use blog_core::ports::{
    BaseRepository, CommentRepository, PostRepository, TagRepository, UserRepository,
};
use blog_core::query::{CommentQuery, PostOrdering, PostQuery, Window};

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_error, write_error};

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

const POST_COLUMNS: &str = "p.id, p.author_id, p.title, p.slug, p.body, \
     p.publication_date, p.created_at, p.updated_at, p.status";

/// `%text%` with LIKE wildcards escaped, lower-cased for case-insensitive matching.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// `a***@example.com`; keeps the first character and the domain.
pub(crate) fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let mut chars = local.chars();
            match (chars.next(), chars.next()) {
                (Some(first), Some(_)) => format!("{}***@{}", first, domain),
                _ => format!("***@{}", domain),
            }
        }
        None => "***".to_string(),
    }
}

fn lower_like<C: ColumnTrait>(column: C, pattern: &str) -> sea_orm::sea_query::SimpleExpr {
    Expr::expr(Func::lower(Expr::col(column))).like(pattern)
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let masked = mask_email(email);
        tracing::debug!(user_email = %masked, "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn count(&self, query: &CommentQuery) -> Result<u64, RepoError> {
        select_comments(query)
            .count(&self.db)
            .await
            .map_err(query_error)
    }

    async fn find(
        &self,
        query: &CommentQuery,
        window: Option<Window>,
    ) -> Result<Vec<Comment>, RepoError> {
        let mut select = select_comments(query);
        if let Some(window) = window {
            select = select.offset(window.offset).limit(window.limit);
        }

        let comments = select.all(&self.db).await.map_err(query_error)?;
        Ok(comments.into_iter().map(Into::into).collect())
    }
}

fn select_comments(query: &CommentQuery) -> Select<CommentEntity> {
    let mut condition = Condition::all();
    if let Some(post_id) = query.post_id {
        condition = condition.add(comment::Column::PostId.eq(post_id));
    }
    if let Some(visible) = query.visible {
        condition = condition.add(comment::Column::IsVisible.eq(visible));
    }
    if let Some(range) = query.created_in {
        condition = condition
            .add(comment::Column::CreatedAt.gte(range.start))
            .add(comment::Column::CreatedAt.lt(range.end));
    }
    if let Some(range) = query.updated_in {
        condition = condition
            .add(comment::Column::UpdatedAt.gte(range.start))
            .add(comment::Column::UpdatedAt.lt(range.end));
    }
    if let Some(text) = &query.text {
        let pattern = like_pattern(text);
        condition = condition.add(
            Condition::any()
                .add(lower_like(comment::Column::Name, &pattern))
                .add(lower_like(comment::Column::Email, &pattern))
                .add(lower_like(comment::Column::Body, &pattern)),
        );
    }

    CommentEntity::find()
        .filter(condition)
        .order_by_asc(comment::Column::CreatedAt)
}

fn select_posts(query: &PostQuery) -> Select<PostEntity> {
    let mut condition = Condition::all();
    if let Some(status) = query.status {
        condition = condition.add(post::Column::Status.eq(post::Status::from(status)));
    }
    if let Some(author_id) = query.author_id {
        condition = condition.add(post::Column::AuthorId.eq(author_id));
    }
    if let Some(id) = query.exclude_id {
        condition = condition.add(post::Column::Id.ne(id));
    }
    if let Some(range) = query.published_in {
        condition = condition
            .add(post::Column::PublicationDate.gte(range.start))
            .add(post::Column::PublicationDate.lt(range.end));
    }
    if let Some(range) = query.created_in {
        condition = condition
            .add(post::Column::CreatedAt.gte(range.start))
            .add(post::Column::CreatedAt.lt(range.end));
    }
    if let Some(tag_id) = query.tag_id {
        condition = condition.add(
            post::Column::Id.in_subquery(
                Query::select()
                    .column(post_tag::Column::PostId)
                    .from(PostTagEntity)
                    .and_where(post_tag::Column::TagId.eq(tag_id))
                    .to_owned(),
            ),
        );
    }
    if let Some(text) = &query.text {
        let pattern = like_pattern(text);
        condition = condition.add(
            Condition::any()
                .add(lower_like(post::Column::Title, &pattern))
                .add(lower_like(post::Column::Body, &pattern)),
        );
    }

    let select = PostEntity::find().filter(condition);
    match query.ordering {
        PostOrdering::Newest => select.order_by_desc(post::Column::PublicationDate),
        PostOrdering::StatusThenPublication => select
            .order_by_asc(post::Column::Status)
            .order_by_asc(post::Column::PublicationDate),
    }
}

/// Comment count per post, as returned by the "most commented" aggregate.
#[derive(Debug, FromQueryResult)]
struct CommentTally {
    id: Uuid,
    total_comments: i64,
}

/// PostgreSQL post repository. Every returned post carries its tags.
pub struct PostgresPostRepository {
    base: PostgresBaseRepository<PostEntity>,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self {
            base: PostgresBaseRepository::new(db),
        }
    }

    fn db(&self) -> &DbConn {
        &self.base.db
    }

    /// Load the tags of `models` with two set-oriented queries and convert.
    async fn with_tags(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let post_ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let links = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(post_ids))
            .all(self.db())
            .await
            .map_err(query_error)?;

        let tags: HashMap<Uuid, Tag> = if links.is_empty() {
            HashMap::new()
        } else {
            let tag_ids: Vec<Uuid> = links.iter().map(|l| l.tag_id).collect();
            TagEntity::find()
                .filter(tag::Column::Id.is_in(tag_ids))
                .all(self.db())
                .await
                .map_err(query_error)?
                .into_iter()
                .map(|m| (m.id, Tag::from(m)))
                .collect()
        };

        let mut by_post: HashMap<Uuid, Vec<Tag>> = HashMap::new();
        for link in links {
            if let Some(tag) = tags.get(&link.tag_id) {
                by_post.entry(link.post_id).or_default().push(tag.clone());
            }
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let mut post_tags = by_post.remove(&model.id).unwrap_or_default();
                post_tags.sort_by(|a, b| a.name.cmp(&b.name));
                Post::from(model).with_tags(post_tags)
            })
            .collect())
    }

    async fn raw_posts(&self, sql: &str, values: Vec<sea_orm::Value>) -> Result<Vec<Post>, RepoError> {
        let models = PostEntity::find()
            .from_raw_sql(Statement::from_sql_and_values(
                DbBackend::Postgres,
                sql,
                values,
            ))
            .all(self.db())
            .await
            .map_err(query_error)?;

        self.with_tags(models).await
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(self.db())
            .await
            .map_err(query_error)?;

        match model {
            Some(model) => Ok(self.with_tags(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn save(&self, entity: Post) -> Result<Post, RepoError> {
        let tags = entity.tags.clone();
        let saved: Post = self.base.save(entity).await?;
        Ok(saved.with_tags(tags))
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        BaseRepository::<Post, Uuid>::delete(&self.base, id).await
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn count(&self, query: &PostQuery) -> Result<u64, RepoError> {
        select_posts(query)
            .count(self.db())
            .await
            .map_err(query_error)
    }

    async fn find(
        &self,
        query: &PostQuery,
        window: Option<Window>,
    ) -> Result<Vec<Post>, RepoError> {
        let mut select = select_posts(query);
        if let Some(window) = window {
            select = select.offset(window.offset).limit(window.limit);
        }

        let models = select.all(self.db()).await.map_err(query_error)?;
        self.with_tags(models).await
    }

    async fn find_on_day(
        &self,
        query: &PostQuery,
        day: NaiveDate,
        slug: &str,
    ) -> Result<Option<Post>, RepoError> {
        let start = day.and_time(chrono::NaiveTime::MIN).and_utc();
        let end = start + chrono::Duration::days(1);

        let model = select_posts(query)
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::PublicationDate.gte(start))
            .filter(post::Column::PublicationDate.lt(end))
            .one(self.db())
            .await
            .map_err(query_error)?;

        match model {
            Some(model) => Ok(self.with_tags(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn similar_published(&self, post: &Post, limit: u64) -> Result<Vec<Post>, RepoError> {
        let sql = format!(
            r#"SELECT {POST_COLUMNS}
FROM blog_posts p
JOIN blog_post_tags pt ON pt.post_id = p.id
WHERE p.status = 'PB'
  AND p.id <> $1
  AND pt.tag_id IN (SELECT tag_id FROM blog_post_tags WHERE post_id = $1)
GROUP BY p.id
ORDER BY COUNT(DISTINCT pt.tag_id) DESC, p.publication_date DESC
LIMIT $2"#
        );

        self.raw_posts(&sql, vec![post.id.into(), (limit as i64).into()])
            .await
    }

    async fn search_published(&self, text: &str) -> Result<Vec<Post>, RepoError> {
        let sql = format!(
            r#"SELECT {POST_COLUMNS}
FROM blog_posts p
WHERE p.status = 'PB'
  AND to_tsvector('english', p.title || ' ' || p.body) @@ plainto_tsquery('english', $1)
ORDER BY ts_rank(
    to_tsvector('english', p.title || ' ' || p.body),
    plainto_tsquery('english', $1)
) DESC, p.publication_date DESC"#
        );

        self.raw_posts(&sql, vec![text.into()]).await
    }

    async fn most_commented_published(
        &self,
        limit: u64,
    ) -> Result<Vec<(Post, u64)>, RepoError> {
        let tallies = CommentTally::find_by_statement(Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"SELECT p.id AS id, COUNT(c.id) AS total_comments
FROM blog_posts p
LEFT JOIN blog_comments c ON c.post_id = p.id
WHERE p.status = 'PB'
GROUP BY p.id
ORDER BY total_comments DESC, p.publication_date DESC
LIMIT $1"#,
            [(limit as i64).into()],
        ))
        .all(self.db())
        .await
        .map_err(query_error)?;

        if tallies.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = tallies.iter().map(|t| t.id).collect();
        let models = PostEntity::find()
            .filter(post::Column::Id.is_in(ids))
            .all(self.db())
            .await
            .map_err(query_error)?;
        let mut posts: HashMap<Uuid, Post> = self
            .with_tags(models)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        Ok(tallies
            .into_iter()
            .filter_map(|t| {
                posts
                    .remove(&t.id)
                    .map(|p| (p, t.total_comments.max(0) as u64))
            })
            .collect())
    }

    async fn set_tags(&self, post_id: Uuid, tag_ids: &[Uuid]) -> Result<(), RepoError> {
        let txn = self.db().begin().await.map_err(query_error)?;

        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(post_id))
            .exec(&txn)
            .await
            .map_err(write_error)?;

        if !tag_ids.is_empty() {
            let mut unique = tag_ids.to_vec();
            unique.sort();
            unique.dedup();
            let links = unique.into_iter().map(|tag_id| post_tag::ActiveModel {
                post_id: sea_orm::Set(post_id),
                tag_id: sea_orm::Set(tag_id),
            });
            PostTagEntity::insert_many(links)
                .exec(&txn)
                .await
                .map_err(write_error)?;
        }

        txn.commit().await.map_err(query_error)?;
        tracing::debug!(%post_id, tags = tag_ids.len(), "Post tags replaced");
        Ok(())
    }
}

/// PostgreSQL tag repository.
pub struct PostgresTagRepository {
    db: DbConn,
}

impl PostgresTagRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_error)?;

        Ok(result.map(Into::into))
    }

    async fn get_or_create(&self, name: &str) -> Result<Tag, RepoError> {
        let candidate = Tag::new(name.trim());
        if let Some(existing) = self.find_by_slug(&candidate.slug).await? {
            return Ok(existing);
        }

        let active: tag::ActiveModel = candidate.into();
        let model = TagEntity::insert(active)
            .exec_with_returning(&self.db)
            .await
            .map_err(write_error)?;

        tracing::info!(tag = %model.slug, "Tag created");
        Ok(model.into())
    }

    async fn for_post(&self, post_id: Uuid) -> Result<Vec<Tag>, RepoError> {
        let tags = TagEntity::find()
            .join(JoinType::InnerJoin, tag::Relation::PostTags.def())
            .filter(post_tag::Column::PostId.eq(post_id))
            .order_by_asc(tag::Column::Name)
            .all(&self.db)
            .await
            .map_err(query_error)?;

        Ok(tags.into_iter().map(Into::into).collect())
    }
}
