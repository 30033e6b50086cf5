#[cfg(test)]
mod tests {
    use crate::database::entity::{post, post_tag, tag, user};
    use std::collections::BTreeMap;

    use crate::database::postgres_repo::{
        PostgresPostRepository, PostgresUserRepository, mask_email,
    };
    use blog_core::domain::{Post, PostStatus};
    use blog_core::ports::{BaseRepository, PostRepository, UserRepository};
    use sea_orm::{DatabaseBackend, MockDatabase, Value};

    fn post_model(id: uuid::Uuid, author_id: uuid::Uuid) -> post::Model {
        let now = chrono::Utc::now();
        post::Model {
            id,
            author_id,
            title: "Test Post".to_owned(),
            slug: "test-post".to_owned(),
            body: "Content".to_owned(),
            publication_date: now.into(),
            created_at: now.into(),
            updated_at: now.into(),
            status: post::Status::Published,
        }
    }

    #[tokio::test]
    async fn test_find_post_by_id_loads_tags() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();
        let tag_id = uuid::Uuid::new_v4();

        // Post row, then its tag links, then the tags themselves
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(post_id, author_id)]])
            .append_query_results([vec![post_tag::Model { post_id, tag_id }]])
            .append_query_results([vec![tag::Model {
                id: tag_id,
                name: "Rust".to_owned(),
                slug: "rust".to_owned(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(post_id).await.unwrap();

        let post = result.unwrap();
        assert_eq!(post.title, "Test Post");
        assert_eq!(post.id, post_id);
        assert_eq!(post.status, PostStatus::Published);
        assert_eq!(post.tags.len(), 1);
        assert_eq!(post.tags[0].slug, "rust");
    }

    #[tokio::test]
    async fn test_find_missing_post() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db);

        let result: Option<Post> = repo.find_by_id(uuid::Uuid::new_v4()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_save_inserts_when_update_finds_no_row() {
        let post_id = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();

        // UPDATE ... RETURNING yields nothing, INSERT ... RETURNING yields the row
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<post::Model>::new()])
            .append_query_results([vec![post_model(post_id, author_id)]])
            .into_connection();

        let repo = PostgresPostRepository::new(db);
        let draft = Post::new(author_id, "Test Post", "Content");

        let saved = repo.save(draft).await.unwrap();
        assert_eq!(saved.id, post_id);
        assert_eq!(saved.slug, "test-post");
    }

    #[tokio::test]
    async fn test_find_user_by_email() {
        let now = chrono::Utc::now();
        let user_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user::Model {
                id: user_id,
                username: "admin".to_owned(),
                email: "admin@example.com".to_owned(),
                password_hash: "hash".to_owned(),
                is_staff: true,
                created_at: now.into(),
                updated_at: now.into(),
            }]])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let user = repo
            .find_by_email("admin@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, user_id);
        assert!(user.is_staff);
    }

    #[test]
    fn test_mask_email_keeps_first_character() {
        assert_eq!(mask_email("admin@example.com"), "a***@example.com");
        assert_eq!(mask_email("élodie@example.com"), "é***@example.com");
        assert_eq!(mask_email("x@example.com"), "***@example.com");
        assert_eq!(mask_email("not-an-email"), "***");
    }

    #[tokio::test]
    async fn test_find_user_by_non_ascii_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<user::Model>::new()])
            .into_connection();

        let repo = PostgresUserRepository::new(db);

        let user = repo.find_by_email("élodie@example.com").await.unwrap();
        assert!(user.is_none());
    }

    #[tokio::test]
    async fn test_similar_published_ranks_in_one_statement() {
        let source = Post::new(uuid::Uuid::new_v4(), "Source", "text");
        let similar_id = uuid::Uuid::new_v4();
        let tag_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(similar_id, source.author_id)]])
            .append_query_results([vec![post_tag::Model {
                post_id: similar_id,
                tag_id,
            }]])
            .append_query_results([vec![tag::Model {
                id: tag_id,
                name: "Rust".to_owned(),
                slug: "rust".to_owned(),
            }]])
            .into_connection();

        let repo = PostgresPostRepository::new(db.clone());
        let similar = repo.similar_published(&source, 4).await.unwrap();

        assert_eq!(similar.len(), 1);
        assert_eq!(similar[0].id, similar_id);
        assert_eq!(similar[0].tags[0].slug, "rust");

        let log = db.into_transaction_log();
        let ranking = &log[0].statements()[0];
        assert!(ranking.sql.contains("p.status = 'PB'"));
        assert!(ranking.sql.contains("p.id <> $1"));
        assert!(
            ranking
                .sql
                .contains("ORDER BY COUNT(DISTINCT pt.tag_id) DESC, p.publication_date DESC")
        );
        assert_eq!(
            ranking.values.as_ref().map(|v| v.0.clone()),
            Some(vec![Value::from(source.id), Value::from(4i64)])
        );
    }

    #[tokio::test]
    async fn test_search_published_uses_english_text_search() {
        let post_id = uuid::Uuid::new_v4();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![post_model(post_id, uuid::Uuid::new_v4())]])
            .append_query_results([Vec::<post_tag::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db.clone());
        let found = repo.search_published("django rust").await.unwrap();

        assert_eq!(found.len(), 1);
        assert!(found[0].tags.is_empty());

        let log = db.into_transaction_log();
        let search = &log[0].statements()[0];
        assert!(search.sql.contains("plainto_tsquery('english', $1)"));
        assert!(search.sql.contains(") DESC, p.publication_date DESC"));
        assert_eq!(
            search.values.as_ref().map(|v| v.0.clone()),
            Some(vec![Value::from("django rust")])
        );
    }

    #[tokio::test]
    async fn test_most_commented_keeps_tally_order() {
        let busy = uuid::Uuid::new_v4();
        let quiet = uuid::Uuid::new_v4();
        let author_id = uuid::Uuid::new_v4();

        let tally = |id: uuid::Uuid, total: i64| {
            BTreeMap::from([
                ("id", Value::from(id)),
                ("total_comments", Value::from(total)),
            ])
        };

        // Tallies, then the posts (in storage order), then their tag links
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![tally(busy, 3), tally(quiet, 0)]])
            .append_query_results([vec![
                post_model(quiet, author_id),
                post_model(busy, author_id),
            ]])
            .append_query_results([Vec::<post_tag::Model>::new()])
            .into_connection();

        let repo = PostgresPostRepository::new(db.clone());
        let ranked = repo.most_commented_published(5).await.unwrap();

        assert_eq!(ranked.len(), 2);
        assert_eq!((ranked[0].0.id, ranked[0].1), (busy, 3));
        assert_eq!((ranked[1].0.id, ranked[1].1), (quiet, 0));

        let log = db.into_transaction_log();
        let statement = &log[0].statements()[0];
        assert!(statement.sql.contains("LEFT JOIN blog_comments c ON c.post_id = p.id"));
        assert!(statement.sql.contains("ORDER BY total_comments DESC, p.publication_date DESC"));
    }
}
