use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

/// GIN index over the vector the post search matches against.
const CREATE_SEARCH_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS "idx_blog_posts_search"
ON "blog_posts"
USING GIN (to_tsvector('english', "title" || ' ' || "body"))
"#;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(CREATE_SEARCH_INDEX)
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(r#"DROP INDEX IF EXISTS "idx_blog_posts_search""#)
            .await?;
        Ok(())
    }
}
