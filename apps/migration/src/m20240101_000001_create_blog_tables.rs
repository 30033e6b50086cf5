use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Username,
    Email,
    PasswordHash,
    IsStaff,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum BlogPosts {
    Table,
    Id,
    AuthorId,
    Title,
    Slug,
    Body,
    PublicationDate,
    CreatedAt,
    UpdatedAt,
    Status,
}

#[derive(DeriveIden)]
enum BlogComments {
    Table,
    Id,
    PostId,
    Name,
    Email,
    Body,
    CreatedAt,
    UpdatedAt,
    IsVisible,
}

#[derive(DeriveIden)]
enum BlogTags {
    Table,
    Id,
    Name,
    Slug,
}

#[derive(DeriveIden)]
enum BlogPostTags {
    Table,
    PostId,
    TagId,
}

fn timestamp(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .default(Expr::current_timestamp())
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Username).string_len(150).not_null())
                    .col(
                        ColumnDef::new(Users::Email)
                            .string_len(254)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(
                        ColumnDef::new(Users::IsStaff)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogPosts::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlogPosts::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BlogPosts::AuthorId).uuid().not_null())
                    .col(ColumnDef::new(BlogPosts::Title).string_len(250).not_null())
                    .col(ColumnDef::new(BlogPosts::Slug).string_len(250).not_null())
                    .col(ColumnDef::new(BlogPosts::Body).text().not_null())
                    .col(timestamp(BlogPosts::PublicationDate))
                    .col(timestamp(BlogPosts::CreatedAt))
                    .col(timestamp(BlogPosts::UpdatedAt))
                    .col(
                        ColumnDef::new(BlogPosts::Status)
                            .string_len(2)
                            .not_null()
                            .default("DF")
                            .check(Expr::col(BlogPosts::Status).is_in(["DF", "PB"])),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_posts_author")
                            .from(BlogPosts::Table, BlogPosts::AuthorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_posts_publication_date")
                    .table(BlogPosts::Table)
                    .col((BlogPosts::PublicationDate, IndexOrder::Desc))
                    .to_owned(),
            )
            .await?;

        // One slug per calendar day of publication (UTC).
        manager
            .get_connection()
            .execute_unprepared(
                r#"CREATE UNIQUE INDEX IF NOT EXISTS "uq_blog_posts_slug_day"
                   ON "blog_posts" ("slug", (("publication_date" AT TIME ZONE 'UTC')::date))"#,
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogComments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlogComments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BlogComments::PostId).uuid().not_null())
                    .col(ColumnDef::new(BlogComments::Name).string_len(80).not_null())
                    .col(ColumnDef::new(BlogComments::Email).string_len(254).not_null())
                    .col(ColumnDef::new(BlogComments::Body).text().not_null())
                    .col(timestamp(BlogComments::CreatedAt))
                    .col(timestamp(BlogComments::UpdatedAt))
                    .col(
                        ColumnDef::new(BlogComments::IsVisible)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_comments_post")
                            .from(BlogComments::Table, BlogComments::PostId)
                            .to(BlogPosts::Table, BlogPosts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_blog_comments_created_at")
                    .table(BlogComments::Table)
                    .col(BlogComments::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlogTags::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(BlogTags::Name).string_len(100).not_null())
                    .col(
                        ColumnDef::new(BlogTags::Slug)
                            .string_len(100)
                            .not_null()
                            .unique_key(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlogPostTags::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(BlogPostTags::PostId).uuid().not_null())
                    .col(ColumnDef::new(BlogPostTags::TagId).uuid().not_null())
                    .primary_key(
                        Index::create()
                            .col(BlogPostTags::PostId)
                            .col(BlogPostTags::TagId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_post_tags_post")
                            .from(BlogPostTags::Table, BlogPostTags::PostId)
                            .to(BlogPosts::Table, BlogPosts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_blog_post_tags_tag")
                            .from(BlogPostTags::Table, BlogPostTags::TagId)
                            .to(BlogTags::Table, BlogTags::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlogPostTags::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlogTags::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlogComments::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlogPosts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await
    }
}
