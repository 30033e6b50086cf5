use std::sync::Arc;

use actix_web::{App, http::StatusCode, http::header, test, web};
use chrono::{Duration, TimeZone, Utc};
use serde_json::{Value, json};
use uuid::Uuid;

use blog_core::domain::{Post, PostStatus, User};
use blog_core::ports::{
    BaseRepository, CommentRepository, Mailer, PasswordService, PostRepository, TagRepository,
    TokenService,
};
use blog_core::query::CommentQuery;
use blog_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService, MemoryOutbox};

use super::{configure_routes, not_found};
use crate::config::AdminBootstrap;
use crate::state::AppState;

const ADMIN_EMAIL: &str = "admin@example.com";
const ADMIN_PASSWORD: &str = "correct horse battery";

struct Fixture {
    store: Arc<InMemoryStore>,
    outbox: Arc<MemoryOutbox>,
    state: AppState,
    author: User,
}

async fn fixture_with(outbox: MemoryOutbox) -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let outbox = Arc::new(outbox);
    let mailer: Arc<dyn Mailer> = outbox.clone();
    let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(JwtConfig::default()));
    let state = AppState::in_memory(store.clone(), mailer, tokens);

    let author = store
        .save(User::new(
            "writer".to_string(),
            "writer@example.com".to_string(),
            "unused".to_string(),
        ))
        .await
        .unwrap();

    Fixture {
        store,
        outbox,
        state,
        author,
    }
}

async fn fixture() -> Fixture {
    fixture_with(MemoryOutbox::new()).await
}

impl Fixture {
    async fn post(&self, title: &str, body: &str, status: PostStatus, days_ago: i64) -> Post {
        let date = Utc.with_ymd_and_hms(2024, 6, 30, 12, 0, 0).unwrap() - Duration::days(days_ago);
        let post = Post::new(self.author.id, title, body)
            .with_status(status)
            .published_at(date);
        BaseRepository::<Post, Uuid>::save(self.store.as_ref(), post)
            .await
            .unwrap()
    }

    async fn published(&self, title: &str, body: &str) -> Post {
        self.post(title, body, PostStatus::Published, 0).await
    }

    async fn tag(&self, post: &Post, names: &[&str]) {
        let mut ids = Vec::new();
        for name in names {
            ids.push(self.store.get_or_create(name).await.unwrap().id);
        }
        self.store.set_tags(post.id, &ids).await.unwrap();
    }

    async fn visible_comments(&self, post: &Post) -> u64 {
        CommentRepository::count(self.store.as_ref(), &CommentQuery::visible_for(post.id))
            .await
            .unwrap()
    }
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state.clone()))
                .configure(configure_routes)
                .default_service(web::route().to(not_found)),
        )
        .await
    };
}

async fn body_text(resp: actix_web::dev::ServiceResponse) -> String {
    let bytes = test::read_body(resp).await;
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[actix_web::test]
async fn test_root_redirects_to_blog() {
    let fx = fixture().await;
    let app = app!(fx.state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;

    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/blog/");
}

#[actix_web::test]
async fn test_list_shows_published_posts_only() {
    let fx = fixture().await;
    fx.published("Visible Story", "Hello readers").await;
    fx.post("Secret Draft", "Not yet", PostStatus::Draft, 0).await;
    let app = app!(fx.state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/blog/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let html = body_text(resp).await;
    assert!(html.contains("Visible Story"));
    assert!(!html.contains("Secret Draft"));
    assert!(html.contains("I've written 1 post so far."));
}

#[actix_web::test]
async fn test_list_clamps_page_numbers() {
    let fx = fixture().await;
    let titles = ["Entry A", "Entry B", "Entry C", "Entry D", "Entry E", "Entry F", "Entry G"];
    for (i, title) in titles.iter().enumerate() {
        fx.post(title, "text", PostStatus::Published, (titles.len() - i) as i64)
            .await;
    }
    let app = app!(fx.state);

    let last = test::call_service(
        &app,
        test::TestRequest::get().uri("/blog/?page=99").to_request(),
    )
    .await;
    assert_eq!(last.status(), StatusCode::OK);
    assert!(body_text(last).await.contains("Entry A"));

    let first = test::call_service(
        &app,
        test::TestRequest::get().uri("/blog/?page=abc").to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::OK);
    assert!(!body_text(first).await.contains("Entry A"));
}

#[actix_web::test]
async fn test_tag_filter() {
    let fx = fixture().await;
    let tagged = fx.published("Tagged Story", "text").await;
    fx.published("Plain Story", "text").await;
    fx.tag(&tagged, &["Rust"]).await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/blog/tag/rust/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains(r#"Posts tagged with "Rust""#));
    assert!(html.contains("Tagged Story"));

    let unknown = test::call_service(
        &app,
        test::TestRequest::get().uri("/blog/tag/missing/").to_request(),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_detail_of_published_post() {
    let fx = fixture().await;
    let post = fx
        .published("Detail Story", "Body text **here**\n\nSecond <b>paragraph</b>")
        .await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri(&post.absolute_url()).to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("<p>Body text <strong>here</strong></p>"));
    assert!(html.contains("<p>Second &lt;b&gt;paragraph&lt;/b&gt;</p>"));
    assert!(html.contains("Add a new comment"));
}

#[actix_web::test]
async fn test_detail_of_draft_is_404() {
    let fx = fixture().await;
    let draft = fx.post("Hidden", "text", PostStatus::Draft, 0).await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri(&draft.absolute_url()).to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_detail_with_impossible_date_is_404() {
    let fx = fixture().await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/blog/2024/2/31/nope/").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_share_sends_recommendation() {
    let fx = fixture().await;
    let post = fx.published("Shared Story", "text").await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/blog/{}/share/", post.id))
            .set_form([
                ("name", "Ann"),
                ("email", "ann@example.com"),
                ("to", "bob@example.com"),
                ("comments", "Worth it"),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("E-mail successfully sent"));

    let sent = fx.outbox.messages().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].subject,
        "Ann (ann@example.com) recommends you read Shared Story"
    );
    assert_eq!(sent[0].to, vec!["bob@example.com".to_string()]);
    assert!(sent[0].body.contains(&post.absolute_url()));
    assert!(sent[0].body.contains("Ann's comments: Worth it"));
}

#[actix_web::test]
async fn test_share_with_invalid_form_sends_nothing() {
    let fx = fixture().await;
    let post = fx.published("Shared Story", "text").await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/blog/{}/share/", post.id))
            .set_form([("name", "Ann"), ("email", "not-an-email"), ("to", "")])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Enter a valid email address."));
    assert!(html.contains("This field is required."));
    assert!(fx.outbox.is_empty().await);
}

#[actix_web::test]
async fn test_share_transport_failure_is_reported() {
    let fx = fixture_with(MemoryOutbox::failing()).await;
    let post = fx.published("Shared Story", "text").await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/blog/{}/share/", post.id))
            .set_form([
                ("name", "Ann"),
                ("email", "ann@example.com"),
                ("to", "bob@example.com"),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("could not be sent"));
    assert!(!html.contains("E-mail successfully sent"));
}

#[actix_web::test]
async fn test_share_of_draft_is_404() {
    let fx = fixture().await;
    let draft = fx.post("Hidden", "text", PostStatus::Draft, 0).await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/blog/{}/share/", draft.id))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_valid_comment_is_saved_visible() {
    let fx = fixture().await;
    let post = fx.published("Commented Story", "text").await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/blog/{}/comment/", post.id))
            .set_form([
                ("name", "Ann"),
                ("email", "ann@example.com"),
                ("body", "Great post"),
            ])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_text(resp).await.contains("Your comment has been added."));
    assert_eq!(fx.visible_comments(&post).await, 1);
}

#[actix_web::test]
async fn test_invalid_comment_rerenders_form() {
    let fx = fixture().await;
    let post = fx.published("Commented Story", "text").await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/blog/{}/comment/", post.id))
            .set_form([("name", "Ann"), ("body", "No email")])
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("This field is required."));
    assert!(html.contains("No email"));
    assert_eq!(fx.visible_comments(&post).await, 0);
}

#[actix_web::test]
async fn test_comment_endpoint_rejects_get() {
    let fx = fixture().await;
    let post = fx.published("Commented Story", "text").await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri(&format!("/blog/{}/comment/", post.id))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[actix_web::test]
async fn test_search_without_query_is_empty() {
    let fx = fixture().await;
    fx.published("Searchable", "rust everywhere").await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/blog/search/").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let html = body_text(resp).await;
    assert!(html.contains("Search for posts"));
    assert!(!html.contains("Found"));

    let blank = test::call_service(
        &app,
        test::TestRequest::get().uri("/blog/search/?query=+").to_request(),
    )
    .await;
    assert!(body_text(blank).await.contains("This field is required."));
}

#[actix_web::test]
async fn test_tag_query_is_kept_across_pages() {
    let fx = fixture().await;
    for i in 0..6 {
        let post = fx
            .post(&format!("Rust {}", i), "text", PostStatus::Published, i)
            .await;
        fx.tag(&post, &["Rust"]).await;
    }
    fx.published("Untagged", "text").await;
    let app = app!(fx.state);

    let first = test::call_service(
        &app,
        test::TestRequest::get().uri("/blog/?tag=rust").to_request(),
    )
    .await;
    let html = body_text(first).await;
    assert!(html.contains(r#"href="?tag=rust&amp;page=2">Next</a>"#));

    let second = test::call_service(
        &app,
        test::TestRequest::get().uri("/blog/?tag=rust&page=2").to_request(),
    )
    .await;
    let html = body_text(second).await;
    assert!(html.contains("Page 2 of 2."));
    assert!(html.contains(r#"href="?tag=rust&amp;page=1">Previous</a>"#));
}

#[actix_web::test]
async fn test_search_finds_published_matches() {
    let fx = fixture().await;
    fx.published("Searchable", "rust everywhere").await;
    fx.post("Draft Match", "rust too", PostStatus::Draft, 0).await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/blog/search/?query=rust")
            .to_request(),
    )
    .await;

    let html = body_text(resp).await;
    assert!(html.contains("Found 1 result"));
    assert!(html.contains("Searchable"));
    assert!(!html.contains("Draft Match"));
}

#[actix_web::test]
async fn test_feed_lists_latest_posts() {
    let fx = fixture().await;
    fx.published("Feed Story", "Feed body").await;
    fx.post("Draft Story", "text", PostStatus::Draft, 0).await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/blog/feed/").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap().to_string();
    assert!(content_type.starts_with("application/rss+xml"));

    let xml = body_text(resp).await;
    assert!(xml.contains("<title>My blog</title>"));
    assert!(xml.contains("<description>New posts of my blog.</description>"));
    assert!(xml.contains("<title>Feed Story</title>"));
    assert!(!xml.contains("Draft Story"));
}

#[actix_web::test]
async fn test_sitemap_lists_published_posts() {
    let fx = fixture().await;
    let post = fx.published("Mapped Story", "text").await;
    let draft = fx.post("Unmapped", "text", PostStatus::Draft, 1).await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/sitemap.xml").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::OK);
    let xml = body_text(resp).await;
    assert!(xml.contains(&post.absolute_url()));
    assert!(!xml.contains(&draft.absolute_url()));
    assert!(xml.contains("<changefreq>weekly</changefreq>"));
    assert!(xml.contains("<priority>0.9</priority>"));
}

#[actix_web::test]
async fn test_unknown_path_renders_404_page() {
    let fx = fixture().await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/nowhere").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(body_text(resp).await.contains("Page not found"));
}

#[actix_web::test]
async fn test_health() {
    let fx = fixture().await;
    fx.published("One", "text").await;
    let app = app!(fx.state);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["published_posts"], 1);
}

async fn staff_token(fx: &Fixture) -> String {
    fx.state
        .bootstrap_admin(&AdminBootstrap {
            email: ADMIN_EMAIL.to_string(),
            password: ADMIN_PASSWORD.to_string(),
        })
        .await
        .unwrap();

    let app = app!(fx.state);
    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/auth/login")
            .set_json(json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    body["access_token"].as_str().unwrap().to_string()
}

#[actix_web::test]
async fn test_login_with_wrong_password_is_401() {
    let fx = fixture().await;
    staff_token(&fx).await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/auth/login")
            .set_json(json!({ "email": ADMIN_EMAIL, "password": "wrong" }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_admin_requires_token() {
    let fx = fixture().await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/admin/posts").to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_admin_rejects_non_staff() {
    let fx = fixture().await;
    let passwords = Argon2PasswordService::new();
    let reader = User::new(
        "reader".to_string(),
        "reader@example.com".to_string(),
        passwords.hash("reader-pass").unwrap(),
    );
    fx.store.save(reader).await.unwrap();
    let app = app!(fx.state);

    let login = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/auth/login")
            .set_json(json!({ "email": "reader@example.com", "password": "reader-pass" }))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(login).await;
    let token = body["access_token"].as_str().unwrap().to_string();

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/posts")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_admin_create_then_publish() {
    let fx = fixture().await;
    let token = staff_token(&fx).await;
    let auth = (header::AUTHORIZATION, format!("Bearer {}", token));
    let app = app!(fx.state);

    let created = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/posts")
            .insert_header(auth.clone())
            .set_json(json!({
                "title": "Fresh Admin Post",
                "body": "Written through the API",
                "tags": ["Rust", "Web", "Rust"],
            }))
            .to_request(),
    )
    .await;
    assert_eq!(created.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(created).await;
    let data = &body["data"];
    assert_eq!(data["slug"], "fresh-admin-post");
    assert_eq!(data["status"], "DF");
    assert_eq!(data["tags"].as_array().unwrap().len(), 2);
    let id = data["id"].as_str().unwrap().to_string();

    let listing = test::call_service(&app, test::TestRequest::get().uri("/blog/").to_request()).await;
    assert!(!body_text(listing).await.contains("Fresh Admin Post"));

    let published = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("/admin/posts/{}/publish", id))
            .insert_header(auth.clone())
            .to_request(),
    )
    .await;
    assert_eq!(published.status(), StatusCode::OK);
    let body: Value = test::read_body_json(published).await;
    assert_eq!(body["data"]["status"], "PB");

    let listing = test::call_service(&app, test::TestRequest::get().uri("/blog/").to_request()).await;
    assert!(body_text(listing).await.contains("Fresh Admin Post"));
}

#[actix_web::test]
async fn test_admin_duplicate_slug_same_day_conflicts() {
    let fx = fixture().await;
    let token = staff_token(&fx).await;
    let auth = (header::AUTHORIZATION, format!("Bearer {}", token));
    let app = app!(fx.state);

    let payload = json!({
        "title": "Twin",
        "body": "text",
        "publication_date": "2024-05-01T10:00:00Z",
    });
    let first = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/posts")
            .insert_header(auth.clone())
            .set_json(payload.clone())
            .to_request(),
    )
    .await;
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/posts")
            .insert_header(auth)
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_admin_create_requires_title_and_body() {
    let fx = fixture().await;
    let token = staff_token(&fx).await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/posts")
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .set_json(json!({ "title": "  " }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["errors"]["title"].is_array());
    assert!(body["errors"]["body"].is_array());
}

#[actix_web::test]
async fn test_admin_accepts_underscored_slug() {
    let fx = fixture().await;
    let token = staff_token(&fx).await;
    let auth = (header::AUTHORIZATION, format!("Bearer {}", token));
    let app = app!(fx.state);

    let accepted = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/posts")
            .insert_header(auth.clone())
            .set_json(json!({ "title": "Snake", "body": "text", "slug": "snake_case-post" }))
            .to_request(),
    )
    .await;
    assert_eq!(accepted.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(accepted).await;
    assert_eq!(body["data"]["slug"], "snake_case-post");

    let rejected = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/admin/posts")
            .insert_header(auth)
            .set_json(json!({ "title": "Spaced", "body": "text", "slug": "has space" }))
            .to_request(),
    )
    .await;
    assert_eq!(rejected.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(rejected).await;
    assert!(body["errors"]["slug"].is_array());
}

#[actix_web::test]
async fn test_admin_filters_posts_by_date() {
    let fx = fixture().await;
    fx.published("Archived", "text").await;
    let fresh = Post::new(fx.author.id, "Fresh", "text")
        .with_status(PostStatus::Published)
        .published_at(Utc::now());
    BaseRepository::<Post, Uuid>::save(fx.store.as_ref(), fresh)
        .await
        .unwrap();
    let token = staff_token(&fx).await;
    let auth = (header::AUTHORIZATION, format!("Bearer {}", token));
    let app = app!(fx.state);

    let recent = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/posts?publication_date=past_7_days")
            .insert_header(auth.clone())
            .to_request(),
    )
    .await;
    assert_eq!(recent.status(), StatusCode::OK);
    let body: Value = test::read_body_json(recent).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["items"][0]["title"], "Fresh");

    let unknown = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/comments?updated_at=last_decade")
            .insert_header(auth)
            .to_request(),
    )
    .await;
    assert_eq!(unknown.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(unknown).await;
    assert!(body["errors"]["updated_at"].is_array());
}

#[actix_web::test]
async fn test_admin_cannot_unpublish() {
    let fx = fixture().await;
    let post = fx.published("Live", "text").await;
    let token = staff_token(&fx).await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::patch()
            .uri(&format!("/admin/posts/{}", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .set_json(json!({ "status": "DF" }))
            .to_request(),
    )
    .await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn test_admin_delete_cascades_comments() {
    let fx = fixture().await;
    let post = fx.published("Doomed", "text").await;
    let comment = blog_core::domain::Comment::new(post.id, "Ann", "ann@example.com", "Bye");
    fx.store.save(comment).await.unwrap();
    let token = staff_token(&fx).await;
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/admin/posts/{}", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(fx.visible_comments(&post).await, 0);

    let again = test::call_service(
        &app,
        test::TestRequest::delete()
            .uri(&format!("/admin/posts/{}", post.id))
            .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
            .to_request(),
    )
    .await;
    assert_eq!(again.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_admin_hides_comment() {
    let fx = fixture().await;
    let post = fx.published("Moderated", "text").await;
    let comment = blog_core::domain::Comment::new(post.id, "Troll", "troll@example.com", "Spam");
    let comment = fx.store.save(comment).await.unwrap();
    let token = staff_token(&fx).await;
    let auth = (header::AUTHORIZATION, format!("Bearer {}", token));
    let app = app!(fx.state);

    let resp = test::call_service(
        &app,
        test::TestRequest::put()
            .uri(&format!("/admin/comments/{}/visibility", comment.id))
            .insert_header(auth.clone())
            .set_json(json!({ "is_visible": false }))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(fx.visible_comments(&post).await, 0);

    let hidden = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/admin/comments?visible=false")
            .insert_header(auth)
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(hidden).await;
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["items"][0]["name"], "Troll");
}
