//! Staff-only JSON API over posts and comments.

use actix_web::{HttpResponse, web};
use chrono::Utc;
use uuid::Uuid;

use blog_core::domain::{Comment, Post, PostStatus, TITLE_MAX_LENGTH, is_valid_slug};
use blog_core::forms::FormErrors;
use blog_core::pagination::Paginator;
use blog_core::ports::{BaseRepository, CommentRepository, PostRepository, TagRepository};
use blog_core::query::{CommentQuery, DateFilter, DateRange, PostOrdering, PostQuery};
use blog_core::RepoError;
use blog_shared::ApiResponse;
use blog_shared::dto::{
    CommentListQuery, CommentResponse, ListResponse, PostListQuery, PostPayload, PostResponse,
    VisibilityRequest,
};

use crate::middleware::auth::StaffIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// Rows per page of an admin listing.
pub const ADMIN_PAGE_SIZE: u64 = 20;

fn post_response(post: &Post) -> PostResponse {
    PostResponse {
        id: post.id,
        author_id: post.author_id,
        title: post.title.clone(),
        slug: post.slug.clone(),
        body: post.body.clone(),
        status: post.status.code().to_string(),
        status_label: post.status.label().to_string(),
        publication_date: post.publication_date,
        created_at: post.created_at,
        updated_at: post.updated_at,
        tags: post.tags.iter().map(|t| t.name.clone()).collect(),
        url: post.absolute_url(),
    }
}

fn comment_response(comment: &Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        name: comment.name.clone(),
        email: comment.email.clone(),
        body: comment.body.clone(),
        is_visible: comment.is_visible,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

async fn post_or_404(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("post {} not found", id)))
}

fn parse_status(code: &str, errors: &mut FormErrors) -> Option<PostStatus> {
    let status = PostStatus::from_code(code.trim());
    if status.is_none() {
        errors.add("status", "Select a valid choice. Use DF or PB.");
    }
    status
}

/// Range selected by a date filter parameter. Blank means no filter.
fn date_range(field: &str, code: Option<&str>, errors: &mut FormErrors) -> Option<DateRange> {
    let code = code.map(str::trim).filter(|c| !c.is_empty())?;
    match DateFilter::from_code(code) {
        Some(filter) => Some(filter.range(Utc::now())),
        None => {
            errors.add(
                field,
                "Select a valid choice. Use today, past_7_days, this_month or this_year.",
            );
            None
        }
    }
}

/// Apply `payload` to `post`. Absent fields are left alone.
fn apply_payload(post: &mut Post, payload: &PostPayload) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    if let Some(title) = &payload.title {
        let title = title.trim();
        if title.is_empty() {
            errors.add("title", "This field is required.");
        } else if title.chars().count() > TITLE_MAX_LENGTH {
            errors.add("title", "Ensure this value has at most 250 characters.");
        }
        post.title = title.to_string();
    }

    if let Some(slug) = &payload.slug {
        let slug = slug.trim();
        if slug.is_empty() {
            post.slug = slug::slugify(&post.title);
        } else if !is_valid_slug(slug) {
            errors.add(
                "slug",
                "Enter a valid slug consisting of letters, numbers, underscores or hyphens.",
            );
        } else {
            post.slug = slug.to_string();
        }
    }
    if post.slug.chars().count() > TITLE_MAX_LENGTH {
        errors.add("slug", "Ensure this value has at most 250 characters.");
    }

    if let Some(body) = &payload.body {
        if body.trim().is_empty() {
            errors.add("body", "This field is required.");
        }
        post.body = body.clone();
    }

    if let Some(code) = &payload.status {
        match parse_status(code, &mut errors) {
            Some(PostStatus::Draft) if post.is_published() => {
                errors.add("status", "A published post cannot return to draft.");
            }
            Some(PostStatus::Published) => post.publish(),
            _ => {}
        }
    }

    if let Some(publication_date) = payload.publication_date {
        post.publication_date = publication_date;
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Resolve tag names, creating unknown tags, and link them to the post.
async fn replace_tags(state: &AppState, post_id: Uuid, names: &[String]) -> AppResult<()> {
    let mut tag_ids = Vec::new();
    for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
        let tag = state.tags.get_or_create(name).await?;
        if !tag_ids.contains(&tag.id) {
            tag_ids.push(tag.id);
        }
    }
    state.posts.set_tags(post_id, &tag_ids).await?;
    Ok(())
}

/// GET /admin/posts
pub async fn list_posts(
    _staff: StaffIdentity,
    state: web::Data<AppState>,
    params: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let mut query = PostQuery::all().ordered_by(PostOrdering::StatusThenPublication);
    let mut errors = FormErrors::default();

    if let Some(code) = params.status.as_deref().filter(|s| !s.trim().is_empty()) {
        if let Some(status) = parse_status(code, &mut errors) {
            query = query.with_status(status);
        }
    }
    if let Some(range) = date_range(
        "publication_date",
        params.publication_date.as_deref(),
        &mut errors,
    ) {
        query = query.published_within(range);
    }
    if let Some(range) = date_range("created_at", params.created_at.as_deref(), &mut errors) {
        query = query.created_within(range);
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }
    if let Some(author_id) = params.author {
        query = query.by_author(author_id);
    }
    if let Some(text) = params.q {
        query = query.containing(text);
    }

    let count = state.posts.count(&query).await?;
    let window = Paginator::new(ADMIN_PAGE_SIZE).resolve(params.page.as_deref(), count);
    let posts = state.posts.find(&query, Some(window.window())).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ListResponse {
        items: posts.iter().map(post_response).collect(),
        page: window.number,
        num_pages: window.num_pages,
        count,
    })))
}

/// POST /admin/posts
pub async fn create_post(
    staff: StaffIdentity,
    state: web::Data<AppState>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let payload = body.into_inner();

    let mut errors = FormErrors::default();
    if payload.title.as_deref().map_or(true, |t| t.trim().is_empty()) {
        errors.add("title", "This field is required.");
    }
    if payload.body.as_deref().map_or(true, |b| b.trim().is_empty()) {
        errors.add("body", "This field is required.");
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }

    let mut post = Post::new(staff.user_id, "", "");
    apply_payload(&mut post, &payload)?;
    if payload.slug.is_none() {
        post.slug = slug::slugify(&post.title);
    }

    let saved = state.posts.save(post).await?;
    if let Some(names) = &payload.tags {
        replace_tags(&state, saved.id, names).await?;
    }
    let saved = post_or_404(&state, saved.id).await?;

    tracing::info!(post_id = %saved.id, staff = %staff.email, "Post created");
    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(&saved))))
}

/// GET /admin/posts/{id}
pub async fn get_post(
    _staff: StaffIdentity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = post_or_404(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(&post))))
}

/// PUT|PATCH /admin/posts/{id}
pub async fn update_post(
    _staff: StaffIdentity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PostPayload>,
) -> AppResult<HttpResponse> {
    let payload = body.into_inner();
    let mut post = post_or_404(&state, path.into_inner()).await?;

    apply_payload(&mut post, &payload)?;
    post.touch();

    let saved = state.posts.save(post).await?;
    if let Some(names) = &payload.tags {
        replace_tags(&state, saved.id, names).await?;
    }
    let saved = post_or_404(&state, saved.id).await?;

    tracing::info!(post_id = %saved.id, "Post updated");
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(&saved))))
}

/// POST /admin/posts/{id}/publish
pub async fn publish_post(
    _staff: StaffIdentity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let mut post = post_or_404(&state, path.into_inner()).await?;
    if post.is_published() {
        return Ok(HttpResponse::Ok().json(ApiResponse::ok_with_message(
            post_response(&post),
            "Post was already published",
        )));
    }

    post.publish();
    let saved = state.posts.save(post).await?;

    tracing::info!(post_id = %saved.id, "Post published");
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(&saved))))
}

/// DELETE /admin/posts/{id}
pub async fn delete_post(
    _staff: StaffIdentity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.delete(id).await.map_err(|e| match e {
        RepoError::NotFound => AppError::NotFound(format!("post {} not found", id)),
        other => other.into(),
    })?;

    tracing::info!(post_id = %id, "Post deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// GET /admin/comments
pub async fn list_comments(
    _staff: StaffIdentity,
    state: web::Data<AppState>,
    params: web::Query<CommentListQuery>,
) -> AppResult<HttpResponse> {
    let params = params.into_inner();
    let mut query = CommentQuery::all();
    let mut errors = FormErrors::default();
    if let Some(visible) = params.visible {
        query = query.with_visibility(visible);
    }
    if let Some(range) = date_range("created_at", params.created_at.as_deref(), &mut errors) {
        query = query.created_within(range);
    }
    if let Some(range) = date_range("updated_at", params.updated_at.as_deref(), &mut errors) {
        query = query.updated_within(range);
    }
    if !errors.is_empty() {
        return Err(errors.into());
    }
    if let Some(text) = params.q {
        query = query.containing(text);
    }

    let count = state.comments.count(&query).await?;
    let window = Paginator::new(ADMIN_PAGE_SIZE).resolve(params.page.as_deref(), count);
    let comments = state.comments.find(&query, Some(window.window())).await?;

    Ok(HttpResponse::Ok().json(ApiResponse::ok(ListResponse {
        items: comments.iter().map(comment_response).collect(),
        page: window.number,
        num_pages: window.num_pages,
        count,
    })))
}

/// PUT /admin/comments/{id}/visibility
pub async fn set_comment_visibility(
    _staff: StaffIdentity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<VisibilityRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut comment = state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("comment {} not found", id)))?;

    comment.set_visible(body.is_visible);
    let saved = state.comments.save(comment).await?;

    tracing::info!(comment_id = %saved.id, is_visible = saved.is_visible, "Comment moderated");
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment_response(&saved))))
}
