//! Reader-facing pages: list, detail, share, comment and search.

use actix_web::{HttpRequest, HttpResponse, web};
use serde::Deserialize;
use tera::Context;
use uuid::Uuid;

use blog_core::domain::{Comment, Tag};
use blog_core::forms::{CommentForm, EmailPostForm, Form, FormErrors, SearchForm};
use blog_core::pagination::{POSTS_PER_PAGE, Paginator};
use blog_core::ports::{BaseRepository, CommentRepository, TagRepository};
use blog_core::query::CommentQuery;
use blog_core::services::send_post_recommendation;

use crate::middleware::error::{PageError, PageResult};
use crate::state::AppState;
use crate::templates::{self, CommentView, PostView, Sidebar, TagView};

/// `scheme://host` of the current request followed by `path`.
pub fn absolute_uri(req: &HttpRequest, path: &str) -> String {
    let info = req.connection_info();
    format!("{}://{}{}", info.scheme(), info.host(), path)
}

fn html(body: String) -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(body)
}

async fn page_context(state: &AppState) -> PageResult<Context> {
    Ok(Sidebar::load(&state.published).await?.context())
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<String>,
    pub tag: Option<String>,
}

/// Paginated list of published posts.
pub struct PostListView {
    pub template_name: &'static str,
    pub paginate_by: u64,
    pub context_object_name: &'static str,
}

impl Default for PostListView {
    fn default() -> Self {
        Self {
            template_name: "blog/post/list.html",
            paginate_by: POSTS_PER_PAGE,
            context_object_name: "posts",
        }
    }
}

impl PostListView {
    /// Render the page selected by `token`, restricted to `tag` when given.
    /// Out-of-range and malformed page numbers are clamped.
    pub async fn render(
        &self,
        state: &AppState,
        tag: Option<Tag>,
        token: Option<&str>,
    ) -> PageResult<HttpResponse> {
        let paginator = Paginator::new(self.paginate_by);
        let page = state
            .published
            .page(tag.as_ref().map(|t| t.id), &paginator, token)
            .await?
            .map(|post| PostView::from(&post));

        let mut context = page_context(state).await?;
        context.insert(self.context_object_name, &page);
        context.insert("tag", &tag.as_ref().map(TagView::from));
        context.insert("search", &false);
        Ok(html(templates::render(self.template_name, &context)?))
    }
}

async fn tag_or_404(state: &AppState, slug: &str) -> PageResult<Tag> {
    state.tags.find_by_slug(slug).await?.ok_or(PageError::NotFound)
}

/// GET /blog/
pub async fn post_list(
    state: web::Data<AppState>,
    params: web::Query<ListParams>,
) -> PageResult<HttpResponse> {
    let tag = match params.tag.as_deref().filter(|s| !s.is_empty()) {
        Some(slug) => Some(tag_or_404(&state, slug).await?),
        None => None,
    };

    PostListView::default()
        .render(&state, tag, params.page.as_deref())
        .await
}

/// GET /blog/tag/{tag_slug}/
pub async fn post_list_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
    params: web::Query<ListParams>,
) -> PageResult<HttpResponse> {
    let tag = tag_or_404(&state, &path).await?;

    PostListView::default()
        .render(&state, Some(tag), params.page.as_deref())
        .await
}

/// GET /blog/{year}/{month}/{day}/{slug}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<(i32, u32, u32, String)>,
) -> PageResult<HttpResponse> {
    let (year, month, day, slug) = path.into_inner();
    let post = state
        .published
        .get_by_date_and_slug(year, month, day, &slug)
        .await?;

    let comments: Vec<CommentView> = state
        .comments
        .find(&CommentQuery::visible_for(post.id), None)
        .await?
        .iter()
        .map(CommentView::from)
        .collect();
    let similar_posts: Vec<PostView> = state
        .published
        .similar_to(&post)
        .await?
        .iter()
        .map(PostView::from)
        .collect();

    let mut context = page_context(&state).await?;
    context.insert("post", &PostView::from(&post));
    context.insert("comments", &comments);
    context.insert("similar_posts", &similar_posts);
    context.insert("form", &CommentForm::default());
    context.insert("errors", &FormErrors::default());
    Ok(html(templates::render("blog/post/detail.html", &context)?))
}

async fn render_share(
    state: &AppState,
    post: &PostView,
    form: &EmailPostForm,
    errors: &FormErrors,
    sent: bool,
    send_failed: bool,
) -> PageResult<HttpResponse> {
    let mut context = page_context(state).await?;
    context.insert("post", post);
    context.insert("form", form);
    context.insert("errors", errors);
    context.insert("sent", &sent);
    context.insert("send_failed", &send_failed);
    Ok(html(templates::render("blog/post/share.html", &context)?))
}

/// GET /blog/{post_id}/share/
pub async fn post_share_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> PageResult<HttpResponse> {
    let post = state.published.get_by_id_or_404(path.into_inner()).await?;

    render_share(
        &state,
        &PostView::from(&post),
        &EmailPostForm::default(),
        &FormErrors::default(),
        false,
        false,
    )
    .await
}

/// POST /blog/{post_id}/share/
pub async fn post_share(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: web::Form<EmailPostForm>,
) -> PageResult<HttpResponse> {
    let post = state.published.get_by_id_or_404(path.into_inner()).await?;
    let view = PostView::from(&post);

    let cleaned = match form.clean() {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            return render_share(&state, &view, &form, &errors, false, false).await;
        }
    };

    let post_url = absolute_uri(&req, &post.absolute_url());
    let (sent, send_failed) =
        match send_post_recommendation(state.mailer.as_ref(), &post, &cleaned, &post_url).await {
            Ok(()) => {
                tracing::info!(post_id = %post.id, "Post recommendation sent");
                (true, false)
            }
            Err(e) => {
                tracing::error!(post_id = %post.id, error = %e, "Failed to send post recommendation");
                (false, true)
            }
        };

    render_share(&state, &view, &cleaned, &FormErrors::default(), sent, send_failed).await
}

/// POST /blog/{post_id}/comment/
pub async fn post_comment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
) -> PageResult<HttpResponse> {
    let post = state.published.get_by_id_or_404(path.into_inner()).await?;

    let (comment, shown_form, errors) = match form.clean() {
        Ok(cleaned) => {
            let comment = Comment::new(
                post.id,
                cleaned.name.clone(),
                cleaned.email.clone(),
                cleaned.body.clone(),
            );
            let saved = state.comments.save(comment).await?;
            tracing::info!(post_id = %post.id, comment_id = %saved.id, "Comment added");
            (Some(CommentView::from(&saved)), cleaned, FormErrors::default())
        }
        Err(errors) => (None, form.into_inner(), errors),
    };

    let mut context = page_context(&state).await?;
    context.insert("post", &PostView::from(&post));
    context.insert("comment", &comment);
    context.insert("form", &shown_form);
    context.insert("errors", &errors);
    Ok(html(templates::render("blog/post/comment.html", &context)?))
}

/// Any other method on the comment endpoint.
pub async fn method_not_allowed() -> PageResult<HttpResponse> {
    Err(PageError::MethodNotAllowed)
}

/// Fallback for unknown paths.
pub async fn not_found() -> PageResult<HttpResponse> {
    Err(PageError::NotFound)
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub query: Option<String>,
    pub page: Option<String>,
}

/// GET /blog/search/?query=
pub async fn post_search(
    state: web::Data<AppState>,
    params: web::Query<SearchParams>,
) -> PageResult<HttpResponse> {
    let params = params.into_inner();
    let mut query: Option<String> = None;
    let mut errors = FormErrors::default();
    let mut results = Vec::new();

    if let Some(raw) = params.query {
        match (SearchForm { query: raw }).clean() {
            Ok(cleaned) => {
                results = state.published.search(&cleaned.query).await?;
                query = Some(cleaned.query);
            }
            Err(form_errors) => errors = form_errors,
        }
    }

    let posts = Paginator::new(POSTS_PER_PAGE)
        .paginate(results, params.page.as_deref())
        .map(|post| PostView::from(&post));

    let mut context = page_context(&state).await?;
    context.insert("search", &true);
    context.insert("search_form", &SearchForm::default());
    context.insert("query", &query);
    context.insert("errors", &errors);
    context.insert("posts", &posts);
    context.insert("tag", &Option::<TagView>::None);
    Ok(html(templates::render("blog/post/list.html", &context)?))
}

/// GET / - permanent redirect to the blog.
pub async fn index() -> HttpResponse {
    HttpResponse::MovedPermanently()
        .insert_header((actix_web::http::header::LOCATION, "/blog/"))
        .finish()
}
