//! Tera templates, the `markdown` and `truncatewords_html` filters and the
//! sidebar context every page shares.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use pulldown_cmark::{Event, Options, Parser, html};
use serde::Serialize;
use tera::{Context, Tera, Value};

use blog_core::PublishedPosts;
use blog_core::domain::{Comment, Post, Tag};
use blog_core::error::RepoError;

/// Posts listed in each sidebar block.
pub const SIDEBAR_POSTS: u64 = 5;

static TEMPLATES: Lazy<Result<Tera, tera::Error>> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        ("error.html", include_str!("../templates/error.html")),
        ("blog/post/list.html", include_str!("../templates/blog/post/list.html")),
        ("blog/post/detail.html", include_str!("../templates/blog/post/detail.html")),
        ("blog/post/share.html", include_str!("../templates/blog/post/share.html")),
        ("blog/post/comment.html", include_str!("../templates/blog/post/comment.html")),
        (
            "blog/post/includes/comment_form.html",
            include_str!("../templates/blog/post/includes/comment_form.html"),
        ),
        (
            "blog/post/includes/pagination.html",
            include_str!("../templates/blog/post/includes/pagination.html"),
        ),
    ])?;
    tera.register_filter("markdown", markdown_filter);
    tera.register_filter("truncatewords_html", truncatewords_html_filter);
    Ok(tera)
});

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Templates failed to load: {0}")]
    Load(String),

    #[error("Template error: {0}")]
    Render(#[from] tera::Error),
}

fn templates() -> Result<&'static Tera, RenderError> {
    TEMPLATES
        .as_ref()
        .map_err(|e| RenderError::Load(format!("{:?}", e)))
}

/// Parse every template once; used at startup to fail fast.
pub fn check() -> Result<(), RenderError> {
    templates().map(|_| ())
}

pub fn render(name: &str, context: &Context) -> Result<String, RenderError> {
    Ok(templates()?.render(name, context)?)
}

pub fn render_error(status: u16, title: &str) -> Result<String, RenderError> {
    let mut context = Context::new();
    context.insert("status", &status);
    context.insert("title", title);
    render("error.html", &context)
}

/// Render a post body written in Markdown. Raw HTML in the source is shown
/// as text.
pub fn markdown_to_html(source: &str) -> String {
    let parser = Parser::new_ext(
        source,
        Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES,
    )
    .map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// `{{ post.body | markdown | safe }}`
fn markdown_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let source = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("markdown expects a string"))?;
    Ok(Value::String(markdown_to_html(source)))
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('<')
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Track which elements are open after `tag`.
fn track_tag(tag: &str, open: &mut Vec<String>) {
    if tag.starts_with("<!") || tag.starts_with("<?") || tag.ends_with("/>") {
        return;
    }
    let name = tag_name(tag);
    if name.is_empty() || VOID_ELEMENTS.contains(&name.as_str()) {
        return;
    }

    if tag.starts_with("</") {
        if let Some(pos) = open.iter().rposition(|n| *n == name) {
            open.truncate(pos);
        }
    } else {
        open.push(name);
    }
}

/// Split `html` into tags and text runs.
fn segments(html: &str) -> Vec<(bool, &str)> {
    let mut parts = Vec::new();
    let mut rest = html;
    while !rest.is_empty() {
        if rest.starts_with('<') {
            let end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
            parts.push((true, &rest[..end]));
            rest = &rest[end..];
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            parts.push((false, &rest[..end]));
            rest = &rest[end..];
        }
    }
    parts
}

/// Truncate `html` after `limit` words of text, appending an ellipsis and
/// closing the elements still open at the cut. Shorter input is returned as is.
pub fn truncate_words_html(html: &str, limit: usize) -> String {
    let parts = segments(html);
    let total: usize = parts
        .iter()
        .filter(|(is_tag, _)| !is_tag)
        .map(|(_, text)| text.split_whitespace().count())
        .sum();
    if total <= limit {
        return html.to_string();
    }

    let mut out = String::with_capacity(html.len());
    let mut open: Vec<String> = Vec::new();
    let mut words = 0;

    'outer: for (is_tag, part) in parts {
        if is_tag {
            track_tag(part, &mut open);
            out.push_str(part);
            continue;
        }

        let mut in_word = false;
        for (idx, ch) in part.char_indices() {
            if ch.is_whitespace() {
                if in_word && words == limit {
                    out.push_str(&part[..idx]);
                    break 'outer;
                }
                in_word = false;
            } else if !in_word {
                in_word = true;
                words += 1;
                if words > limit {
                    out.push_str(part[..idx].trim_end());
                    break 'outer;
                }
            }
        }
        out.push_str(part);
        if words >= limit {
            break;
        }
    }

    let mut out = out.trim_end().to_string();
    out.push_str(" …");
    for name in open.iter().rev() {
        out.push_str("</");
        out.push_str(name);
        out.push('>');
    }
    out
}

/// `{{ value | truncatewords_html(n=30) }}`
fn truncatewords_html_filter(value: &Value, args: &HashMap<String, Value>) -> tera::Result<Value> {
    let html = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("truncatewords_html expects a string"))?;
    let limit = match args.get("n") {
        Some(n) => n
            .as_u64()
            .ok_or_else(|| tera::Error::msg("truncatewords_html: `n` must be a positive integer"))?,
        None => return Err(tera::Error::msg("truncatewords_html requires `n`")),
    };

    Ok(Value::String(truncate_words_html(html, limit as usize)))
}

/// Tag as shown in templates.
#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub name: String,
    pub slug: String,
    pub url: String,
}

impl From<&Tag> for TagView {
    fn from(tag: &Tag) -> Self {
        Self {
            name: tag.name.clone(),
            slug: tag.slug.clone(),
            url: format!("/blog/tag/{}/", tag.slug),
        }
    }
}

/// Post as shown in templates.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub url: String,
    pub share_url: String,
    pub comment_url: String,
    pub publish: String,
    pub tags: Vec<TagView>,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            body: post.body.clone(),
            url: post.absolute_url(),
            share_url: format!("/blog/{}/share/", post.id),
            comment_url: format!("/blog/{}/comment/", post.id),
            publish: post.publication_date.format("%b %-d, %Y").to_string(),
            tags: post.tags.iter().map(TagView::from).collect(),
        }
    }
}

/// Comment as shown in templates.
#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub name: String,
    pub body: String,
    pub created: String,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            name: comment.name.clone(),
            body: comment.body.clone(),
            created: comment.created_at.format("%b %-d, %Y %H:%M").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct CommentedPost {
    post: PostView,
    total_comments: u64,
}

/// Values of the blog template tags, shown in the sidebar of every page.
#[derive(Debug, Clone, Serialize)]
pub struct Sidebar {
    total_posts: u64,
    latest_posts: Vec<PostView>,
    most_commented_posts: Vec<CommentedPost>,
}

impl Sidebar {
    pub async fn load(published: &PublishedPosts) -> Result<Self, RepoError> {
        let total_posts = published.count().await?;
        let latest_posts = published
            .latest(SIDEBAR_POSTS)
            .await?
            .iter()
            .map(PostView::from)
            .collect();
        let most_commented_posts = published
            .most_commented(SIDEBAR_POSTS)
            .await?
            .iter()
            .map(|(post, total_comments)| CommentedPost {
                post: PostView::from(post),
                total_comments: *total_comments,
            })
            .collect();

        Ok(Self {
            total_posts,
            latest_posts,
            most_commented_posts,
        })
    }

    /// A context pre-filled with the sidebar values.
    pub fn context(&self) -> Context {
        let mut context = Context::new();
        context.insert("total_posts", &self.total_posts);
        context.insert("latest_posts", &self.latest_posts);
        context.insert("most_commented_posts", &self.most_commented_posts);
        context
    }
}
