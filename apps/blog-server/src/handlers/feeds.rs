//! RSS 2.0 feed of the latest published posts.

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use chrono::{DateTime, Utc};

use blog_core::domain::Post;

use super::blog::absolute_uri;
use crate::middleware::error::PageResult;
use crate::state::AppState;
use crate::templates::{markdown_to_html, truncate_words_html};

pub const FEED_TITLE: &str = "My blog";
pub const FEED_DESCRIPTION: &str = "New posts of my blog.";
const FEED_ITEMS: u64 = 5;
const DESCRIPTION_WORDS: usize = 30;

pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

fn render_item(post: &Post, post_url: &str) -> String {
    format!(
        "    <item>\n\
               <title>{}</title>\n\
               <link>{}</link>\n\
               <description>{}</description>\n\
               <pubDate>{}</pubDate>\n\
               <guid isPermaLink=\"true\">{}</guid>\n\
             </item>\n",
        escape_xml(&post.title),
        escape_xml(post_url),
        escape_xml(&truncate_words_html(
            &markdown_to_html(&post.body),
            DESCRIPTION_WORDS,
        )),
        rfc822(&post.publication_date),
        escape_xml(post_url),
    )
}

/// GET /blog/feed/
pub async fn latest_posts_feed(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> PageResult<HttpResponse> {
    let posts = state.published.latest(FEED_ITEMS).await?;

    let items: String = posts
        .iter()
        .map(|post| render_item(post, &absolute_uri(&req, &post.absolute_url())))
        .collect();

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{}</title>
    <link>{}</link>
    <description>{}</description>
    <language>en-us</language>
    <atom:link href="{}" rel="self" type="application/rss+xml"/>
    <lastBuildDate>{}</lastBuildDate>
{}  </channel>
</rss>"#,
        escape_xml(FEED_TITLE),
        escape_xml(&absolute_uri(&req, "/blog/")),
        escape_xml(FEED_DESCRIPTION),
        escape_xml(&absolute_uri(&req, "/blog/feed/")),
        posts
            .first()
            .map(|post| rfc822(&post.publication_date))
            .unwrap_or_default(),
        items,
    );

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/rss+xml; charset=utf-8"))
        .body(xml))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<p>"), "&lt;p&gt;");
        assert_eq!(escape_xml("\"it's\""), "&quot;it&apos;s&quot;");
    }

    #[test]
    fn test_rfc822_format() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(rfc822(&dt), "Mon, 15 Jan 2024 12:00:00 +0000");
    }

    #[test]
    fn test_item_description_is_truncated_and_escaped() {
        let body = (1..=40).map(|i| format!("w{}", i)).collect::<Vec<_>>().join(" ");
        let post = Post::new(Uuid::new_v4(), "Fish & Chips", body);

        let item = render_item(&post, "http://example.com/blog/x/");

        assert!(item.contains("<title>Fish &amp; Chips</title>"));
        assert!(item.contains("&lt;p&gt;w1 w2"));
        assert!(item.contains("w30 …&lt;/p&gt;"));
        assert!(!item.contains("w31"));
    }

    #[test]
    fn test_item_description_renders_markdown() {
        let post = Post::new(Uuid::new_v4(), "Notes", "Read **this** first");

        let item = render_item(&post, "http://example.com/blog/x/");

        assert!(item.contains(
            "<description>&lt;p&gt;Read &lt;strong&gt;this&lt;/strong&gt; first&lt;/p&gt;\n</description>"
        ));
    }
}
