//! XML sitemap of published posts.

use std::fmt;

use actix_web::{HttpRequest, HttpResponse, http::header, web};
use chrono::{DateTime, SecondsFormat, Utc};

use super::blog::absolute_uri;
use super::feeds::escape_xml;
use crate::middleware::error::{PageError, PageResult};
use crate::state::AppState;

const POST_PRIORITY: f32 = 0.9;

#[derive(Debug, thiserror::Error)]
pub enum SitemapError {
    #[error("Priority must be between 0.0 and 1.0, got {0}")]
    InvalidPriority(f32),
}

/// How often a page is expected to change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeFrequency {
    Always,
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Never,
}

impl fmt::Display for ChangeFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChangeFrequency::Always => "always",
            ChangeFrequency::Hourly => "hourly",
            ChangeFrequency::Daily => "daily",
            ChangeFrequency::Weekly => "weekly",
            ChangeFrequency::Monthly => "monthly",
            ChangeFrequency::Yearly => "yearly",
            ChangeFrequency::Never => "never",
        };
        f.write_str(s)
    }
}

/// Relative importance of a page, in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Priority(f32);

impl Priority {
    pub fn new(value: f32) -> Result<Self, SitemapError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(SitemapError::InvalidPriority(value))
        }
    }

    pub fn value(&self) -> f32 {
        self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self(0.5)
    }
}

#[derive(Debug, Clone)]
pub struct SitemapItem {
    pub loc: String,
    pub lastmod: Option<DateTime<Utc>>,
    pub changefreq: Option<ChangeFrequency>,
    pub priority: Option<Priority>,
}

impl SitemapItem {
    pub fn new(loc: impl Into<String>) -> Self {
        Self {
            loc: loc.into(),
            lastmod: None,
            changefreq: None,
            priority: None,
        }
    }

    pub fn with_lastmod(mut self, lastmod: DateTime<Utc>) -> Self {
        self.lastmod = Some(lastmod);
        self
    }

    pub fn with_changefreq(mut self, changefreq: ChangeFrequency) -> Self {
        self.changefreq = Some(changefreq);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn to_xml(&self) -> String {
        let mut xml = format!("  <url>\n    <loc>{}</loc>\n", escape_xml(&self.loc));
        if let Some(lastmod) = self.lastmod {
            xml.push_str(&format!(
                "    <lastmod>{}</lastmod>\n",
                lastmod.to_rfc3339_opts(SecondsFormat::Secs, true)
            ));
        }
        if let Some(changefreq) = self.changefreq {
            xml.push_str(&format!("    <changefreq>{}</changefreq>\n", changefreq));
        }
        if let Some(priority) = self.priority {
            xml.push_str(&format!("    <priority>{:.1}</priority>\n", priority.value()));
        }
        xml.push_str("  </url>\n");
        xml
    }
}

#[derive(Debug, Clone, Default)]
pub struct Sitemap {
    pub items: Vec<SitemapItem>,
}

impl Sitemap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_item(&mut self, item: SitemapItem) {
        self.items.push(item);
    }

    pub fn to_xml(&self) -> String {
        let urls: String = self.items.iter().map(SitemapItem::to_xml).collect();
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>\n",
            urls
        )
    }
}

/// GET /sitemap.xml
pub async fn sitemap(req: HttpRequest, state: web::Data<AppState>) -> PageResult<HttpResponse> {
    let priority =
        Priority::new(POST_PRIORITY).map_err(|e| PageError::Internal(e.to_string()))?;

    let mut sitemap = Sitemap::new();
    for post in state.published.all().await? {
        sitemap.add_item(
            SitemapItem::new(absolute_uri(&req, &post.absolute_url()))
                .with_lastmod(post.updated_at)
                .with_changefreq(ChangeFrequency::Weekly)
                .with_priority(priority),
        );
    }

    Ok(HttpResponse::Ok()
        .insert_header((header::CONTENT_TYPE, "application/xml; charset=utf-8"))
        .body(sitemap.to_xml()))
}
