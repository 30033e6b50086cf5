//! Full-text matching rules used by the in-memory store.
//!
//! PostgreSQL evaluates `to_tsvector(title || ' ' || body) @@ plainto_tsquery(q)`
//! and orders by `ts_rank`. [`SearchVector`] reproduces the observable
//! contract: every query term must occur, and documents with a higher share
//! of matching terms rank first.

use std::collections::HashMap;

use crate::domain::Post;

/// Lower-cased alphanumeric words of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Term frequencies of a post's title and body.
#[derive(Debug, Clone)]
pub struct SearchVector {
    terms: HashMap<String, usize>,
    length: usize,
}

impl SearchVector {
    pub fn from_post(post: &Post) -> Self {
        Self::from_fields(&[&post.title, &post.body])
    }

    pub fn from_fields(fields: &[&str]) -> Self {
        let mut terms = HashMap::new();
        let mut length = 0;
        for field in fields {
            for word in tokenize(field) {
                *terms.entry(word).or_insert(0) += 1;
                length += 1;
            }
        }
        Self { terms, length }
    }

    /// Relevance of `query` against this document, or `None` when some
    /// query term is missing.
    pub fn rank(&self, query: &str) -> Option<f32> {
        let words = tokenize(query);
        if words.is_empty() || self.length == 0 {
            return None;
        }

        let mut hits = 0usize;
        for word in &words {
            hits += *self.terms.get(word)?;
        }
        Some(hits as f32 / (1.0 + (self.length as f32).ln()))
    }
}

/// Filter `posts` to those matching `query` and order by rank, then recency.
pub fn rank_matches<'a>(posts: impl IntoIterator<Item = &'a Post>, query: &str) -> Vec<Post> {
    let mut ranked: Vec<(f32, &Post)> = posts
        .into_iter()
        .filter_map(|p| SearchVector::from_post(p).rank(query).map(|r| (r, p)))
        .collect();

    ranked.sort_by(|(ra, a), (rb, b)| {
        rb.partial_cmp(ra)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(b.publication_date.cmp(&a.publication_date))
    });

    ranked.into_iter().map(|(_, p)| p.clone()).collect()
}
