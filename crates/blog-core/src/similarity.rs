//! Tag-overlap ranking for "related posts".

use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::Post;

/// Number of related posts shown on a detail page.
pub const SIMILAR_POSTS_LIMIT: u64 = 4;

/// Rank `candidates` by the number of distinct tags they share with `target`.
///
/// Candidates sharing no tag, the target itself, and anything not published
/// are dropped. Ties are broken by publication date, newest first.
pub fn rank_similar<'a>(
    target: &Post,
    candidates: impl IntoIterator<Item = &'a Post>,
    limit: u64,
) -> Vec<Post> {
    let target_tags: HashSet<Uuid> = target.tags.iter().map(|t| t.id).collect();
    if target_tags.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(usize, &Post)> = candidates
        .into_iter()
        .filter(|p| p.id != target.id && p.is_published())
        .filter_map(|p| {
            let shared = p
                .tags
                .iter()
                .map(|t| t.id)
                .collect::<HashSet<_>>()
                .intersection(&target_tags)
                .count();
            (shared > 0).then_some((shared, p))
        })
        .collect();

    scored.sort_by(|(a_shared, a), (b_shared, b)| {
        b_shared
            .cmp(a_shared)
            .then(b.publication_date.cmp(&a.publication_date))
    });

    scored
        .into_iter()
        .take(limit as usize)
        .map(|(_, p)| p.clone())
        .collect()
}
