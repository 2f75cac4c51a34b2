use std::collections::HashSet;

use wi_core::Article;

/// Article ids already handed downstream during the current run.
pub type SeenSet = HashSet<String>;

/// Drops articles whose id was already seen, keeping input order.
///
/// Ids repeated inside `incoming` are dropped after their first occurrence too.
pub fn deduplicate(mut seen: SeenSet, incoming: Vec<Article>) -> (SeenSet, Vec<Article>) {
    let mut fresh = Vec::with_capacity(incoming.len());
    for article in incoming {
        if seen.insert(article.id.clone()) {
            fresh.push(article);
        }
    }
    (seen, fresh)
}
