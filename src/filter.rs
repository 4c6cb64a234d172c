//! Case-insensitive comment filters.

use crate::youtube::Comment;

/// Keeps comments whose author name contains `username`.
pub fn by_username(comments: Vec<Comment>, username: &str) -> Vec<Comment> {
    let needle = username.to_lowercase();
    comments
        .into_iter()
        .filter(|c| c.author.to_lowercase().contains(&needle))
        .collect()
}

/// Keeps comments whose text contains at least one of `keywords`.
pub fn by_keywords(comments: Vec<Comment>, keywords: &[String]) -> Vec<Comment> {
    let needles: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();
    comments
        .into_iter()
        .filter(|c| {
            let text = c.text.to_lowercase();
            needles.iter().any(|k| text.contains(k.as_str()))
        })
        .collect()
}
