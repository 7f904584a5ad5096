//! Inference of the current week's theme tag.

use crate::poll::ParsedPost;

/// Identify the current theme tag: the most frequent hashtag across the new
/// posts that has not already been retired.
///
/// Frequency ties are broken deterministically in favor of the tag whose
/// first occurrence appears earliest in the post stream.
///
/// Returns `None` when no candidate tag remains, which callers treat as a
/// fatal condition for the run.
#[must_use]
pub fn infer_current_tag<'a>(posts: &'a [ParsedPost], retired: &[String]) -> Option<&'a str> {
    // First-seen-ordered counting keeps the max scan deterministic.
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for post in posts {
        for tag in &post.tags {
            if retired.iter().any(|r| r == tag) {
                continue;
            }
            match counts.iter_mut().find(|(t, _)| *t == tag.as_str()) {
                Some((_, n)) => *n += 1,
                None => counts.push((tag.as_str(), 1)),
            }
        }
    }

    // Strictly-greater comparison: on ties the earlier entry stands.
    let mut best: Option<(&str, usize)> = None;
    for (tag, n) in counts {
        if best.is_none_or(|(_, m)| n > m) {
            best = Some((tag, n));
        }
    }
    best.map(|(tag, _)| tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(id: u64, tags: &[&str]) -> ParsedPost {
        ParsedPost {
            id,
            author: "someone".to_string(),
            permalink: format!("/comments/{id}/"),
            link_count: 0,
            text: String::new(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            image_count: 1,
        }
    }

    #[test]
    fn test_most_frequent_tag_wins() {
        let posts = vec![
            post(1, &["#green"]),
            post(2, &["#blue"]),
            post(3, &["#green"]),
        ];
        assert_eq!(infer_current_tag(&posts, &[]), Some("#green"));
    }

    #[test]
    fn test_retired_tags_excluded_even_when_most_frequent() {
        let posts = vec![
            post(1, &["#calm"]),
            post(2, &["#calm"]),
            post(3, &["#calm"]),
            post(4, &["#green"]),
        ];
        let retired = vec!["#calm".to_string()];
        assert_eq!(infer_current_tag(&posts, &retired), Some("#green"));
    }

    #[test]
    fn test_tie_breaks_on_first_seen_order() {
        let posts = vec![
            post(1, &["#bark"]),
            post(2, &["#moss"]),
            post(3, &["#moss", "#bark"]),
        ];
        assert_eq!(infer_current_tag(&posts, &[]), Some("#bark"));
    }

    #[test]
    fn test_no_candidate_left() {
        let posts = vec![post(1, &["#calm"]), post(2, &[])];
        let retired = vec!["#calm".to_string()];
        assert_eq!(infer_current_tag(&posts, &retired), None);
        assert_eq!(infer_current_tag(&[], &[]), None);
    }
}
