//! Classification of parsed posts against the current theme tag.

use regex::Regex;
use tracing::{debug, warn};

use crate::poll::ParsedPost;

/// Result of classifying a batch of posts.
///
/// `collector` holds the lines of the publishable digest, two per qualifying
/// post (header line, then absolute permalink), in fetch order. `flawless`
/// is true only when no post needed manual attention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub collector: Vec<String>,
    pub flawless: bool,
}

/// Walk the posts in fetch order and build the digest.
///
/// Per-post rules, applied in order:
/// 1. More than four comment links once the digest has entries reads as a
///    voting post: advisory warning, flawless is lost, evaluation continues.
/// 2. Posts without images cannot qualify and are skipped outright.
/// 3. Untagged posts are reported for manual resolution without costing
///    flawlessness.
/// 4. Posts carrying the current tag contribute their two digest lines.
/// 5. Posts whose tags are all retired belong to a previous week: skipped
///    silently.
/// 6. Anything else (a likely misspelling or unrelated hashtag) is reported
///    and costs flawlessness.
#[must_use]
pub fn classify(
    posts: &[ParsedPost],
    current_tag: &str,
    retired: &[String],
    site_base_url: &str,
) -> Report {
    let tag_re = Regex::new(&format!("(?i){}", regex::escape(current_tag)))
        .expect("Invalid regex");
    let bare_tag = current_tag.strip_prefix('#').unwrap_or(current_tag);

    let mut collector = Vec::new();
    let mut flawless = true;

    for post in posts {
        if post.link_count > 4 && !collector.is_empty() {
            warn!(
                author = %post.author,
                link_count = post.link_count,
                "Voting may have already started"
            );
            flawless = false;
        }

        if post.image_count == 0 {
            continue;
        }

        let title = derive_title(&post.text, current_tag, &tag_re, bare_tag).unwrap_or_default();
        let url = format!("{site_base_url}{}", post.permalink);

        if post.tags.is_empty() {
            warn!(
                author = %post.author,
                title = %title,
                %url,
                "Post has an image but no tag"
            );
        } else if post.tags.iter().any(|t| t == current_tag) {
            debug!(author = %post.author, %url, "Post qualifies for the digest");
            collector.push(format!("{}{title} ()", post.author));
            collector.push(url);
        } else if post.tags.iter().all(|t| retired.contains(t)) {
            // Belongs to a previous week's theme.
        } else {
            warn!(
                author = %post.author,
                title = %title,
                %url,
                tags = ?post.tags,
                "Post tags do not match the current theme"
            );
            flawless = false;
        }
    }

    Report { collector, flawless }
}

/// Derive the display title for a post: the shortest non-blank line of its
/// text, skipping lines that are exactly the current tag, with the tag's
/// leading `#` stripped wherever it appears. Word-count ties keep the
/// earliest line. Returns `None` when no line survives the filters.
fn derive_title(text: &str, current_tag: &str, tag_re: &Regex, bare_tag: &str) -> Option<String> {
    let line = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .filter(|l| !l.eq_ignore_ascii_case(current_tag))
        .min_by_key(|l| l.split_whitespace().count())?;

    Some(format!(" - {}", tag_re.replace_all(line, bare_tag)))
}
