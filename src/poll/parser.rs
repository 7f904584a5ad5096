//! Normalization of raw API comments into [`ParsedPost`] values.
//!
//! The conversation API delivers each comment twice over: raw markdown and
//! rendered HTML. Hashtags are read from the markdown (the rendered form
//! wraps them in search links), everything else from the rendered body.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;

static HASHTAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"#\w+").expect("Invalid regex"));

/// A comment as delivered by the conversation API.
#[derive(Debug, Clone, Deserialize)]
pub struct RawComment {
    pub id: u64,
    #[serde(default)]
    pub markdown: String,
    #[serde(default)]
    pub html: String,
    /// Attachment count; absent on comments without uploads.
    #[serde(default)]
    pub attachments: u32,
    pub meta: CommentMeta,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentMeta {
    pub created_by: CommentAuthor,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub profile_name: String,
}

/// A normalized post, immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPost {
    pub id: u64,
    pub author: String,
    /// Site-relative path, `/comments/{id}/`.
    pub permalink: String,
    /// Count of intra-forum comment links in the rendered body.
    pub link_count: usize,
    /// Plain-text rendering of the body.
    pub text: String,
    /// Lowercase hashtags from the raw markdown, deduplicated, in first-seen
    /// order. Order matters: tag inference breaks frequency ties on it.
    pub tags: Vec<String>,
    /// Declared attachments plus inline images in the rendered body.
    pub image_count: u32,
}

/// Parse one raw comment into a [`ParsedPost`].
#[must_use]
pub fn parse_post(raw: &RawComment) -> ParsedPost {
    let document = Html::parse_fragment(&raw.html);

    let comment_link_selector =
        Selector::parse(r#"a[href^="/comments/"]"#).expect("Invalid selector");
    let img_selector = Selector::parse("img").expect("Invalid selector");

    let link_count = document.select(&comment_link_selector).count();
    let inline_images = document.select(&img_selector).count();

    let text: String = document.root_element().text().collect();

    ParsedPost {
        id: raw.id,
        author: raw.meta.created_by.profile_name.clone(),
        permalink: format!("/comments/{}/", raw.id),
        link_count,
        text,
        tags: extract_tags(&raw.markdown),
        image_count: raw.attachments + inline_images as u32,
    }
}

/// Extract lowercase hashtags from markdown, deduplicated in first-seen order.
fn extract_tags(markdown: &str) -> Vec<String> {
    let mut tags = Vec::new();
    let mut seen = std::collections::HashSet::new();

    for m in HASHTAG_RE.find_iter(markdown) {
        let tag = m.as_str().to_lowercase();
        if seen.contains(&tag) {
            continue;
        }
        seen.insert(tag.clone());
        tags.push(tag);
    }

    tags
}
