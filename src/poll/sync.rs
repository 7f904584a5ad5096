//! Incremental synchronization against the paginated conversation API.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::poll::parser::{parse_post, ParsedPost, RawComment};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("fetch of {url} returned status {status}")]
    Status { url: String, status: StatusCode },
    #[error("malformed page response from {url}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Result of one synchronization pass.
#[derive(Debug)]
pub struct SyncOutcome {
    /// Posts newer than the starting watermark, in fetch order.
    pub posts: Vec<ParsedPost>,
    /// Highest post id processed; equals the starting watermark when no new
    /// posts were found.
    pub last_post_id: u64,
    /// Offset of the final page fetched. The next run re-fetches that page
    /// and the watermark filters out the overlap.
    pub offset: u64,
}

#[derive(Debug, Deserialize)]
struct ConversationEnvelope {
    data: ConversationData,
}

#[derive(Debug, Deserialize)]
struct ConversationData {
    comments: CommentPage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentPage {
    #[serde(default)]
    items: Vec<RawComment>,
    max_offset: u64,
}

/// Fetch all conversation pages from `start_offset` onward, returning the
/// posts newer than `watermark`.
///
/// Pagination continues while the response's reported `maxOffset` is at least
/// one full page beyond the current offset. A page on which every post was
/// already seen still advances the offset. Any transport failure, non-success
/// status, or undecodable body aborts the pass; the caller must not persist
/// state in that case, so offset and watermark never advance past a page that
/// was not fully retrieved.
///
/// # Errors
///
/// Returns a [`FetchError`] describing the failed page request.
pub async fn fetch_new_posts(
    client: &reqwest::Client,
    config: &Config,
    watermark: u64,
    start_offset: u64,
) -> Result<SyncOutcome, FetchError> {
    let mut posts = Vec::new();
    let mut last_post_id = watermark;
    let mut offset = start_offset;

    loop {
        let url = format!(
            "{}/api/v1/conversations/{}?limit={}&offset={}",
            config.api_base_url, config.conversation_id, config.page_size, offset
        );
        debug!(%url, "Fetching conversation page");

        let response = client
            .get(&url)
            .header(reqwest::header::USER_AGENT, &config.user_agent)
            .send()
            .await
            .map_err(|e| FetchError::Transport {
                url: url.clone(),
                source: e,
            })?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                url,
                status: response.status(),
            });
        }

        let envelope: ConversationEnvelope =
            response.json().await.map_err(|e| FetchError::Decode {
                url: url.clone(),
                source: e,
            })?;
        let page = envelope.data.comments;

        // Ids are strictly increasing within and across pages, so the
        // watermark after a page equals the last qualifying post's id.
        for raw in &page.items {
            if raw.id > last_post_id {
                posts.push(parse_post(raw));
                last_post_id = raw.id;
            }
        }

        if page.max_offset >= offset + config.page_size {
            offset += config.page_size;
        } else {
            break;
        }
    }

    info!(
        new_posts = posts.len(),
        last_post_id, offset, "Synchronization pass complete"
    );

    Ok(SyncOutcome {
        posts,
        last_post_id,
        offset,
    })
}
