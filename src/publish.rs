//! Outbound gateway: digest submission to the forum and push notifications.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Config;

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("digest submission to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("digest submission to {url} returned status {status}")]
    Status { url: String, status: StatusCode },
}

/// Notification priority, mapped to the Pushover priority field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Priority {
    Normal,
    High,
}

impl Priority {
    fn value(self) -> i32 {
        match self {
            Self::Normal => 0,
            Self::High => 1,
        }
    }
}

/// Compose the digest payload: the theme tag, a blank line, then the
/// collector lines.
#[must_use]
pub fn compose_digest(current_tag: &str, collector: &[String]) -> String {
    format!("{current_tag}\n\n{}", collector.join("\n"))
}

/// Submit the composed digest as a new comment on the conversation.
///
/// The forum accepts an authenticated form submission: the `access_token`
/// cookie carries the credential and the `markdown` field carries the
/// payload.
///
/// # Errors
///
/// Returns a [`PublishError`] on transport failure or a non-success status.
pub async fn publish_digest(
    client: &reqwest::Client,
    config: &Config,
    current_tag: &str,
    collector: &[String],
) -> Result<(), PublishError> {
    let url = format!("{}/comments/create/", config.site_base_url);
    let markdown = compose_digest(current_tag, collector);

    info!(%url, lines = collector.len(), "Publishing digest");

    let response = client
        .post(&url)
        .header(reqwest::header::USER_AGENT, &config.user_agent)
        .header(
            reqwest::header::COOKIE,
            format!(
                "access_token={}",
                config.access_token.as_deref().unwrap_or_default()
            ),
        )
        .form(&[("markdown", markdown.as_str())])
        .send()
        .await
        .map_err(|e| PublishError::Transport {
            url: url.clone(),
            source: e,
        })?;

    if !response.status().is_success() {
        return Err(PublishError::Status {
            url,
            status: response.status(),
        });
    }

    Ok(())
}

#[derive(Debug, Deserialize)]
struct PushoverResponse {
    status: i32,
}

/// Send a push notification about the run outcome.
///
/// Notification delivery is best effort: a missing configuration or a failed
/// call is logged and swallowed, since it must not affect state persistence
/// or the run's own outcome.
pub async fn notify(client: &reqwest::Client, config: &Config, message: &str, priority: Priority) {
    let (Some(user), Some(token)) = (
        config.pushover_user.as_deref(),
        config.pushover_token.as_deref(),
    ) else {
        warn!("Notification credentials not configured, skipping notification");
        return;
    };

    let url = format!("{}/1/messages.json", config.notify_api_url);
    debug!(%url, %message, priority = priority.value(), "Sending notification");

    let priority_value = priority.value().to_string();
    let result = client
        .post(&url)
        .form(&[
            ("token", token),
            ("user", user),
            ("message", message),
            ("priority", priority_value.as_str()),
        ])
        .send()
        .await;

    match result {
        Ok(response) if response.status().is_success() => {
            match response.json::<PushoverResponse>().await {
                Ok(body) if body.status == 1 => {}
                Ok(body) => warn!(status = body.status, "Notification was not accepted"),
                Err(e) => warn!(error = %e, "Failed to decode notification response"),
            }
        }
        Ok(response) => {
            warn!(status = %response.status(), "Notification request failed");
        }
        Err(e) => {
            warn!(error = %e, "Notification request failed");
        }
    }
}
