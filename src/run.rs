//! Run orchestration: sync, infer, classify, publish, persist.

use tracing::{error, info, warn};

use crate::classify::classify;
use crate::config::Config;
use crate::error::RunError;
use crate::poll::fetch_new_posts;
use crate::publish::{notify, publish_digest, Priority};
use crate::state::{StateRecord, StateStore};
use crate::theme::infer_current_tag;

/// Independent toggles controlling a run, mirroring the CLI flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Drop back to the previous run's state before syncing.
    pub rewind: bool,
    /// Leave the state file untouched at run end.
    pub no_save: bool,
    /// Submit the digest when the run is flawless.
    pub publish: bool,
}

/// What a completed run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub current_tag: String,
    pub new_posts: usize,
    pub digest_lines: usize,
    /// No post needed manual attention.
    pub flawless: bool,
    /// The digest was submitted to the forum.
    pub published: bool,
    /// A publish attempt was made and failed. State is persisted regardless.
    pub publish_failed: bool,
}

impl RunOutcome {
    /// Process-exit mapping: success only when classification was flawless
    /// and a requested publish did not fail.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.flawless && !self.publish_failed
    }
}

/// Execute one full run against the configured conversation.
///
/// State is persisted exactly once, at the very end, and only on the success
/// path through classification: a fetch or inference failure leaves the state
/// file exactly as it was.
///
/// # Errors
///
/// Returns a [`RunError`] for fatal conditions; ambiguous classifications and
/// failed publish attempts are reported through the outcome instead.
pub async fn run(
    client: &reqwest::Client,
    config: &Config,
    options: RunOptions,
) -> Result<RunOutcome, RunError> {
    if options.publish {
        config.validate_for_publish()?;
    }

    let store = StateStore::new(config.state_path.clone());
    let seed = StateRecord::seed(config.seed_last_post_id, config.seed_offset);
    let mut state = store.load_or_seed(seed).await?;

    if options.rewind {
        state = state.rewound()?;
        info!(
            last_post_id = state.last_post_id(),
            offset = state.offset(),
            "Rewound to the previous state"
        );
    }

    let sync = fetch_new_posts(client, config, state.last_post_id(), state.offset()).await?;

    let current_tag = infer_current_tag(&sync.posts, state.retired_tags())
        .ok_or(RunError::NoNewTag)?
        .to_string();
    info!(%current_tag, "Identified current tag");

    let report = classify(
        &sync.posts,
        &current_tag,
        state.retired_tags(),
        &config.site_base_url,
    );

    let mut published = false;
    let mut publish_failed = false;

    if options.publish {
        if report.flawless && !report.collector.is_empty() {
            match publish_digest(client, config, &current_tag, &report.collector).await {
                Ok(()) => {
                    published = true;
                    notify(client, config, "Digest published ok", Priority::Normal).await;
                }
                Err(e) => {
                    error!(error = %e, "Failed to publish digest");
                    publish_failed = true;
                    notify(client, config, "Failed to publish digest", Priority::High).await;
                }
            }
        } else if !report.flawless {
            warn!("Refusing to publish: classification was not flawless");
            notify(
                client,
                config,
                "Refusing to publish digest",
                Priority::High,
            )
            .await;
        }
    }

    state.append(current_tag.clone(), sync.last_post_id, sync.offset);
    if options.no_save {
        info!("Skipping state save");
    } else {
        store.save(&state).await?;
    }

    info!(
        %current_tag,
        new_posts = sync.posts.len(),
        digest_lines = report.collector.len(),
        flawless = report.flawless,
        published,
        "Run complete"
    );

    Ok(RunOutcome {
        current_tag,
        new_posts: sync.posts.len(),
        digest_lines: report.collector.len(),
        flawless: report.flawless,
        published,
        publish_failed,
    })
}
