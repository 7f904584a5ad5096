use thiserror::Error;

use crate::config::ConfigError;
use crate::poll::FetchError;
use crate::state::StateError;

/// Fatal run failures. Classification ambiguity is not among them: it is a
/// normal outcome carried by [`crate::run::RunOutcome::flawless`], as is a
/// failed publish attempt (state is persisted regardless).
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("no new theme tag identified among the fetched posts")]
    NoNewTag,
    #[error(transparent)]
    State(#[from] StateError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
