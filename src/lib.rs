//! Microcosm theme-of-the-week digest bot.
//!
//! Tracks a recurring photo-theme thread on a Microcosm-powered forum:
//! incrementally pulls new comments from the paginated conversation API,
//! infers which hashtag represents the current week's theme, classifies each
//! new post against that theme, and optionally republishes a curated digest
//! of qualifying posts.

pub mod classify;
pub mod config;
pub mod error;
pub mod poll;
pub mod publish;
pub mod run;
pub mod state;
pub mod theme;
