//! Command handling and teaching for Web Baby.
//!
//! This crate ties the intent classifier, the provider chains and the store
//! together:
//! - [`intent`]: command → (intent, subject)
//! - [`chains`]: recipe and topic fallback chains built from config
//! - [`pipeline`]: [`CommandPipeline::handle`], the `/command` workflow
//! - [`teaching`]: validated concept teaching

pub mod chains;
pub mod intent;
pub mod pipeline;
pub mod teaching;

pub use intent::{ParsedCommand, classify, topic_key};
pub use pipeline::{CommandPipeline, CommandResult, PREVIEW_CHARS};
pub use teaching::teach;
