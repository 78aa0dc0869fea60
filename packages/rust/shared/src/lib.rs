//! Shared types, error model, and configuration for Web Baby.
//!
//! This crate is the foundation depended on by all other Web Baby crates.
//! It provides:
//! - [`WebBabyError`], the unified error type
//! - Domain records ([`Concept`], [`Experience`], [`WebKnowledge`], [`Intent`])
//! - Configuration ([`AppConfig`], [`ProvidersConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, ProvidersConfig, ServerConfig, StorageConfig, TOPIC_PROVIDER_NAMES, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, WebBabyError};
pub use types::{Concept, Experience, Intent, WebKnowledge};
