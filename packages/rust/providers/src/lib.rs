//! External content providers, the HTML normalizer, and the fallback chain.
//!
//! This crate provides:
//! - [`ContentProvider`], the single-operation capability every source implements
//! - [`RecipeProvider`], [`SummaryProvider`] and [`ProxyProvider`]
//! - [`normalize_html`], markup to bounded plain text
//! - [`FallbackChain`], tries providers in order until one succeeds
//!
//! Providers never return errors for network or format problems. Every such
//! failure comes back as a [`FetchOutcome`] carrying displayable placeholder
//! text and a short diagnostic.

mod chain;
mod normalize;
mod proxy;
mod recipe;
mod summary;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use webbaby_shared::{Result, WebBabyError};

pub use chain::{ChainOutcome, FallbackChain};
pub use normalize::{MAX_NORMALIZED_CHARS, normalize_html};
pub use proxy::ProxyProvider;
pub use recipe::RecipeProvider;
pub use summary::{SummaryApi, SummaryProvider};

/// Maximum number of redirects to follow on provider requests.
const MAX_REDIRECTS: usize = 3;

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("WebBaby/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// FetchOutcome
// ---------------------------------------------------------------------------

/// Result of one provider attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Fetched content on success, placeholder text on failure. Never empty.
    pub content: String,
    pub success: bool,
    /// Short diagnostic (`HTTP 503`, `No meals`, ...) when `success` is false.
    pub error: Option<String>,
}

impl FetchOutcome {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: true,
            error: None,
        }
    }

    pub fn failure(placeholder: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            content: placeholder.into(),
            success: false,
            error: Some(reason.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One external content source.
#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Provenance tag stored alongside content this provider produced.
    fn source(&self) -> &str;

    /// Try to fetch content about `subject`. Must not panic or error on
    /// network/format failures; report them through [`FetchOutcome::failure`].
    async fn fetch(&self, subject: &str) -> FetchOutcome;
}

/// Build a reqwest client with the given per-request timeout.
pub(crate) fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(timeout)
        .build()
        .map_err(|e| WebBabyError::Network(format!("failed to build HTTP client: {e}")))
}
