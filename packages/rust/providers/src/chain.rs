//! Ordered provider fallback.
//!
//! Providers are tried in list order, each exactly once. The first success
//! wins; if none succeed the last failure is returned under the chain's
//! fallback tag. Attempts are sequential so later (often costlier) sources
//! are only hit when earlier ones fail.

use tracing::{info, instrument, warn};

use crate::{ContentProvider, FetchOutcome};

/// Outcome of resolving a subject through a [`FallbackChain`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainOutcome {
    /// Content from the winning provider, or the last placeholder.
    pub content: String,
    pub success: bool,
    /// Diagnostic of the last attempt. Always `None` when `success` is true.
    pub error: Option<String>,
    /// Winning provider's tag, or the chain's fallback tag.
    pub source: String,
}

/// Holds providers in the order they are tried.
pub struct FallbackChain {
    fallback_source: String,
    providers: Vec<Box<dyn ContentProvider>>,
}

impl FallbackChain {
    /// Create an empty chain whose total failures are tagged `fallback_source`.
    pub fn new(fallback_source: impl Into<String>) -> Self {
        Self {
            fallback_source: fallback_source.into(),
            providers: Vec::new(),
        }
    }

    /// Append a provider to the end of the chain.
    pub fn with_provider(mut self, provider: impl ContentProvider + 'static) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Append an already boxed provider.
    pub fn push(&mut self, provider: Box<dyn ContentProvider>) {
        self.providers.push(provider);
    }

    /// Tag used when every provider fails.
    pub fn fallback_source(&self) -> &str {
        &self.fallback_source
    }

    /// Provider tags in attempt order.
    pub fn sources(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.source()).collect()
    }

    /// Try each provider in order and return the first success, or the last
    /// failure tagged with the fallback source.
    #[instrument(skip(self), fields(fallback = %self.fallback_source))]
    pub async fn resolve(&self, subject: &str) -> ChainOutcome {
        let mut last_failure: Option<FetchOutcome> = None;

        for provider in &self.providers {
            let outcome = provider.fetch(subject).await;

            if outcome.success {
                info!(source = provider.source(), "provider succeeded");
                return ChainOutcome {
                    content: outcome.content,
                    success: true,
                    error: None,
                    source: provider.source().to_string(),
                };
            }

            warn!(
                source = provider.source(),
                error = outcome.error.as_deref().unwrap_or("unknown"),
                "provider failed"
            );
            last_failure = Some(outcome);
        }

        let last = last_failure.unwrap_or_else(|| {
            FetchOutcome::failure(
                format!("(Fallback) No providers configured for '{subject}'."),
                "No providers configured",
            )
        });

        info!(
            error = last.error.as_deref().unwrap_or("unknown"),
            "all providers failed"
        );

        ChainOutcome {
            content: last.content,
            success: false,
            error: last.error,
            source: self.fallback_source.clone(),
        }
    }
}
