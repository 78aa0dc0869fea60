//! Builds the recipe and topic fallback chains from configuration.

use std::time::Duration;

use tracing::debug;
use webbaby_providers::{FallbackChain, ProxyProvider, RecipeProvider, SummaryApi, SummaryProvider};
use webbaby_shared::{ProvidersConfig, Result, WebBabyError};

/// Source tag stored when the recipe provider fails.
pub const RECIPE_FALLBACK_SOURCE: &str = "recipe_api_fallback";

/// Source tag stored when every topic provider fails.
pub const TOPIC_FALLBACK_SOURCE: &str = "topic_fallback";

/// Recipe chain: the recipe API alone.
pub fn recipe_chain(config: &ProvidersConfig) -> Result<FallbackChain> {
    let timeout = Duration::from_secs(config.api_timeout_secs);
    let provider = RecipeProvider::new(&config.recipe_api_url, timeout)?;
    Ok(FallbackChain::new(RECIPE_FALLBACK_SOURCE).with_provider(provider))
}

/// Topic chain in `config.topic_chain` order.
pub fn topic_chain(config: &ProvidersConfig) -> Result<FallbackChain> {
    config.validate()?;

    let api_timeout = Duration::from_secs(config.api_timeout_secs);
    let proxy_timeout = Duration::from_secs(config.proxy_timeout_secs);

    let mut chain = FallbackChain::new(TOPIC_FALLBACK_SOURCE);
    for name in &config.topic_chain {
        match name.as_str() {
            "instant_answer" => chain.push(Box::new(SummaryProvider::new(
                SummaryApi::InstantAnswer,
                &config.instant_answer_url,
                api_timeout,
            )?)),
            "encyclopedia" => chain.push(Box::new(SummaryProvider::new(
                SummaryApi::Encyclopedia,
                &config.encyclopedia_url,
                api_timeout,
            )?)),
            "proxy" => chain.push(Box::new(ProxyProvider::new(
                config.proxy_url.as_ref(),
                proxy_timeout,
            )?)),
            other => {
                return Err(WebBabyError::config(format!(
                    "unknown topic provider '{other}'"
                )));
            }
        }
    }

    debug!(sources = ?chain.sources(), "topic chain built");
    Ok(chain)
}
