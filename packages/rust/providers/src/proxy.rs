//! Raw page fetch through a personal fetch proxy.
//!
//! The proxy answers `GET {base}/fetch?topic=<topic>` with either
//! `{"error": "..."}` or `{"content": "<raw markup>"}`. Markup is run through
//! [`normalize_html`] before it is returned.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;
use webbaby_shared::{Result, WebBabyError};

use crate::{ContentProvider, FetchOutcome, build_client, normalize_html};

#[derive(Debug, Deserialize)]
struct ProxyResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    content: Option<String>,
}

/// Fetches a page via the configured proxy and cleans it to plain text.
pub struct ProxyProvider {
    client: Client,
    /// `None` when no proxy is configured; every fetch then fails fast.
    fetch_url: Option<Url>,
}

impl ProxyProvider {
    /// Provenance tag for content fetched through the proxy.
    pub const SOURCE: &'static str = "personal_proxy";

    pub fn new(proxy_base: Option<&Url>, timeout: Duration) -> Result<Self> {
        let fetch_url = proxy_base
            .map(|base| {
                base.join("fetch").map_err(|e| {
                    WebBabyError::config(format!("invalid proxy URL '{base}': {e}"))
                })
            })
            .transpose()?;

        Ok(Self {
            client: build_client(timeout)?,
            fetch_url,
        })
    }
}

#[async_trait]
impl ContentProvider for ProxyProvider {
    fn source(&self) -> &str {
        Self::SOURCE
    }

    #[instrument(skip(self), fields(source = "personal_proxy"))]
    async fn fetch(&self, topic: &str) -> FetchOutcome {
        let Some(fetch_url) = &self.fetch_url else {
            return FetchOutcome::failure(
                "(Fallback) Proxy base URL is not set.",
                "Proxy URL missing",
            );
        };

        let response = match self
            .client
            .get(fetch_url.clone())
            .query(&[("topic", topic)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return transport_failure(topic, &e.to_string()),
        };

        let status = response.status();
        if status != StatusCode::OK {
            let code = status.as_u16();
            return FetchOutcome::failure(
                format!("(Fallback) Proxy HTTP {code} for '{topic}'."),
                format!("HTTP {code}"),
            );
        }

        let body: ProxyResponse = match response.json().await {
            Ok(body) => body,
            Err(e) => return transport_failure(topic, &e.to_string()),
        };

        if let Some(error) = body.error.filter(|e| !e.is_empty()) {
            return FetchOutcome::failure(
                format!("(Fallback) Proxy error for '{topic}': {error}"),
                error,
            );
        }

        let raw = body.content.unwrap_or_default();
        if raw.is_empty() {
            return FetchOutcome::failure(
                format!("(Fallback) Proxy returned no content for '{topic}'."),
                "Empty content",
            );
        }

        let text = normalize_html(&raw);
        if text.is_empty() {
            return FetchOutcome::failure(
                format!("(Fallback) Proxy page for '{topic}' had no readable text."),
                "Empty content after normalization",
            );
        }

        debug!(raw_len = raw.len(), text_chars = text.chars().count(), "page normalized");
        FetchOutcome::success(text)
    }
}

fn transport_failure(topic: &str, reason: &str) -> FetchOutcome {
    FetchOutcome::failure(
        format!("(Fallback) Error contacting proxy for '{topic}': {reason}"),
        reason,
    )
}
