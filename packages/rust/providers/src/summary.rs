//! Short topic summaries from JSON APIs.
//!
//! Two APIs are supported, each reading one text field out of the response:
//! an instant-answer API (`AbstractText`) and an encyclopedia REST API
//! (`extract`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument};
use url::Url;
use webbaby_shared::{Result, WebBabyError};

use crate::{ContentProvider, FetchOutcome, build_client};

/// Which summary API a [`SummaryProvider`] talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryApi {
    /// `GET {base}?q=<topic>&format=json…`, reads `AbstractText`.
    InstantAnswer,
    /// `GET {base}page/summary/<Title>`, reads `extract`.
    Encyclopedia,
}

impl SummaryApi {
    /// Provenance tag stored for content from this API.
    pub fn source(&self) -> &'static str {
        match self {
            Self::InstantAnswer => "duckduckgo",
            Self::Encyclopedia => "wikipedia",
        }
    }

    fn field(&self) -> &'static str {
        match self {
            Self::InstantAnswer => "AbstractText",
            Self::Encyclopedia => "extract",
        }
    }

    fn empty_reason(&self) -> &'static str {
        match self {
            Self::InstantAnswer => "Empty abstract",
            Self::Encyclopedia => "Empty extract",
        }
    }
}

/// Fetches a plain-text summary of a topic from one [`SummaryApi`].
pub struct SummaryProvider {
    api: SummaryApi,
    client: Client,
    base_url: Url,
}

impl SummaryProvider {
    pub fn new(api: SummaryApi, base_url: &Url, timeout: Duration) -> Result<Self> {
        if base_url.cannot_be_a_base() {
            return Err(WebBabyError::config(format!(
                "invalid {} URL '{base_url}'",
                api.source()
            )));
        }

        Ok(Self {
            api,
            client: build_client(timeout)?,
            base_url: base_url.clone(),
        })
    }

    fn request_url(&self, topic: &str) -> Url {
        let mut url = self.base_url.clone();
        match self.api {
            SummaryApi::InstantAnswer => {
                url.query_pairs_mut()
                    .append_pair("q", topic)
                    .append_pair("format", "json")
                    .append_pair("no_html", "1")
                    .append_pair("skip_disambig", "1");
            }
            SummaryApi::Encyclopedia => {
                // Checked in `new`, so the base always has path segments.
                if let Ok(mut segments) = url.path_segments_mut() {
                    segments
                        .pop_if_empty()
                        .extend(["page", "summary"])
                        .push(&encyclopedia_title(topic));
                }
            }
        }
        url
    }
}

#[async_trait]
impl ContentProvider for SummaryProvider {
    fn source(&self) -> &str {
        self.api.source()
    }

    #[instrument(skip(self))]
    async fn fetch(&self, topic: &str) -> FetchOutcome {
        let source = self.api.source();
        let url = self.request_url(topic);

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => return transport_failure(topic, source, &e.to_string()),
        };

        let status = response.status();
        if status != StatusCode::OK {
            let code = status.as_u16();
            return FetchOutcome::failure(
                format!("(Fallback) Could not reach {source} for '{topic}'. HTTP {code}."),
                format!("HTTP {code}"),
            );
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => return transport_failure(topic, source, &e.to_string()),
        };

        let text = body
            .get(self.api.field())
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default();

        // Returned verbatim; whitespace only counts as empty.
        if text.trim().is_empty() {
            return FetchOutcome::failure(
                format!("(Fallback) {source} had no summary for '{topic}'."),
                self.api.empty_reason(),
            );
        }

        debug!(source, chars = text.chars().count(), "summary found");
        FetchOutcome::success(text)
    }
}

/// Encyclopedia titles use underscores and a capitalized first letter.
fn encyclopedia_title(topic: &str) -> String {
    let underscored = topic.trim().replace(' ', "_");
    let mut chars = underscored.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => underscored,
    }
}

fn transport_failure(topic: &str, source: &str, reason: &str) -> FetchOutcome {
    FetchOutcome::failure(
        format!("(Fallback) Error contacting {source} for '{topic}': {reason}"),
        reason,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer, api: SummaryApi) -> SummaryProvider {
        provider_with_timeout(server, api, Duration::from_secs(5))
    }

    fn provider_with_timeout(
        server: &MockServer,
        api: SummaryApi,
        timeout: Duration,
    ) -> SummaryProvider {
        let base = Url::parse(&server.uri()).unwrap();
        SummaryProvider::new(api, &base, timeout).expect("build provider")
    }

    #[test]
    fn title_formatting() {
        assert_eq!(encyclopedia_title("black holes"), "Black_holes");
        assert_eq!(encyclopedia_title(" rust "), "Rust");
        assert_eq!(encyclopedia_title(""), "");
    }

    #[test]
    fn encyclopedia_url_keeps_base_path() {
        let base = Url::parse("https://en.wikipedia.org/api/rest_v1/").unwrap();
        let provider =
            SummaryProvider::new(SummaryApi::Encyclopedia, &base, Duration::from_secs(1)).unwrap();
        assert_eq!(
            provider.request_url("black holes").as_str(),
            "https://en.wikipedia.org/api/rest_v1/page/summary/Black_holes"
        );
    }

    #[tokio::test]
    async fn instant_answer_reads_abstract() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .and(query_param("q", "black holes"))
            .and(query_param("format", "json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AbstractText": "A black hole is a region of spacetime.",
                "Heading": "Black hole"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider_for(&server, SummaryApi::InstantAnswer);
        let outcome = provider.fetch("black holes").await;

        assert!(outcome.success);
        assert_eq!(outcome.content, "A black hole is a region of spacetime.");
        assert_eq!(provider.source(), "duckduckgo");
    }

    #[tokio::test]
    async fn instant_answer_empty_abstract_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "AbstractText": "" })),
            )
            .mount(&server)
            .await;

        let outcome = provider_for(&server, SummaryApi::InstantAnswer)
            .fetch("qwzx")
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Empty abstract"));
        assert!(outcome.content.contains("'qwzx'"));
    }

    #[tokio::test]
    async fn encyclopedia_reads_extract() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page/summary/Black_holes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "title": "Black hole",
                "extract": "A black hole is a region of spacetime where gravity is so strong..."
            })))
            .mount(&server)
            .await;

        let provider = provider_for(&server, SummaryApi::Encyclopedia);
        let outcome = provider.fetch("black holes").await;
        assert!(outcome.success, "unexpected failure: {outcome:?}");
        assert!(outcome.content.starts_with("A black hole"));
        assert_eq!(provider.source(), "wikipedia");
    }

    #[tokio::test]
    async fn encyclopedia_404_is_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let outcome = provider_for(&server, SummaryApi::Encyclopedia)
            .fetch("no such page")
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("HTTP 404"));
    }

    #[tokio::test]
    async fn missing_field_is_empty_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "type": "no-extract" })),
            )
            .mount(&server)
            .await;

        let outcome = provider_for(&server, SummaryApi::Encyclopedia)
            .fetch("rust")
            .await;
        assert_eq!(outcome.error.as_deref(), Some("Empty extract"));
    }

    #[tokio::test]
    async fn content_is_returned_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "AbstractText": "  Rust is a language.\n"
            })))
            .mount(&server)
            .await;

        let outcome = provider_for(&server, SummaryApi::InstantAnswer)
            .fetch("rust")
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.content, "  Rust is a language.\n");
    }

    #[tokio::test]
    async fn whitespace_only_extract_is_empty_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "extract": " \n " })),
            )
            .mount(&server)
            .await;

        let outcome = provider_for(&server, SummaryApi::Encyclopedia)
            .fetch("rust")
            .await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("Empty extract"));
    }

    #[tokio::test]
    async fn timeout_becomes_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "AbstractText": "late" }))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        for api in [SummaryApi::InstantAnswer, SummaryApi::Encyclopedia] {
            let outcome = provider_with_timeout(&server, api, Duration::from_millis(50))
                .fetch("black holes")
                .await;
            assert!(!outcome.success);
            assert!(outcome.error.as_deref().is_some_and(|e| !e.is_empty()));
            assert!(outcome.content.contains("'black holes'"));
        }
    }

    #[tokio::test]
    async fn invalid_json_becomes_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
            .mount(&server)
            .await;

        for api in [SummaryApi::InstantAnswer, SummaryApi::Encyclopedia] {
            let outcome = provider_for(&server, api).fetch("black holes").await;
            assert!(!outcome.success);
            assert!(outcome.error.as_deref().is_some_and(|e| !e.is_empty()));
            assert!(outcome.content.contains("'black holes'"));
        }
    }
}
