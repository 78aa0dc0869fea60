//! Command handling: classify → resolve → upsert → respond.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, instrument};
use webbaby_providers::FallbackChain;
use webbaby_shared::{Intent, ProvidersConfig, Result};
use webbaby_storage::Storage;

use crate::chains;
use crate::intent;

/// Maximum characters of the stored summary echoed back to the caller.
pub const PREVIEW_CHARS: usize = 350;

/// Response to one handled command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    /// The command exactly as received.
    pub command: String,
    /// Normalized subject; also the knowledge key.
    pub subject: String,
    pub intent: Intent,
    /// Whether a provider succeeded.
    pub from_internet: bool,
    /// Winning provider tag, or the chain's fallback tag.
    pub source: String,
    /// Last provider diagnostic. `None` whenever `from_internet` is true.
    pub error_detail: Option<String>,
    /// First [`PREVIEW_CHARS`] characters of the stored summary.
    pub summary_preview: String,
}

/// Routes classified commands through the right chain and persists the result.
pub struct CommandPipeline {
    recipe_chain: FallbackChain,
    topic_chain: FallbackChain,
    storage: Arc<Storage>,
}

impl CommandPipeline {
    pub fn new(recipe_chain: FallbackChain, topic_chain: FallbackChain, storage: Arc<Storage>) -> Self {
        Self {
            recipe_chain,
            topic_chain,
            storage,
        }
    }

    /// Build both chains from the `[providers]` config section.
    pub fn from_config(config: &ProvidersConfig, storage: Arc<Storage>) -> Result<Self> {
        Ok(Self::new(
            chains::recipe_chain(config)?,
            chains::topic_chain(config)?,
            storage,
        ))
    }

    pub fn storage(&self) -> &Arc<Storage> {
        &self.storage
    }

    /// Handle one raw command.
    ///
    /// Classifier failures are returned as errors before any provider is
    /// contacted. Provider failures are not errors: the fallback text is
    /// stored and reported with `from_internet = false`.
    #[instrument(skip(self))]
    pub async fn handle(&self, command: &str) -> Result<CommandResult> {
        let parsed = intent::classify(command)?;

        let chain = match parsed.intent {
            Intent::Recipe => &self.recipe_chain,
            Intent::Topic => &self.topic_chain,
        };
        let outcome = chain.resolve(&parsed.subject).await;

        let record = self
            .storage
            .upsert_knowledge(&parsed.subject, &outcome.content, &outcome.source)
            .await?;

        info!(
            subject = %parsed.subject,
            intent = %parsed.intent,
            source = %record.source,
            from_internet = outcome.success,
            "command handled"
        );

        Ok(CommandResult {
            command: command.to_string(),
            subject: parsed.subject,
            intent: parsed.intent,
            from_internet: outcome.success,
            source: record.source,
            error_detail: if outcome.success { None } else { outcome.error },
            summary_preview: preview(&record.summary),
        })
    }
}

fn preview(summary: &str) -> String {
    summary.chars().take(PREVIEW_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use url::Url;
    use uuid::Uuid;
    use webbaby_providers::{ContentProvider, FetchOutcome};
    use webbaby_shared::WebBabyError;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn test_storage() -> Arc<Storage> {
        let tmp = std::env::temp_dir().join(format!("webbaby_test_{}.db", Uuid::now_v7()));
        Arc::new(Storage::open(&tmp).await.expect("open test db"))
    }

    /// Returns scripted outcomes in order, repeating the last one.
    struct Scripted {
        tag: &'static str,
        script: Mutex<Vec<FetchOutcome>>,
        calls: Arc<AtomicUsize>,
    }

    impl Scripted {
        fn new(tag: &'static str, script: Vec<FetchOutcome>) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    tag,
                    script: Mutex::new(script),
                    calls: calls.clone(),
                },
                calls,
            )
        }
    }

    #[async_trait]
    impl ContentProvider for Scripted {
        fn source(&self) -> &str {
            self.tag
        }

        async fn fetch(&self, _subject: &str) -> FetchOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.remove(0)
            } else {
                script[0].clone()
            }
        }
    }

    fn pipeline_with(
        recipe: Scripted,
        topic: Vec<Scripted>,
        storage: Arc<Storage>,
    ) -> CommandPipeline {
        let recipe_chain =
            FallbackChain::new(chains::RECIPE_FALLBACK_SOURCE).with_provider(recipe);
        let mut topic_chain = FallbackChain::new(chains::TOPIC_FALLBACK_SOURCE);
        for provider in topic {
            topic_chain.push(Box::new(provider));
        }
        CommandPipeline::new(recipe_chain, topic_chain, storage)
    }

    #[tokio::test]
    async fn recipe_success_then_failure_updates_same_record() {
        let storage = test_storage().await;
        let (recipe, recipe_calls) = Scripted::new(
            "recipe_api",
            vec![
                FetchOutcome::success("Recipe for Butter Chicken (Chicken, Indian):\n\nCook."),
                FetchOutcome::failure("(Fallback) No recipe found for 'butter chicken'.", "No meals"),
            ],
        );
        let (topic, topic_calls) = Scripted::new("duckduckgo", vec![FetchOutcome::success("x")]);
        let pipeline = pipeline_with(recipe, vec![topic], storage.clone());

        let first = pipeline
            .handle("go and learn how to cook butter chicken")
            .await
            .unwrap();
        assert_eq!(first.subject, "butter chicken");
        assert_eq!(first.intent, Intent::Recipe);
        assert!(first.from_internet);
        assert_eq!(first.source, "recipe_api");
        assert_eq!(first.error_detail, None);
        assert_eq!(recipe_calls.load(Ordering::SeqCst), 1);
        assert_eq!(topic_calls.load(Ordering::SeqCst), 0);

        let second = pipeline
            .handle("go and learn how to cook butter chicken")
            .await
            .unwrap();
        assert!(!second.from_internet);
        assert_eq!(second.source, "recipe_api_fallback");
        assert_eq!(second.error_detail.as_deref(), Some("No meals"));

        assert_eq!(storage.count_knowledge().await.unwrap(), 1);
        let stored = storage.get_knowledge("butter chicken").await.unwrap();
        assert_eq!(stored.source, "recipe_api_fallback");
        assert_eq!(stored.summary, "(Fallback) No recipe found for 'butter chicken'.");
    }

    #[tokio::test]
    async fn topic_falls_through_to_later_provider() {
        let storage = test_storage().await;
        let (recipe, _) = Scripted::new("recipe_api", vec![FetchOutcome::success("r")]);
        let (ddg, ddg_calls) = Scripted::new(
            "duckduckgo",
            vec![FetchOutcome::failure("(Fallback) nothing", "Empty abstract")],
        );
        let (wiki, wiki_calls) =
            Scripted::new("wikipedia", vec![FetchOutcome::success("A black hole is...")]);
        let (proxy, proxy_calls) =
            Scripted::new("personal_proxy", vec![FetchOutcome::success("page")]);
        let pipeline = pipeline_with(recipe, vec![ddg, wiki, proxy], storage);

        let result = pipeline.handle("learn about black holes").await.unwrap();
        assert_eq!(result.intent, Intent::Topic);
        assert_eq!(result.subject, "black holes");
        assert_eq!(result.source, "wikipedia");
        assert!(result.from_internet);
        // Earlier failure is not surfaced once a later provider succeeds.
        assert_eq!(result.error_detail, None);
        assert_eq!(ddg_calls.load(Ordering::SeqCst), 1);
        assert_eq!(wiki_calls.load(Ordering::SeqCst), 1);
        assert_eq!(proxy_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn total_topic_failure_stores_last_placeholder() {
        let storage = test_storage().await;
        let (recipe, _) = Scripted::new("recipe_api", vec![FetchOutcome::success("r")]);
        let (ddg, _) = Scripted::new(
            "duckduckgo",
            vec![FetchOutcome::failure("(Fallback) ddg", "Empty abstract")],
        );
        let (proxy, _) = Scripted::new(
            "personal_proxy",
            vec![FetchOutcome::failure("(Fallback) Proxy base URL is not set.", "Proxy URL missing")],
        );
        let pipeline = pipeline_with(recipe, vec![ddg, proxy], storage.clone());

        let result = pipeline.handle("tell me about qwzx").await.unwrap();
        assert!(!result.from_internet);
        assert_eq!(result.source, "topic_fallback");
        assert_eq!(result.error_detail.as_deref(), Some("Proxy URL missing"));
        assert_eq!(result.summary_preview, "(Fallback) Proxy base URL is not set.");

        let stored = storage.get_knowledge("qwzx").await.unwrap();
        assert_eq!(stored.source, "topic_fallback");
    }

    #[tokio::test]
    async fn preview_is_first_350_chars() {
        let storage = test_storage().await;
        let long: String = "ab".repeat(500);
        let (recipe, _) = Scripted::new("recipe_api", vec![FetchOutcome::success(long.clone())]);
        let pipeline = pipeline_with(recipe, vec![], storage.clone());

        let result = pipeline.handle("make dal").await.unwrap();
        assert_eq!(result.summary_preview.chars().count(), PREVIEW_CHARS);
        assert!(long.starts_with(&result.summary_preview));

        let stored = storage.get_knowledge("dal").await.unwrap();
        assert_eq!(stored.summary.chars().count(), 1000);
    }

    #[tokio::test]
    async fn preview_counts_characters_not_bytes() {
        let storage = test_storage().await;
        let (recipe, _) = Scripted::new("recipe_api", vec![FetchOutcome::success("é".repeat(400))]);
        let pipeline = pipeline_with(recipe, vec![], storage);

        let result = pipeline.handle("cook crêpes").await.unwrap();
        assert_eq!(result.summary_preview, "é".repeat(PREVIEW_CHARS));
    }

    #[tokio::test]
    async fn classifier_errors_skip_providers_and_storage() {
        let storage = test_storage().await;
        let (recipe, recipe_calls) = Scripted::new("recipe_api", vec![FetchOutcome::success("r")]);
        let (topic, topic_calls) = Scripted::new("duckduckgo", vec![FetchOutcome::success("t")]);
        let pipeline = pipeline_with(recipe, vec![topic], storage.clone());

        assert!(matches!(
            pipeline.handle("   ").await,
            Err(WebBabyError::EmptyCommand)
        ));
        assert!(matches!(
            pipeline.handle("learn").await,
            Err(WebBabyError::NoSubjectDetected)
        ));
        assert_eq!(recipe_calls.load(Ordering::SeqCst), 0);
        assert_eq!(topic_calls.load(Ordering::SeqCst), 0);
        assert_eq!(storage.count_knowledge().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn from_config_against_mock_recipe_api() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search.php"))
            .and(query_param("s", "butter chicken"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "meals": [{
                    "strMeal": "Butter Chicken",
                    "strCategory": "Chicken",
                    "strArea": "Indian",
                    "strInstructions": "Simmer."
                }]
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/search.php"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let config = ProvidersConfig {
            recipe_api_url: Url::parse(&format!("{}/", server.uri())).unwrap(),
            ..ProvidersConfig::default()
        };
        let storage = test_storage().await;
        let pipeline = CommandPipeline::from_config(&config, storage.clone()).unwrap();

        let ok = pipeline
            .handle("go and learn how to cook butter chicken")
            .await
            .unwrap();
        assert_eq!(ok.source, "recipe_api");
        assert!(ok.summary_preview.starts_with("Recipe for Butter Chicken (Chicken, Indian)"));

        let failed = pipeline
            .handle("go and learn how to cook butter chicken")
            .await
            .unwrap();
        assert_eq!(failed.source, "recipe_api_fallback");
        assert_eq!(failed.error_detail.as_deref(), Some("HTTP 500"));
        assert_eq!(storage.count_knowledge().await.unwrap(), 1);
    }

    #[test]
    fn result_serializes_snake_case() {
        let result = CommandResult {
            command: "make dal".into(),
            subject: "dal".into(),
            intent: Intent::Recipe,
            from_internet: false,
            source: "recipe_api_fallback".into(),
            error_detail: Some("No meals".into()),
            summary_preview: "(Fallback)".into(),
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["intent"], "recipe");
        assert_eq!(json["from_internet"], false);
        assert_eq!(json["error_detail"], "No meals");
    }
}
