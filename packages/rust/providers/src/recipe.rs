//! Recipe lookup against a MealDB-style search API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;
use webbaby_shared::{Result, WebBabyError};

use crate::{ContentProvider, FetchOutcome, build_client};

/// One entry of the `meals` array. Absent fields fall back to blanks.
#[derive(Debug, Deserialize)]
struct Meal {
    #[serde(rename = "strMeal")]
    name: Option<String>,
    #[serde(rename = "strCategory")]
    category: Option<String>,
    #[serde(rename = "strArea")]
    area: Option<String>,
    #[serde(rename = "strInstructions")]
    instructions: Option<String>,
}

/// Looks up a dish by name and formats the first match as a recipe.
pub struct RecipeProvider {
    client: Client,
    search_url: Url,
}

impl RecipeProvider {
    /// Provenance tag for recipes fetched by this provider.
    pub const SOURCE: &'static str = "recipe_api";

    /// `base_url` is the API root; `search.php` is resolved against it.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self> {
        let search_url = base_url.join("search.php").map_err(|e| {
            WebBabyError::config(format!("invalid recipe API URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client: build_client(timeout)?,
            search_url,
        })
    }
}

#[async_trait]
impl ContentProvider for RecipeProvider {
    fn source(&self) -> &str {
        Self::SOURCE
    }

    #[instrument(skip(self), fields(source = "recipe_api"))]
    async fn fetch(&self, dish: &str) -> FetchOutcome {
        let response = match self
            .client
            .get(self.search_url.clone())
            .query(&[("s", dish)])
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => return transport_failure(dish, &e.to_string()),
        };

        let status = response.status();
        if status != StatusCode::OK {
            let code = status.as_u16();
            return FetchOutcome::failure(
                format!("(Fallback) Could not fetch recipe for '{dish}'. HTTP {code}."),
                format!("HTTP {code}"),
            );
        }

        let body: serde_json::Value = match response.json().await {
            Ok(body) => body,
            Err(e) => return transport_failure(dish, &e.to_string()),
        };

        let Some(meals) = body.get("meals") else {
            return FetchOutcome::failure(
                format!("(Fallback) Recipe API returned no meal list for '{dish}'."),
                "No meals in response",
            );
        };

        let first = meals.as_array().and_then(|list| list.first());
        let Some(first) = first else {
            return FetchOutcome::failure(
                format!("(Fallback) No recipe found for '{dish}'."),
                "No meals",
            );
        };

        let meal: Meal = match serde_json::from_value(first.clone()) {
            Ok(meal) => meal,
            Err(e) => {
                return FetchOutcome::failure(
                    format!("(Fallback) Recipe API returned an unreadable meal for '{dish}'."),
                    e.to_string(),
                );
            }
        };
        debug!(name = ?meal.name, "recipe found");
        FetchOutcome::success(format_recipe(dish, meal))
    }
}

fn format_recipe(dish: &str, meal: Meal) -> String {
    let name = meal.name.unwrap_or_else(|| dish.to_string());
    let category = meal.category.unwrap_or_default();
    let area = meal.area.unwrap_or_default();
    let instructions = meal.instructions.unwrap_or_default();
    format!("Recipe for {name} ({category}, {area}):\n\n{instructions}")
}

fn transport_failure(dish: &str, reason: &str) -> FetchOutcome {
    FetchOutcome::failure(
        format!("(Fallback) Error fetching recipe for '{dish}': {reason}"),
        reason,
    )
}
