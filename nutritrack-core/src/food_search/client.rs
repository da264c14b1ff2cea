//! HTTP client for the Open Food Facts product search.

use std::time::{Duration, Instant};

use crate::models::{FoodItem, MealSlot};

use super::normalize::{to_food_item, SearchResponse};
use super::SearchError;

pub const DEFAULT_BASE_URL: &str = "https://world.openfoodfacts.org";
/// Results requested for a free-text search.
pub const SEARCH_PAGE_SIZE: usize = 20;
/// Results requested for a meal-slot suggestion.
pub const SUGGESTION_PAGE_SIZE: usize = 10;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone)]
pub struct FoodSearchClient {
    http: reqwest::Client,
    base_url: String,
}

impl FoodSearchClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SearchError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("nutritrack/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self::with_client(http, base_url))
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn search_url(&self, query: &str, page_size: usize) -> String {
        format!(
            "{}/cgi/search.pl?search_terms={}&search_simple=1&action=process&json=1&page_size={}",
            self.base_url,
            urlencoding::encode(query),
            page_size
        )
    }

    /// Searches products matching `query`, in the order the server ranks them.
    ///
    /// A blank query returns no results without a request.
    pub async fn search(&self, query: &str, page_size: usize) -> Result<Vec<FoodItem>, SearchError> {
        self.fetch(query, page_size, |idx| idx.to_string()).await
    }

    /// Suggested foods for a meal slot, e.g. oatmeal for breakfast.
    pub async fn suggest(&self, slot: MealSlot) -> Result<Vec<FoodItem>, SearchError> {
        self.fetch(slot.suggestion_query(), SUGGESTION_PAGE_SIZE, |idx| {
            format!("{}_{}", slot, idx)
        })
        .await
    }

    async fn fetch(
        &self,
        query: &str,
        page_size: usize,
        fallback_id: impl Fn(usize) -> String,
    ) -> Result<Vec<FoodItem>, SearchError> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let started = Instant::now();
        let response = self.http.get(self.search_url(query, page_size)).send().await?;

        if !response.status().is_success() {
            return Err(SearchError::Status(response.status()));
        }

        let body: SearchResponse = response.json().await?;
        let items: Vec<FoodItem> = body
            .products
            .unwrap_or_default()
            .into_iter()
            .take(page_size)
            .enumerate()
            .map(|(idx, product)| to_food_item(product, fallback_id(idx)))
            .collect();

        tracing::debug!(
            query,
            results = items.len(),
            "Food search took {:.2?}",
            started.elapsed()
        );

        Ok(items)
    }
}
