use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::models::FoodItem;

use super::client::{FoodSearchClient, SEARCH_PAGE_SIZE};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Results for the latest search. Empty when the request failed.
    Completed(Vec<FoodItem>),
    /// A newer search was started before this one finished.
    Superseded,
}

impl SearchOutcome {
    pub fn into_items(self) -> Option<Vec<FoodItem>> {
        match self {
            SearchOutcome::Completed(items) => Some(items),
            SearchOutcome::Superseded => None,
        }
    }
}

/// Debounced search for one input field.
///
/// Each call takes a sequence number. A call whose number is no longer the
/// latest when its delay or request finishes returns
/// [`SearchOutcome::Superseded`] and its results are dropped.
#[derive(Debug)]
pub struct SearchSession {
    client: FoodSearchClient,
    debounce: Duration,
    page_size: usize,
    latest: AtomicU64,
}

impl SearchSession {
    pub fn new(client: FoodSearchClient) -> Self {
        Self {
            client,
            debounce: DEFAULT_DEBOUNCE,
            page_size: SEARCH_PAGE_SIZE,
            latest: AtomicU64::new(0),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sequence number of the most recent search.
    pub fn latest_sequence(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub async fn search(&self, query: &str) -> SearchOutcome {
        let seq = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        let query = query.trim();
        if query.is_empty() {
            return SearchOutcome::Completed(Vec::new());
        }

        if !self.debounce.is_zero() {
            tokio::time::sleep(self.debounce).await;
        }
        if self.is_stale(seq) {
            return SearchOutcome::Superseded;
        }

        let result = self.client.search(query, self.page_size).await;
        if self.is_stale(seq) {
            tracing::debug!(seq, query, "Discarding superseded search results");
            return SearchOutcome::Superseded;
        }

        match result {
            Ok(items) => SearchOutcome::Completed(items),
            Err(e) => {
                tracing::warn!(query, error = %e, "Food search failed");
                SearchOutcome::Completed(Vec::new())
            }
        }
    }

    fn is_stale(&self, seq: u64) -> bool {
        self.latest.load(Ordering::SeqCst) != seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn products(name: &str) -> serde_json::Value {
        json!({ "products": [{ "code": name, "product_name": name }] })
    }

    fn session(server: &MockServer, debounce: Duration) -> SearchSession {
        let client = FoodSearchClient::new(server.uri(), Duration::from_secs(5)).unwrap();
        SearchSession::new(client).with_debounce(debounce)
    }

    #[tokio::test]
    async fn test_slow_search_is_superseded() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("search_terms", "app"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(products("app"))
                    .set_delay(Duration::from_millis(400)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("search_terms", "apple"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products("apple")))
            .mount(&server)
            .await;

        let session = session(&server, Duration::ZERO);
        let (first, second) = tokio::join!(session.search("app"), async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            session.search("apple").await
        });

        assert_eq!(first, SearchOutcome::Superseded);
        let items = second.into_items().unwrap();
        assert_eq!(items[0].name, "apple");
        assert_eq!(session.latest_sequence(), 2);
    }

    #[tokio::test]
    async fn test_debounce_skips_superseded_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("search_terms", "ban"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products("ban")))
            .expect(0)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("search_terms", "banana"))
            .respond_with(ResponseTemplate::new(200).set_body_json(products("banana")))
            .expect(1)
            .mount(&server)
            .await;

        let session = session(&server, Duration::from_millis(200));
        let (first, second) = tokio::join!(session.search("ban"), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            session.search("banana").await
        });

        assert_eq!(first, SearchOutcome::Superseded);
        assert_eq!(second.into_items().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_search_yields_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let outcome = session(&server, Duration::ZERO).search("kale").await;
        assert_eq!(outcome, SearchOutcome::Completed(Vec::new()));
    }

    #[tokio::test]
    async fn test_clearing_query_supersedes_pending_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(products("pear"))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;

        let session = session(&server, Duration::ZERO);
        let (first, cleared) = tokio::join!(session.search("pear"), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            session.search("").await
        });

        assert_eq!(first, SearchOutcome::Superseded);
        assert_eq!(cleared, SearchOutcome::Completed(Vec::new()));
    }
}
