//! Food lookups against the Open Food Facts database.
//!
//! [`FoodSearchClient`] performs single requests. [`SearchSession`] sits in
//! front of it for search-as-you-type and discards results of searches that
//! a newer one has replaced.

mod client;
mod normalize;
mod session;

pub use client::{
    FoodSearchClient, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, SEARCH_PAGE_SIZE, SUGGESTION_PAGE_SIZE,
};
pub use normalize::{kj_to_kcal, round_whole};
pub use session::{SearchOutcome, SearchSession, DEFAULT_DEBOUNCE};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Food search request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Food search returned status {0}")]
    Status(reqwest::StatusCode),
}
