use clap::Args;
use nutritrack_core::food_search::SEARCH_PAGE_SIZE;
use nutritrack_core::{FoodItem, MealSlot, SearchError};

use super::{food_client, print_foods, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct SearchCommand {
    /// Food name to look up
    pub query: String,

    /// Maximum number of results
    #[arg(long, short, default_value_t = SEARCH_PAGE_SIZE)]
    pub limit: usize,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct SuggestCommand {
    /// Meal slot (breakfast, lunch, dinner)
    pub slot: String,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl SearchCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let query = self.query.trim();
        if query.is_empty() {
            return Err("Search query cannot be empty".into());
        }

        let client = food_client(config)?;
        let foods = degrade(client.search(query, self.limit).await);

        print_results(&foods, &self.format, || {
            println!("No foods found for '{}'", query)
        })
    }
}

impl SuggestCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let slot: MealSlot = self.slot.parse()?;

        let client = food_client(config)?;
        let foods = degrade(client.suggest(slot).await);

        if let OutputFormat::Text = self.format {
            if !foods.is_empty() {
                println!("Suggestions for {}:", slot);
            }
        }
        print_results(&foods, &self.format, || {
            println!("No suggestions available for {}", slot)
        })
    }
}

/// Network failures show as an empty list; the cause goes to the log.
fn degrade(result: Result<Vec<FoodItem>, SearchError>) -> Vec<FoodItem> {
    match result {
        Ok(foods) => foods,
        Err(e) => {
            tracing::warn!(error = %e, "Food search failed");
            eprintln!("Food search is unavailable right now.");
            Vec::new()
        }
    }
}

fn print_results(
    foods: &[FoodItem],
    format: &OutputFormat,
    on_empty: impl FnOnce(),
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(foods)?);
        }
        OutputFormat::Text => {
            if foods.is_empty() {
                on_empty();
            } else {
                print_foods(foods);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_degrade_keeps_results() {
        let foods = vec![FoodItem::new("1", "Apple")];
        assert_eq!(degrade(Ok(foods.clone())), foods);
    }

    #[tokio::test]
    async fn test_degrade_failure_is_empty() {
        let client = nutritrack_core::FoodSearchClient::new(
            "http://127.0.0.1:9",
            std::time::Duration::from_secs(1),
        )
        .unwrap();
        let result = client.search("apple", 5).await;
        assert!(result.is_err());
        assert!(degrade(result).is_empty());
    }
}
