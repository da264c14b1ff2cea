mod chat;
mod config_cmd;
mod meal;
mod search;
mod summary;

pub use chat::ChatCommand;
pub use config_cmd::ConfigCommand;
pub use meal::MealCommand;
pub use search::{SearchCommand, SuggestCommand};
pub use summary::SummaryCommand;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;
use nutritrack_core::{
    DayKey, FileStore, FoodEntry, FoodItem, FoodSearchClient, HydrateOutcome, MealLedger,
    STORAGE_KEY,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{Config, DayFormat};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Resolves a `--day` argument into a day key.
///
/// Accepts "today", "yesterday", an ISO date (re-keyed with `format`), or an
/// existing key such as "Jun 18". Missing means today.
pub fn resolve_day(day: Option<&str>, format: DayFormat) -> Result<DayKey, String> {
    let today = Local::now().date_naive();
    let Some(raw) = day else {
        return Ok(format.key_for(today));
    };

    let trimmed = raw.trim();
    match trimmed.to_lowercase().as_str() {
        "today" => return Ok(format.key_for(today)),
        "yesterday" => {
            let date = today.pred_opt().unwrap_or(today);
            return Ok(format.key_for(date));
        }
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(format.key_for(date));
    }

    DayKey::new(trimmed).map_err(|e| e.to_string())
}

/// Opens the meal ledger in the configured data directory and loads it.
pub async fn open_ledger(config: &Config) -> Result<MealLedger, Box<dyn std::error::Error>> {
    let store = FileStore::new(config.data_dir.value.clone());
    let backup = store.clone();
    let ledger = MealLedger::new(Arc::new(store))?;

    if let HydrateOutcome::Corrupt = ledger.hydrate().await {
        match preserve_corrupt(&backup) {
            Ok(path) => eprintln!(
                "Warning: stored meals could not be read and were ignored. A copy was kept at {}",
                path.display()
            ),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to keep a copy of the corrupt meals file");
                eprintln!("Warning: stored meals could not be read and were ignored.");
            }
        }
    }

    Ok(ledger)
}

/// Copies an unreadable meals file to `meals.json.corrupt` before it gets overwritten.
fn preserve_corrupt(store: &FileStore) -> std::io::Result<PathBuf> {
    let source = store.path(STORAGE_KEY);
    let target = source.with_extension("json.corrupt");
    std::fs::copy(&source, &target)?;
    Ok(target)
}

pub fn food_client(config: &Config) -> Result<FoodSearchClient, Box<dyn std::error::Error>> {
    let timeout = Duration::from_secs(config.food_search.timeout_secs);
    Ok(FoodSearchClient::new(
        config.food_search.base_url.clone(),
        timeout,
    )?)
}

/// One line per search result: " 1. Oats (389 kcal / 100g) P 17g C 66g F 7g"
pub fn format_food(index: usize, food: &FoodItem) -> String {
    format!(
        "{:>2}. {} ({:.0} kcal / {}) P {:.0}g C {:.0}g F {:.0}g",
        index, food.name, food.calories, food.unit, food.protein, food.carbs, food.fat
    )
}

pub fn format_entry(entry: &FoodEntry) -> String {
    format!(
        "{} x{} ({:.0} kcal)",
        entry.name,
        entry.quantity,
        entry.total_calories()
    )
}

pub fn print_foods(foods: &[FoodItem]) {
    for (i, food) in foods.iter().enumerate() {
        println!("  {}", format_food(i + 1, food));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ConfigSource, ConfigValue};
    use nutritrack_core::{KeyValueStore, MealSlot, Servings};
    use rust_decimal::Decimal;
    use tempfile::tempdir;

    #[test]
    fn test_resolve_day_iso_date() {
        let key = resolve_day(Some("2025-06-18"), DayFormat::Short).unwrap();
        assert_eq!(key.as_str(), "Jun 18");

        let key = resolve_day(Some("2025-06-18"), DayFormat::Dated).unwrap();
        assert_eq!(key.as_str(), "2025-06-18");
    }

    #[test]
    fn test_resolve_day_raw_key() {
        let key = resolve_day(Some(" Jun 3 "), DayFormat::Dated).unwrap();
        assert_eq!(key.as_str(), "Jun 3");
    }

    #[test]
    fn test_resolve_day_defaults_to_today() {
        let today = Local::now().date_naive();
        assert_eq!(
            resolve_day(None, DayFormat::Dated).unwrap(),
            DayKey::dated(today)
        );
        assert_eq!(
            resolve_day(Some("Today"), DayFormat::Short).unwrap(),
            DayKey::short(today)
        );
    }

    #[test]
    fn test_resolve_day_rejects_blank() {
        assert!(resolve_day(Some("   "), DayFormat::Short).is_err());
    }

    #[test]
    fn test_format_food() {
        let food = FoodItem::new("1", "Oats").with_nutrients(
            Decimal::from(389),
            Decimal::from(17),
            Decimal::from(66),
            Decimal::from(7),
        );
        assert_eq!(
            format_food(1, &food),
            " 1. Oats (389 kcal / 100g) P 17g C 66g F 7g"
        );
    }

    #[test]
    fn test_format_entry() {
        let food = FoodItem::new("1", "Rice").with_nutrients(
            Decimal::from(130),
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        );
        let entry = FoodEntry::new(food, Servings::from_decimal(Decimal::new(15, 1)).unwrap());
        assert_eq!(format_entry(&entry), "Rice x1.5 (195 kcal)");
    }

    #[tokio::test]
    async fn test_open_ledger_keeps_copy_of_corrupt_file() {
        let temp_dir = tempdir().unwrap();
        let store = FileStore::new(temp_dir.path());
        store.set(STORAGE_KEY, "{not json").unwrap();

        let mut config = Config::load(Some(temp_dir.path().join("missing.yaml"))).unwrap();
        config.data_dir = ConfigValue::new(temp_dir.path().to_path_buf(), ConfigSource::File);

        let ledger = open_ledger(&config).await.unwrap();
        assert!(ledger.snapshot().is_empty());

        let backup = temp_dir.path().join("meals.json.corrupt");
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "{not json");

        ledger
            .append(
                DayKey::new("Jun 18").unwrap(),
                MealSlot::Lunch,
                FoodItem::custom("Soup"),
                Servings::ONE,
            )
            .wait()
            .await
            .unwrap();
        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "{not json");
    }
}
