use clap::{Args, Subcommand};
use nutritrack_core::food_search::SEARCH_PAGE_SIZE;
use nutritrack_core::{DayKey, DaySlots, FoodItem, MealLedger, MealSlot, NutritionTotals, Servings};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{food_client, format_entry, open_ledger, resolve_day, OutputFormat};
use crate::config::Config;

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Log a food to a meal slot
    Log {
        /// Day (today, yesterday, YYYY-MM-DD or a stored key like "Jun 18")
        #[arg(long, short)]
        day: Option<String>,

        /// Meal slot (breakfast, lunch, dinner)
        #[arg(long, short)]
        slot: String,

        /// Servings, in steps of 0.5
        #[arg(long, short, default_value = "1")]
        quantity: String,

        /// Search Open Food Facts and log a result
        #[arg(long, conflicts_with = "name")]
        query: Option<String>,

        /// Which search result to log (1-based)
        #[arg(long, default_value_t = 1, requires = "query")]
        pick: usize,

        /// Name of a food entered by hand
        #[arg(long, requires = "calories")]
        name: Option<String>,

        /// Calories per serving
        #[arg(long)]
        calories: Option<Decimal>,

        /// Protein per serving (g)
        #[arg(long, default_value = "0")]
        protein: Decimal,

        /// Carbs per serving (g)
        #[arg(long, default_value = "0")]
        carbs: Decimal,

        /// Fat per serving (g)
        #[arg(long, default_value = "0")]
        fat: Decimal,

        /// Serving unit
        #[arg(long)]
        unit: Option<String>,
    },

    /// Show one day's meals
    Show {
        /// Day (defaults to today)
        #[arg(long, short)]
        day: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// View every logged day with its totals
    History {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

#[derive(Serialize)]
struct DayReport<'a> {
    day: &'a DayKey,
    meals: &'a DaySlots,
    totals: NutritionTotals,
}

impl MealCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            MealSubcommand::Log {
                day,
                slot,
                quantity,
                query,
                pick,
                name,
                calories,
                protein,
                carbs,
                fat,
                unit,
            } => {
                let day = resolve_day(day.as_deref(), config.day_format.value)?;
                let slot: MealSlot = slot.parse()?;
                let quantity: Servings = quantity.parse()?;

                let food = match (query, name) {
                    (Some(query), _) => pick_food(config, query, *pick).await?,
                    (None, Some(name)) => {
                        let name = name.trim();
                        if name.is_empty() {
                            return Err("Food name cannot be empty".into());
                        }
                        let calories = calories.ok_or("--calories is required with --name")?;
                        let food = FoodItem::custom(name)
                            .with_nutrients(calories, *protein, *carbs, *fat);
                        match unit {
                            Some(u) => food.with_unit(u.trim()),
                            None => food,
                        }
                    }
                    (None, None) => return Err("Provide --query or --name".into()),
                };

                let ledger = open_ledger(config).await?;
                log_food(&ledger, day, slot, food, quantity).await
            }
            MealSubcommand::Show { day, format } => {
                let day = resolve_day(day.as_deref(), config.day_format.value)?;
                let ledger = open_ledger(config).await?;
                let meals = ledger.day(&day);

                match format {
                    OutputFormat::Json => {
                        let report = DayReport {
                            day: &day,
                            totals: meals.totals(),
                            meals: &meals,
                        };
                        println!("{}", serde_json::to_string_pretty(&report)?);
                    }
                    OutputFormat::Text => print_day(&day, &meals),
                }
                Ok(())
            }
            MealSubcommand::History { format } => {
                let ledger = open_ledger(config).await?;
                let snapshot = ledger.snapshot();

                if snapshot.is_empty() {
                    println!("No meals logged yet");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        let reports: Vec<DayReport<'_>> = snapshot
                            .days()
                            .map(|(day, meals)| DayReport {
                                day,
                                meals,
                                totals: meals.totals(),
                            })
                            .collect();
                        println!("{}", serde_json::to_string_pretty(&reports)?);
                    }
                    OutputFormat::Text => {
                        for (i, (day, meals)) in snapshot.days().enumerate() {
                            if i > 0 {
                                println!();
                            }
                            print_day(day, meals);
                        }
                        println!("\nTotal: {} day(s)", snapshot.len());
                    }
                }
                Ok(())
            }
        }
    }
}

/// Runs a food search and returns the `pick`th result.
async fn pick_food(
    config: &Config,
    query: &str,
    pick: usize,
) -> Result<FoodItem, Box<dyn std::error::Error>> {
    let query = query.trim();
    if query.is_empty() {
        return Err("Search query cannot be empty".into());
    }

    let client = food_client(config)?;
    let mut foods = client.search(query, SEARCH_PAGE_SIZE).await?;

    if foods.is_empty() {
        return Err(format!("No foods found for '{}'", query).into());
    }
    if pick == 0 || pick > foods.len() {
        return Err(format!(
            "Result {} is out of range; '{}' returned {} result(s)",
            pick,
            query,
            foods.len()
        )
        .into());
    }

    Ok(foods.swap_remove(pick - 1))
}

/// Appends to the ledger and waits for the save to reach disk.
async fn log_food(
    ledger: &MealLedger,
    day: DayKey,
    slot: MealSlot,
    food: FoodItem,
    quantity: Servings,
) -> Result<(), Box<dyn std::error::Error>> {
    let name = food.name.clone();
    let total = food.calories.saturating_mul(quantity.as_decimal());

    let pending = ledger.append(day.clone(), slot, food, quantity);
    let saved = pending.wait().await;
    ledger.flush().await;

    println!(
        "Logged {} x{} ({:.0} kcal) to {} on {}",
        name, quantity, total, slot, day
    );
    println!("  Day total: {}", ledger.totals(&day));

    if let Err(e) = saved {
        eprintln!("Warning: meal could not be saved: {}", e);
    }
    Ok(())
}

fn print_day(day: &DayKey, meals: &DaySlots) {
    println!("{}", day);
    println!("{}", "-".repeat(60));

    for slot in MealSlot::ALL {
        let entries = meals.slot(slot);
        println!("  {}", capitalize(slot.as_str()));
        if entries.is_empty() {
            println!("    (nothing logged)");
        }
        for entry in entries {
            println!("    - {}", format_entry(entry));
        }
    }

    println!("  {}", "-".repeat(56));
    println!("  Daily Total: {}", meals.totals());
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nutritrack_core::{FileStore, MemoryStore, STORAGE_KEY};
    use std::sync::Arc;
    use tempfile::tempdir;

    #[test]
    fn test_capitalize() {
        assert_eq!(capitalize("breakfast"), "Breakfast");
        assert_eq!(capitalize(""), "");
    }

    #[tokio::test]
    async fn test_log_food_persists_before_returning() {
        let temp_dir = tempdir().unwrap();
        let store = Arc::new(FileStore::new(temp_dir.path()));
        let ledger = MealLedger::new(store.clone()).unwrap();
        let day = DayKey::new("Jun 18").unwrap();
        let food = FoodItem::custom("Toast").with_nutrients(
            Decimal::from(80),
            Decimal::from(3),
            Decimal::from(15),
            Decimal::from(1),
        );

        log_food(&ledger, day.clone(), MealSlot::Breakfast, food, Servings::ONE)
            .await
            .unwrap();

        assert_eq!(ledger.pending_writes(), 0);
        assert!(store.exists(STORAGE_KEY));

        let reopened = MealLedger::new(store).unwrap();
        reopened.hydrate().await;
        assert_eq!(reopened.day(&day).slot(MealSlot::Breakfast)[0].name, "Toast");
    }

    #[tokio::test]
    async fn test_log_food_appends_in_order() {
        let ledger = MealLedger::new(Arc::new(MemoryStore::new())).unwrap();
        let day = DayKey::new("Jun 18").unwrap();

        for name in ["Eggs", "Coffee"] {
            log_food(
                &ledger,
                day.clone(),
                MealSlot::Breakfast,
                FoodItem::custom(name),
                Servings::HALF,
            )
            .await
            .unwrap();
        }

        let names: Vec<_> = ledger
            .day(&day)
            .slot(MealSlot::Breakfast)
            .iter()
            .map(|e| e.name.clone())
            .collect();
        assert_eq!(names, vec!["Eggs", "Coffee"]);
    }

    #[tokio::test]
    async fn test_log_food_with_huge_calories() {
        let ledger = MealLedger::new(Arc::new(MemoryStore::new())).unwrap();
        let day = DayKey::new("Jun 18").unwrap();
        let huge = FoodItem::custom("Mystery").with_nutrients(
            Decimal::MAX,
            Decimal::ZERO,
            Decimal::ZERO,
            Decimal::ZERO,
        );

        let double = Servings::from_decimal(Decimal::from(2)).unwrap();
        log_food(&ledger, day.clone(), MealSlot::Lunch, huge, double)
            .await
            .unwrap();
        log_food(
            &ledger,
            day.clone(),
            MealSlot::Lunch,
            FoodItem::custom("Apple"),
            Servings::ONE,
        )
        .await
        .unwrap();

        assert_eq!(ledger.totals(&day).calories, Decimal::MAX);
    }
}
