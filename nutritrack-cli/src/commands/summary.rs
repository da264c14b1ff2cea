use clap::Args;
use nutritrack_core::{CalorieGoal, DailySummary, DayKey, DaySlots};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use super::{format_entry, open_ledger, resolve_day, OutputFormat};
use crate::config::Config;

const BAR_WIDTH: usize = 30;

#[derive(Args)]
pub struct SummaryCommand {
    /// Day (defaults to today)
    #[arg(long, short)]
    pub day: Option<String>,

    /// Calorie goal for this report (defaults to the configured goal)
    #[arg(long, short)]
    pub goal: Option<String>,

    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Serialize)]
struct SummaryReport<'a> {
    day: &'a DayKey,
    #[serde(flatten)]
    summary: DailySummary,
    meals: &'a DaySlots,
}

impl SummaryCommand {
    pub async fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        let goal = match &self.goal {
            Some(raw) => raw.parse::<CalorieGoal>()?,
            None => config.daily_goal.value,
        };
        let day = resolve_day(self.day.as_deref(), config.day_format.value)?;

        let ledger = open_ledger(config).await?;
        let meals = ledger.day(&day);
        let summary = ledger.summary(&day, goal);

        match self.format {
            OutputFormat::Json => {
                let report = SummaryReport {
                    day: &day,
                    summary,
                    meals: &meals,
                };
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                println!("Summary for {}", day);
                println!("{}", "=".repeat(60));
                println!();
                println!("Remaining Calories: {:.0}", summary.remaining);
                println!(
                    "{} {:.0}%",
                    progress_bar(summary.progress, BAR_WIDTH),
                    summary.progress_percent()
                );
                println!(
                    "Eaten: {:.0} kcal of {} kcal goal",
                    summary.totals.calories, summary.goal
                );
                println!("{}", summary.totals);

                println!();
                if meals.is_empty() {
                    println!("No foods logged for {}", day);
                } else {
                    println!("Items:");
                    for (slot, entry) in meals.entries() {
                        println!("  {:10} {}", slot.as_str(), format_entry(entry));
                    }
                }
            }
        }

        Ok(())
    }
}

/// Renders a fraction in [0, 1] as "[#####.....]".
fn progress_bar(progress: Decimal, width: usize) -> String {
    let filled = (progress * Decimal::from(width))
        .floor()
        .to_usize()
        .unwrap_or(0)
        .min(width);
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_progress_bar_bounds() {
        assert_eq!(progress_bar(dec!(0), 4), "[....]");
        assert_eq!(progress_bar(dec!(0.5), 4), "[##..]");
        assert_eq!(progress_bar(dec!(1), 4), "[####]");
    }

    #[test]
    fn test_progress_bar_rounds_down() {
        assert_eq!(progress_bar(dec!(0.74), 4), "[##..]");
    }
}
