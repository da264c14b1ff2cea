use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use super::food::FoodEntry;
use super::ModelError;

pub const DEFAULT_DAILY_GOAL: u32 = 2000;

/// Calories and macros summed over a set of entries, each scaled by its quantity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NutritionTotals {
    pub calories: Decimal,
    pub protein: Decimal,
    pub carbs: Decimal,
    pub fat: Decimal,
}

impl NutritionTotals {
    pub fn of(entry: &FoodEntry) -> Self {
        let quantity = entry.quantity.as_decimal();
        Self {
            calories: entry.calories.saturating_mul(quantity),
            protein: entry.protein.saturating_mul(quantity),
            carbs: entry.carbs.saturating_mul(quantity),
            fat: entry.fat.saturating_mul(quantity),
        }
    }
}

impl Add for NutritionTotals {
    type Output = NutritionTotals;

    /// Saturates at the `Decimal` bounds instead of overflowing.
    fn add(self, other: Self) -> Self {
        Self {
            calories: self.calories.saturating_add(other.calories),
            protein: self.protein.saturating_add(other.protein),
            carbs: self.carbs.saturating_add(other.carbs),
            fat: self.fat.saturating_add(other.fat),
        }
    }
}

impl<'a> Sum<&'a FoodEntry> for NutritionTotals {
    fn sum<I: Iterator<Item = &'a FoodEntry>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, entry| acc + Self::of(entry))
    }
}

impl fmt::Display for NutritionTotals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Calories: {:.0} | Protein: {:.0}g | Carbs: {:.0}g | Fat: {:.0}g",
            self.calories, self.protein, self.carbs, self.fat
        )
    }
}

/// Daily calorie target. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct CalorieGoal(u32);

impl CalorieGoal {
    pub fn new(kcal: u32) -> Result<Self, ModelError> {
        if kcal == 0 {
            return Err(ModelError::InvalidGoal(kcal.to_string()));
        }
        Ok(Self(kcal))
    }

    pub fn kcal(&self) -> u32 {
        self.0
    }
}

impl Default for CalorieGoal {
    fn default() -> Self {
        Self(DEFAULT_DAILY_GOAL)
    }
}

impl TryFrom<u32> for CalorieGoal {
    type Error = ModelError;

    fn try_from(kcal: u32) -> Result<Self, Self::Error> {
        CalorieGoal::new(kcal)
    }
}

impl From<CalorieGoal> for u32 {
    fn from(goal: CalorieGoal) -> u32 {
        goal.0
    }
}

impl FromStr for CalorieGoal {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .map_err(|_| ModelError::InvalidGoal(s.to_string()))
            .and_then(CalorieGoal::new)
    }
}

impl fmt::Display for CalorieGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A day's totals measured against the calorie goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailySummary {
    pub totals: NutritionTotals,
    pub goal: CalorieGoal,
    /// Calories left before the goal, never negative.
    pub remaining: Decimal,
    /// Eaten calories as a fraction of the goal, capped at 1.
    pub progress: Decimal,
}

impl DailySummary {
    pub fn new(totals: NutritionTotals, goal: CalorieGoal) -> Self {
        let target = Decimal::from(goal.kcal());
        let remaining = target.saturating_sub(totals.calories).max(Decimal::ZERO);
        let progress = (totals.calories / target).min(Decimal::ONE);
        Self {
            totals,
            goal,
            remaining,
            progress,
        }
    }

    pub fn progress_percent(&self) -> Decimal {
        self.progress * Decimal::ONE_HUNDRED
    }
}
