mod day_key;
mod day_slots;
mod food;
mod meal_slot;
mod nutrition;
mod servings;

pub use day_key::DayKey;
pub use day_slots::DaySlots;
pub use food::{FoodEntry, FoodItem, DEFAULT_UNIT};
pub use meal_slot::MealSlot;
pub use nutrition::{CalorieGoal, DailySummary, NutritionTotals, DEFAULT_DAILY_GOAL};
pub use servings::Servings;

use thiserror::Error;

/// Validation errors for user-supplied model values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Day key must not be empty")]
    EmptyDayKey,
    #[error("Invalid meal slot '{0}'. Valid options: breakfast, lunch, dinner")]
    InvalidSlot(String),
    #[error("Invalid quantity '{0}'. Use a multiple of 0.5 servings, at least 0.5")]
    InvalidQuantity(String),
    #[error("Invalid calorie goal '{0}'. Please enter a positive number")]
    InvalidGoal(String),
}
