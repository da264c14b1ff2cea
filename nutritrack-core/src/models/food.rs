use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::servings::Servings;

pub const DEFAULT_UNIT: &str = "100g";

/// A food candidate, with nutrient values for one serving of `unit`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub calories: Decimal,
    #[serde(default)]
    pub protein: Decimal,
    #[serde(default)]
    pub carbs: Decimal,
    #[serde(default)]
    pub fat: Decimal,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub image: Option<String>,
}

fn default_unit() -> String {
    DEFAULT_UNIT.to_string()
}

impl FoodItem {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            calories: Decimal::ZERO,
            protein: Decimal::ZERO,
            carbs: Decimal::ZERO,
            fat: Decimal::ZERO,
            unit: default_unit(),
            image: None,
        }
    }

    /// A user-described food with a synthesized id.
    pub fn custom(name: impl Into<String>) -> Self {
        Self::new(format!("custom-{}", Uuid::new_v4()), name)
    }

    /// Sets calories, protein, carbs and fat per serving. Negative values become 0.
    pub fn with_nutrients(
        mut self,
        calories: Decimal,
        protein: Decimal,
        carbs: Decimal,
        fat: Decimal,
    ) -> Self {
        self.calories = calories.max(Decimal::ZERO);
        self.protein = protein.max(Decimal::ZERO);
        self.carbs = carbs.max(Decimal::ZERO);
        self.fat = fat.max(Decimal::ZERO);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

impl fmt::Display for FoodItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} kcal / {} (P {}g, C {}g, F {}g)",
            self.name,
            self.calories.normalize(),
            self.unit,
            self.protein.normalize(),
            self.carbs.normalize(),
            self.fat.normalize()
        )
    }
}

/// A food item as logged into a meal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub calories: Decimal,
    #[serde(default)]
    pub protein: Decimal,
    #[serde(default)]
    pub carbs: Decimal,
    #[serde(default)]
    pub fat: Decimal,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub quantity: Servings,
}

impl FoodEntry {
    pub fn new(food: FoodItem, quantity: Servings) -> Self {
        Self {
            id: food.id,
            name: food.name,
            calories: food.calories,
            protein: food.protein,
            carbs: food.carbs,
            fat: food.fat,
            unit: food.unit,
            image: food.image,
            quantity,
        }
    }

    pub fn total_calories(&self) -> Decimal {
        self.calories.saturating_mul(self.quantity.as_decimal())
    }
}
