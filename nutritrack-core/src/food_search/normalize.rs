//! Conversion of Open Food Facts products into [`FoodItem`]s.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Deserialize;
use serde_json::Value;

use crate::models::{FoodItem, DEFAULT_UNIT};

#[derive(Debug, Default, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub products: Option<Vec<Product>>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Product {
    #[serde(default)]
    pub code: Option<Value>,
    #[serde(default)]
    pub product_name: Option<String>,
    #[serde(default)]
    pub nutriments: Option<Nutriments>,
    #[serde(default)]
    pub image_front_small_url: Option<String>,
    #[serde(default)]
    pub image_thumb_url: Option<String>,
}

/// Per-100g values. The feed mixes numbers and numeric strings.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Nutriments {
    #[serde(default)]
    pub energy_100g: Option<Value>,
    #[serde(default)]
    pub proteins_100g: Option<Value>,
    #[serde(default)]
    pub carbohydrates_100g: Option<Value>,
    #[serde(default)]
    pub fat_100g: Option<Value>,
}

/// Builds a food item from a product. `fallback_id` is used when the product
/// has no barcode.
pub(crate) fn to_food_item(product: Product, fallback_id: String) -> FoodItem {
    let id = product
        .code
        .as_ref()
        .and_then(code_string)
        .unwrap_or(fallback_id);

    let name = product
        .product_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| "Unknown".to_string());

    let nutriments = product.nutriments.unwrap_or_default();
    let energy_kj = number(nutriments.energy_100g.as_ref());

    let mut item = FoodItem::new(id, name)
        .with_nutrients(
            round_whole(kj_to_kcal(energy_kj)),
            round_whole(number(nutriments.proteins_100g.as_ref())),
            round_whole(number(nutriments.carbohydrates_100g.as_ref())),
            round_whole(number(nutriments.fat_100g.as_ref())),
        )
        .with_unit(DEFAULT_UNIT);

    if let Some(image) = product
        .image_front_small_url
        .filter(|u| !u.is_empty())
        .or(product.image_thumb_url.filter(|u| !u.is_empty()))
    {
        item = item.with_image(image);
    }

    item
}

/// Converts kilojoules to kilocalories (1 kcal = 4.184 kJ).
pub fn kj_to_kcal(kj: Decimal) -> Decimal {
    kj / Decimal::new(4184, 3)
}

/// Rounds to the nearest integer, halves away from zero.
pub fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

fn code_string(code: &Value) -> Option<String> {
    match code {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Reads a non-negative number, treating anything missing or malformed as 0.
fn number(value: Option<&Value>) -> Decimal {
    let parsed = match value {
        Some(Value::Number(n)) => parse_decimal(&n.to_string()),
        Some(Value::String(s)) => parse_decimal(s.trim()),
        _ => None,
    };
    parsed.unwrap_or(Decimal::ZERO).max(Decimal::ZERO)
}

fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}
