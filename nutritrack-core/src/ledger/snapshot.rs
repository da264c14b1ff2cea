use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{DayKey, DaySlots, FoodEntry, MealSlot, NutritionTotals};

/// Immutable view of every logged meal, keyed by day.
///
/// Serializes to the persisted layout: an object of day key to
/// `{ "breakfast": [...], "lunch": [...], "dinner": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LedgerSnapshot {
    days: BTreeMap<DayKey, DaySlots>,
}

impl LedgerSnapshot {
    /// Returns the slots for `day`. A day that was never logged reads as empty.
    pub fn day(&self, day: &DayKey) -> Cow<'_, DaySlots> {
        match self.days.get(day) {
            Some(slots) => Cow::Borrowed(slots),
            None => Cow::Owned(DaySlots::default()),
        }
    }

    pub fn contains_day(&self, day: &DayKey) -> bool {
        self.days.contains_key(day)
    }

    pub fn days(&self) -> impl Iterator<Item = (&DayKey, &DaySlots)> {
        self.days.iter()
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn totals(&self, day: &DayKey) -> NutritionTotals {
        self.days.get(day).map(DaySlots::totals).unwrap_or_default()
    }

    pub(crate) fn push(&mut self, day: DayKey, slot: MealSlot, entry: FoodEntry) {
        self.days.entry(day).or_default().slot_mut(slot).push(entry);
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodItem, Servings};

    fn day(key: &str) -> DayKey {
        DayKey::new(key).unwrap()
    }

    #[test]
    fn test_missing_day_is_empty() {
        let snapshot = LedgerSnapshot::default();
        let slots = snapshot.day(&day("Jun 18"));
        assert!(slots.breakfast.is_empty());
        assert!(slots.lunch.is_empty());
        assert!(slots.dinner.is_empty());
        assert!(!snapshot.contains_day(&day("Jun 18")));
    }

    #[test]
    fn test_push_creates_day_lazily() {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.push(
            day("Jun 18"),
            MealSlot::Lunch,
            FoodEntry::new(FoodItem::new("1", "Soup"), Servings::ONE),
        );
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.day(&day("Jun 18")).lunch.len(), 1);
    }

    #[test]
    fn test_json_layout() {
        let mut snapshot = LedgerSnapshot::default();
        snapshot.push(
            day("Jun 18"),
            MealSlot::Breakfast,
            FoodEntry::new(FoodItem::new("1", "Oats"), Servings::HALF),
        );

        let value: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        let entry = &value["Jun 18"]["breakfast"][0];
        assert_eq!(entry["name"], "Oats");
        assert_eq!(entry["unit"], "100g");
        assert_eq!(entry["quantity"], 0.5);
        assert!(value["Jun 18"]["lunch"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_reads_mobile_app_blob() {
        let json = r#"{"Jun 18":{"Breakfast":[{"id":"1","name":"Oats","calories":389,
            "protein":17,"carbs":66,"fat":7,"unit":"100g","image":null,"quantity":1.5}],
            "Lunch":[],"Dinner":[]}}"#;
        let snapshot = LedgerSnapshot::from_json(json).unwrap();
        assert_eq!(snapshot.day(&day("Jun 18")).breakfast[0].quantity.halves(), 3);
    }
}
