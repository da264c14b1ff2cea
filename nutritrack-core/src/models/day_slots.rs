use serde::{Deserialize, Serialize};

use super::food::FoodEntry;
use super::meal_slot::MealSlot;
use super::nutrition::NutritionTotals;

/// The three meal slots of one day, each in logging order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DaySlots {
    #[serde(default, alias = "Breakfast")]
    pub breakfast: Vec<FoodEntry>,
    #[serde(default, alias = "Lunch")]
    pub lunch: Vec<FoodEntry>,
    #[serde(default, alias = "Dinner")]
    pub dinner: Vec<FoodEntry>,
}

impl DaySlots {
    pub fn slot(&self, slot: MealSlot) -> &[FoodEntry] {
        match slot {
            MealSlot::Breakfast => &self.breakfast,
            MealSlot::Lunch => &self.lunch,
            MealSlot::Dinner => &self.dinner,
        }
    }

    pub(crate) fn slot_mut(&mut self, slot: MealSlot) -> &mut Vec<FoodEntry> {
        match slot {
            MealSlot::Breakfast => &mut self.breakfast,
            MealSlot::Lunch => &mut self.lunch,
            MealSlot::Dinner => &mut self.dinner,
        }
    }

    /// All entries, breakfast first, then lunch, then dinner.
    pub fn entries(&self) -> impl Iterator<Item = (MealSlot, &FoodEntry)> {
        MealSlot::ALL
            .into_iter()
            .flat_map(move |slot| self.slot(slot).iter().map(move |entry| (slot, entry)))
    }

    pub fn is_empty(&self) -> bool {
        self.breakfast.is_empty() && self.lunch.is_empty() && self.dinner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.breakfast.len() + self.lunch.len() + self.dinner.len()
    }

    pub fn totals(&self) -> NutritionTotals {
        self.entries().map(|(_, entry)| entry).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FoodItem, Servings};
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_day() {
        let day = DaySlots::default();
        assert!(day.is_empty());
        assert_eq!(day.len(), 0);
        assert_eq!(day.totals(), NutritionTotals::default());
    }

    #[test]
    fn test_entries_in_slot_order() {
        let mut day = DaySlots::default();
        day.slot_mut(MealSlot::Dinner)
            .push(FoodEntry::new(FoodItem::new("d", "Salmon"), Servings::ONE));
        day.slot_mut(MealSlot::Breakfast)
            .push(FoodEntry::new(FoodItem::new("b", "Oats"), Servings::ONE));

        let names: Vec<_> = day.entries().map(|(slot, e)| (slot, e.name.as_str())).collect();
        assert_eq!(
            names,
            vec![(MealSlot::Breakfast, "Oats"), (MealSlot::Dinner, "Salmon")]
        );
    }

    #[test]
    fn test_reads_capitalized_slot_names() {
        let json = r#"{"Breakfast":[{"id":"1","name":"Egg","calories":70,"protein":6,
            "carbs":0,"fat":5,"unit":"100g","image":null,"quantity":2}],"Lunch":[]}"#;
        let day: DaySlots = serde_json::from_str(json).unwrap();
        assert_eq!(day.breakfast.len(), 1);
        assert!(day.dinner.is_empty());
        assert_eq!(day.totals().calories, dec!(140));
    }
}
