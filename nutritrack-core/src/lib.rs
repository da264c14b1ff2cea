//! NutriTrack Core Library
//!
//! The meal ledger and its storage, plus clients for the Open Food Facts
//! search and the NutriBot chat proxy.

pub mod chat;
pub mod food_search;
pub mod ledger;
pub mod models;
pub mod storage;

pub use chat::{ChatClient, ChatError, ChatMessage, ChatTranscript, Role};
pub use food_search::{FoodSearchClient, SearchError, SearchOutcome, SearchSession};
pub use ledger::{
    HydrateOutcome, LedgerError, LedgerSnapshot, MealLedger, PendingWrite, STORAGE_KEY,
};
pub use models::{
    CalorieGoal, DailySummary, DayKey, DaySlots, FoodEntry, FoodItem, MealSlot, ModelError,
    NutritionTotals, Servings,
};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
