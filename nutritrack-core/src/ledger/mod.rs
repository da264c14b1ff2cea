//! The meal ledger: what the user has eaten, by day and meal slot.
//!
//! The in-memory mapping is authoritative. Each append hands a full JSON
//! copy of the mapping to a background writer; callers that need durability
//! wait on the returned [`PendingWrite`] or call [`MealLedger::flush`].

mod snapshot;
mod writer;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use thiserror::Error;
use tokio::runtime::Handle;

use crate::models::{
    CalorieGoal, DailySummary, DayKey, DaySlots, FoodEntry, FoodItem, MealSlot, ModelError,
    NutritionTotals, Servings,
};
use crate::storage::KeyValueStore;

pub use snapshot::LedgerSnapshot;
pub use writer::PendingWrite;
use writer::Writer;

/// Storage key the whole ledger is persisted under.
pub const STORAGE_KEY: &str = "meals";

/// Result of restoring the ledger from storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// Stored meals replaced the in-memory mapping.
    Restored { days: usize },
    /// Nothing stored yet.
    Empty,
    /// The stored value could not be parsed and was ignored.
    Corrupt,
    /// Storage could not be read.
    Unavailable,
}

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Meal ledger requires a running Tokio runtime")]
    NoRuntime,
    #[error(transparent)]
    Invalid(#[from] ModelError),
}

pub struct MealLedger {
    state: RwLock<Arc<LedgerSnapshot>>,
    store: Arc<dyn KeyValueStore>,
    writer: Writer,
}

impl MealLedger {
    /// Creates an empty ledger backed by `store`.
    ///
    /// Must be called from inside a Tokio runtime, which runs the writer task.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Result<Self, LedgerError> {
        let handle = Handle::try_current().map_err(|_| LedgerError::NoRuntime)?;
        let writer = Writer::spawn(&handle, store.clone(), STORAGE_KEY);

        Ok(Self {
            state: RwLock::new(Arc::new(LedgerSnapshot::default())),
            store,
            writer,
        })
    }

    /// Loads previously persisted meals, replacing the in-memory mapping.
    ///
    /// Never fails: unreadable or unparseable storage leaves the ledger as it
    /// was and is reported through the outcome.
    pub async fn hydrate(&self) -> HydrateOutcome {
        let store = self.store.clone();
        let read = tokio::task::spawn_blocking(move || store.get(STORAGE_KEY)).await;

        let raw = match read {
            Ok(Ok(Some(raw))) => raw,
            Ok(Ok(None)) => {
                tracing::debug!("No stored meals found, starting empty");
                return HydrateOutcome::Empty;
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Failed to read stored meals");
                return HydrateOutcome::Unavailable;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Meal loading task failed");
                return HydrateOutcome::Unavailable;
            }
        };

        match LedgerSnapshot::from_json(&raw) {
            Ok(snapshot) => {
                let days = snapshot.len();
                *self.write_state() = Arc::new(snapshot);
                tracing::info!("Loaded meals for {} day(s)", days);
                HydrateOutcome::Restored { days }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Stored meals are corrupt, ignoring them");
                HydrateOutcome::Corrupt
            }
        }
    }

    /// Appends `food` to the end of `slot` on `day` and schedules a save.
    ///
    /// The in-memory change is visible as soon as this returns. The save runs
    /// in the background and a failure is only logged and reported through
    /// the returned handle.
    pub fn append(
        &self,
        day: DayKey,
        slot: MealSlot,
        food: FoodItem,
        quantity: Servings,
    ) -> PendingWrite {
        // Enqueue under the lock so saves reach the writer in mutation order.
        let pending = {
            let mut state = self.write_state();
            Arc::make_mut(&mut state).push(day.clone(), slot, FoodEntry::new(food, quantity));
            match state.to_json() {
                Ok(payload) => self.writer.save(payload),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to encode meal ledger");
                    PendingWrite::failed(e.into())
                }
            }
        };

        tracing::debug!(day = %day, slot = %slot, quantity = %quantity, "Logged food");
        pending
    }

    /// Like [`append`](Self::append), validating raw day and slot names first.
    pub fn append_named(
        &self,
        day: &str,
        slot: &str,
        food: FoodItem,
        quantity: Servings,
    ) -> Result<PendingWrite, LedgerError> {
        let day = DayKey::new(day)?;
        let slot = slot.parse::<MealSlot>()?;
        Ok(self.append(day, slot, food, quantity))
    }

    /// Current state. Later appends do not affect a snapshot already taken.
    pub fn snapshot(&self) -> Arc<LedgerSnapshot> {
        self.read_state().clone()
    }

    pub fn day(&self, day: &DayKey) -> DaySlots {
        self.read_state().day(day).into_owned()
    }

    pub fn totals(&self, day: &DayKey) -> NutritionTotals {
        self.read_state().totals(day)
    }

    pub fn summary(&self, day: &DayKey, goal: CalorieGoal) -> DailySummary {
        DailySummary::new(self.totals(day), goal)
    }

    /// Number of saves issued but not yet finished.
    pub fn pending_writes(&self) -> usize {
        self.writer.pending()
    }

    /// Waits until every save issued before this call has finished.
    pub async fn flush(&self) {
        self.writer.flush().await;
    }

    fn read_state(&self) -> RwLockReadGuard<'_, Arc<LedgerSnapshot>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, Arc<LedgerSnapshot>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}
