use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use super::ModelError;

/// Identifier of the calendar day a meal is logged under.
///
/// The ledger treats keys as opaque strings. `short` produces the year-less
/// "Jun 18" form the mobile app used; `dated` produces a year-qualified key.
/// The two forms never compare equal, so a ledger should stick to one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DayKey(String);

impl DayKey {
    pub fn new(key: impl Into<String>) -> Result<Self, ModelError> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(ModelError::EmptyDayKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Month and day without a year, e.g. "Jun 18".
    pub fn short(date: NaiveDate) -> Self {
        Self(date.format("%b %-d").to_string())
    }

    /// ISO date, e.g. "2025-06-18".
    pub fn dated(date: NaiveDate) -> Self {
        Self(date.format("%Y-%m-%d").to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DayKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for DayKey {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayKey::new(s)
    }
}

impl<'de> Deserialize<'de> for DayKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DayKey::new(raw).map_err(serde::de::Error::custom)
    }
}
