use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::ModelError;

/// Number of servings logged for an entry.
///
/// Stored as a count of half-servings, so a value is always at least 0.5 and
/// a multiple of 0.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Servings(u32);

impl Servings {
    pub const HALF: Servings = Servings(1);
    pub const ONE: Servings = Servings(2);

    /// Builds a quantity from a decimal amount of servings.
    pub fn from_decimal(amount: Decimal) -> Result<Self, ModelError> {
        let halves = amount * Decimal::TWO;
        if amount < Decimal::new(5, 1) || halves.fract() != Decimal::ZERO {
            return Err(ModelError::InvalidQuantity(amount.normalize().to_string()));
        }
        halves
            .to_u32()
            .map(Servings)
            .ok_or_else(|| ModelError::InvalidQuantity(amount.normalize().to_string()))
    }

    pub fn halves(&self) -> u32 {
        self.0
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.0) / Decimal::TWO
    }

    /// Moves the quantity by `steps` half-servings, never going below 0.5.
    pub fn adjust(self, steps: i32) -> Self {
        let next = i64::from(self.0) + i64::from(steps);
        Servings(next.clamp(1, i64::from(u32::MAX)) as u32)
    }

    pub fn increment(self) -> Self {
        self.adjust(1)
    }

    pub fn decrement(self) -> Self {
        self.adjust(-1)
    }
}

impl Default for Servings {
    fn default() -> Self {
        Servings::ONE
    }
}

impl fmt::Display for Servings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_decimal().normalize())
    }
}

impl FromStr for Servings {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let amount = Decimal::from_str(s.trim())
            .map_err(|_| ModelError::InvalidQuantity(s.to_string()))?;
        Servings::from_decimal(amount)
    }
}

impl Serialize for Servings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Serialize::serialize(&self.as_decimal().normalize(), serializer)
    }
}

impl<'de> Deserialize<'de> for Servings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = <Decimal as Deserialize>::deserialize(deserializer)?;
        Servings::from_decimal(amount).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_servings_default_is_one() {
        assert_eq!(Servings::default(), Servings::ONE);
        assert_eq!(Servings::ONE.as_decimal(), dec!(1));
    }

    #[test]
    fn test_servings_decrement_clamps_at_half() {
        let half = Servings::ONE.decrement();
        assert_eq!(half.as_decimal(), dec!(0.5));
        assert_eq!(half.decrement(), Servings::HALF);
        assert_eq!(half.adjust(-10), Servings::HALF);
    }

    #[test]
    fn test_servings_increment() {
        assert_eq!(Servings::ONE.increment().as_decimal(), dec!(1.5));
    }

    #[test]
    fn test_servings_from_decimal() {
        assert_eq!(Servings::from_decimal(dec!(2.5)).unwrap().halves(), 5);
        assert_eq!(Servings::from_decimal(dec!(3.0)).unwrap().halves(), 6);
        assert!(Servings::from_decimal(dec!(0)).is_err());
        assert!(Servings::from_decimal(dec!(-1)).is_err());
        assert!(Servings::from_decimal(dec!(1.25)).is_err());
    }

    #[test]
    fn test_servings_from_str() {
        assert_eq!("1.5".parse::<Servings>().unwrap().halves(), 3);
        assert!("abc".parse::<Servings>().is_err());
    }

    #[test]
    fn test_servings_display() {
        assert_eq!(Servings::ONE.to_string(), "1");
        assert_eq!(Servings::HALF.to_string(), "0.5");
    }

    #[test]
    fn test_servings_json() {
        let parsed: Servings = serde_json::from_str("1.5").unwrap();
        assert_eq!(parsed.halves(), 3);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "1.5");
        assert!(serde_json::from_str::<Servings>("0.2").is_err());
        assert_eq!(serde_json::to_string(&Servings::ONE).unwrap(), "1");
    }
}
