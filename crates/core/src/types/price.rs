//! Product price.

use core::fmt;
use core::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product price in the marketplace's single currency.
///
/// The backend stores prices as floats and sends them as JSON numbers, so
/// the wire format is a number. Internally the amount is a [`Decimal`] so
/// that display never shows binary float noise like `19.990000000000002`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }
}

/// Formats with exactly two decimal places, e.g. `12.50`.
impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Price {
    type Err = rust_decimal::Error;

    /// Parses the verbatim contents of a price input field.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str(s.trim()).map(Self)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_from_json_number() {
        let price: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(price.to_string(), "19.99");

        let whole: Price = serde_json::from_str("5").unwrap();
        assert_eq!(whole.to_string(), "5.00");
    }

    #[test]
    fn test_serializes_as_json_number() {
        let price: Price = "12.5".parse().unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "12.5");
    }

    #[test]
    fn test_parse_rejects_non_numeric() {
        assert!("twelve".parse::<Price>().is_err());
    }
}
