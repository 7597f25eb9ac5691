//! Amount type for handling monetary values with optional pound signs.
//!
//! This module provides the `Amount` type which wraps `Decimal` and handles
//! parsing values that may or may not include a pound sign and commas.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// Represents how amounts were (or should be) formatted.
///
/// # Examples
///  - `AmountFormat{ pound: true, commas: true }` -> `-£60,000.00`
///  - `AmountFormat{ pound: false, commas: true }` -> `-60,000.00`
///  - `AmountFormat{ pound: false, commas: false }` -> `-60000.00`
///  - `AmountFormat{ pound: true, commas: false }` -> `-£60000.00`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AmountFormat {
    /// Whether a pound sign is present in the formatting.
    pound: bool,
    /// Whether commas are present as thousands separators in the formatting.
    commas: bool,
}

impl Default for AmountFormat {
    fn default() -> Self {
        DEFAULT_FORMAT
    }
}

/// The default format has a pound sign and commas: e.g. `-£60,000.00`.
const DEFAULT_FORMAT: AmountFormat = AmountFormat {
    pound: true,
    commas: true,
};

/// A plain format with neither pound sign nor commas: e.g. `-60000.00`. This
/// is the format used on the wire (export documents and bucket records).
pub(crate) const PLAIN_FORMAT: AmountFormat = AmountFormat {
    pound: false,
    commas: false,
};

/// Represents an amount of money.
///
/// This type wraps `Decimal` and provides custom serialization/deserialization
/// to handle amounts that may be formatted with or without pound signs or commas.
///
/// Formatting is considered significant for the purposes of equality, so for numeric comparisons,
/// you should access the `Decimal` value and use that.
///
/// # Examples
///
/// Parsing with pound sign:
/// ```
/// # use splitbill::model::Amount;
/// # use std::str::FromStr;
/// let amount = Amount::from_str("-£50.00").unwrap();
/// assert_eq!(amount.to_string(), "-£50.00");
/// ```
///
/// Value equivalency, but not absolute equivalency:
/// ```
/// # use splitbill::model::Amount;
/// # use std::str::FromStr;
/// let a = Amount::from_str("-5000.00").unwrap();
/// let b = Amount::from_str("-£5,000.00").unwrap();
/// assert_ne!(a, b);
/// assert_eq!(a.value(), b.value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Amount {
    /// The parsed numerical value.
    value: Decimal,
    /// The way the numerical value was parsed from, or should be written to, a `String`.
    format: AmountFormat,
}

impl Amount {
    /// Creates a new Amount from a Decimal value with default `String` formatting.
    pub const fn new(value: Decimal) -> Self {
        Self {
            value,
            format: DEFAULT_FORMAT,
        }
    }

    /// Returns the underlying Decimal value.
    pub fn value(&self) -> Decimal {
        self.value
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.value().is_zero()
    }

    /// Returns true if the amount is positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.value().is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.value().is_sign_negative()
    }

    /// Rounds to two decimal places, half-up (5 rounds away from zero).
    ///
    /// The ledger's calculation rule rounds at each stage, so a cent produced
    /// by the VAT uplift participates in the split rounding.
    pub fn round_half_up(&self) -> Self {
        Self {
            value: self
                .value
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
            format: self.format,
        }
    }

    /// The same amount formatted without pound sign or commas, as written to
    /// export documents and bucket records.
    pub fn plain(&self) -> Self {
        Self {
            value: self.value,
            format: PLAIN_FORMAT,
        }
    }
}

/// An error that can occur when parsing strings into `Decimal` values.
pub struct AmountError(rust_decimal::Error);

impl Debug for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Debug::fmt(&self.0, f)
    }
}

impl Display for AmountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl std::error::Error for AmountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.0)
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut pound_sign = false;

        // Remove whitespace
        let trimmed = s.trim();

        // Handle empty string
        if trimmed.is_empty() {
            return Ok(Amount::default());
        }

        // Remove pound sign if present
        let without_pound = if let Some(after_minus) = trimmed.strip_prefix('-') {
            // Negative number: could be "-£50.00" or "-50.00"
            if let Some(after_pound) = after_minus.strip_prefix('£') {
                pound_sign = true;
                format!("-{after_pound}")
            } else {
                trimmed.to_string()
            }
        } else if let Some(after_pound) = trimmed.strip_prefix('£') {
            // Positive number with pound sign: "£50.00"
            pound_sign = true;
            after_pound.to_string()
        } else {
            // No pound sign
            trimmed.to_string()
        };

        // Remove commas (thousand separators)
        let without_commas = without_pound.replace(',', "");
        let commas = without_commas.len() < without_pound.len();

        // Parse the decimal value
        let value = Decimal::from_str(&without_commas).map_err(AmountError)?;
        Ok(Amount {
            value,
            format: AmountFormat {
                pound: pound_sign,
                commas,
            },
        })
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.is_negative() {
            (String::from("-"), self.value().abs())
        } else {
            (String::new(), self.value())
        };

        let sym = if self.format.pound {
            String::from("£")
        } else {
            String::new()
        };

        if self.format.commas {
            write!(
                f,
                "{sign}{sym}{}",
                format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
            )
        } else {
            write!(f, "{sign}{sym}{num}")
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // Serialize as a string, preserving the formatting
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Amount::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<Amount> for Decimal {
    fn from(amount: Amount) -> Self {
        amount.value()
    }
}
