//! The ledger entry and its identity and mode types.

use crate::model::Amount;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::num::ParseIntError;
use std::str::FromStr;

/// The identity of a ledger entry, unique among live entries in a session.
#[derive(
    Debug, Clone, Copy, Default, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EntryId(u64);

impl EntryId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub(crate) const fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for EntryId {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl From<u64> for EntryId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// The session-wide operation mode: whether a new entry's final cost is added
/// to or subtracted from the running total.
///
/// The mode is snapshotted onto the entry at the moment it enters the ledger.
/// Toggling the mode afterwards never changes deltas that were already
/// applied.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Add,
    Subtract,
}

impl Mode {
    /// The sign this mode applies to a final cost: `1` or `-1`.
    pub fn sign(&self) -> Decimal {
        match self {
            Mode::Add => Decimal::ONE,
            Mode::Subtract => Decimal::NEGATIVE_ONE,
        }
    }
}

impl Display for Mode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Add => write!(f, "Add"),
            Mode::Subtract => write!(f, "Subtract"),
        }
    }
}

/// A single item in the ledger.
///
/// `final_cost` is derived, never user-entered: recomputing it from
/// `(initial_cost, vat, split)` with [`crate::calc::final_cost`] always
/// reproduces the stored value. There is no update-in-place; correcting an
/// entry means delete and re-add.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LedgerEntry {
    id: EntryId,
    product: String,
    initial_cost: Amount,
    vat: bool,
    split: bool,
    final_cost: Amount,
    mode: Mode,
    added: DateTime<Utc>,
}

impl LedgerEntry {
    /// Assembles an entry. Only the ledger store and the importer construct
    /// entries, and both derive `final_cost` through the calculation engine.
    pub(crate) fn new(
        id: EntryId,
        product: String,
        initial_cost: Amount,
        vat: bool,
        split: bool,
        final_cost: Amount,
        mode: Mode,
        added: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            product,
            initial_cost,
            vat,
            split,
            final_cost,
            mode,
            added,
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn initial_cost(&self) -> Amount {
        self.initial_cost
    }

    pub fn vat(&self) -> bool {
        self.vat
    }

    pub fn split(&self) -> bool {
        self.split
    }

    pub fn final_cost(&self) -> Amount {
        self.final_cost
    }

    /// The Add/Subtract mode that was in effect when this entry entered the
    /// ledger. Deletion reverses the delta applied under this mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn added(&self) -> DateTime<Utc> {
        self.added
    }

    /// This entry's signed contribution to the running total.
    pub fn signed_final_cost(&self) -> Decimal {
        self.mode.sign() * self.final_cost.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_entry_id_round_trip() {
        let id = EntryId::from_str("42").unwrap();
        assert_eq!(id, EntryId::new(42));
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn test_mode_sign() {
        assert_eq!(Mode::Add.sign(), Decimal::ONE);
        assert_eq!(Mode::Subtract.sign(), Decimal::NEGATIVE_ONE);
    }

    #[test]
    fn test_signed_final_cost() {
        let entry = LedgerEntry::new(
            EntryId::new(1),
            "Apples".to_string(),
            Amount::from_str("2.00").unwrap(),
            false,
            false,
            Amount::from_str("2.00").unwrap(),
            Mode::Subtract,
            Utc::now(),
        );
        assert_eq!(entry.signed_final_cost(), Decimal::from_str("-2.00").unwrap());
    }
}
