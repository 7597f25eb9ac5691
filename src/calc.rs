//! The calculation engine: derives an entry's final cost from its initial
//! cost and the VAT/split flags.
//!
//! The rule is applied in a fixed order, rounding half-up to two decimal
//! places at *each* stage:
//!
//! 1. VAT: `initial * 1.20`, rounded.
//! 2. Split: the result halved, rounded again.
//!
//! The order and the per-stage rounding both matter: an odd cent produced by
//! the VAT uplift shifts the halved value by a cent compared to rounding only
//! once at the end (e.g. `10.19` -> VAT `12.23` -> split `6.12`, where a
//! single final rounding would give `6.11`).

use crate::error::ValidationError;
use crate::model::Amount;
use rust_decimal::Decimal;
use std::str::FromStr;

/// The fixed VAT multiplier (20%).
const VAT_RATE: Decimal = Decimal::from_parts(12, 0, 0, false, 1); // 1.2

/// Validates the user-facing inputs of an add operation.
///
/// Returns the trimmed product name and the parsed cost. The cost text may
/// carry a pound sign and thousands separators, exactly like the amounts the
/// rest of the system displays. Violations abort with a [`ValidationError`]
/// naming the offending field; nothing is ever silently coerced.
pub fn validate(product: &str, cost: &str) -> Result<(String, Amount), ValidationError> {
    let product = validate_product(product)?;
    let trimmed = cost.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::InvalidCost(cost.to_string()));
    }
    let amount =
        Amount::from_str(trimmed).map_err(|_| ValidationError::InvalidCost(cost.to_string()))?;
    if amount.is_negative() {
        return Err(ValidationError::NegativeCost(cost.to_string()));
    }
    Ok((product, amount))
}

/// Validates a product name, for user input and for imported records alike.
///
/// The export format delimits fields with `', '` and records with newlines,
/// so a product containing either could never round-trip through an export
/// document; such names are rejected before they can enter the ledger.
pub fn validate_product(product: &str) -> Result<String, ValidationError> {
    let product = product.trim();
    if product.is_empty() {
        return Err(ValidationError::EmptyProduct);
    }
    if product.contains('\n') || product.contains('\r') || product.contains("', '") {
        return Err(ValidationError::InvalidProduct(product.to_string()));
    }
    Ok(product.to_string())
}

/// Derives the final cost from the initial cost and the two flags.
///
/// Pure and deterministic: the ledger's final-cost invariant rests on every
/// stored `final_cost` being reproducible by this function.
pub fn final_cost(initial: Amount, vat: bool, split: bool) -> Amount {
    let mut value = if vat {
        Amount::from(initial.value() * VAT_RATE).round_half_up()
    } else {
        initial
    };
    if split {
        value = Amount::from(value.value() / Decimal::TWO).round_half_up();
    }
    value.plain()
}
