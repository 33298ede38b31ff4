//! Per-ingredient yield calculation
//!
//! Pure arithmetic over a single raw technical-sheet entry and the recipe's
//! precomputed gross total. Every derived value is rounded to two decimal
//! places, half away from zero, at the moment it is computed.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of decimal places stored for every derived quantity
pub const QUANTITY_SCALE: u32 = 2;

/// Errors raised while computing an entry
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum YieldError {
    #[error("Invalid yield parameter: {field} must be greater than 0 (got {value})")]
    InvalidYieldParameter { field: &'static str, value: Decimal },

    #[error("Negative quantity: {field} cannot be negative (got {value})")]
    NegativeQuantity { field: &'static str, value: Decimal },

    #[error("Arithmetic overflow while computing {field}")]
    Overflow { field: &'static str },
}

/// Result type for yield calculations
pub type YieldResult<T> = Result<T, YieldError>;

/// Opaque reference to an ingredient record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientRef(pub i64);

impl fmt::Display for IngredientRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An ingredient line as entered by the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIngredientEntry {
    pub ingredient_ref: IngredientRef,
    /// Quantity as acquired (with skin, bone, husk...)
    pub gross_quantity: Decimal,
    /// Free-text unit label, never interpreted
    pub unit: String,
    /// Gross to usable ratio; 1 means no trimming loss
    #[serde(default = "default_factor")]
    pub correction_factor: Decimal,
    /// Mass multiplier applied by cooking; < 1 loses, > 1 absorbs
    #[serde(default = "default_factor")]
    pub cooking_index: Decimal,
    #[serde(default)]
    pub supplemental_notes: Option<String>,
}

fn default_factor() -> Decimal {
    Decimal::ONE
}

impl RawIngredientEntry {
    /// Entry with neutral correction factor and cooking index
    pub fn new(ingredient_ref: IngredientRef, gross_quantity: Decimal, unit: impl Into<String>) -> Self {
        Self {
            ingredient_ref,
            gross_quantity,
            unit: unit.into(),
            correction_factor: Decimal::ONE,
            cooking_index: Decimal::ONE,
            supplemental_notes: None,
        }
    }

    pub fn with_correction_factor(mut self, correction_factor: Decimal) -> Self {
        self.correction_factor = correction_factor;
        self
    }

    pub fn with_cooking_index(mut self, cooking_index: Decimal) -> Self {
        self.cooking_index = cooking_index;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.supplemental_notes = Some(notes.into());
        self
    }
}

/// A raw entry plus its derived quantities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedIngredientEntry {
    pub ingredient_ref: IngredientRef,
    pub gross_quantity: Decimal,
    pub unit: String,
    pub correction_factor: Decimal,
    pub cooking_index: Decimal,
    pub supplemental_notes: Option<String>,
    /// Usable quantity after trimming
    pub net_quantity: Decimal,
    /// Quantity after trimming and cooking
    pub yield_quantity: Decimal,
    /// Share of the recipe's gross mass, in percent
    pub participation_percent: Decimal,
}

/// Round to two decimal places, half away from zero, always at scale 2
///
/// Values too large to carry two decimal places are reported as an
/// overflow of `field`.
pub fn round2(value: Decimal, field: &'static str) -> YieldResult<Decimal> {
    let mut rounded =
        value.round_dp_with_strategy(QUANTITY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(QUANTITY_SCALE);
    if rounded.scale() != QUANTITY_SCALE {
        return Err(YieldError::Overflow { field });
    }
    Ok(rounded)
}

fn validate(entry: &RawIngredientEntry, recipe_gross_total: Decimal) -> YieldResult<()> {
    if entry.correction_factor <= Decimal::ZERO {
        return Err(YieldError::InvalidYieldParameter {
            field: "correction_factor",
            value: entry.correction_factor,
        });
    }
    if entry.gross_quantity < Decimal::ZERO {
        return Err(YieldError::NegativeQuantity {
            field: "gross_quantity",
            value: entry.gross_quantity,
        });
    }
    if entry.cooking_index < Decimal::ZERO {
        return Err(YieldError::NegativeQuantity {
            field: "cooking_index",
            value: entry.cooking_index,
        });
    }
    if recipe_gross_total < Decimal::ZERO {
        return Err(YieldError::NegativeQuantity {
            field: "recipe_gross_total",
            value: recipe_gross_total,
        });
    }
    Ok(())
}

/// Compute the derived quantities of one entry
///
/// `recipe_gross_total` must be the sum of `gross_quantity` over every entry
/// of the recipe, computed once before any entry is processed. The yield
/// quantity multiplies the already rounded net quantity, so results match
/// the values stored by earlier versions of the application.
pub fn compute_entry(
    entry: &RawIngredientEntry,
    recipe_gross_total: Decimal,
) -> YieldResult<EnrichedIngredientEntry> {
    validate(entry, recipe_gross_total)?;

    let net_quantity = entry
        .gross_quantity
        .checked_div(entry.correction_factor)
        .ok_or(YieldError::Overflow { field: "net_quantity" })
        .and_then(|net| round2(net, "net_quantity"))?;

    let yield_quantity = net_quantity
        .checked_mul(entry.cooking_index)
        .ok_or(YieldError::Overflow { field: "yield_quantity" })
        .and_then(|cooked| round2(cooked, "yield_quantity"))?;

    let participation_percent = if recipe_gross_total.is_zero() {
        round2(Decimal::ZERO, "participation_percent")?
    } else {
        entry
            .gross_quantity
            .checked_div(recipe_gross_total)
            .and_then(|share| share.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or(YieldError::Overflow { field: "participation_percent" })
            .and_then(|percent| round2(percent, "participation_percent"))?
    };

    Ok(EnrichedIngredientEntry {
        ingredient_ref: entry.ingredient_ref,
        gross_quantity: entry.gross_quantity,
        unit: entry.unit.clone(),
        correction_factor: entry.correction_factor,
        cooking_index: entry.cooking_index,
        supplemental_notes: entry.supplemental_notes.clone(),
        net_quantity,
        yield_quantity,
        participation_percent,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn entry(gross: Decimal, factor: Decimal, index: Decimal) -> RawIngredientEntry {
        RawIngredientEntry::new(IngredientRef(1), gross, "g")
            .with_correction_factor(factor)
            .with_cooking_index(index)
    }

    #[test]
    fn test_trimming_loss_without_cooking_change() {
        let result = compute_entry(&entry(dec!(125), dec!(1.25), dec!(1.0)), dec!(250)).unwrap();
        assert_eq!(result.net_quantity, dec!(100.00));
        assert_eq!(result.yield_quantity, dec!(100.00));
        assert_eq!(result.participation_percent, dec!(50.00));
    }

    #[test]
    fn test_cooking_gain() {
        // rice absorbing water
        let result = compute_entry(&entry(dec!(100), dec!(1.0), dec!(2.5)), dec!(250)).unwrap();
        assert_eq!(result.net_quantity, dec!(100.00));
        assert_eq!(result.yield_quantity, dec!(250.00));
        assert_eq!(result.participation_percent, dec!(40.00));
    }

    #[test]
    fn test_zero_total_gives_zero_participation() {
        let result = compute_entry(&entry(dec!(50), dec!(1.0), dec!(1.0)), Decimal::ZERO).unwrap();
        assert_eq!(result.net_quantity, dec!(50.00));
        assert_eq!(result.yield_quantity, dec!(50.00));
        assert_eq!(result.participation_percent, dec!(0.00));
    }

    #[test]
    fn test_zero_correction_factor_rejected() {
        let err = compute_entry(&entry(dec!(10), Decimal::ZERO, dec!(1.0)), dec!(100)).unwrap_err();
        assert_eq!(
            err,
            YieldError::InvalidYieldParameter { field: "correction_factor", value: Decimal::ZERO }
        );
    }

    #[test]
    fn test_negative_correction_factor_rejected() {
        let err = compute_entry(&entry(dec!(10), dec!(-1.2), dec!(1.0)), dec!(100)).unwrap_err();
        assert!(matches!(
            err,
            YieldError::InvalidYieldParameter { field: "correction_factor", .. }
        ));
    }

    #[test]
    fn test_yield_uses_rounded_net_quantity() {
        // 10 / 3 = 3.333.. -> 3.33; 3.33 * 3 = 9.99 (full precision would give 10.00)
        let result = compute_entry(&entry(dec!(10), dec!(3), dec!(3)), dec!(10)).unwrap();
        assert_eq!(result.net_quantity, dec!(3.33));
        assert_eq!(result.yield_quantity, dec!(9.99));
        assert_eq!(result.participation_percent, dec!(100.00));
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        assert_eq!(round2(dec!(0.125), "value").unwrap(), dec!(0.13));
        assert_eq!(round2(dec!(2.675), "value").unwrap(), dec!(2.68));
        assert_eq!(round2(dec!(2.674), "value").unwrap(), dec!(2.67));
        assert_eq!(round2(dec!(-0.125), "value").unwrap(), dec!(-0.13));
    }

    #[test]
    fn test_derived_values_have_scale_two() {
        let result = compute_entry(&entry(dec!(100), dec!(1), dec!(1)), dec!(100)).unwrap();
        assert_eq!(result.net_quantity.to_string(), "100.00");
        assert_eq!(result.yield_quantity.to_string(), "100.00");
        assert_eq!(result.participation_percent.to_string(), "100.00");

        let zero = compute_entry(&entry(dec!(5), dec!(1), dec!(1)), Decimal::ZERO).unwrap();
        assert_eq!(zero.participation_percent.to_string(), "0.00");
    }

    #[test]
    fn test_participation_rounding() {
        let result = compute_entry(&entry(dec!(1), dec!(1), dec!(1)), dec!(3)).unwrap();
        assert_eq!(result.participation_percent, dec!(33.33));

        let result = compute_entry(&entry(dec!(2), dec!(1), dec!(1)), dec!(3)).unwrap();
        assert_eq!(result.participation_percent, dec!(66.67));
    }

    #[test]
    fn test_zero_cooking_index_is_valid() {
        let result = compute_entry(&entry(dec!(80), dec!(1.6), Decimal::ZERO), dec!(80)).unwrap();
        assert_eq!(result.net_quantity, dec!(50.00));
        assert_eq!(result.yield_quantity, dec!(0.00));
    }

    #[test]
    fn test_zero_gross_quantity_is_valid() {
        let result = compute_entry(&entry(Decimal::ZERO, dec!(1.25), dec!(0.8)), dec!(200)).unwrap();
        assert_eq!(result.net_quantity, dec!(0.00));
        assert_eq!(result.yield_quantity, dec!(0.00));
        assert_eq!(result.participation_percent, dec!(0.00));
    }

    #[test]
    fn test_negative_inputs_rejected() {
        let err = compute_entry(&entry(dec!(-5), dec!(1), dec!(1)), dec!(10)).unwrap_err();
        assert_eq!(err, YieldError::NegativeQuantity { field: "gross_quantity", value: dec!(-5) });

        let err = compute_entry(&entry(dec!(5), dec!(1), dec!(-0.5)), dec!(10)).unwrap_err();
        assert_eq!(err, YieldError::NegativeQuantity { field: "cooking_index", value: dec!(-0.5) });

        let err = compute_entry(&entry(dec!(5), dec!(1), dec!(1)), dec!(-10)).unwrap_err();
        assert!(matches!(err, YieldError::NegativeQuantity { field: "recipe_gross_total", .. }));
    }

    #[test]
    fn test_correction_factor_checked_first() {
        let err = compute_entry(&entry(dec!(-5), Decimal::ZERO, dec!(-1)), dec!(10)).unwrap_err();
        assert!(matches!(err, YieldError::InvalidYieldParameter { .. }));
    }

    #[test]
    fn test_overflow_is_reported() {
        let err = compute_entry(&entry(Decimal::MAX, dec!(0.5), dec!(1)), Decimal::MAX).unwrap_err();
        assert_eq!(err, YieldError::Overflow { field: "net_quantity" });
    }

    #[test]
    fn test_quantity_without_room_for_two_places_is_overflow() {
        // 10^27 fits a Decimal but not with two decimal places
        let huge = Decimal::from_i128_with_scale(10i128.pow(27), 0);
        let err = compute_entry(&entry(huge, dec!(1), dec!(1)), huge).unwrap_err();
        assert_eq!(err, YieldError::Overflow { field: "net_quantity" });

        assert_eq!(round2(huge, "gross_total"), Err(YieldError::Overflow { field: "gross_total" }));
    }

    #[test]
    fn test_passthrough_fields_and_idempotence() {
        let raw = RawIngredientEntry::new(IngredientRef(42), dec!(330), "colheres")
            .with_correction_factor(dec!(1.1))
            .with_cooking_index(dec!(0.8))
            .with_notes("cortado em cubos");

        let first = compute_entry(&raw, dec!(1000)).unwrap();
        let second = compute_entry(&raw, dec!(1000)).unwrap();
        assert_eq!(first, second);

        assert_eq!(first.ingredient_ref, IngredientRef(42));
        assert_eq!(first.unit, "colheres");
        assert_eq!(first.supplemental_notes.as_deref(), Some("cortado em cubos"));
        assert_eq!(first.gross_quantity, dec!(330));
        assert_eq!(first.correction_factor, dec!(1.1));
        assert_eq!(first.cooking_index, dec!(0.8));
        assert_eq!(first.net_quantity, dec!(300.00));
        assert_eq!(first.yield_quantity, dec!(240.00));
        assert_eq!(first.participation_percent, dec!(33.00));
    }

    #[test]
    fn test_raw_entry_defaults_from_json() {
        let raw: RawIngredientEntry = serde_json::from_str(
            r#"{"ingredient_ref": 7, "gross_quantity": 125.5, "unit": "g"}"#,
        )
        .unwrap();
        assert_eq!(raw.ingredient_ref, IngredientRef(7));
        assert_eq!(raw.gross_quantity, dec!(125.5));
        assert_eq!(raw.correction_factor, Decimal::ONE);
        assert_eq!(raw.cooking_index, Decimal::ONE);
        assert!(raw.supplemental_notes.is_none());
    }
}
