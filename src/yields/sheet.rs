//! Recipe-level sheet computation
//!
//! Sums the recipe's gross total once, then computes every entry against that
//! frozen total. A fault in any entry discards the whole sheet.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::calculator::{
    compute_entry, round2, EnrichedIngredientEntry, RawIngredientEntry, YieldError, YieldResult,
};

/// Allowed drift of the participation sum, per entry
const PARTICIPATION_TOLERANCE_PER_ENTRY: Decimal = dec!(0.01);

/// A fully computed technical sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputedSheet {
    pub entries: Vec<EnrichedIngredientEntry>,
    pub gross_total: Decimal,
    pub net_total: Decimal,
    pub yield_total: Decimal,
    pub participation_total: Decimal,
}

/// Sum of gross quantities over every entry of one recipe
pub fn recipe_gross_total(entries: &[RawIngredientEntry]) -> YieldResult<Decimal> {
    entries.iter().try_fold(Decimal::ZERO, |acc, entry| {
        acc.checked_add(entry.gross_quantity)
            .ok_or(YieldError::Overflow { field: "recipe_gross_total" })
    })
}

fn checked_sum<'a>(
    mut values: impl Iterator<Item = &'a Decimal>,
    field: &'static str,
) -> YieldResult<Decimal> {
    values.try_fold(Decimal::ZERO, |acc, value| {
        acc.checked_add(*value).ok_or(YieldError::Overflow { field })
    })
}

/// Compute every entry of a recipe, all or nothing
pub fn compute_sheet(entries: &[RawIngredientEntry]) -> YieldResult<ComputedSheet> {
    let gross_total = recipe_gross_total(entries)?;

    let computed = entries
        .iter()
        .map(|entry| compute_entry(entry, gross_total))
        .collect::<YieldResult<Vec<_>>>()?;

    let net_total = checked_sum(computed.iter().map(|e| &e.net_quantity), "net_total")?;
    let yield_total = checked_sum(computed.iter().map(|e| &e.yield_quantity), "yield_total")?;
    let participation_total = checked_sum(
        computed.iter().map(|e| &e.participation_percent),
        "participation_total",
    )?;

    tracing::debug!(
        entries = computed.len(),
        %gross_total,
        %yield_total,
        "Computed technical sheet"
    );

    Ok(ComputedSheet {
        entries: computed,
        gross_total,
        net_total: round2(net_total, "net_total")?,
        yield_total: round2(yield_total, "yield_total")?,
        participation_total: round2(participation_total, "participation_total")?,
    })
}

/// Whether the participation percentages add up to 100 within rounding drift
///
/// Sheets without entries or with a zero gross total have nothing to share
/// out and always pass.
pub fn within_participation_tolerance(sheet: &ComputedSheet) -> bool {
    if sheet.entries.is_empty() || sheet.gross_total.is_zero() {
        return true;
    }
    let tolerance = PARTICIPATION_TOLERANCE_PER_ENTRY * Decimal::from(sheet.entries.len());
    (Decimal::ONE_HUNDRED - sheet.participation_total).abs() <= tolerance
}
