//! Yield calculation module
//!
//! Derives net quantity, yield quantity and participation percentage for the
//! ingredients of a recipe's technical sheet.

pub mod calculator;
pub mod sheet;

pub use calculator::{
    compute_entry, round2, EnrichedIngredientEntry, IngredientRef, RawIngredientEntry,
    YieldError, YieldResult, QUANTITY_SCALE,
};
pub use sheet::{
    compute_sheet, recipe_gross_total, within_participation_tolerance, ComputedSheet,
};
