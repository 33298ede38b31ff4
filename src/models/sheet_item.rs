//! Technical sheet item model
//!
//! One ingredient line of a recipe's technical sheet, stored together with
//! the values computed when the recipe was created.

use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::columns::get_decimal;
use crate::db::DbResult;
use crate::yields::{EnrichedIngredientEntry, IngredientRef};

/// A stored sheet line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetItem {
    pub id: i64,
    pub recipe_id: i64,
    pub position: i64,
    #[serde(flatten)]
    pub entry: EnrichedIngredientEntry,
}

/// Sheet line with the ingredient's name, for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetItemDetail {
    pub id: i64,
    pub ingredient_id: i64,
    pub ingredient_name: String,
    pub gross_quantity: Decimal,
    pub unit: String,
    pub correction_factor: Decimal,
    pub cooking_index: Decimal,
    pub net_quantity: Decimal,
    pub yield_quantity: Decimal,
    pub participation_percent: Decimal,
    pub supplemental_notes: Option<String>,
}

fn entry_from_row(row: &Row) -> rusqlite::Result<EnrichedIngredientEntry> {
    Ok(EnrichedIngredientEntry {
        ingredient_ref: IngredientRef(row.get("ingredient_id")?),
        gross_quantity: get_decimal(row, "gross_quantity")?,
        unit: row.get("unit")?,
        correction_factor: get_decimal(row, "correction_factor")?,
        cooking_index: get_decimal(row, "cooking_index")?,
        supplemental_notes: row.get("supplemental_notes")?,
        net_quantity: get_decimal(row, "net_quantity")?,
        yield_quantity: get_decimal(row, "yield_quantity")?,
        participation_percent: get_decimal(row, "participation_percent")?,
    })
}

impl SheetItem {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            recipe_id: row.get("recipe_id")?,
            position: row.get("position")?,
            entry: entry_from_row(row)?,
        })
    }

    /// Store computed entries for a recipe, in order
    ///
    /// Values are written exactly as computed; callers run this inside the
    /// transaction that created the recipe.
    pub fn insert_all(
        conn: &Connection,
        recipe_id: i64,
        entries: &[EnrichedIngredientEntry],
    ) -> DbResult<usize> {
        let mut stmt = conn.prepare(
            r#"
            INSERT INTO sheet_items (
                recipe_id, ingredient_id, position, gross_quantity, unit, supplemental_notes,
                correction_factor, cooking_index, net_quantity, yield_quantity, participation_percent
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )?;

        for (position, entry) in entries.iter().enumerate() {
            stmt.execute(params![
                recipe_id,
                entry.ingredient_ref.0,
                position as i64,
                entry.gross_quantity.to_string(),
                entry.unit,
                entry.supplemental_notes,
                entry.correction_factor.to_string(),
                entry.cooking_index.to_string(),
                entry.net_quantity.to_string(),
                entry.yield_quantity.to_string(),
                entry.participation_percent.to_string(),
            ])?;
        }

        Ok(entries.len())
    }

    /// All sheet lines of a recipe in sheet order
    pub fn get_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM sheet_items WHERE recipe_id = ?1 ORDER BY position")?;

        let items = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(items)
    }

    /// Sheet lines with ingredient names
    pub fn get_details_for_recipe(
        conn: &Connection,
        recipe_id: i64,
    ) -> DbResult<Vec<SheetItemDetail>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT si.*, i.name AS ingredient_name
            FROM sheet_items si
            INNER JOIN ingredients i ON si.ingredient_id = i.id
            WHERE si.recipe_id = ?1
            ORDER BY si.position
            "#,
        )?;

        let details = stmt
            .query_map([recipe_id], |row| {
                let entry = entry_from_row(row)?;
                Ok(SheetItemDetail {
                    id: row.get("id")?,
                    ingredient_id: entry.ingredient_ref.0,
                    ingredient_name: row.get("ingredient_name")?,
                    gross_quantity: entry.gross_quantity,
                    unit: entry.unit,
                    correction_factor: entry.correction_factor,
                    cooking_index: entry.cooking_index,
                    net_quantity: entry.net_quantity,
                    yield_quantity: entry.yield_quantity,
                    participation_percent: entry.participation_percent,
                    supplemental_notes: entry.supplemental_notes,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{Ingredient, IngredientCreate, Recipe, RecipeCreate};
    use crate::yields::{compute_sheet, RawIngredientEntry};
    use rust_decimal_macros::dec;

    #[test]
    fn test_stored_values_read_back_unchanged() {
        let db = test_database();
        db.with_conn(|conn| {
            let onion = Ingredient::create(
                conn,
                &IngredientCreate {
                    name: "Cebola".to_string(),
                    default_unit: Some("g".to_string()),
                    category: Some("Vegetais".to_string()),
                },
            )?;
            let rice = Ingredient::create(
                conn,
                &IngredientCreate {
                    name: "Arroz".to_string(),
                    default_unit: Some("g".to_string()),
                    category: Some("Cereais".to_string()),
                },
            )?;

            let sheet = compute_sheet(&[
                RawIngredientEntry::new(IngredientRef(onion.id), dec!(10), "g")
                    .with_correction_factor(dec!(3))
                    .with_cooking_index(dec!(3))
                    .with_notes("picada"),
                RawIngredientEntry::new(IngredientRef(rice.id), dec!(20), "g")
                    .with_cooking_index(dec!(2.5)),
            ])
            .unwrap();

            let recipe = Recipe::create(
                conn,
                &RecipeCreate {
                    title: "Arroz Refogado".to_string(),
                    photo_url: None,
                    method: "Refogue a cebola e cozinhe o arroz.".to_string(),
                    category: "Acompanhamento".to_string(),
                    tags: Vec::new(),
                    star_rating: 0,
                },
                sheet.gross_total,
            )?;

            assert_eq!(SheetItem::insert_all(conn, recipe.id, &sheet.entries)?, 2);

            let items = SheetItem::get_for_recipe(conn, recipe.id)?;
            let stored: Vec<_> = items.iter().map(|i| i.entry.clone()).collect();
            assert_eq!(stored, sheet.entries);
            assert_eq!(items[0].entry.yield_quantity.to_string(), "9.99");
            assert_eq!(items[1].position, 1);

            let details = SheetItem::get_details_for_recipe(conn, recipe.id)?;
            assert_eq!(details[0].ingredient_name, "Cebola");
            assert_eq!(details[1].participation_percent, dec!(66.67));
            Ok(())
        })
        .unwrap();
    }
}
