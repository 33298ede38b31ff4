//! Nutrition table model
//!
//! Per-recipe nutrition facts, entered by hand.

use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::columns::get_decimal;
use crate::db::DbResult;

/// Nutrition values (per 100g or per serving, as the author chose)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionValues {
    #[serde(default)]
    pub calories: Decimal, // kcal
    #[serde(default)]
    pub carbohydrates: Decimal, // g
    #[serde(default)]
    pub protein: Decimal, // g
    #[serde(default)]
    pub total_fat: Decimal, // g
    #[serde(default)]
    pub sodium: Decimal, // mg
}

impl NutritionValues {
    /// Name of the first negative field, if any
    pub fn first_negative(&self) -> Option<&'static str> {
        [
            ("calories", self.calories),
            ("carbohydrates", self.carbohydrates),
            ("protein", self.protein),
            ("total_fat", self.total_fat),
            ("sodium", self.sodium),
        ]
        .into_iter()
        .find(|(_, value)| *value < Decimal::ZERO)
        .map(|(name, _)| name)
    }
}

/// Stored nutrition table of a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NutritionTable {
    pub id: i64,
    pub recipe_id: i64,
    #[serde(flatten)]
    pub values: NutritionValues,
    pub updated_at: String,
}

impl NutritionTable {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            recipe_id: row.get("recipe_id")?,
            values: NutritionValues {
                calories: get_decimal(row, "calories")?,
                carbohydrates: get_decimal(row, "carbohydrates")?,
                protein: get_decimal(row, "protein")?,
                total_fat: get_decimal(row, "total_fat")?,
                sodium: get_decimal(row, "sodium")?,
            },
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert or replace the nutrition table of a recipe
    pub fn upsert(conn: &Connection, recipe_id: i64, values: &NutritionValues) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO nutrition_tables (recipe_id, calories, carbohydrates, protein, total_fat, sodium)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(recipe_id) DO UPDATE SET
                calories = excluded.calories,
                carbohydrates = excluded.carbohydrates,
                protein = excluded.protein,
                total_fat = excluded.total_fat,
                sodium = excluded.sodium,
                updated_at = datetime('now')
            "#,
            params![
                recipe_id,
                values.calories.to_string(),
                values.carbohydrates.to_string(),
                values.protein.to_string(),
                values.total_fat.to_string(),
                values.sodium.to_string(),
            ],
        )?;

        Self::get_for_recipe(conn, recipe_id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    pub fn get_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM nutrition_tables WHERE recipe_id = ?1")?;

        match stmt.query_row([recipe_id], Self::from_row) {
            Ok(table) => Ok(Some(table)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::{Recipe, RecipeCreate};
    use rust_decimal_macros::dec;

    #[test]
    fn test_upsert_replaces_values() {
        let db = test_database();
        db.with_conn(|conn| {
            let recipe = Recipe::create(
                conn,
                &RecipeCreate {
                    title: "Sopa de Legumes".to_string(),
                    photo_url: None,
                    method: "Cozinhe os legumes.".to_string(),
                    category: "Jantar".to_string(),
                    tags: Vec::new(),
                    star_rating: 0,
                },
                Decimal::ZERO,
            )?;

            assert!(NutritionTable::get_for_recipe(conn, recipe.id)?.is_none());

            let first = NutritionTable::upsert(
                conn,
                recipe.id,
                &NutritionValues { calories: dec!(120.5), ..Default::default() },
            )?;
            let second = NutritionTable::upsert(
                conn,
                recipe.id,
                &NutritionValues { calories: dec!(98), sodium: dec!(410), ..Default::default() },
            )?;

            assert_eq!(first.id, second.id);
            assert_eq!(second.values.calories, dec!(98));
            assert_eq!(second.values.sodium, dec!(410));
            assert_eq!(second.values.protein, Decimal::ZERO);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_first_negative() {
        let values = NutritionValues { protein: dec!(-1), ..Default::default() };
        assert_eq!(values.first_negative(), Some("protein"));
        assert_eq!(NutritionValues::default().first_negative(), None);
    }
}
