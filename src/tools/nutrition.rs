//! Nutrition Table Tools

use super::{ToolError, ToolResult};
use crate::db::Database;
use crate::models::{NutritionTable, NutritionValues, Recipe};

/// Set (insert or replace) the nutrition table of a recipe
pub fn set_nutrition_table(
    db: &Database,
    recipe_id: i64,
    values: NutritionValues,
) -> ToolResult<NutritionTable> {
    if let Some(field) = values.first_negative() {
        return Err(ToolError::Invalid(format!("{} cannot be negative", field)));
    }

    let conn = db.get_conn()?;

    if Recipe::get_by_id(&conn, recipe_id)?.is_none() {
        return Err(ToolError::NotFound(format!("Recipe not found with id: {}", recipe_id)));
    }

    Ok(NutritionTable::upsert(&conn, recipe_id, &values)?)
}

/// Get the nutrition table of a recipe
pub fn get_nutrition_table(db: &Database, recipe_id: i64) -> ToolResult<NutritionTable> {
    let conn = db.get_conn()?;
    NutritionTable::get_for_recipe(&conn, recipe_id)?.ok_or_else(|| {
        ToolError::NotFound(format!("No nutrition table for recipe id: {}", recipe_id))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use crate::models::RecipeCreate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    #[test]
    fn test_set_and_get() {
        let db = test_database();
        let recipe = db
            .with_conn(|conn| {
                Recipe::create(
                    conn,
                    &RecipeCreate {
                        title: "Salada".to_string(),
                        photo_url: None,
                        method: "Misture.".to_string(),
                        category: "Entrada".to_string(),
                        tags: Vec::new(),
                        star_rating: 0,
                    },
                    Decimal::ZERO,
                )
            })
            .unwrap();

        assert!(matches!(get_nutrition_table(&db, recipe.id), Err(ToolError::NotFound(_))));

        let values = NutritionValues { calories: dec!(45), protein: dec!(2.1), ..Default::default() };
        set_nutrition_table(&db, recipe.id, values.clone()).unwrap();
        assert_eq!(get_nutrition_table(&db, recipe.id).unwrap().values, values);

        let negative = NutritionValues { sodium: dec!(-3), ..Default::default() };
        let err = set_nutrition_table(&db, recipe.id, negative).unwrap_err();
        assert_eq!(err.to_string(), "sodium cannot be negative");

        assert!(matches!(
            set_nutrition_table(&db, 999, NutritionValues::default()),
            Err(ToolError::NotFound(_))
        ));
    }
}
