//! Ingredient Tools
//!
//! Catalogue management for ingredients used in technical sheets.

use serde::Serialize;

use super::{optional_text, required_text, ToolError, ToolResult};
use crate::db::Database;
use crate::models::{Ingredient, IngredientCreate};

/// Response for list_ingredients
#[derive(Debug, Serialize)]
pub struct ListIngredientsResponse {
    pub ingredients: Vec<Ingredient>,
    pub count: usize,
}

/// Create a new ingredient
pub fn create_ingredient(db: &Database, data: IngredientCreate) -> ToolResult<Ingredient> {
    let data = IngredientCreate {
        name: required_text("name", &data.name)?,
        default_unit: optional_text(data.default_unit),
        category: optional_text(data.category),
    };

    let conn = db.get_conn()?;

    if Ingredient::get_by_name(&conn, &data.name)?.is_some() {
        return Err(ToolError::Invalid(format!(
            "Ingredient '{}' already exists",
            data.name
        )));
    }

    let ingredient = Ingredient::create(&conn, &data)?;
    tracing::info!(ingredient_id = ingredient.id, name = %ingredient.name, "Ingredient created");
    Ok(ingredient)
}

/// Get an ingredient by ID
pub fn get_ingredient(db: &Database, id: i64) -> ToolResult<Ingredient> {
    let conn = db.get_conn()?;
    Ingredient::get_by_id(&conn, id)?
        .ok_or_else(|| ToolError::NotFound(format!("Ingredient not found with id: {}", id)))
}

/// List ingredients, optionally by category
pub fn list_ingredients(db: &Database, category: Option<&str>) -> ToolResult<ListIngredientsResponse> {
    let conn = db.get_conn()?;
    let category = category.map(str::trim).filter(|c| !c.is_empty());
    let ingredients = Ingredient::list(&conn, category)?;
    let count = ingredients.len();
    Ok(ListIngredientsResponse { ingredients, count })
}
