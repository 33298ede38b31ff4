//! Recipe Tools
//!
//! Recipe creation with its technical sheet, the complete recipe book view,
//! rating and deletion.

use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;
use serde::Serialize;

use super::{optional_text, required_text, ToolError, ToolResult};
use crate::db::Database;
use crate::models::{
    Comment, Ingredient, NutritionTable, Recipe, RecipeCreate, SheetItem, SheetItemDetail,
    MAX_STAR_RATING,
};
use crate::yields::{
    compute_sheet, round2, within_participation_tolerance, ComputedSheet, RawIngredientEntry,
};

/// Totals of a stored technical sheet
#[derive(Debug, Serialize)]
pub struct SheetTotals {
    pub gross_total: Decimal,
    pub net_total: Decimal,
    pub yield_total: Decimal,
    pub participation_total: Decimal,
}

/// Full recipe with technical sheet, comments and nutrition table
#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    pub id: i64,
    pub title: String,
    pub photo_url: Option<String>,
    pub method: String,
    pub star_rating: u8,
    pub category: String,
    pub tags: Vec<String>,
    pub technical_sheet: Vec<SheetItemDetail>,
    pub totals: SheetTotals,
    pub comments: Vec<Comment>,
    pub nutrition_table: Option<NutritionTable>,
    pub created_at: String,
    pub updated_at: String,
}

/// Response for list_recipes_complete
#[derive(Debug, Serialize)]
pub struct RecipeBookResponse {
    pub recipes: Vec<RecipeDetail>,
    pub count: usize,
}

/// Response for preview_sheet
#[derive(Debug, Serialize)]
pub struct SheetPreviewResponse {
    #[serde(flatten)]
    pub sheet: ComputedSheet,
    /// Participation percentages add up to 100 within rounding drift
    pub participation_consistent: bool,
}

/// Response for rate_recipe
#[derive(Debug, Serialize)]
pub struct RateRecipeResponse {
    pub id: i64,
    pub star_rating: u8,
    pub updated_at: String,
}

/// Response for successful delete
#[derive(Debug, Serialize)]
pub struct RecipeDeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

fn validate_star_rating(stars: u8) -> ToolResult<u8> {
    if stars > MAX_STAR_RATING {
        return Err(ToolError::Invalid(format!(
            "star_rating must be between 0 and {} (got {})",
            MAX_STAR_RATING, stars
        )));
    }
    Ok(stars)
}

fn validate_recipe(data: RecipeCreate) -> ToolResult<RecipeCreate> {
    Ok(RecipeCreate {
        title: required_text("title", &data.title)?,
        photo_url: optional_text(data.photo_url),
        method: required_text("method", &data.method)?,
        category: required_text("category", &data.category)?,
        tags: data
            .tags
            .into_iter()
            .filter_map(|t| optional_text(Some(t)))
            .collect(),
        star_rating: validate_star_rating(data.star_rating)?,
    })
}

fn validate_items(items: Vec<RawIngredientEntry>) -> ToolResult<Vec<RawIngredientEntry>> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| -> ToolResult<RawIngredientEntry> {
            let unit = required_text(&format!("items[{}].unit", i), &item.unit)?;
            Ok(RawIngredientEntry {
                unit,
                supplemental_notes: optional_text(item.supplemental_notes),
                ..item
            })
        })
        .collect()
}

/// Compute a sheet, logging rejected input
fn compute_checked_sheet(items: &[RawIngredientEntry]) -> ToolResult<ComputedSheet> {
    let sheet = compute_sheet(items).map_err(|e| {
        tracing::warn!(error = %e, "Technical sheet rejected");
        e
    })?;

    if !within_participation_tolerance(&sheet) {
        tracing::warn!(
            participation_total = %sheet.participation_total,
            entries = sheet.entries.len(),
            "Participation percentages drift beyond rounding tolerance"
        );
    }

    Ok(sheet)
}

fn load_detail(conn: &Connection, recipe: Recipe) -> ToolResult<RecipeDetail> {
    let technical_sheet = SheetItem::get_details_for_recipe(conn, recipe.id)?;
    let comments = Comment::list_for_recipe(conn, recipe.id)?;
    let nutrition_table = NutritionTable::get_for_recipe(conn, recipe.id)?;

    // Sums of the stored, already rounded values
    let net_total: Decimal = technical_sheet.iter().map(|i| i.net_quantity).sum();
    let yield_total: Decimal = technical_sheet.iter().map(|i| i.yield_quantity).sum();
    let participation_total: Decimal =
        technical_sheet.iter().map(|i| i.participation_percent).sum();

    Ok(RecipeDetail {
        id: recipe.id,
        title: recipe.title,
        photo_url: recipe.photo_url,
        method: recipe.method,
        star_rating: recipe.star_rating,
        category: recipe.category,
        tags: recipe.tags,
        technical_sheet,
        totals: SheetTotals {
            gross_total: recipe.gross_total,
            net_total: round2(net_total, "net_total")?,
            yield_total: round2(yield_total, "yield_total")?,
            participation_total: round2(participation_total, "participation_total")?,
        },
        comments,
        nutrition_table,
        created_at: recipe.created_at,
        updated_at: recipe.updated_at,
    })
}

// ============================================================================
// Recipe Tools
// ============================================================================

/// Create a recipe together with its technical sheet
///
/// The sheet is computed in full before anything is written; the recipe and
/// all its lines are then stored in one transaction.
pub fn create_recipe(
    db: &Database,
    data: RecipeCreate,
    items: Vec<RawIngredientEntry>,
) -> ToolResult<RecipeDetail> {
    let data = validate_recipe(data)?;
    let items = validate_items(items)?;
    let sheet = compute_checked_sheet(&items)?;

    db.with_conn_mut(|conn| {
        // Immediate: hold the write lock from the title check to the commit
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        if Recipe::title_exists(&tx, &data.title)? {
            return Err(ToolError::Invalid(format!(
                "A recipe titled '{}' already exists",
                data.title
            )));
        }

        let ingredient_ids: Vec<i64> = items.iter().map(|i| i.ingredient_ref.0).collect();
        let missing = Ingredient::missing_ids(&tx, &ingredient_ids)?;
        if !missing.is_empty() {
            let ids = missing
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ToolError::NotFound(format!("Ingredient not found with id: {}", ids)));
        }

        let recipe = Recipe::create(&tx, &data, sheet.gross_total)?;
        SheetItem::insert_all(&tx, recipe.id, &sheet.entries)?;
        tx.commit()?;

        tracing::info!(
            recipe_id = recipe.id,
            title = %recipe.title,
            items = sheet.entries.len(),
            gross_total = %sheet.gross_total,
            "Recipe created"
        );

        load_detail(conn, recipe)
    })
}

/// Compute a technical sheet without storing anything
pub fn preview_sheet(items: Vec<RawIngredientEntry>) -> ToolResult<SheetPreviewResponse> {
    let items = validate_items(items)?;
    let sheet = compute_checked_sheet(&items)?;
    let participation_consistent = within_participation_tolerance(&sheet);
    Ok(SheetPreviewResponse {
        sheet,
        participation_consistent,
    })
}

/// Get a recipe with full details
pub fn get_recipe(db: &Database, id: i64) -> ToolResult<RecipeDetail> {
    let conn = db.get_conn()?;
    let recipe = Recipe::get_by_id(&conn, id)?
        .ok_or_else(|| ToolError::NotFound(format!("Recipe not found with id: {}", id)))?;
    load_detail(&conn, recipe)
}

/// Every recipe with its technical sheet (the complete recipe book)
pub fn list_recipes_complete(db: &Database, category: Option<&str>) -> ToolResult<RecipeBookResponse> {
    let conn = db.get_conn()?;
    let category = category.map(str::trim).filter(|c| !c.is_empty());

    let recipes = Recipe::list(&conn, category)?
        .into_iter()
        .map(|recipe| load_detail(&conn, recipe))
        .collect::<ToolResult<Vec<_>>>()?;

    let count = recipes.len();
    Ok(RecipeBookResponse { recipes, count })
}

/// Set a recipe's star rating
pub fn rate_recipe(db: &Database, id: i64, stars: u8) -> ToolResult<RateRecipeResponse> {
    let stars = validate_star_rating(stars)?;
    let conn = db.get_conn()?;
    let recipe = Recipe::set_star_rating(&conn, id, stars)?
        .ok_or_else(|| ToolError::NotFound(format!("Recipe not found with id: {}", id)))?;

    Ok(RateRecipeResponse {
        id: recipe.id,
        star_rating: recipe.star_rating,
        updated_at: recipe.updated_at,
    })
}

/// Delete a recipe with its sheet, comments and nutrition table
pub fn delete_recipe(db: &Database, id: i64) -> ToolResult<RecipeDeleteResponse> {
    let conn = db.get_conn()?;

    if !Recipe::delete(&conn, id)? {
        return Err(ToolError::NotFound(format!("Recipe not found with id: {}", id)));
    }

    tracing::info!(recipe_id = id, "Recipe deleted");
    Ok(RecipeDeleteResponse {
        success: true,
        deleted_id: id,
    })
}
