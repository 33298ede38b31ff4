//! Ficha MCP Server Implementation
//!
//! Implements the MCP server with all ficha tools.

use std::path::PathBuf;
use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
};
use rmcp::{schemars, tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::db::Database;
use crate::models::{CommentCreate, IngredientCreate, NutritionValues, RecipeCreate};
use crate::tools::comments;
use crate::tools::ingredients;
use crate::tools::nutrition;
use crate::tools::recipes;
use crate::tools::status::StatusTracker;
use crate::tools::ToolError;
use crate::yields::{IngredientRef, RawIngredientEntry};

/// Ficha MCP Service
#[derive(Clone)]
pub struct FichaService {
    status_tracker: Arc<Mutex<StatusTracker>>,
    database: Database,
    tool_router: ToolRouter<FichaService>,
}

impl FichaService {
    pub fn new(database_path: PathBuf, database: Database) -> Self {
        Self {
            status_tracker: Arc::new(Mutex::new(StatusTracker::new(database_path))),
            database,
            tool_router: Self::tool_router(),
        }
    }
}

/// Map a tool failure to the MCP error the client sees
fn tool_error(e: ToolError) -> McpError {
    if e.is_client_error() {
        McpError::invalid_params(e.to_string(), None)
    } else {
        tracing::error!(error = %e, "Tool failed");
        McpError::internal_error(e.to_string(), None)
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| McpError::internal_error(format!("Serialization error: {}", e), None))?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Ingredient Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateIngredientParams {
    pub name: String,
    pub default_unit: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetIngredientParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListIngredientsParams {
    pub category: Option<String>,
}

// ============================================================================
// Recipe Parameter Structs
// ============================================================================

fn default_factor() -> Decimal {
    Decimal::ONE
}

/// One technical sheet line as sent by the client
#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SheetItemParams {
    pub ingredient_id: i64,
    #[schemars(with = "f64")]
    pub gross_quantity: Decimal,
    pub unit: String,
    #[serde(default = "default_factor")]
    #[schemars(with = "f64")]
    pub correction_factor: Decimal,
    #[serde(default = "default_factor")]
    #[schemars(with = "f64")]
    pub cooking_index: Decimal,
    pub notes: Option<String>,
}

impl From<SheetItemParams> for RawIngredientEntry {
    fn from(p: SheetItemParams) -> Self {
        RawIngredientEntry {
            ingredient_ref: IngredientRef(p.ingredient_id),
            gross_quantity: p.gross_quantity,
            unit: p.unit,
            correction_factor: p.correction_factor,
            cooking_index: p.cooking_index,
            supplemental_notes: p.notes,
        }
    }
}

fn raw_entries(items: Vec<SheetItemParams>) -> Vec<RawIngredientEntry> {
    items.into_iter().map(RawIngredientEntry::from).collect()
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct CreateRecipeParams {
    pub title: String,
    pub photo_url: Option<String>,
    pub method: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub star_rating: u8,
    pub items: Vec<SheetItemParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct PreviewSheetParams {
    pub items: Vec<SheetItemParams>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetRecipeParams {
    pub id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListRecipesCompleteParams {
    pub category: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct RateRecipeParams {
    pub id: i64,
    pub star_rating: u8,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct DeleteRecipeParams {
    pub id: i64,
}

// ============================================================================
// Comment and Nutrition Parameter Structs
// ============================================================================

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AddCommentParams {
    pub recipe_id: i64,
    pub body: String,
    pub author: Option<String>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct ListCommentsParams {
    pub recipe_id: i64,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct SetNutritionTableParams {
    pub recipe_id: i64,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub calories: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub carbohydrates: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub protein: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub total_fat: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub sodium: Decimal,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct GetNutritionTableParams {
    pub recipe_id: i64,
}

// ============================================================================
// Tool Router
// ============================================================================

#[tool_router]
impl FichaService {
    // --- Status ---

    #[tool(description = "Get the current status of the ficha service including build info, database status, and process information")]
    async fn ficha_status(&self) -> Result<CallToolResult, McpError> {
        let tracker = self.status_tracker.lock().await;
        let status = tracker.get_status(&self.database);
        json_result(&status)
    }

    #[tool(description = "Get instructions for building technical sheets: field meanings, formulas, rounding and validation. Call this before creating recipes.")]
    fn sheet_instructions(&self) -> Result<CallToolResult, McpError> {
        use crate::tools::status::SHEET_INSTRUCTIONS;
        Ok(CallToolResult::success(vec![Content::text(SHEET_INSTRUCTIONS)]))
    }

    // --- Ingredients ---

    #[tool(description = "Register a new ingredient in the catalogue")]
    fn create_ingredient(&self, Parameters(p): Parameters<CreateIngredientParams>) -> Result<CallToolResult, McpError> {
        let data = IngredientCreate { name: p.name, default_unit: p.default_unit, category: p.category };
        let result = ingredients::create_ingredient(&self.database, data).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get an ingredient by ID")]
    fn get_ingredient(&self, Parameters(p): Parameters<GetIngredientParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::get_ingredient(&self.database, p.id).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "List catalogue ingredients, optionally filtered by category")]
    fn list_ingredients(&self, Parameters(p): Parameters<ListIngredientsParams>) -> Result<CallToolResult, McpError> {
        let result = ingredients::list_ingredients(&self.database, p.category.as_deref()).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Recipes ---

    #[tool(description = "Create a recipe together with its technical sheet. Net quantity, yield and participation are computed for every item. Nothing is saved if any item is invalid.")]
    fn create_recipe(&self, Parameters(p): Parameters<CreateRecipeParams>) -> Result<CallToolResult, McpError> {
        let data = RecipeCreate {
            title: p.title, photo_url: p.photo_url, method: p.method,
            category: p.category, tags: p.tags, star_rating: p.star_rating,
        };
        let result = recipes::create_recipe(&self.database, data, raw_entries(p.items)).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Compute a technical sheet without saving it. Returns every enriched item, the totals, and whether participation adds up to 100 within rounding tolerance.")]
    fn preview_sheet(&self, Parameters(p): Parameters<PreviewSheetParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::preview_sheet(raw_entries(p.items)).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get a recipe with its technical sheet, totals, comments and nutrition table")]
    fn get_recipe(&self, Parameters(p): Parameters<GetRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::get_recipe(&self.database, p.id).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "List complete recipes (recipe book), optionally filtered by category")]
    fn list_recipes_complete(&self, Parameters(p): Parameters<ListRecipesCompleteParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::list_recipes_complete(&self.database, p.category.as_deref()).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Set the star rating of a recipe (0 to 5)")]
    fn rate_recipe(&self, Parameters(p): Parameters<RateRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::rate_recipe(&self.database, p.id, p.star_rating).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Delete a recipe with its technical sheet, comments and nutrition table")]
    fn delete_recipe(&self, Parameters(p): Parameters<DeleteRecipeParams>) -> Result<CallToolResult, McpError> {
        let result = recipes::delete_recipe(&self.database, p.id).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Comments ---

    #[tool(description = "Add a comment to a recipe")]
    fn add_comment(&self, Parameters(p): Parameters<AddCommentParams>) -> Result<CallToolResult, McpError> {
        let data = CommentCreate { recipe_id: p.recipe_id, body: p.body, author: p.author };
        let result = comments::add_comment(&self.database, data).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "List the comments of a recipe, oldest first")]
    fn list_comments(&self, Parameters(p): Parameters<ListCommentsParams>) -> Result<CallToolResult, McpError> {
        let result = comments::list_comments(&self.database, p.recipe_id).map_err(tool_error)?;
        json_result(&result)
    }

    // --- Nutrition Table ---

    #[tool(description = "Set the nutrition table of a recipe (calories in kcal, sodium in mg, the rest in grams). Replaces any existing table.")]
    fn set_nutrition_table(&self, Parameters(p): Parameters<SetNutritionTableParams>) -> Result<CallToolResult, McpError> {
        let values = NutritionValues {
            calories: p.calories, carbohydrates: p.carbohydrates, protein: p.protein,
            total_fat: p.total_fat, sodium: p.sodium,
        };
        let result = nutrition::set_nutrition_table(&self.database, p.recipe_id, values).map_err(tool_error)?;
        json_result(&result)
    }

    #[tool(description = "Get the nutrition table of a recipe")]
    fn get_nutrition_table(&self, Parameters(p): Parameters<GetNutritionTableParams>) -> Result<CallToolResult, McpError> {
        let result = nutrition::get_nutrition_table(&self.database, p.recipe_id).map_err(tool_error)?;
        json_result(&result)
    }
}

// ============================================================================
// Server Handler
// ============================================================================

#[tool_handler]
impl ServerHandler for FichaService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "ficha".into(),
                version: crate::build_info::VERSION.into(),
                title: Some("Ficha Tecnica Manager".into()),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Ficha Tecnica Manager - recipes with ingredient yield technical sheets. \
                 IMPORTANT: Call sheet_instructions before creating recipes. \
                 Ingredients: create/get/list_ingredient(s). \
                 Recipes: create_recipe (with items), preview_sheet, get_recipe, list_recipes_complete, \
                 rate_recipe, delete_recipe. \
                 Comments: add_comment, list_comments. \
                 Nutrition: set/get_nutrition_table. \
                 Quantities are decimals; results carry two decimal places."
                    .into(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    #[test]
    fn test_sheet_item_params_defaults() {
        let p: SheetItemParams = serde_json::from_str(
            r#"{"ingredient_id": 3, "gross_quantity": 250, "unit": "g"}"#,
        )
        .unwrap();
        let raw = RawIngredientEntry::from(p);
        assert_eq!(raw.ingredient_ref, IngredientRef(3));
        assert_eq!(raw.correction_factor, Decimal::ONE);
        assert_eq!(raw.cooking_index, Decimal::ONE);
        assert_eq!(raw.gross_quantity, Decimal::from(250));
    }

    #[test]
    fn test_tool_error_mapping() {
        let client = tool_error(ToolError::Invalid("title cannot be empty".to_string()));
        assert_eq!(client.code, rmcp::model::ErrorCode::INVALID_PARAMS);

        let server = tool_error(ToolError::from(rusqlite::Error::QueryReturnedNoRows));
        assert_eq!(server.code, rmcp::model::ErrorCode::INTERNAL_ERROR);
    }

    #[test]
    fn test_service_lists_tools() {
        let service = FichaService::new(PathBuf::from(":memory:"), test_database());
        let names: Vec<String> = service
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert!(names.contains(&"create_recipe".to_string()));
        assert!(names.contains(&"preview_sheet".to_string()));
        assert!(names.contains(&"ficha_status".to_string()));
    }
}
