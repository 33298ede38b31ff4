//! Data models
//!
//! Rust structs representing database entities.

mod comment;
mod ingredient;
mod nutrition_table;
mod recipe;
mod sheet_item;

pub use comment::{Comment, CommentCreate};
pub use ingredient::{Ingredient, IngredientCreate};
pub use nutrition_table::{NutritionTable, NutritionValues};
pub use recipe::{Recipe, RecipeCreate, MAX_STAR_RATING};
pub use sheet_item::{SheetItem, SheetItemDetail};
