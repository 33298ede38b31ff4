//! Ficha Tecnica Manager Library
//!
//! Recipes with ingredient yield technical sheets: net quantity, cooked
//! yield and participation of each ingredient in the recipe.

pub mod build_info;
pub mod config;
pub mod db;
pub mod mcp;
pub mod models;
pub mod tools;
pub mod yields;
