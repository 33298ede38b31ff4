//! Recipe model
//!
//! A recipe with its preparation text and the gross total of its technical
//! sheet, fixed when the sheet was computed.

use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::db::columns::{get_decimal, get_string_list};
use crate::db::DbResult;

/// Highest star rating a recipe can carry
pub const MAX_STAR_RATING: u8 = 5;

/// A stored recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub title: String,
    pub photo_url: Option<String>,
    pub method: String,
    pub star_rating: u8,
    pub category: String,
    pub tags: Vec<String>,
    pub gross_total: Decimal,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeCreate {
    pub title: String,
    pub photo_url: Option<String>,
    pub method: String,
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub star_rating: u8,
}

impl Recipe {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            photo_url: row.get("photo_url")?,
            method: row.get("method")?,
            star_rating: row.get("star_rating")?,
            category: row.get("category")?,
            tags: get_string_list(row, "tags")?,
            gross_total: get_decimal(row, "gross_total")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new recipe with the gross total of its sheet
    pub fn create(conn: &Connection, data: &RecipeCreate, gross_total: Decimal) -> DbResult<Self> {
        let tags = if data.tags.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&data.tags)?)
        };

        conn.execute(
            r#"
            INSERT INTO recipes (title, photo_url, method, star_rating, category, tags, gross_total)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                data.title,
                data.photo_url,
                data.method,
                data.star_rating,
                data.category,
                tags,
                gross_total.to_string(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a recipe by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM recipes WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(recipe) => Ok(Some(recipe)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Whether a recipe with this title exists (case-insensitive)
    pub fn title_exists(conn: &Connection, title: &str) -> DbResult<bool> {
        let mut stmt = conn.prepare("SELECT 1 FROM recipes WHERE title = ?1 COLLATE NOCASE")?;
        Ok(stmt.exists([title])?)
    }

    /// List recipes, optionally filtered by category, ordered by title
    pub fn list(conn: &Connection, category: Option<&str>) -> DbResult<Vec<Self>> {
        let recipes = match category {
            Some(category) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM recipes WHERE category = ?1 COLLATE NOCASE ORDER BY title",
                )?;
                let rows = stmt.query_map([category], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare("SELECT * FROM recipes ORDER BY title")?;
                let rows = stmt.query_map([], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(recipes)
    }

    /// Set the star rating; returns the updated recipe or None if missing
    pub fn set_star_rating(conn: &Connection, id: i64, stars: u8) -> DbResult<Option<Self>> {
        let rows = conn.execute(
            "UPDATE recipes SET star_rating = ?1, updated_at = datetime('now') WHERE id = ?2",
            params![stars, id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, id)
    }

    /// Delete a recipe; cascades to sheet items, comments and nutrition table
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM recipes WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Count recipes
    pub fn count(conn: &Connection) -> DbResult<i64> {
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;
    use rust_decimal_macros::dec;

    fn pudding() -> RecipeCreate {
        RecipeCreate {
            title: "Pudim de Leite".to_string(),
            photo_url: Some("https://example.com/pudim.jpg".to_string()),
            method: "Bata tudo e asse em banho-maria.".to_string(),
            category: "Sobremesa".to_string(),
            tags: vec!["Sem Glúten".to_string()],
            star_rating: 4,
        }
    }

    #[test]
    fn test_create_and_get() {
        let db = test_database();
        db.with_conn(|conn| {
            let recipe = Recipe::create(conn, &pudding(), dec!(250.5))?;
            assert_eq!(recipe.title, "Pudim de Leite");
            assert_eq!(recipe.star_rating, 4);
            assert_eq!(recipe.tags, vec!["Sem Glúten".to_string()]);
            assert_eq!(recipe.gross_total, dec!(250.5));

            assert!(Recipe::title_exists(conn, "pudim de leite")?);
            assert!(!Recipe::title_exists(conn, "Brigadeiro")?);
            assert_eq!(Recipe::count(conn)?, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_untagged_recipe_reads_empty_tags() {
        let db = test_database();
        db.with_conn(|conn| {
            let mut data = pudding();
            data.tags.clear();
            let recipe = Recipe::create(conn, &data, Decimal::ZERO)?;
            assert!(recipe.tags.is_empty());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_rating_and_delete() {
        let db = test_database();
        db.with_conn(|conn| {
            let recipe = Recipe::create(conn, &pudding(), Decimal::ZERO)?;
            let rated = Recipe::set_star_rating(conn, recipe.id, 5)?.unwrap();
            assert_eq!(rated.star_rating, 5);
            assert!(Recipe::set_star_rating(conn, 999, 5)?.is_none());

            assert!(Recipe::delete(conn, recipe.id)?);
            assert!(!Recipe::delete(conn, recipe.id)?);
            assert!(Recipe::get_by_id(conn, recipe.id)?.is_none());
            Ok(())
        })
        .unwrap();
    }
}
