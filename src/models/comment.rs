//! Comment model

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// A comment left on a recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub recipe_id: i64,
    pub body: String,
    pub author: Option<String>,
    pub created_at: String,
}

/// Data for adding a comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentCreate {
    pub recipe_id: i64,
    pub body: String,
    pub author: Option<String>,
}

impl Comment {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            recipe_id: row.get("recipe_id")?,
            body: row.get("body")?,
            author: row.get("author")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &CommentCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO comments (recipe_id, body, author) VALUES (?1, ?2, ?3)",
            params![data.recipe_id, data.body, data.author],
        )?;

        let id = conn.last_insert_rowid();
        let mut stmt = conn.prepare("SELECT * FROM comments WHERE id = ?1")?;
        Ok(stmt.query_row([id], Self::from_row)?)
    }

    /// Comments of a recipe, oldest first
    pub fn list_for_recipe(conn: &Connection, recipe_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM comments WHERE recipe_id = ?1 ORDER BY created_at, id",
        )?;

        let comments = stmt
            .query_map([recipe_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(comments)
    }
}
