//! Ingredient model
//!
//! Catalogue of ingredients referenced by technical-sheet lines.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::DbResult;

/// An ingredient in the catalogue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: i64,
    pub name: String,
    pub default_unit: Option<String>,
    pub category: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a new ingredient
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientCreate {
    pub name: String,
    #[serde(default)]
    pub default_unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl Ingredient {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            default_unit: row.get("default_unit")?,
            category: row.get("category")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert a new ingredient
    pub fn create(conn: &Connection, data: &IngredientCreate) -> DbResult<Self> {
        conn.execute(
            "INSERT INTO ingredients (name, default_unit, category) VALUES (?1, ?2, ?3)",
            params![data.name, data.default_unit, data.category],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            crate::db::DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get an ingredient by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM ingredients WHERE id = ?1")?;

        match stmt.query_row([id], Self::from_row) {
            Ok(ingredient) => Ok(Some(ingredient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive lookup by name
    pub fn get_by_name(conn: &Connection, name: &str) -> DbResult<Option<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM ingredients WHERE name = ?1 COLLATE NOCASE")?;

        match stmt.query_row([name], Self::from_row) {
            Ok(ingredient) => Ok(Some(ingredient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all ingredients, optionally filtered by category
    pub fn list(conn: &Connection, category: Option<&str>) -> DbResult<Vec<Self>> {
        let ingredients = match category {
            Some(category) => {
                let mut stmt = conn.prepare(
                    "SELECT * FROM ingredients WHERE category = ?1 COLLATE NOCASE ORDER BY name",
                )?;
                let rows = stmt.query_map([category], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare("SELECT * FROM ingredients ORDER BY name")?;
                let rows = stmt.query_map([], Self::from_row)?;
                rows.collect::<Result<Vec<_>, _>>()?
            }
        };
        Ok(ingredients)
    }

    /// IDs from `ids` with no matching ingredient row
    pub fn missing_ids(conn: &Connection, ids: &[i64]) -> DbResult<Vec<i64>> {
        let mut stmt = conn.prepare("SELECT 1 FROM ingredients WHERE id = ?1")?;
        let mut missing = Vec::new();
        for &id in ids {
            if !stmt.exists([id])? && !missing.contains(&id) {
                missing.push(id);
            }
        }
        Ok(missing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_database;

    fn tomato() -> IngredientCreate {
        IngredientCreate {
            name: "Tomate".to_string(),
            default_unit: Some("g".to_string()),
            category: Some("Vegetais".to_string()),
        }
    }

    #[test]
    fn test_create_and_lookup() {
        let db = test_database();
        db.with_conn(|conn| {
            let created = Ingredient::create(conn, &tomato())?;
            assert_eq!(created.name, "Tomate");

            let by_id = Ingredient::get_by_id(conn, created.id)?.unwrap();
            assert_eq!(by_id.category.as_deref(), Some("Vegetais"));

            let by_name = Ingredient::get_by_name(conn, "tomate")?.unwrap();
            assert_eq!(by_name.id, created.id);

            assert!(Ingredient::get_by_id(conn, 999)?.is_none());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_duplicate_name_rejected() {
        let db = test_database();
        db.with_conn(|conn| {
            Ingredient::create(conn, &tomato())?;
            assert!(Ingredient::create(conn, &tomato()).is_err());
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_list_and_missing_ids() {
        let db = test_database();
        db.with_conn(|conn| {
            let tomato = Ingredient::create(conn, &tomato())?;
            let flour = Ingredient::create(
                conn,
                &IngredientCreate {
                    name: "Farinha de Trigo".to_string(),
                    default_unit: None,
                    category: Some("Cereais".to_string()),
                },
            )?;

            let all = Ingredient::list(conn, None)?;
            assert_eq!(all.len(), 2);
            assert_eq!(all[0].name, "Farinha de Trigo");
            assert!(all[0].default_unit.is_none());

            let cereals = Ingredient::list(conn, Some("cereais"))?;
            assert_eq!(cereals.len(), 1);

            let missing = Ingredient::missing_ids(conn, &[tomato.id, 77, flour.id, 77])?;
            assert_eq!(missing, vec![77]);
            Ok(())
        })
        .unwrap();
    }
}
