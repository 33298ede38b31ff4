//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!("Applied schema migration v1");
    }

    Ok(())
}

/// Migration v1: Initial schema
///
/// Decimal quantities are stored as TEXT so the two-decimal values written
/// at creation time read back unchanged.
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- INGREDIENTS
        -- ============================================
        CREATE TABLE ingredients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,           -- e.g., "Tomate", "Farinha de Trigo"
            default_unit TEXT,                   -- e.g., "g", "ml", "unid"
            category TEXT,                       -- e.g., "Laticínios", "Vegetais"
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_ingredients_category ON ingredients(category);

        -- ============================================
        -- RECIPES
        -- ============================================
        CREATE TABLE recipes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL UNIQUE COLLATE NOCASE,
            photo_url TEXT,
            method TEXT NOT NULL,                -- preparation steps
            star_rating INTEGER NOT NULL DEFAULT 0 CHECK(star_rating BETWEEN 0 AND 5),
            category TEXT NOT NULL,              -- e.g., "Sobremesa", "Jantar"
            tags TEXT,                           -- JSON array, e.g., ["Vegano"]
            gross_total TEXT NOT NULL DEFAULT '0', -- sum of sheet gross quantities
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_recipes_category ON recipes(category);

        -- ============================================
        -- SHEET ITEMS
        -- Technical sheet lines, stored with their computed values
        -- ============================================
        CREATE TABLE sheet_items (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            ingredient_id INTEGER NOT NULL REFERENCES ingredients(id) ON DELETE RESTRICT,
            position INTEGER NOT NULL,           -- order within the sheet

            gross_quantity TEXT NOT NULL,
            unit TEXT NOT NULL,
            supplemental_notes TEXT,             -- e.g., "cortado em cubos"
            correction_factor TEXT NOT NULL DEFAULT '1',
            cooking_index TEXT NOT NULL DEFAULT '1',

            -- Computed once at creation, never recomputed on read
            net_quantity TEXT NOT NULL,
            yield_quantity TEXT NOT NULL,
            participation_percent TEXT NOT NULL DEFAULT '0.00',

            UNIQUE(recipe_id, position)
        );

        CREATE INDEX idx_sheet_items_recipe ON sheet_items(recipe_id);
        CREATE INDEX idx_sheet_items_ingredient ON sheet_items(ingredient_id);

        -- ============================================
        -- COMMENTS
        -- ============================================
        CREATE TABLE comments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            body TEXT NOT NULL,
            author TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_comments_recipe ON comments(recipe_id);

        -- ============================================
        -- NUTRITION TABLES
        -- One per recipe
        -- ============================================
        CREATE TABLE nutrition_tables (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            recipe_id INTEGER NOT NULL UNIQUE REFERENCES recipes(id) ON DELETE CASCADE,
            calories TEXT NOT NULL DEFAULT '0',      -- kcal
            carbohydrates TEXT NOT NULL DEFAULT '0', -- g
            protein TEXT NOT NULL DEFAULT '0',       -- g
            total_fat TEXT NOT NULL DEFAULT '0',     -- g
            sodium TEXT NOT NULL DEFAULT '0',        -- mg
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_recipe_title_unique_ignoring_case() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn.execute(
            "INSERT INTO recipes (title, method, category) VALUES ('Pudim', 'y', 'z')",
            [],
        )
        .unwrap();
        let result = conn.execute(
            "INSERT INTO recipes (title, method, category) VALUES ('PUDIM', 'y', 'z')",
            [],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_star_rating_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        let result = conn.execute(
            "INSERT INTO recipes (title, method, category, star_rating) VALUES ('x', 'y', 'z', 6)",
            [],
        );
        assert!(result.is_err());
    }
}
